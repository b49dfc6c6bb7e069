//! Data access - storage backends, unit of work and the typed registry context

pub mod memory;
pub mod postgres;
pub mod registry;
pub mod schema;
pub mod seed;
pub mod traits;
pub mod unit_of_work;

pub use memory::MemoryRegistryStore;
pub use postgres::PostgresRegistryStore;
pub use registry::Registry;
pub use schema::{Id, Table};
pub use traits::{Record, RegistryStore};
pub use unit_of_work::{CommitOutcome, Link, Pending, UnitOfWork};
