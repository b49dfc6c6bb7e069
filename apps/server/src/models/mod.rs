//! Domain models: table rows, API representations, request inputs and roles

pub mod dto;
pub mod entities;
pub mod inputs;
pub mod roles;

pub use dto::*;
pub use entities::*;
pub use inputs::*;
pub use roles::{OrganizationRole, PersonRole};
