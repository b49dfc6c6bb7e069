//! Reporting module documents for the CDE registry.
//!
//! A reporting module is an externally authored XML document describing a full
//! element set: module-level metadata plus an ordered list of typed data elements.
//! This crate turns such a document into a typed [`ModuleDescription`] graph and
//! back:
//! - [`parse_module`] reads and structurally validates the XML before anything is mapped.
//! - [`write_module`] serializes a description using the same element layout.
//!
//! ```rust
//! use cde_module::{parse_module, DataElementType};
//!
//! let xml = r#"
//! <ReportingModule id="demo">
//!   <Metadata><Label>Demo</Label></Metadata>
//!   <DataElements>
//!     <IntegerDataElement Id="size">
//!       <Label>Size</Label>
//!       <Minimum>0</Minimum>
//!       <Maximum>10</Maximum>
//!     </IntegerDataElement>
//!   </DataElements>
//! </ReportingModule>"#;
//!
//! let module = parse_module(xml).unwrap();
//! assert_eq!(module.name, "Demo");
//! assert_eq!(module.data_elements[0].element_type(), DataElementType::Integer);
//! ```

mod error;
mod model;
mod parse;
mod write;

pub use error::{ModuleError, Result};
pub use model::{Choice, DataElement, DataElementKind, DataElementType, ModuleDescription};
pub use parse::parse_module;
pub use write::write_module;
