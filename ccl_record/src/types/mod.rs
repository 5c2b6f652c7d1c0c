//! Runtime schema, records and their values

pub mod error;
pub mod list;
pub mod record;
pub mod structure;
pub mod value;

pub use error::{RecordError, RecordResult};
pub use list::{DynamicRecordList, RecordList};
pub use record::{ParentRef, Record};
pub use structure::{status_data_structure, FieldDefinition, FieldKind, RecordStructure, StructureBuilder};
pub use value::{default_date_time, FieldValue};
