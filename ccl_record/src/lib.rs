// Internal modules
pub mod factory;
pub mod types;
pub mod wire;

// Re-export key types for library consumers
pub use factory::{create_named_record, create_record, create_record_from_catalog, record_structure};
pub use types::{
    DynamicRecordList, FieldDefinition, FieldKind, FieldValue, Record, RecordError, RecordList,
    RecordResult, RecordStructure, StructureBuilder,
};
pub use wire::{put_from_json, setter_commands, ReplyError};
