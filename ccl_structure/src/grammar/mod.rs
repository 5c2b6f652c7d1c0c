//! Grammar definitions for CCL record-structure declarations

pub mod data_type;
pub mod nodes;

// Re-export data types
pub use data_type::{for_declaration, resolve_token, DataType, DataTypeError, ResolvedToken, ValueCategory};

// Re-export structure model
pub use nodes::{FlatMember, LevelViolation, MemberKind, Structure, StructureMember};
