//! Runtime record errors

use ccl_structure::grammar::DataType;
use ccl_structure::logging::{codes, Code};
use ccl_structure::CatalogError;

/// Errors raised while building record structures or reading and writing
/// record fields
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("Field '{field}' not found in {record}")]
    FieldNotFound { field: String, record: String },

    #[error("Field '{field}' is {actual}, not {expected}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Value {value} does not fit {data_type} field '{field}'")]
    ValueOutOfRange {
        field: String,
        value: i64,
        data_type: DataType,
    },

    #[error("Value for '{field}' is {length} characters; the field holds {max}")]
    ValueTooLong {
        field: String,
        length: usize,
        max: u32,
    },

    #[error("Cannot read '{field}' as a boolean: {value} is not in [0,1]")]
    NotBoolean { field: String, value: i64 },

    #[error("Index {index} is outside list '{list}' of size {size}")]
    IndexOutOfBounds {
        list: String,
        index: usize,
        size: usize,
    },

    #[error("Member '%i {path}' is an unresolved include")]
    UnresolvedIncludeMember { path: String },

    #[error("A field named '{name}' already exists")]
    DuplicateField { name: String },

    #[error("List '{list}' cannot hold more than {max} records")]
    ListCapacityExceeded { list: String, max: usize },

    #[error("Invalid definition for field '{name}': {reason}")]
    InvalidFieldDefinition { name: String, reason: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl RecordError {
    pub fn field_not_found(field: &str, record: &str) -> Self {
        Self::FieldNotFound {
            field: field.to_string(),
            record: record.to_string(),
        }
    }

    pub fn type_mismatch(field: &str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            field: field.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FieldNotFound { .. } => codes::record::FIELD_NOT_FOUND,
            Self::TypeMismatch { .. } => codes::record::TYPE_MISMATCH,
            Self::ValueOutOfRange { .. } => codes::record::VALUE_OUT_OF_RANGE,
            Self::ValueTooLong { .. } => codes::record::VALUE_TOO_LONG,
            Self::NotBoolean { .. } => codes::record::NOT_BOOLEAN,
            Self::IndexOutOfBounds { .. } => codes::record::INDEX_OUT_OF_BOUNDS,
            Self::UnresolvedIncludeMember { .. } => codes::record::UNRESOLVED_INCLUDE_MEMBER,
            Self::DuplicateField { .. } => codes::record::DUPLICATE_FIELD,
            Self::ListCapacityExceeded { .. } => codes::record::LIST_CAPACITY_EXCEEDED,
            Self::InvalidFieldDefinition { .. } => codes::record::INVALID_FIELD_DEFINITION,
            Self::Catalog(err) => err.error_code(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = RecordError::field_not_found("name", "request");
        assert_eq!(err.error_code(), codes::record::FIELD_NOT_FOUND);
        assert_eq!(err.category(), "Record");
        assert_eq!(err.to_string(), "Field 'name' not found in request");

        let err = RecordError::NotBoolean {
            field: "flag".to_string(),
            value: 2,
        };
        assert_eq!(err.error_code(), codes::record::NOT_BOOLEAN);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_catalog_errors_keep_their_code() {
        let err = RecordError::from(CatalogError::UnresolvedInclude {
            path: "x.inc".to_string(),
        });
        assert_eq!(err.error_code(), codes::catalog::UNRESOLVED_INCLUDE);
    }
}
