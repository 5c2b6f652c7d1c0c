//! Error family shared by the CCL source parsers
//!
//! Declaration parsing reports `InvalidDataTypeDeclaration` or
//! `InvalidRecordStructureDefinition`. The subroutine and documentation
//! variants belong to sibling parsers that share this family.

use crate::grammar::DataTypeError;
use crate::logging::{codes, Code};
use crate::syntax::StructureError;
use crate::utils::Span;

pub type ParserResult<T> = Result<T, ParserError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParserError {
    #[error("Invalid data type declaration: {0}")]
    InvalidDataTypeDeclaration(#[from] DataTypeError),

    #[error("Invalid record structure definition: {0}")]
    InvalidRecordStructureDefinition(#[from] StructureError),

    #[error("Invalid subroutine: {message}")]
    InvalidSubroutine { message: String },

    #[error("Invalid documentation: {message}")]
    InvalidDocumentation { message: String },
}

impl ParserError {
    pub fn invalid_subroutine(message: &str) -> Self {
        Self::InvalidSubroutine {
            message: message.to_string(),
        }
    }

    pub fn invalid_documentation(message: &str) -> Self {
        Self::InvalidDocumentation {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidDataTypeDeclaration(err) => err.error_code(),
            Self::InvalidRecordStructureDefinition(err) => err.error_code(),
            Self::InvalidSubroutine { .. } => codes::structure::INVALID_SUBROUTINE,
            Self::InvalidDocumentation { .. } => codes::structure::INVALID_DOCUMENTATION,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::InvalidRecordStructureDefinition(err) => err.span(),
            _ => None,
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

impl From<crate::lexical::TokenizerError> for ParserError {
    fn from(err: crate::lexical::TokenizerError) -> Self {
        Self::InvalidRecordStructureDefinition(StructureError::Tokenizer(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::TokenizerError;

    #[test]
    fn test_tokenizer_errors_are_structure_definitions() {
        let err: ParserError = TokenizerError::UnbalancedParentheses { line: 3 }.into();

        match &err {
            ParserError::InvalidRecordStructureDefinition(StructureError::Tokenizer(_)) => {}
            _ => panic!("Expected InvalidRecordStructureDefinition"),
        }
        assert_eq!(err.error_code(), codes::declaration::UNBALANCED_PARENTHESES);
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_data_type_errors_keep_their_code() {
        let err: ParserError = DataTypeError::UnknownType {
            token: "zz".to_string(),
        }
        .into();

        assert_eq!(err.error_code(), codes::data_type::INVALID_DATA_TYPE);
        assert!(err.span().is_none());
    }

    #[test]
    fn test_sibling_parser_variants() {
        let err = ParserError::invalid_subroutine("missing end");
        assert_eq!(err.error_code(), codes::structure::INVALID_SUBROUTINE);
        assert_eq!(err.to_string(), "Invalid subroutine: missing end");

        let err = ParserError::invalid_documentation("unterminated block");
        assert_eq!(err.error_code(), codes::structure::INVALID_DOCUMENTATION);
    }
}
