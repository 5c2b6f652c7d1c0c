//! Structure-building errors
//!
//! Raised while turning a tokenized declaration into a `Structure` tree.

use crate::lexical::TokenizerError;
use crate::logging::{codes, Code};
use crate::utils::Span;

pub type StructureResult<T> = Result<T, StructureError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error("Member '{name}' at level {level} has no enclosing parent at {span}")]
    OrphanedMember { name: String, level: u32, span: Span },

    #[error("Invalid occurs clause '[{clause}]' on member '{name}' at {span}")]
    InvalidOccursClause {
        name: String,
        clause: String,
        span: Span,
    },

    #[error("Member '{name}' at level {level} exceeds the maximum nesting level {max}")]
    LevelTooDeep {
        name: String,
        level: u32,
        max: u32,
        span: Span,
    },

    #[error("Declaration at line {line} has no record name")]
    MissingDeclarationName { line: u32 },

    #[error("Member '{child}' is not nested below its parent '{parent}'")]
    LevelInvariantViolation { parent: String, child: String },
}

impl StructureError {
    pub fn orphaned_member(name: &str, level: u32, span: Span) -> Self {
        Self::OrphanedMember {
            name: name.to_string(),
            level,
            span,
        }
    }

    pub fn invalid_occurs_clause(name: &str, clause: &str, span: Span) -> Self {
        Self::InvalidOccursClause {
            name: name.to_string(),
            clause: clause.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Tokenizer(err) => err.error_code(),
            Self::OrphanedMember { .. } => codes::structure::ORPHANED_MEMBER,
            Self::InvalidOccursClause { .. } => codes::structure::INVALID_OCCURS_CLAUSE,
            Self::LevelTooDeep { .. } => codes::structure::LEVEL_TOO_DEEP,
            Self::MissingDeclarationName { .. } => codes::declaration::MISSING_DECLARATION_NAME,
            Self::LevelInvariantViolation { .. } => codes::structure::LEVEL_INVARIANT_VIOLATION,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Tokenizer(err) => err.span(),
            Self::OrphanedMember { span, .. }
            | Self::InvalidOccursClause { span, .. }
            | Self::LevelTooDeep { span, .. } => Some(*span),
            Self::MissingDeclarationName { .. } | Self::LevelInvariantViolation { .. } => None,
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
