//! CCL primitive data types and declaration-token resolution
//!
//! A declaration token is whatever follows `=` or sits in brackets on a
//! declaration item: a type keyword (`vc`, `i4`, `dq8`, ...), a character
//! length (`c25` or bare `25`), or an occurs clause (`[*]`, `[10]`).

use crate::logging::{codes, Code};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataTypeError {
    #[error("Unrecognized data type declaration: '{token}'")]
    UnknownType { token: String },

    #[error("Invalid character length in declaration: '{token}'")]
    InvalidCharacterLength { token: String },

    #[error("Empty data type declaration")]
    EmptyToken,
}

impl DataTypeError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownType { .. } | Self::EmptyToken => codes::data_type::INVALID_DATA_TYPE,
            Self::InvalidCharacterLength { .. } => codes::data_type::INVALID_CHARACTER_LENGTH,
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

/// Closed set of CCL primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Fixed-length character; the length lives on the member
    Char,
    F4,
    F8,
    I1,
    Ui1,
    I2,
    Ui2,
    I4,
    Ui4,
    W8,
    Uw8,
    /// OS-dependent 32/64-bit handle
    H,
    Vc,
    Gvc,
    Zvc,
    Zgvc,
    Dq8,
    Dm12,
    Dm14,
}

/// What kind of value a primitive holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueCategory {
    Text,
    Integer,
    Float,
    DateTime,
}

impl DataType {
    pub const ALL: [DataType; 19] = [
        Self::Char,
        Self::F4,
        Self::F8,
        Self::I1,
        Self::Ui1,
        Self::I2,
        Self::Ui2,
        Self::I4,
        Self::Ui4,
        Self::W8,
        Self::Uw8,
        Self::H,
        Self::Vc,
        Self::Gvc,
        Self::Zvc,
        Self::Zgvc,
        Self::Dq8,
        Self::Dm12,
        Self::Dm14,
    ];

    /// Parse a type keyword, ignoring case. Character lengths (`c25`) are
    /// not keywords; see [`resolve_token`].
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Char => "CHAR",
            Self::F4 => "F4",
            Self::F8 => "F8",
            Self::I1 => "I1",
            Self::Ui1 => "UI1",
            Self::I2 => "I2",
            Self::Ui2 => "UI2",
            Self::I4 => "I4",
            Self::Ui4 => "UI4",
            Self::W8 => "W8",
            Self::Uw8 => "UW8",
            Self::H => "H",
            Self::Vc => "VC",
            Self::Gvc => "GVC",
            Self::Zvc => "ZVC",
            Self::Zgvc => "ZGVC",
            Self::Dq8 => "DQ8",
            Self::Dm12 => "DM12",
            Self::Dm14 => "DM14",
        }
    }

    pub fn category(&self) -> ValueCategory {
        match self {
            Self::Char | Self::Vc | Self::Gvc | Self::Zvc | Self::Zgvc => ValueCategory::Text,
            Self::F4 | Self::F8 => ValueCategory::Float,
            Self::Dq8 | Self::Dm12 | Self::Dm14 => ValueCategory::DateTime,
            Self::I1
            | Self::Ui1
            | Self::I2
            | Self::Ui2
            | Self::I4
            | Self::Ui4
            | Self::W8
            | Self::Uw8
            | Self::H => ValueCategory::Integer,
        }
    }

    /// Storage size in bytes for fixed-size kinds
    pub fn byte_length(&self) -> Option<u32> {
        match self {
            Self::I1 | Self::Ui1 => Some(1),
            Self::I2 | Self::Ui2 => Some(2),
            Self::I4 | Self::Ui4 | Self::F4 => Some(4),
            Self::W8 | Self::Uw8 | Self::F8 | Self::Dq8 => Some(8),
            Self::Dm12 => Some(12),
            Self::Dm14 => Some(14),
            Self::Char | Self::H | Self::Vc | Self::Gvc | Self::Zvc | Self::Zgvc => None,
        }
    }

    /// Inclusive value range of integer kinds. `UW8` is limited to the
    /// non-negative `i64` range.
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            Self::I1 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::Ui1 => Some((0, u8::MAX as i64)),
            Self::I2 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Ui2 => Some((0, u16::MAX as i64)),
            Self::I4 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Ui4 => Some((0, u32::MAX as i64)),
            Self::W8 | Self::H => Some((i64::MIN, i64::MAX)),
            Self::Uw8 => Some((0, i64::MAX)),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.category() == ValueCategory::Text
    }

    pub fn is_integer(&self) -> bool {
        self.category() == ValueCategory::Integer
    }

    pub fn is_float(&self) -> bool {
        self.category() == ValueCategory::Float
    }

    pub fn is_date_time(&self) -> bool {
        self.category() == ValueCategory::DateTime
    }

    /// `VC`, `GVC`, `ZVC` and `ZGVC`
    pub fn is_variable_length(&self) -> bool {
        matches!(self, Self::Vc | Self::Gvc | Self::Zvc | Self::Zgvc)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a type token to its primitive kind. Any `c`-prefixed token is
/// `Char`; its length is validated by [`resolve_token`].
pub fn for_declaration(token: &str) -> Result<DataType, DataTypeError> {
    match resolve_token(token)? {
        ResolvedToken::Primitive(data_type) => Ok(data_type),
        ResolvedToken::Character(_) => Ok(DataType::Char),
        ResolvedToken::Occurs(_) => Err(DataTypeError::UnknownType {
            token: token.to_string(),
        }),
    }
}

/// Outcome of resolving one declaration token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedToken {
    Primitive(DataType),
    /// Fixed-length character field of this many characters
    Character(u32),
    /// Bracketed occurs clause, brackets stripped and trimmed
    Occurs(String),
}

pub fn resolve_token(token: &str) -> Result<ResolvedToken, DataTypeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DataTypeError::EmptyToken);
    }

    if let Some(inner) = token.strip_prefix('[') {
        return match inner.strip_suffix(']') {
            Some(clause) => Ok(ResolvedToken::Occurs(clause.trim().to_string())),
            None => Err(DataTypeError::UnknownType {
                token: token.to_string(),
            }),
        };
    }

    if token.bytes().all(|b| b.is_ascii_digit()) {
        return character_length(token, token).map(ResolvedToken::Character);
    }

    if let Some(digits) = token.strip_prefix(['c', 'C']) {
        if token.eq_ignore_ascii_case("char") {
            return Err(DataTypeError::InvalidCharacterLength {
                token: token.to_string(),
            });
        }
        return character_length(digits, token).map(ResolvedToken::Character);
    }

    DataType::parse(token)
        .filter(|t| *t != DataType::Char)
        .map(ResolvedToken::Primitive)
        .ok_or_else(|| DataTypeError::UnknownType {
            token: token.to_string(),
        })
}

fn character_length(digits: &str, token: &str) -> Result<u32, DataTypeError> {
    let invalid = || DataTypeError::InvalidCharacterLength {
        token: token.to_string(),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match digits.parse::<u32>() {
        Ok(length) if length > 0 => Ok(length),
        _ => Err(invalid()),
    }
}
