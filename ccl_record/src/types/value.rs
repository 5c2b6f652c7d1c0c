//! Stored field values

use super::list::{DynamicRecordList, RecordList};
use super::record::Record;
use chrono::{NaiveDate, NaiveDateTime};
use ccl_structure::grammar::ValueCategory;
use std::fmt;

/// Value held for one field of a [`Record`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    /// `None` is CCL's null date
    DateTime(Option<NaiveDateTime>),
    Record(Box<Record>),
    List(RecordList),
    DynamicList(DynamicRecordList),
}

/// `1900-01-01 00:00:00`, the value a fresh date-time field holds
pub fn default_date_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl FieldValue {
    /// Initial value of a scalar of this category
    pub fn default_for(category: ValueCategory) -> Self {
        match category {
            ValueCategory::Text => Self::Text(String::new()),
            ValueCategory::Integer => Self::Integer(0),
            ValueCategory::Float => Self::Float(0.0),
            ValueCategory::DateTime => Self::DateTime(Some(default_date_time())),
        }
    }

    /// Whether a setter command would leave this value out
    pub fn is_default(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Integer(value) => *value == 0,
            Self::Float(value) => *value == 0.0,
            Self::DateTime(_) | Self::Record(_) | Self::List(_) | Self::DynamicList(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "\"{}\"", text),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::DateTime(Some(value)) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S%.3f")),
            Self::DateTime(None) => write!(f, "null"),
            Self::Record(record) => write!(f, "record({})", record.name()),
            Self::List(list) => write!(f, "list({})", list.len()),
            Self::DynamicList(list) => write!(f, "dynamic list({})", list.len()),
        }
    }
}
