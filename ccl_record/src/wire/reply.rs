//! Loading CCL JSON replies into records
//!
//! CCL writes a record as `{"NAME": {...}}` with upper-cased keys. Fixed
//! lists of size one may arrive as a bare object instead of an array, and
//! date-times arrive as `/Date(2024-03-05T14:07:09.042+00:00)/`.

use crate::types::{FieldKind, Record, RecordError, RecordStructure};
use ccl_structure::config::runtime::RecordPreferences;
use ccl_structure::grammar::ValueCategory;
use ccl_structure::logging::{codes, Code};
use ccl_structure::{log_debug, log_success};
use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

/// Inner text CCL uses for a null date
const NULL_DATE: &str = "0000-00-00T00:00:00.000+00:00";

static JSON_DATE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplyError {
    #[error("Reply is not valid JSON: {message}")]
    MalformedJson { message: String },

    #[error("Reply does not contain record {name}")]
    MissingRecord { name: String },

    #[error("Expected '{field}' in the reply, but it is missing")]
    MissingField { field: String },

    #[error("Date value '{value}' for '{field}' is not a /Date(...)/ timestamp")]
    InvalidDate { field: String, value: String },

    #[error("Fixed-length list {list} has {expected} elements, but the reply has {actual}")]
    ListSizeMismatch {
        list: String,
        expected: usize,
        actual: usize,
    },

    #[error("Value for '{field}' is not {expected}")]
    InvalidValue { field: String, expected: String },

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl ReplyError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::MalformedJson { .. } => codes::reply::MALFORMED_JSON,
            Self::MissingRecord { .. } => codes::reply::MISSING_RECORD,
            Self::MissingField { .. } => codes::reply::MISSING_FIELD,
            Self::InvalidDate { .. } => codes::reply::INVALID_DATE,
            Self::ListSizeMismatch { .. } => codes::reply::LIST_SIZE_MISMATCH,
            Self::InvalidValue { .. } => codes::reply::INVALID_VALUE,
            Self::Record(err) => err.error_code(),
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

    fn invalid_value(field: &str, expected: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Populate `record` from a CCL JSON reply
pub fn put_from_json(json: &str, record: &mut Record) -> Result<(), ReplyError> {
    put_from_json_with(json, record, &RecordPreferences::default())
}

pub fn put_from_json_with(
    json: &str,
    record: &mut Record,
    preferences: &RecordPreferences,
) -> Result<(), ReplyError> {
    let root: Value = serde_json::from_str(json).map_err(|e| ReplyError::MalformedJson {
        message: e.to_string(),
    })?;
    put_from_value(&root, record, preferences)
}

/// Populate `record` from an already parsed reply document
pub fn put_from_value(
    root: &Value,
    record: &mut Record,
    preferences: &RecordPreferences,
) -> Result<(), ReplyError> {
    let reader = ReplyReader {
        uppercase_keys: preferences.uppercase_reply_keys,
    };

    let object = root.as_object().ok_or_else(|| ReplyError::MalformedJson {
        message: "top-level value is not an object".to_string(),
    })?;
    let body = reader
        .lookup(object, record.name())
        .and_then(Value::as_object)
        .ok_or_else(|| ReplyError::MissingRecord {
            name: record.name().to_uppercase(),
        })?;

    reader.read_record(body, record)?;

    log_success!(
        codes::success::REPLY_INGESTED,
        "Reply loaded into record",
        "record" => record.name()
    );
    Ok(())
}

struct ReplyReader {
    uppercase_keys: bool,
}

impl ReplyReader {
    fn lookup<'a>(&self, object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
        if self.uppercase_keys {
            object.get(&name.to_uppercase())
        } else {
            object
                .get(name)
                .or_else(|| {
                    object
                        .iter()
                        .find(|(key, _)| key.eq_ignore_ascii_case(name))
                        .map(|(_, value)| value)
                })
        }
    }

    fn read_record(&self, object: &Map<String, Value>, record: &mut Record) -> Result<(), ReplyError> {
        let structure: Arc<RecordStructure> = record.structure().clone();

        for definition in structure.fields() {
            let field = definition.name();
            let value = self
                .lookup(object, field)
                .ok_or_else(|| ReplyError::MissingField {
                    field: field.to_uppercase(),
                })?;

            match definition.kind() {
                FieldKind::Record(_) => {
                    let nested = value
                        .as_object()
                        .ok_or_else(|| ReplyError::invalid_value(field, "an object"))?;
                    self.read_record(nested, record.get_record_mut(field)?)?;
                }
                FieldKind::List { .. } => self.read_fixed_list(field, value, record)?,
                FieldKind::DynamicList(_) => self.read_dynamic_list(field, value, record)?,
                FieldKind::Character(_) => {
                    record.set_char(field, text_value(field, value)?)?;
                }
                FieldKind::Primitive(data_type) => match data_type.category() {
                    ValueCategory::Text => record.set_vc(field, text_value(field, value)?)?,
                    ValueCategory::Integer => {
                        let number = value
                            .as_i64()
                            .ok_or_else(|| ReplyError::invalid_value(field, "an integer"))?;
                        record.set_integer(field, number)?;
                    }
                    ValueCategory::Float => {
                        let number = value
                            .as_f64()
                            .ok_or_else(|| ReplyError::invalid_value(field, "a number"))?;
                        record.set_f8(field, number)?;
                    }
                    ValueCategory::DateTime => {
                        record.set_dq8(field, parse_json_date(field, value)?)?;
                    }
                },
            }
        }

        Ok(())
    }

    fn read_fixed_list(&self, field: &str, value: &Value, record: &mut Record) -> Result<(), ReplyError> {
        let list = record.get_list_mut(field)?;

        match value {
            Value::Array(items) => {
                if items.len() != list.len() {
                    return Err(ReplyError::ListSizeMismatch {
                        list: field.to_uppercase(),
                        expected: list.len(),
                        actual: items.len(),
                    });
                }
                for (item, target) in items.iter().zip(list.iter_mut()) {
                    let object = item
                        .as_object()
                        .ok_or_else(|| ReplyError::invalid_value(field, "a list of objects"))?;
                    self.read_record(object, target)?;
                }
                Ok(())
            }
            Value::Object(object) => {
                // Single-item lists may be written without the array
                if list.len() != 1 {
                    return Err(ReplyError::ListSizeMismatch {
                        list: field.to_uppercase(),
                        expected: list.len(),
                        actual: 1,
                    });
                }
                self.read_record(object, list.get_mut(0)?)
            }
            _ => Err(ReplyError::invalid_value(field, "a list")),
        }
    }

    fn read_dynamic_list(&self, field: &str, value: &Value, record: &mut Record) -> Result<(), ReplyError> {
        let items = value
            .as_array()
            .ok_or_else(|| ReplyError::invalid_value(field, "an array"))?;
        let list = record.get_dynamic_list_mut(field)?;

        log_debug!("Reading dynamic list",
            "list" => field,
            "items" => items.len(),
            "existing" => list.len()
        );

        for (index, item) in items.iter().enumerate() {
            let object = item
                .as_object()
                .ok_or_else(|| ReplyError::invalid_value(field, "a list of objects"))?;
            let target = if index < list.len() {
                list.get_mut(index)?
            } else {
                list.add_item()?
            };
            self.read_record(object, target)?;
        }

        Ok(())
    }
}

/// Strings pass through; numbers and booleans are taken as their JSON text
fn text_value(field: &str, value: &Value) -> Result<String, ReplyError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(ReplyError::invalid_value(field, "text")),
    }
}

fn json_date_pattern() -> Option<&'static Regex> {
    JSON_DATE_PATTERN
        .get_or_init(|| Regex::new(r"^/Date\((.*)\)/$").ok())
        .as_ref()
}

/// Parse `/Date(YYYY-MM-DDTHH:MM:SS.mmm+HH:MM)/`, keeping the wall-clock
/// time as written. The all-zero date is `None`.
pub fn parse_json_date(field: &str, value: &Value) -> Result<Option<NaiveDateTime>, ReplyError> {
    let invalid = || ReplyError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    };

    let text = value.as_str().ok_or_else(invalid)?;
    let inner = json_date_pattern()
        .and_then(|pattern| pattern.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .ok_or_else(invalid)?;

    if inner == NULL_DATE {
        return Ok(None);
    }

    DateTime::parse_from_str(inner, "%Y-%m-%dT%H:%M:%S%.3f%:z")
        .map(|parsed| Some(parsed.naive_local()))
        .map_err(|_| invalid())
}
