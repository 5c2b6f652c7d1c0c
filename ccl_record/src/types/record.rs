//! Runtime record instances
//!
//! A [`Record`] holds one value per field of its [`RecordStructure`], in
//! declaration order. Accessors are typed: reading or writing a field with
//! the wrong accessor is a [`RecordError::TypeMismatch`]. Field names are
//! matched without regard to case.

use super::error::{RecordError, RecordResult};
use super::list::{DynamicRecordList, RecordList};
use super::structure::{FieldDefinition, FieldKind, RecordStructure};
use super::value::FieldValue;
use ccl_structure::grammar::DataType;
use chrono::NaiveDateTime;
use std::fmt;
use std::sync::Arc;

/// Name and nesting level of the record that owns a nested record
///
/// Only context is kept; the owner holds the child by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    name: String,
    level: u32,
}

impl ParentRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    structure: Arc<RecordStructure>,
    level: u32,
    parent: Option<ParentRef>,
    values: Vec<FieldValue>,
}

impl Record {
    /// Root record with every field at its default
    pub fn new(name: impl Into<String>, structure: Arc<RecordStructure>) -> Self {
        Self::build(name.into(), structure, None)
    }

    pub(crate) fn nested(name: &str, structure: Arc<RecordStructure>, parent: &ParentRef) -> Self {
        Self::build(name.to_string(), structure, Some(parent.clone()))
    }

    fn build(name: String, structure: Arc<RecordStructure>, parent: Option<ParentRef>) -> Self {
        let level = parent.as_ref().map_or(0, |p| p.level + 1);
        let owner = ParentRef {
            name: name.clone(),
            level,
        };
        let values = structure
            .fields()
            .iter()
            .map(|field| initial_value(field, &owner))
            .collect();

        Self {
            name,
            structure,
            level,
            parent,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn structure(&self) -> &Arc<RecordStructure> {
        &self.structure
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 0 for a root record, one more per level of nesting
    pub fn nested_level(&self) -> u32 {
        self.level
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    pub fn has_member(&self, field: &str) -> bool {
        self.structure.has_member(field)
    }

    /// Primitive type of `field`; `None` for nested records and lists
    pub fn data_type(&self, field: &str) -> RecordResult<Option<DataType>> {
        Ok(self.definition(field)?.1.data_type())
    }

    pub fn field_kind(&self, field: &str) -> RecordResult<&FieldKind> {
        Ok(self.definition(field)?.1.kind())
    }

    /// Stored value of any field
    pub fn value(&self, field: &str) -> RecordResult<&FieldValue> {
        let (index, _) = self.definition(field)?;
        Ok(&self.values[index])
    }

    /// Field definitions paired with their values, in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&FieldDefinition, &FieldValue)> {
        self.structure.fields().iter().zip(self.values.iter())
    }

    /// `record NAME ( ... )` text declaring this record's structure
    pub fn declaration(&self) -> String {
        let mut out = format!("record {}\n(\n", self.name);
        self.structure.write_declaration(&mut out, 1);
        out.push(')');
        out
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    pub fn get_char(&self, field: &str) -> RecordResult<&str> {
        let index = self.typed(field, "C", is_character)?;
        self.text_at(field, index)
    }

    /// Fails with `ValueTooLong` when `value` exceeds the declared length
    pub fn set_char(&mut self, field: &str, value: impl Into<String>) -> RecordResult<()> {
        let index = self.typed(field, "C", is_character)?;
        let value = value.into();

        if let FieldKind::Character(max) = self.structure.fields()[index].kind() {
            let length = value.chars().count();
            if length > *max as usize {
                return Err(RecordError::ValueTooLong {
                    field: field.to_string(),
                    length,
                    max: *max,
                });
            }
        }

        self.values[index] = FieldValue::Text(value);
        Ok(())
    }

    /// `VC` and its `GVC`/`ZVC`/`ZGVC` variants
    pub fn get_vc(&self, field: &str) -> RecordResult<&str> {
        let index = self.typed(field, "VC", is_variable_text)?;
        self.text_at(field, index)
    }

    pub fn set_vc(&mut self, field: &str, value: impl Into<String>) -> RecordResult<()> {
        let index = self.typed(field, "VC", is_variable_text)?;
        self.values[index] = FieldValue::Text(value.into());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Integers
    // ------------------------------------------------------------------

    pub fn get_i2(&self, field: &str) -> RecordResult<i16> {
        let index = self.typed(field, "I2", is_i2)?;
        let value = self.integer_at(field, index)?;
        i16::try_from(value).map_err(|_| out_of_range(field, value, DataType::I2))
    }

    pub fn set_i2(&mut self, field: &str, value: i16) -> RecordResult<()> {
        let index = self.typed(field, "I2", is_i2)?;
        self.values[index] = FieldValue::Integer(value as i64);
        Ok(())
    }

    /// An I2 read as a flag. Only 0 and 1 convert.
    pub fn get_i2_boolean(&self, field: &str) -> RecordResult<bool> {
        match self.get_i2(field)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(RecordError::NotBoolean {
                field: field.to_string(),
                value: other as i64,
            }),
        }
    }

    pub fn set_i2_boolean(&mut self, field: &str, value: bool) -> RecordResult<()> {
        self.set_i2(field, i16::from(value))
    }

    /// Reads an I2 or I4 field
    pub fn get_i4(&self, field: &str) -> RecordResult<i32> {
        let index = self.typed(field, "I2 or I4", is_i2_or_i4)?;
        let value = self.integer_at(field, index)?;
        i32::try_from(value).map_err(|_| out_of_range(field, value, DataType::I4))
    }

    /// Writes an I2 or I4 field; an I2 target is range checked
    pub fn set_i4(&mut self, field: &str, value: i32) -> RecordResult<()> {
        let index = self.typed(field, "I2 or I4", is_i2_or_i4)?;
        self.store_integer(field, index, value as i64)
    }

    /// Any integer kind, widened to `i64`
    pub fn get_integer(&self, field: &str) -> RecordResult<i64> {
        let index = self.typed(field, "integer", is_integer)?;
        self.integer_at(field, index)
    }

    pub fn set_integer(&mut self, field: &str, value: i64) -> RecordResult<()> {
        let index = self.typed(field, "integer", is_integer)?;
        self.store_integer(field, index, value)
    }

    // ------------------------------------------------------------------
    // Floats and dates
    // ------------------------------------------------------------------

    /// Reads an F4 or F8 field
    pub fn get_f8(&self, field: &str) -> RecordResult<f64> {
        let index = self.typed(field, "F8", is_float)?;
        match &self.values[index] {
            FieldValue::Float(value) => Ok(*value),
            other => Err(self.stored_mismatch(field, "F8", other)),
        }
    }

    pub fn set_f8(&mut self, field: &str, value: f64) -> RecordResult<()> {
        let index = self.typed(field, "F8", is_float)?;
        self.values[index] = FieldValue::Float(value);
        Ok(())
    }

    /// Reads a DQ8, DM12 or DM14 field; `None` is the null date
    pub fn get_dq8(&self, field: &str) -> RecordResult<Option<NaiveDateTime>> {
        let index = self.typed(field, "DQ8", is_date_time)?;
        match &self.values[index] {
            FieldValue::DateTime(value) => Ok(*value),
            other => Err(self.stored_mismatch(field, "DQ8", other)),
        }
    }

    pub fn set_dq8(&mut self, field: &str, value: Option<NaiveDateTime>) -> RecordResult<()> {
        let index = self.typed(field, "DQ8", is_date_time)?;
        self.values[index] = FieldValue::DateTime(value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Nested records and lists
    // ------------------------------------------------------------------

    pub fn get_record(&self, field: &str) -> RecordResult<&Record> {
        let index = self.typed(field, "RECORD", is_record)?;
        match &self.values[index] {
            FieldValue::Record(record) => Ok(&**record),
            other => Err(self.stored_mismatch(field, "RECORD", other)),
        }
    }

    pub fn get_record_mut(&mut self, field: &str) -> RecordResult<&mut Record> {
        let index = self.typed(field, "RECORD", is_record)?;
        let kind = self.structure.fields()[index].kind().describe();
        match &mut self.values[index] {
            FieldValue::Record(record) => Ok(&mut **record),
            _ => Err(RecordError::type_mismatch(field, "RECORD", kind)),
        }
    }

    pub fn get_list(&self, field: &str) -> RecordResult<&RecordList> {
        let index = self.typed(field, "LIST", is_fixed_list)?;
        match &self.values[index] {
            FieldValue::List(list) => Ok(list),
            other => Err(self.stored_mismatch(field, "LIST", other)),
        }
    }

    pub fn get_list_mut(&mut self, field: &str) -> RecordResult<&mut RecordList> {
        let index = self.typed(field, "LIST", is_fixed_list)?;
        let kind = self.structure.fields()[index].kind().describe();
        match &mut self.values[index] {
            FieldValue::List(list) => Ok(list),
            _ => Err(RecordError::type_mismatch(field, "LIST", kind)),
        }
    }

    pub fn get_dynamic_list(&self, field: &str) -> RecordResult<&DynamicRecordList> {
        let index = self.typed(field, "DYNAMIC_LIST", is_dynamic_list)?;
        match &self.values[index] {
            FieldValue::DynamicList(list) => Ok(list),
            other => Err(self.stored_mismatch(field, "DYNAMIC_LIST", other)),
        }
    }

    pub fn get_dynamic_list_mut(&mut self, field: &str) -> RecordResult<&mut DynamicRecordList> {
        let index = self.typed(field, "DYNAMIC_LIST", is_dynamic_list)?;
        let kind = self.structure.fields()[index].kind().describe();
        match &mut self.values[index] {
            FieldValue::DynamicList(list) => Ok(list),
            _ => Err(RecordError::type_mismatch(field, "DYNAMIC_LIST", kind)),
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn definition(&self, field: &str) -> RecordResult<(usize, &FieldDefinition)> {
        let index = self
            .structure
            .position(field)
            .ok_or_else(|| RecordError::field_not_found(field, &self.name))?;
        Ok((index, &self.structure.fields()[index]))
    }

    fn typed(&self, field: &str, expected: &str, accepts: fn(&FieldKind) -> bool) -> RecordResult<usize> {
        let (index, definition) = self.definition(field)?;
        if accepts(definition.kind()) {
            Ok(index)
        } else {
            Err(RecordError::type_mismatch(
                field,
                expected,
                definition.kind().describe(),
            ))
        }
    }

    fn text_at(&self, field: &str, index: usize) -> RecordResult<&str> {
        match &self.values[index] {
            FieldValue::Text(text) => Ok(text),
            other => Err(self.stored_mismatch(field, "text", other)),
        }
    }

    fn integer_at(&self, field: &str, index: usize) -> RecordResult<i64> {
        match &self.values[index] {
            FieldValue::Integer(value) => Ok(*value),
            other => Err(self.stored_mismatch(field, "integer", other)),
        }
    }

    fn store_integer(&mut self, field: &str, index: usize, value: i64) -> RecordResult<()> {
        if let FieldKind::Primitive(data_type) = self.structure.fields()[index].kind() {
            if let Some((min, max)) = data_type.integer_range() {
                if value < min || value > max {
                    return Err(out_of_range(field, value, *data_type));
                }
            }
        }

        self.values[index] = FieldValue::Integer(value);
        Ok(())
    }

    fn stored_mismatch(&self, field: &str, expected: &str, stored: &FieldValue) -> RecordError {
        RecordError::type_mismatch(field, expected, stored.to_string())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            writeln!(f, "{}", self.name)?;
        }

        let indent = " ".repeat(self.level as usize + 1);
        let level = self.level + 1;

        for (definition, value) in self.entries() {
            match value {
                FieldValue::Record(record) => {
                    writeln!(f, "{}{} {}", indent, level, definition.name())?;
                    write!(f, "{}", record)?;
                }
                FieldValue::List(list) => {
                    for (i, record) in list.iter().enumerate() {
                        writeln!(f, "{}{} {} [{},{}]", indent, level, definition.name(), i + 1, list.len())?;
                        write!(f, "{}", record)?;
                    }
                }
                FieldValue::DynamicList(list) => {
                    for (i, record) in list.iter().enumerate() {
                        writeln!(f, "{}{} {} [{},{}]", indent, level, definition.name(), i + 1, list.len())?;
                        write!(f, "{}", record)?;
                    }
                }
                scalar => writeln!(
                    f,
                    "{}{} {} {{{}}}",
                    indent,
                    level,
                    definition.declaration(),
                    scalar
                )?,
            }
        }

        Ok(())
    }
}

fn initial_value(field: &FieldDefinition, owner: &ParentRef) -> FieldValue {
    match field.kind() {
        FieldKind::Primitive(data_type) => FieldValue::default_for(data_type.category()),
        FieldKind::Character(_) => FieldValue::Text(String::new()),
        FieldKind::Record(structure) => {
            FieldValue::Record(Box::new(Record::nested(field.name(), structure.clone(), owner)))
        }
        FieldKind::List { structure, size } => {
            FieldValue::List(RecordList::new(field.name(), structure.clone(), *size, owner))
        }
        FieldKind::DynamicList(structure) => {
            FieldValue::DynamicList(DynamicRecordList::new(field.name(), structure.clone(), owner))
        }
    }
}

fn out_of_range(field: &str, value: i64, data_type: DataType) -> RecordError {
    RecordError::ValueOutOfRange {
        field: field.to_string(),
        value,
        data_type,
    }
}

fn is_character(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Character(_))
}

fn is_variable_text(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Primitive(t) if t.is_variable_length())
}

fn is_i2(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Primitive(DataType::I2))
}

fn is_i2_or_i4(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Primitive(DataType::I2 | DataType::I4))
}

fn is_integer(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Primitive(t) if t.is_integer())
}

fn is_float(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Primitive(t) if t.is_float())
}

fn is_date_time(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Primitive(t) if t.is_date_time())
}

fn is_record(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Record(_))
}

fn is_fixed_list(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::List { .. })
}

fn is_dynamic_list(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::DynamicList(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::default_date_time;
    use crate::types::StructureBuilder;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn request() -> Record {
        let person = StructureBuilder::new().add_vc("name").build().unwrap();
        let structure = StructureBuilder::new()
            .add_char("code", 3)
            .add_vc("comment")
            .add_i2("active_ind")
            .add_i4("count")
            .add_f8("person_id")
            .add_dq8("updt_dt_tm")
            .add_primitive("big", DataType::W8)
            .add_record("person", person)
            .build()
            .unwrap();
        Record::new("request", structure)
    }

    #[test]
    fn test_defaults() {
        let record = request();

        assert_eq!(record.get_char("code").unwrap(), "");
        assert_eq!(record.get_vc("comment").unwrap(), "");
        assert_eq!(record.get_i2("active_ind").unwrap(), 0);
        assert_eq!(record.get_f8("person_id").unwrap(), 0.0);
        assert_eq!(record.get_dq8("updt_dt_tm").unwrap(), Some(default_date_time()));
        assert!(record.is_root());
        assert_eq!(record.nested_level(), 0);
    }

    #[test]
    fn test_typed_setters_round_trip() {
        let mut record = request();
        let when = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_milli_opt(8, 30, 0, 250)
            .unwrap();

        record.set_char("CODE", "abc").unwrap();
        record.set_vc("comment", "it's fine").unwrap();
        record.set_i2_boolean("active_ind", true).unwrap();
        record.set_i4("count", 70_000).unwrap();
        record.set_f8("person_id", 1234.5).unwrap();
        record.set_dq8("updt_dt_tm", Some(when)).unwrap();
        record.set_integer("big", i64::MAX).unwrap();

        assert_eq!(record.get_char("code").unwrap(), "abc");
        assert_eq!(record.get_vc("Comment").unwrap(), "it's fine");
        assert!(record.get_i2_boolean("active_ind").unwrap());
        assert_eq!(record.get_i4("count").unwrap(), 70_000);
        assert_eq!(record.get_i4("active_ind").unwrap(), 1);
        assert_eq!(record.get_f8("person_id").unwrap(), 1234.5);
        assert_eq!(record.get_dq8("updt_dt_tm").unwrap(), Some(when));
        assert_eq!(record.get_integer("big").unwrap(), i64::MAX);

        record.set_dq8("updt_dt_tm", None).unwrap();
        assert_eq!(record.get_dq8("updt_dt_tm").unwrap(), None);
    }

    #[test]
    fn test_setter_validation() {
        let mut record = request();

        assert_matches!(
            record.set_char("code", "abcd"),
            Err(RecordError::ValueTooLong { length: 4, max: 3, .. })
        );
        assert_matches!(
            record.set_i4("active_ind", 40_000),
            Err(RecordError::ValueOutOfRange { data_type: DataType::I2, .. })
        );
        assert_matches!(
            record.set_vc("count", "x"),
            Err(RecordError::TypeMismatch { .. })
        );
        assert_matches!(
            record.get_vc("missing"),
            Err(RecordError::FieldNotFound { .. })
        );

        record.set_i2("active_ind", 2).unwrap();
        assert_matches!(
            record.get_i2_boolean("active_ind"),
            Err(RecordError::NotBoolean { value: 2, .. })
        );
    }

    #[test]
    fn test_nested_record_context() {
        let mut record = request();
        record
            .get_record_mut("person")
            .unwrap()
            .set_vc("name", "Pat")
            .unwrap();

        let person = record.get_record("PERSON").unwrap();
        assert_eq!(person.get_vc("name").unwrap(), "Pat");
        assert!(!person.is_root());
        assert_eq!(person.nested_level(), 1);

        let parent = person.parent().unwrap();
        assert_eq!(parent.name(), "request");
        assert_eq!(parent.level(), 0);
    }

    #[test]
    fn test_member_queries() {
        let record = request();

        assert!(record.has_member("Person_ID"));
        assert!(!record.has_member("nope"));
        assert_eq!(record.data_type("count").unwrap(), Some(DataType::I4));
        assert_eq!(record.data_type("code").unwrap(), Some(DataType::Char));
        assert_eq!(record.data_type("person").unwrap(), None);
        assert_eq!(record.field_kind("code").unwrap(), &FieldKind::Character(3));
        assert!(record.field_kind("person").unwrap().is_complex());
        assert!(!record.field_kind("person").unwrap().is_list());
    }

    #[test]
    fn test_declaration() {
        let structure = StructureBuilder::new()
            .add_vc("name")
            .add_status_data()
            .build()
            .unwrap();
        let record = Record::new("reply", structure);

        assert_eq!(
            record.declaration(),
            "record reply\n(\n  1 name = VC\n  1 status_data\n    2 status = C1\n    2 subeventstatus [1]\n      3 OperationName = C25\n      3 OperationStatus = C1\n      3 TargetObjectName = C25\n      3 TargetObjectValue = VC\n)"
        );
    }

    #[test]
    fn test_display_lists_values() {
        let mut record = request();
        record.set_vc("comment", "hi").unwrap();

        let text = record.to_string();
        assert!(text.starts_with("request\n"));
        assert!(text.contains(" 1 comment = VC {\"hi\"}"));
        assert!(text.contains("  2 name = VC {\"\"}"));
    }
}
