//! Runtime record schema
//!
//! A [`RecordStructure`] is the immutable shape shared by every record built
//! from it. Nested shapes are held behind `Arc` so list items and nested
//! records can point at them without copying.

use super::error::{RecordError, RecordResult};
use ccl_structure::config::compile_time::record::MAX_PREALLOCATED_RECORDS;
use ccl_structure::grammar::DataType;
use std::fmt;
use std::sync::Arc;

/// What a single field holds
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Primitive(DataType),
    /// Fixed-length character field of this many characters
    Character(u32),
    Record(Arc<RecordStructure>),
    List {
        structure: Arc<RecordStructure>,
        size: usize,
    },
    DynamicList(Arc<RecordStructure>),
}

impl FieldKind {
    /// Primitive type of a scalar field; `None` for records and lists
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Primitive(data_type) => Some(*data_type),
            Self::Character(_) => Some(DataType::Char),
            Self::Record(_) | Self::List { .. } | Self::DynamicList(_) => None,
        }
    }

    /// Child structure of a record or list field
    pub fn structure(&self) -> Option<&Arc<RecordStructure>> {
        match self {
            Self::Record(structure)
            | Self::List { structure, .. }
            | Self::DynamicList(structure) => Some(structure),
            Self::Primitive(_) | Self::Character(_) => None,
        }
    }

    pub fn is_complex(&self) -> bool {
        self.structure().is_some()
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List { .. } | Self::DynamicList(_))
    }

    /// Short name used in error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(data_type) => data_type.to_string(),
            Self::Character(length) => format!("C{}", length),
            Self::Record(_) => "RECORD".to_string(),
            Self::List { size, .. } => format!("LIST[{}]", size),
            Self::DynamicList(_) => "DYNAMIC_LIST".to_string(),
        }
    }

    /// Nested records a field of this kind creates when its owner is built
    pub fn preallocated_records(&self) -> usize {
        match self {
            Self::Record(structure) => structure.preallocated_records().saturating_add(1),
            Self::List { structure, size } => size
                .saturating_mul(structure.preallocated_records().saturating_add(1)),
            Self::Primitive(_) | Self::Character(_) | Self::DynamicList(_) => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    name: String,
    kind: FieldKind,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.kind.data_type()
    }

    /// Declaration line without its level, e.g. `name = VC` or `qual [*]`
    pub fn declaration(&self) -> String {
        match &self.kind {
            FieldKind::Primitive(data_type) => format!("{} = {}", self.name, data_type),
            FieldKind::Character(length) => format!("{} = C{}", self.name, length),
            FieldKind::Record(_) => self.name.clone(),
            FieldKind::List { size, .. } => format!("{} [{}]", self.name, size),
            FieldKind::DynamicList(_) => format!("{} [*]", self.name),
        }
    }
}

/// Ordered field definitions. Field lookup ignores case.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordStructure {
    fields: Vec<FieldDefinition>,
    preallocated: usize,
}

impl RecordStructure {
    fn from_fields(fields: Vec<FieldDefinition>) -> Self {
        let preallocated = fields.iter().fold(0usize, |total, field| {
            total.saturating_add(field.kind.preallocated_records())
        });
        Self {
            fields,
            preallocated,
        }
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name.eq_ignore_ascii_case(name))
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.position(name).map(|index| &self.fields[index])
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Nested records created up front for one record of this shape.
    /// Dynamic list items are not counted; they are created on demand.
    pub fn preallocated_records(&self) -> usize {
        self.preallocated
    }

    /// Member lines at `level`, children indented two spaces per level
    pub fn write_declaration(&self, out: &mut String, level: u32) {
        for field in &self.fields {
            out.push_str(&" ".repeat(level as usize * 2));
            out.push_str(&format!("{} {}\n", level, field.declaration()));
            if let Some(child) = field.kind.structure() {
                child.write_declaration(out, level + 1);
            }
        }
    }
}

impl fmt::Display for RecordStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_declaration(&mut out, 1);
        f.write_str(&out)
    }
}

/// Programmatic construction of a [`RecordStructure`]
///
/// Definitions are collected as given and checked in [`build`](Self::build):
/// duplicate names (ignoring case), zero-length character fields and shapes
/// that would pre-allocate more than `MAX_PREALLOCATED_RECORDS` nested
/// records are rejected there.
#[derive(Debug, Clone, Default)]
pub struct StructureBuilder {
    fields: Vec<FieldDefinition>,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a copy of an existing structure's fields
    pub fn from_existing(structure: &RecordStructure) -> Self {
        Self {
            fields: structure.fields.clone(),
        }
    }

    pub fn add_char(self, name: impl Into<String>, length: u32) -> Self {
        self.add(name, FieldKind::Character(length))
    }

    pub fn add_vc(self, name: impl Into<String>) -> Self {
        self.add_primitive(name, DataType::Vc)
    }

    pub fn add_i2(self, name: impl Into<String>) -> Self {
        self.add_primitive(name, DataType::I2)
    }

    pub fn add_i4(self, name: impl Into<String>) -> Self {
        self.add_primitive(name, DataType::I4)
    }

    pub fn add_f8(self, name: impl Into<String>) -> Self {
        self.add_primitive(name, DataType::F8)
    }

    pub fn add_dq8(self, name: impl Into<String>) -> Self {
        self.add_primitive(name, DataType::Dq8)
    }

    /// Any primitive; `DataType::Char` needs [`add_char`](Self::add_char)
    /// and is rejected at build time
    pub fn add_primitive(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.add(name, FieldKind::Primitive(data_type))
    }

    pub fn add_record(self, name: impl Into<String>, structure: Arc<RecordStructure>) -> Self {
        self.add(name, FieldKind::Record(structure))
    }

    pub fn add_list(self, name: impl Into<String>, structure: Arc<RecordStructure>, size: usize) -> Self {
        self.add(name, FieldKind::List { structure, size })
    }

    pub fn add_dynamic_list(self, name: impl Into<String>, structure: Arc<RecordStructure>) -> Self {
        self.add(name, FieldKind::DynamicList(structure))
    }

    /// Add the standard `status_data` reply block
    pub fn add_status_data(self) -> Self {
        self.add_record("status_data", status_data_structure())
    }

    pub fn add_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    fn add(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.add_field(FieldDefinition::new(name, kind))
    }

    pub fn build(self) -> RecordResult<Arc<RecordStructure>> {
        let mut preallocated = 0usize;

        for (index, field) in self.fields.iter().enumerate() {
            if self.fields[..index]
                .iter()
                .any(|earlier| earlier.name.eq_ignore_ascii_case(&field.name))
            {
                return Err(RecordError::DuplicateField {
                    name: field.name.clone(),
                });
            }

            match field.kind {
                FieldKind::Character(0) => {
                    return Err(RecordError::InvalidFieldDefinition {
                        name: field.name.clone(),
                        reason: "character length must be positive".to_string(),
                    })
                }
                FieldKind::Primitive(DataType::Char) => {
                    return Err(RecordError::InvalidFieldDefinition {
                        name: field.name.clone(),
                        reason: "character fields need a length".to_string(),
                    })
                }
                _ => {}
            }

            preallocated = preallocated.saturating_add(field.kind.preallocated_records());
            if preallocated > MAX_PREALLOCATED_RECORDS {
                return Err(RecordError::ListCapacityExceeded {
                    list: field.name.clone(),
                    max: MAX_PREALLOCATED_RECORDS,
                });
            }
        }

        Ok(Arc::new(RecordStructure::from_fields(self.fields)))
    }
}

/// Shape of the standard `status_data` block
pub fn status_data_structure() -> Arc<RecordStructure> {
    let subevent = Arc::new(RecordStructure::from_fields(vec![
        FieldDefinition::new("OperationName", FieldKind::Character(25)),
        FieldDefinition::new("OperationStatus", FieldKind::Character(1)),
        FieldDefinition::new("TargetObjectName", FieldKind::Character(25)),
        FieldDefinition::new("TargetObjectValue", FieldKind::Primitive(DataType::Vc)),
    ]));

    Arc::new(RecordStructure::from_fields(vec![
        FieldDefinition::new("status", FieldKind::Character(1)),
        FieldDefinition::new(
            "subeventstatus",
            FieldKind::List {
                structure: subevent,
                size: 1,
            },
        ),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_builder_keeps_order_and_ignores_case_on_lookup() {
        let structure = StructureBuilder::new()
            .add_vc("programName")
            .add_i2("compile")
            .add_char("flag", 1)
            .build()
            .unwrap();

        let names: Vec<_> = structure.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["programName", "compile", "flag"]);
        assert!(structure.has_member("PROGRAMNAME"));
        assert_eq!(structure.field("Flag").unwrap().data_type(), Some(DataType::Char));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = StructureBuilder::new().add_vc("name").add_i4("NAME").build();
        assert_matches!(result, Err(RecordError::DuplicateField { name }) if name == "NAME");
    }

    #[test]
    fn test_invalid_character_fields_are_rejected() {
        assert_matches!(
            StructureBuilder::new().add_char("c", 0).build(),
            Err(RecordError::InvalidFieldDefinition { .. })
        );
        assert_matches!(
            StructureBuilder::new().add_primitive("c", DataType::Char).build(),
            Err(RecordError::InvalidFieldDefinition { .. })
        );
    }

    #[test]
    fn test_nested_fixed_lists_are_capped_by_total_records() {
        let leaf = StructureBuilder::new().add_vc("c").build().unwrap();
        let middle = StructureBuilder::new().add_list("b", leaf, 100).build().unwrap();
        assert_eq!(middle.preallocated_records(), 100);

        let outer = StructureBuilder::new()
            .add_list("a", middle.clone(), 10)
            .add_status_data()
            .build()
            .unwrap();
        assert_eq!(outer.preallocated_records(), 10 * 101 + 2);

        let result = StructureBuilder::new()
            .add_vc("id")
            .add_list("a", middle, 2_000)
            .build();
        assert_matches!(
            result,
            Err(RecordError::ListCapacityExceeded { list, max })
                if list == "a" && max == MAX_PREALLOCATED_RECORDS
        );
    }

    #[test]
    fn test_dynamic_lists_do_not_count_toward_preallocation() {
        let item = StructureBuilder::new()
            .add_list("inner", StructureBuilder::new().add_i4("n").build().unwrap(), 50_000)
            .build()
            .unwrap();
        let structure = StructureBuilder::new()
            .add_dynamic_list("rows", item)
            .build()
            .unwrap();
        assert_eq!(structure.preallocated_records(), 0);
    }

    #[test]
    fn test_from_existing_extends_a_copy() {
        let base = StructureBuilder::new().add_f8("id").build().unwrap();
        let extended = StructureBuilder::from_existing(&base)
            .add_status_data()
            .build()
            .unwrap();

        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert!(extended.field("status_data").unwrap().kind().is_complex());
        assert!(!extended.field("status_data").unwrap().kind().is_list());
        let status = extended.field("status_data").unwrap().kind().structure().unwrap();
        assert!(status.field("subeventstatus").unwrap().kind().is_list());
    }

    #[test]
    fn test_declaration_rendering() {
        let item = StructureBuilder::new().add_vc("name").build().unwrap();
        let structure = StructureBuilder::new()
            .add_dynamic_list("qual", item)
            .add_status_data()
            .build()
            .unwrap();

        assert_eq!(
            structure.to_string(),
            "  1 qual [*]\n    2 name = VC\n  1 status_data\n    2 status = C1\n    2 subeventstatus [1]\n      3 OperationName = C25\n      3 OperationStatus = C1\n      3 TargetObjectName = C25\n      3 TargetObjectValue = VC\n"
        );
    }
}
