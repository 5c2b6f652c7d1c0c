//! Records built from parsed declarations
//!
//! Converts a `ccl_structure` [`Structure`] into the runtime schema and
//! instantiates records from it. Includes must be resolved first; the status
//! block is already expanded by the parser.

use crate::types::{Record, RecordError, RecordResult, RecordStructure, StructureBuilder};
use ccl_structure::logging::codes;
use ccl_structure::{log_debug, log_success};
use ccl_structure::{IncludeResolver, Structure, StructureCatalog, StructureMember};
use std::sync::Arc;

/// Runtime schema for a parsed structure
pub fn record_structure(structure: &Structure) -> RecordResult<Arc<RecordStructure>> {
    log_debug!("Converting structure to record schema",
        "structure" => structure.name(),
        "members" => structure.member_count()
    );
    members_to_structure(structure.members())
}

/// Root record named after the structure
pub fn create_record(structure: &Structure) -> RecordResult<Record> {
    create_named_record(structure.name(), structure)
}

pub fn create_named_record(name: &str, structure: &Structure) -> RecordResult<Record> {
    let schema = record_structure(structure)?;

    log_success!(
        codes::success::RECORD_CREATED,
        "Record created",
        "record" => name,
        "structure" => structure.name(),
        "fields" => schema.len()
    );

    Ok(Record::new(name, schema))
}

/// Record for catalog structure `name`, with its includes expanded
pub fn create_record_from_catalog(
    catalog: &StructureCatalog,
    name: &str,
    resolver: &dyn IncludeResolver,
) -> RecordResult<Record> {
    let structure = catalog.resolved(name, resolver)?;
    create_record(&structure)
}

fn members_to_structure(members: &[StructureMember]) -> RecordResult<Arc<RecordStructure>> {
    let mut builder = StructureBuilder::new();

    for member in members {
        builder = match member {
            StructureMember::Field {
                name, data_type, ..
            } => builder.add_primitive(name.as_str(), *data_type),
            StructureMember::CharacterField { name, length, .. } => {
                builder.add_char(name.as_str(), *length)
            }
            StructureMember::Record { name, members, .. } => {
                builder.add_record(name.as_str(), members_to_structure(members)?)
            }
            StructureMember::List { name, members, .. } => {
                builder.add_dynamic_list(name.as_str(), members_to_structure(members)?)
            }
            StructureMember::FixedLengthList {
                name,
                count,
                members,
                ..
            } => builder.add_list(name.as_str(), members_to_structure(members)?, *count as usize),
            StructureMember::Include { path, .. } => {
                return Err(RecordError::UnresolvedIncludeMember { path: path.clone() })
            }
        };
    }

    builder.build()
}
