//! Caller-owned cache of parsed structures
//!
//! Structures are keyed by upper-cased name, matching CCL's case-insensitive
//! record names. Includes other than the status block stay unexpanded in
//! parsed structures; `resolve_includes` splices them in using text supplied
//! by an [`IncludeResolver`].

use crate::error::ParserError;
use crate::file_processor::{scan_file, FileProcessorError};
use crate::grammar::{Structure, StructureMember};
use crate::lexical::{mask_source, ItemTokenizer, ScanResult};
use crate::logging::{codes, Code};
use crate::syntax::{scan_source_with_parser, StructureParser};
use crate::utils::SourceMap;
use crate::{log_debug, log_success};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("No structure named '{name}' in catalog")]
    UnknownStructure { name: String },

    #[error("Include cycle: {}", chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    #[error("Include '{path}' could not be resolved")]
    UnresolvedInclude { path: String },

    #[error("Include '{path}' is not a valid member list: {error}")]
    InvalidInclude { path: String, error: ParserError },
}

impl CatalogError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownStructure { .. } => codes::catalog::UNKNOWN_STRUCTURE,
            Self::IncludeCycle { .. } => codes::catalog::INCLUDE_CYCLE,
            Self::UnresolvedInclude { .. } => codes::catalog::UNRESOLVED_INCLUDE,
            Self::InvalidInclude { error, .. } => error.error_code(),
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

/// Supplies the text of an include file by its path
pub trait IncludeResolver {
    fn resolve(&self, path: &str) -> Option<String>;
}

impl<F> IncludeResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, path: &str) -> Option<String> {
        self(path)
    }
}

impl IncludeResolver for HashMap<String, String> {
    fn resolve(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}

#[derive(Default)]
pub struct StructureCatalog {
    structures: BTreeMap<String, Structure>,
}

fn catalog_key(name: &str) -> String {
    name.to_ascii_uppercase()
}

impl StructureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a structure, returning any structure it replaced
    pub fn insert(&mut self, structure: Structure) -> Option<Structure> {
        self.structures.insert(catalog_key(structure.name()), structure)
    }

    pub fn get(&self, name: &str) -> Option<&Structure> {
        self.structures.get(&catalog_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structures.contains_key(&catalog_key(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<Structure> {
        self.structures.remove(&catalog_key(name))
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Structure names as declared, ordered by key
    pub fn names(&self) -> Vec<&str> {
        self.structures.values().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    pub fn clear(&mut self) {
        self.structures.clear();
    }

    /// Parse every declaration in `source` and insert the ones that succeed.
    /// Returns the 1-based line and error of each one that failed.
    pub fn load_source(&mut self, source: &str) -> Vec<(usize, ParserError)> {
        self.load_source_with_parser(source, &StructureParser::new())
    }

    pub fn load_source_with_parser(
        &mut self,
        source: &str,
        parser: &StructureParser,
    ) -> Vec<(usize, ParserError)> {
        let mut failures = Vec::new();
        let mut loaded = 0usize;

        for outcome in scan_source_with_parser(source, parser) {
            match outcome.result {
                Ok(structure) => {
                    self.insert(structure);
                    loaded += 1;
                }
                Err(err) => failures.push((outcome.line, err)),
            }
        }

        log_success!(
            codes::success::CATALOG_UPDATED,
            "Structure catalog updated",
            "loaded" => loaded,
            "failed" => failures.len(),
            "total" => self.len()
        );

        failures
    }

    /// Scan a source file and insert its structures
    pub fn load_file(
        &mut self,
        file_path: &str,
    ) -> Result<Vec<(usize, ParserError)>, FileProcessorError> {
        let report = scan_file(file_path)?;
        let mut failures = Vec::new();

        for outcome in report.outcomes {
            match outcome.result {
                Ok(structure) => {
                    self.insert(structure);
                }
                Err(err) => failures.push((outcome.line, err)),
            }
        }

        Ok(failures)
    }

    /// Catalog structure `name` with every include expanded
    pub fn resolved(
        &self,
        name: &str,
        resolver: &dyn IncludeResolver,
    ) -> Result<Structure, CatalogError> {
        let structure = self.get(name).ok_or_else(|| CatalogError::UnknownStructure {
            name: name.to_string(),
        })?;
        self.resolve_includes(structure, resolver)
    }

    /// Copy of `structure` with each `Include` replaced by the members its
    /// file declares, shifted to the include's level
    pub fn resolve_includes(
        &self,
        structure: &Structure,
        resolver: &dyn IncludeResolver,
    ) -> Result<Structure, CatalogError> {
        let parser = StructureParser::new();
        let mut chain = Vec::new();
        let members = expand_members(structure.members(), resolver, &parser, &mut chain)?;
        Ok(Structure::new(structure.name(), members))
    }
}

fn expand_members(
    members: &[StructureMember],
    resolver: &dyn IncludeResolver,
    parser: &StructureParser,
    chain: &mut Vec<String>,
) -> Result<Vec<StructureMember>, CatalogError> {
    let mut out = Vec::with_capacity(members.len());

    for member in members {
        match member {
            StructureMember::Include { path, level } => {
                out.extend(expand_include(path, *level, resolver, parser, chain)?);
            }
            StructureMember::Record {
                name,
                level,
                members,
            } => out.push(StructureMember::Record {
                name: name.clone(),
                level: *level,
                members: expand_members(members, resolver, parser, chain)?,
            }),
            StructureMember::List {
                name,
                level,
                members,
            } => out.push(StructureMember::List {
                name: name.clone(),
                level: *level,
                members: expand_members(members, resolver, parser, chain)?,
            }),
            StructureMember::FixedLengthList {
                name,
                level,
                count,
                members,
            } => out.push(StructureMember::FixedLengthList {
                name: name.clone(),
                level: *level,
                count: *count,
                members: expand_members(members, resolver, parser, chain)?,
            }),
            StructureMember::Field { .. } | StructureMember::CharacterField { .. } => {
                out.push(member.clone())
            }
        }
    }

    Ok(out)
}

fn expand_include(
    path: &str,
    level: u32,
    resolver: &dyn IncludeResolver,
    parser: &StructureParser,
    chain: &mut Vec<String>,
) -> Result<Vec<StructureMember>, CatalogError> {
    let key = catalog_key(path);
    if chain.contains(&key) {
        let mut cycle = chain.clone();
        cycle.push(key);
        return Err(CatalogError::IncludeCycle { chain: cycle });
    }

    let text = resolver
        .resolve(path)
        .ok_or_else(|| CatalogError::UnresolvedInclude {
            path: path.to_string(),
        })?;

    log_debug!("Expanding include", "path" => path, "level" => level);

    // An include body is a bare member list, numbered for the place it is
    // included; scope records stand in for the levels above its first item
    let base = first_item_level(&text).unwrap_or(1).max(1);
    let mut wrapped = format!("record {}\n(\n", path);
    for scope in 1..base {
        wrapped.push_str(&format!("{} include_scope_{}\n", scope, scope));
    }
    wrapped.push_str(&text);
    wrapped.push_str("\n)");

    let parsed = parser
        .parse_text(&wrapped)
        .map_err(|error| CatalogError::InvalidInclude {
            path: path.to_string(),
            error,
        })?;

    let mut body = parsed.members();
    for _ in 1..base {
        body = match body {
            [scope] => scope.children(),
            _ => body,
        };
    }

    chain.push(key);
    let mut members = expand_members(body, resolver, parser, chain)?;
    chain.pop();

    for member in &mut members {
        member.relevel(level);
    }

    Ok(members)
}

/// Level of the first leveled item in an include body
fn first_item_level(text: &str) -> Option<u32> {
    let masked = mask_source(text);
    let map = SourceMap::new(masked.clone());
    let tokenizer = ItemTokenizer::new(&masked, &map);
    let mut position = 0;

    while let Ok(ScanResult::Item(item)) = tokenizer.next_item(position) {
        if item.level.is_some() {
            return item.level;
        }
        position = item.resume_at;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::MemberKind;

    #[test]
    fn test_catalog_is_case_insensitive() {
        let mut catalog = StructureCatalog::new();
        let failures = catalog.load_source("record Request ( 1 a = vc )\nrecord bad ( 1 a = ?? )");

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 2);
        assert!(catalog.contains("REQUEST"));
        assert_eq!(catalog.get("request").map(|s| s.name()), Some("Request"));
        assert_eq!(catalog.names(), vec!["Request"]);

        assert!(catalog.remove("request").is_some());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_resolve_includes_relevels_members() {
        let mut catalog = StructureCatalog::new();
        catalog.load_source(
            "record reply ( 1 qual [*] 2 id = f8 %i cclsource:person.inc 1 count = i4 )",
        );

        let mut files = HashMap::new();
        files.insert(
            "cclsource:person.inc".to_string(),
            "1 person\n  2 name = vc\n  2 birth_dt_tm = dq8".to_string(),
        );

        let resolved = catalog.resolved("reply", &files).unwrap();
        let flat: Vec<_> = resolved
            .flatten()
            .into_iter()
            .map(|m| (m.name, m.level, m.kind))
            .collect();

        assert_eq!(
            flat,
            vec![
                ("qual".to_string(), 1, MemberKind::List),
                ("id".to_string(), 2, MemberKind::Field),
                ("person".to_string(), 2, MemberKind::Record),
                ("name".to_string(), 3, MemberKind::Field),
                ("birth_dt_tm".to_string(), 3, MemberKind::Field),
                ("count".to_string(), 1, MemberKind::Field),
            ]
        );
        assert!(resolved.validate_levels().is_ok());
        assert!(resolved.include_paths().is_empty());
    }

    #[test]
    fn test_include_numbered_for_its_context() {
        let structure = StructureParser::new()
            .parse_text("record r ( 1 qual [*] 2 id = f8 %i cclsource:detail.inc )")
            .unwrap();
        let resolver = |_: &str| -> Option<String> {
            Some("2 detail\n  3 text = vc\n2 seq = i4".to_string())
        };

        let resolved = StructureCatalog::new()
            .resolve_includes(&structure, &resolver)
            .unwrap();
        let flat: Vec<_> = resolved
            .flatten()
            .into_iter()
            .map(|m| (m.name, m.level))
            .collect();

        assert_eq!(
            flat,
            vec![
                ("qual".to_string(), 1),
                ("id".to_string(), 2),
                ("detail".to_string(), 2),
                ("text".to_string(), 3),
                ("seq".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_include_cycle_is_rejected() {
        let structure = StructureParser::new()
            .parse_text("record r ( %i a.inc )")
            .unwrap();
        let resolver = |path: &str| -> Option<String> {
            match path {
                "a.inc" => Some("1 x = vc %i b.inc".to_string()),
                "b.inc" => Some("1 y = vc %i A.INC".to_string()),
                _ => None,
            }
        };

        match StructureCatalog::new().resolve_includes(&structure, &resolver) {
            Err(CatalogError::IncludeCycle { chain }) => {
                assert_eq!(chain, vec!["A.INC", "B.INC", "A.INC"]);
            }
            other => panic!("Expected IncludeCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_and_unknown() {
        let catalog = StructureCatalog::new();
        let resolver = |_: &str| -> Option<String> { None };

        match catalog.resolved("nope", &resolver) {
            Err(CatalogError::UnknownStructure { name }) => assert_eq!(name, "nope"),
            other => panic!("Expected UnknownStructure, got {:?}", other),
        }

        let structure = StructureParser::new()
            .parse_text("record r ( %i missing.inc )")
            .unwrap();
        let err = catalog.resolve_includes(&structure, &resolver).unwrap_err();
        assert_eq!(err.error_code(), codes::catalog::UNRESOLVED_INCLUDE);
    }
}
