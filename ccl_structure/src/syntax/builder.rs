//! Structure builder
//!
//! Drives the item tokenizer over a coalesced declaration and assembles the
//! `Structure` tree with a stack of open parents. An item closes every open
//! parent whose level is not below its own, then attaches to whatever parent
//! remains on top (or becomes a root member).

use super::error::StructureError;
use crate::config::constants::compile_time::declaration::{MAX_FIXED_LIST_COUNT, MAX_NESTING_LEVEL};
use crate::config::runtime::DeclarationPreferences;
use crate::error::ParserResult;
use crate::grammar::{resolve_token, DataTypeError, ResolvedToken, Structure, StructureMember};
use crate::lexical::{
    coalesce_declaration, is_declaration_start, mask_source, Coalesced, ItemShape, ItemTokenizer,
    NextItem, ScanResult,
};
use crate::logging::codes;
use crate::utils::SourceMap;
use crate::{log_debug, log_success};

/// A structure together with the 0-based line range it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeclaration {
    pub structure: Structure,
    pub first_line: usize,
    pub last_line: usize,
}

pub struct StructureParser {
    preferences: DeclarationPreferences,
}

impl StructureParser {
    pub fn new() -> Self {
        Self::with_preferences(DeclarationPreferences::default())
    }

    pub fn with_preferences(preferences: DeclarationPreferences) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &DeclarationPreferences {
        &self.preferences
    }

    /// Whether `line` starts a record declaration
    pub fn can_parse(&self, line: &str) -> bool {
        is_declaration_start(line)
    }

    /// Parse the declaration starting at `lines[start]`. Lines must already
    /// be masked.
    pub fn parse(&self, lines: &[&str], start: usize) -> ParserResult<ParsedDeclaration> {
        let coalesced = coalesce_declaration(lines, start)?;
        let structure = self.parse_coalesced(&coalesced)?;

        Ok(ParsedDeclaration {
            structure,
            first_line: coalesced.first_line,
            last_line: coalesced.last_line,
        })
    }

    /// Parse the first declaration found in raw source text
    pub fn parse_text(&self, source: &str) -> ParserResult<Structure> {
        let masked = mask_source(source);
        let lines: Vec<&str> = masked.lines().collect();
        let start = lines
            .iter()
            .position(|line| is_declaration_start(line))
            .unwrap_or(0);

        Ok(self.parse(&lines, start)?.structure)
    }

    pub fn parse_coalesced(&self, coalesced: &Coalesced) -> ParserResult<Structure> {
        let first_line = coalesced.first_line as u32 + 1;
        let name = declaration_name(coalesced.header())
            .ok_or(StructureError::MissingDeclarationName { line: first_line })?;

        log_debug!("Building record structure",
            "name" => name,
            "line" => first_line,
            "lines" => coalesced.line_count()
        );

        let map = SourceMap::with_first_line(coalesced.text.clone(), first_line);
        let tokenizer = ItemTokenizer::new(&coalesced.text, &map).with_end(coalesced.close_paren);
        let mut stack = LevelStack::new(&self.preferences);
        let mut position = coalesced.open_paren + 1;

        loop {
            let item = match tokenizer.next_item(position)? {
                ScanResult::Item(item) => item,
                ScanResult::EndOfInput => break,
            };
            position = item.resume_at;

            // A level-0 item ends the declaration
            if item.level == Some(0) {
                break;
            }

            log_debug!("Declaration item",
                "name" => item.name,
                "level" => item.level.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string()),
                "at" => item.span.start
            );

            stack.push_item(item)?;
        }

        let structure = Structure::new(name, stack.finish());

        if self.preferences.validate_levels {
            structure.validate_levels().map_err(|violation| {
                StructureError::LevelInvariantViolation {
                    parent: violation.parent.unwrap_or_else(|| structure.name().to_string()),
                    child: violation.member,
                }
            })?;
        }

        log_success!(
            codes::success::STRUCTURE_BUILT,
            "Record structure built",
            "name" => structure.name(),
            "members" => structure.member_count()
        );

        Ok(structure)
    }
}

impl Default for StructureParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Record name from the text before a declaration's `(`
fn declaration_name(header: &str) -> Option<&str> {
    let mut words = header.split_whitespace();
    match words.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case("record") => words.next(),
        _ => None,
    }
}

enum ParentShape {
    Record,
    List,
    FixedLengthList(u32),
}

/// A parent member that can still receive children
struct OpenParent {
    name: String,
    level: u32,
    shape: ParentShape,
    members: Vec<StructureMember>,
}

impl OpenParent {
    fn close(self) -> StructureMember {
        let Self {
            name,
            level,
            shape,
            members,
        } = self;

        match shape {
            ParentShape::Record => StructureMember::Record {
                name,
                level,
                members,
            },
            ParentShape::List => StructureMember::List {
                name,
                level,
                members,
            },
            ParentShape::FixedLengthList(count) => StructureMember::FixedLengthList {
                name,
                level,
                count,
                members,
            },
        }
    }
}

struct LevelStack<'p> {
    preferences: &'p DeclarationPreferences,
    roots: Vec<StructureMember>,
    open: Vec<OpenParent>,
}

impl<'p> LevelStack<'p> {
    fn new(preferences: &'p DeclarationPreferences) -> Self {
        Self {
            preferences,
            roots: Vec::new(),
            open: Vec::new(),
        }
    }

    fn push_item(&mut self, item: NextItem) -> ParserResult<()> {
        let level = match item.level {
            Some(level) => level,
            None => {
                self.push_include(item);
                return Ok(());
            }
        };

        if level > MAX_NESTING_LEVEL {
            return Err(StructureError::LevelTooDeep {
                name: item.name,
                level,
                max: MAX_NESTING_LEVEL,
                span: item.span,
            }
            .into());
        }

        self.close_from(level);

        if level > 1 && self.open.is_empty() {
            return Err(StructureError::orphaned_member(&item.name, level, item.span).into());
        }

        let NextItem {
            name, shape, span, ..
        } = item;

        match shape {
            ItemShape::Typed(token) => {
                let member = match resolve_token(&token)? {
                    ResolvedToken::Primitive(data_type) => StructureMember::Field {
                        name,
                        level,
                        data_type,
                    },
                    ResolvedToken::Character(length) => StructureMember::CharacterField {
                        name,
                        level,
                        length,
                    },
                    ResolvedToken::Occurs(_) => {
                        return Err(DataTypeError::UnknownType { token }.into());
                    }
                };
                self.attach(member);
            }
            ItemShape::Occurs(clause) => {
                let shape = if clause.contains('*') {
                    ParentShape::List
                } else {
                    match clause.parse::<u32>() {
                        Ok(count) if count <= MAX_FIXED_LIST_COUNT => {
                            ParentShape::FixedLengthList(count)
                        }
                        _ => {
                            return Err(
                                StructureError::invalid_occurs_clause(&name, &clause, span).into()
                            );
                        }
                    }
                };
                self.open(name, level, shape);
            }
            ItemShape::Group => self.open(name, level, ParentShape::Record),
            // Includes carry no level and are handled above
            ItemShape::Include => {}
        }

        Ok(())
    }

    fn push_include(&mut self, item: NextItem) {
        if StructureMember::is_status_block_path(
            &item.name,
            self.preferences.case_insensitive_status_block,
        ) {
            self.close_from(1);
            self.roots.push(StructureMember::status_block());
            return;
        }

        let level = self.open.last().map(|parent| parent.level + 1).unwrap_or(1);
        self.attach(StructureMember::Include {
            path: item.name,
            level,
        });
    }

    fn open(&mut self, name: String, level: u32, shape: ParentShape) {
        self.open.push(OpenParent {
            name,
            level,
            shape,
            members: Vec::new(),
        });
    }

    fn attach(&mut self, member: StructureMember) {
        match self.open.last_mut() {
            Some(parent) => parent.members.push(member),
            None => self.roots.push(member),
        }
    }

    /// Close every open parent whose level is `level` or deeper
    fn close_from(&mut self, level: u32) {
        while self.open.last().is_some_and(|parent| parent.level >= level) {
            if let Some(parent) = self.open.pop() {
                let closed = parent.close();
                self.attach(closed);
            }
        }
    }

    fn finish(mut self) -> Vec<StructureMember> {
        self.close_from(0);
        self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParserError;
    use crate::grammar::{DataType, MemberKind};
    use crate::lexical::TokenizerError;
    use assert_matches::assert_matches;

    fn parser() -> StructureParser {
        StructureParser::with_preferences(DeclarationPreferences {
            case_insensitive_status_block: true,
            stop_on_first_error: false,
            validate_levels: true,
        })
    }

    fn shape(structure: &Structure) -> Vec<(String, u32, MemberKind)> {
        structure
            .flatten()
            .into_iter()
            .map(|m| (m.name, m.level, m.kind))
            .collect()
    }

    #[test]
    fn test_end_to_end_example() {
        let structure = parser()
            .parse_text("record x ( 1 programs [*] 2 programName = vc 2 compile = i2 )")
            .unwrap();

        assert_eq!(structure.name(), "x");
        assert_eq!(structure.members().len(), 1);
        match &structure.members()[0] {
            StructureMember::List { name, members, .. } => {
                assert_eq!(name, "programs");
                assert_eq!(members[0].data_type(), Some(DataType::Vc));
                assert_eq!(members[1].name(), "compile");
                assert_eq!(members[1].data_type(), Some(DataType::I2));
            }
            other => panic!("Expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline_nested_declaration() {
        let source = "\
record request
(
  1 person_id = f8     ; the person
  1 encounters [*]
    2 encntr_id = f8
    2 alias
      3 value = c40
      3 pool_cd = f8
    2 flags [3]
      3 flag = i2
  1 name = vc
)";
        let structure = parser().parse_text(source).unwrap();

        assert_eq!(
            shape(&structure),
            vec![
                ("person_id".to_string(), 1, MemberKind::Field),
                ("encounters".to_string(), 1, MemberKind::List),
                ("encntr_id".to_string(), 2, MemberKind::Field),
                ("alias".to_string(), 2, MemberKind::Record),
                ("value".to_string(), 3, MemberKind::CharacterField),
                ("pool_cd".to_string(), 3, MemberKind::Field),
                ("flags".to_string(), 2, MemberKind::FixedLengthList),
                ("flag".to_string(), 3, MemberKind::Field),
                ("name".to_string(), 1, MemberKind::Field),
            ]
        );
        assert!(structure.validate_levels().is_ok());
    }

    #[test]
    fn test_character_and_list_disambiguation() {
        let structure = parser()
            .parse_text("record r ( 1 code = 25 1 fixed [5] 2 a = i4 1 grow [ * ] 2 b = i4 )")
            .unwrap();

        assert_matches!(
            structure.find_member("code"),
            Some(StructureMember::CharacterField { length: 25, .. })
        );
        assert_matches!(
            structure.find_member("fixed"),
            Some(StructureMember::FixedLengthList { count: 5, .. })
        );
        assert_matches!(structure.find_member("grow"), Some(StructureMember::List { .. }));
    }

    #[test]
    fn test_status_block_resets_open_parents() {
        let source = "record reply (\n 1 qual [*]\n  2 id = f8\n%i cclsource:status_block.inc\n)";
        let structure = parser().parse_text(source).unwrap();

        let roots: Vec<_> = structure.members().iter().map(|m| m.name()).collect();
        assert_eq!(roots, vec!["qual", "status_data"]);
        assert_eq!(structure.members()[1], StructureMember::status_block());
    }

    #[test]
    fn test_status_block_case_preference() {
        let source = "record reply ( %I CCLSOURCE:STATUS_BLOCK.INC )";

        let lenient = parser().parse_text(source).unwrap();
        assert_eq!(lenient.members()[0].name(), "status_data");

        let strict = StructureParser::with_preferences(DeclarationPreferences {
            case_insensitive_status_block: false,
            stop_on_first_error: false,
            validate_levels: true,
        })
        .parse_text(source)
        .unwrap();
        assert_matches!(strict.members()[0], StructureMember::Include { level: 1, .. });
    }

    #[test]
    fn test_other_includes_take_contextual_level() {
        let structure = parser()
            .parse_text("record r ( 1 grp 2 a = vc %i cclsource:other.inc 1 b = i2 )")
            .unwrap();

        match structure.find_member("grp") {
            Some(StructureMember::Record { members, .. }) => {
                assert_eq!(
                    members[1],
                    StructureMember::Include {
                        path: "cclsource:other.inc".to_string(),
                        level: 2,
                    }
                );
            }
            other => panic!("Expected record, got {:?}", other),
        }
        assert_eq!(structure.include_paths(), vec!["cclsource:other.inc"]);
    }

    #[test]
    fn test_level_zero_ends_declaration() {
        let structure = parser()
            .parse_text("record r ( 1 a = vc 0 stop = vc 1 b = vc )")
            .unwrap();

        assert_eq!(structure.member_count(), 1);
    }

    #[test]
    fn test_comments_and_strings_do_not_unbalance() {
        let source = "record r ( ; a ) in a comment\n 1 a = vc /* ) */\n)";
        let structure = parser().parse_text(source).unwrap();

        assert_eq!(structure.member_count(), 1);
    }

    #[test]
    fn test_errors() {
        assert_matches!(
            parser().parse_text("record r ( 1 a = zz )"),
            Err(ParserError::InvalidDataTypeDeclaration(DataTypeError::UnknownType { .. }))
        );
        assert_matches!(
            parser().parse_text("record r ( 1 a = vc"),
            Err(ParserError::InvalidRecordStructureDefinition(StructureError::Tokenizer(
                TokenizerError::UnbalancedParentheses { line: 1 }
            )))
        );
        assert_matches!(
            parser().parse_text("record r ( 2 a = vc )"),
            Err(ParserError::InvalidRecordStructureDefinition(
                StructureError::OrphanedMember { level: 2, .. }
            ))
        );
        assert_matches!(
            parser().parse_text("record r ( 1 a [x] 2 b = vc )"),
            Err(ParserError::InvalidRecordStructureDefinition(
                StructureError::InvalidOccursClause { .. }
            ))
        );
        assert_matches!(
            parser().parse_text("record r ( 1 a 99 b = vc )"),
            Err(ParserError::InvalidRecordStructureDefinition(
                StructureError::LevelTooDeep { level: 99, .. }
            ))
        );
        assert_matches!(
            parser().parse_text("record ( 1 a = vc )"),
            Err(ParserError::InvalidRecordStructureDefinition(
                StructureError::MissingDeclarationName { line: 1 }
            ))
        );
    }

    #[test]
    fn test_parse_reports_line_range() {
        let masked = mask_source("x\nrecord r\n(\n1 a = vc\n)\ny");
        let lines: Vec<&str> = masked.lines().collect();

        let parsed = parser().parse(&lines, 1).unwrap();
        assert_eq!(parsed.first_line, 1);
        assert_eq!(parsed.last_line, 4);
    }

    #[test]
    fn test_to_declaration_reparses_to_same_tree() {
        let structure = parser()
            .parse_text("record r ( 1 a [2] 2 b = c3 2 c 3 d = dq8 1 e [*] 2 f = ui4 )")
            .unwrap();

        let reparsed = parser().parse_text(&structure.to_declaration()).unwrap();
        assert_eq!(reparsed, structure);
    }
}
