//! Structure model produced from record declarations
//!
//! A `Structure` is the immutable tree for one `record <name> ( ... )`
//! declaration. Members are a closed set of variants; parent shapes own
//! their children in declaration order.

use super::data_type::DataType;
use crate::config::compile_time::declaration::STATUS_BLOCK_INCLUDE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`StructureMember`], used for flattened views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    CharacterField,
    Record,
    List,
    FixedLengthList,
    Include,
}

impl MemberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::CharacterField => "character_field",
            Self::Record => "record",
            Self::List => "list",
            Self::FixedLengthList => "fixed_length_list",
            Self::Include => "include",
        }
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, Self::Record | Self::List | Self::FixedLengthList)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureMember {
    Field {
        name: String,
        level: u32,
        data_type: DataType,
    },
    CharacterField {
        name: String,
        level: u32,
        length: u32,
    },
    Record {
        name: String,
        level: u32,
        members: Vec<StructureMember>,
    },
    List {
        name: String,
        level: u32,
        members: Vec<StructureMember>,
    },
    FixedLengthList {
        name: String,
        level: u32,
        count: u32,
        members: Vec<StructureMember>,
    },
    /// Unexpanded include; `path` is kept verbatim
    Include { path: String, level: u32 },
}

impl StructureMember {
    /// Member name; the include path for includes
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name, .. }
            | Self::CharacterField { name, .. }
            | Self::Record { name, .. }
            | Self::List { name, .. }
            | Self::FixedLengthList { name, .. } => name,
            Self::Include { path, .. } => path,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            Self::Field { level, .. }
            | Self::CharacterField { level, .. }
            | Self::Record { level, .. }
            | Self::List { level, .. }
            | Self::FixedLengthList { level, .. }
            | Self::Include { level, .. } => *level,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            Self::Field { .. } => MemberKind::Field,
            Self::CharacterField { .. } => MemberKind::CharacterField,
            Self::Record { .. } => MemberKind::Record,
            Self::List { .. } => MemberKind::List,
            Self::FixedLengthList { .. } => MemberKind::FixedLengthList,
            Self::Include { .. } => MemberKind::Include,
        }
    }

    pub fn is_parent(&self) -> bool {
        self.kind().is_parent()
    }

    /// Children of parent shapes; empty for leaves
    pub fn children(&self) -> &[StructureMember] {
        match self {
            Self::Record { members, .. }
            | Self::List { members, .. }
            | Self::FixedLengthList { members, .. } => members,
            _ => &[],
        }
    }

    /// Data type of a scalar member (`Char` for character fields)
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Field { data_type, .. } => Some(*data_type),
            Self::CharacterField { .. } => Some(DataType::Char),
            _ => None,
        }
    }

    /// Declaration text of this member without its level prefix
    pub fn declaration(&self) -> String {
        match self {
            Self::Field {
                name, data_type, ..
            } => format!("{} = {}", name, data_type),
            Self::CharacterField { name, length, .. } => format!("{} = C{}", name, length),
            Self::Record { name, .. } => name.clone(),
            Self::List { name, .. } => format!("{} [*]", name),
            Self::FixedLengthList { name, count, .. } => format!("{} [{}]", name, count),
            Self::Include { path, .. } => format!("%i {}", path),
        }
    }

    /// The expanded form of `%i cclsource:status_block.inc`
    pub fn status_block() -> Self {
        let char_field = |name: &str, level: u32, length: u32| Self::CharacterField {
            name: name.to_string(),
            level,
            length,
        };

        Self::Record {
            name: "status_data".to_string(),
            level: 1,
            members: vec![
                char_field("status", 2, 1),
                Self::FixedLengthList {
                    name: "subeventstatus".to_string(),
                    level: 2,
                    count: 1,
                    members: vec![
                        char_field("OperationName", 3, 25),
                        char_field("OperationStatus", 3, 1),
                        char_field("TargetObjectName", 3, 25),
                        Self::Field {
                            name: "TargetObjectValue".to_string(),
                            level: 3,
                            data_type: DataType::Vc,
                        },
                    ],
                },
            ],
        }
    }

    /// Whether an include path names the status block
    pub fn is_status_block_path(path: &str, ignore_case: bool) -> bool {
        if ignore_case {
            path.eq_ignore_ascii_case(STATUS_BLOCK_INCLUDE)
        } else {
            path == STATUS_BLOCK_INCLUDE
        }
    }

    /// Shift this member and its subtree so it sits at `level`
    pub fn relevel(&mut self, level: u32) {
        let delta = level as i64 - self.level() as i64;
        self.shift_levels(delta);
    }

    fn shift_levels(&mut self, delta: i64) {
        let shift = |level: &mut u32| *level = (*level as i64 + delta).max(1) as u32;
        match self {
            Self::Field { level, .. }
            | Self::CharacterField { level, .. }
            | Self::Include { level, .. } => shift(level),
            Self::Record { level, members, .. }
            | Self::List { level, members, .. }
            | Self::FixedLengthList { level, members, .. } => {
                shift(level);
                for member in members {
                    member.shift_levels(delta);
                }
            }
        }
    }
}

/// One row of [`Structure::flatten`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatMember {
    pub name: String,
    pub level: u32,
    pub kind: MemberKind,
}

/// Violation of the level-stack invariant found by [`Structure::validate_levels`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelViolation {
    pub parent: Option<String>,
    pub member: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    name: String,
    members: Vec<StructureMember>,
}

impl Structure {
    pub fn new(name: impl Into<String>, members: Vec<StructureMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root (level 1) members in declaration order
    pub fn members(&self) -> &[StructureMember] {
        &self.members
    }

    /// Pre-order name/level/kind triples of every member
    pub fn flatten(&self) -> Vec<FlatMember> {
        fn walk(members: &[StructureMember], out: &mut Vec<FlatMember>) {
            for member in members {
                out.push(FlatMember {
                    name: member.name().to_string(),
                    level: member.level(),
                    kind: member.kind(),
                });
                walk(member.children(), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.members, &mut out);
        out
    }

    /// First member with this exact name, searching depth-first
    pub fn find_member(&self, name: &str) -> Option<&StructureMember> {
        fn find<'a>(members: &'a [StructureMember], name: &str) -> Option<&'a StructureMember> {
            members.iter().find_map(|member| {
                if member.kind() != MemberKind::Include && member.name() == name {
                    Some(member)
                } else {
                    find(member.children(), name)
                }
            })
        }

        find(&self.members, name)
    }

    /// Total number of members at every depth
    pub fn member_count(&self) -> usize {
        self.flatten().len()
    }

    pub fn max_level(&self) -> u32 {
        self.flatten().iter().map(|m| m.level).max().unwrap_or(0)
    }

    /// Paths of includes left unexpanded anywhere in the tree
    pub fn include_paths(&self) -> Vec<&str> {
        fn walk<'a>(members: &'a [StructureMember], out: &mut Vec<&'a str>) {
            for member in members {
                if let StructureMember::Include { path, .. } = member {
                    out.push(path);
                }
                walk(member.children(), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.members, &mut out);
        out
    }

    /// Check that roots sit at level 1 and every child's level is greater
    /// than its parent's
    pub fn validate_levels(&self) -> Result<(), LevelViolation> {
        fn check(
            parent: Option<&StructureMember>,
            members: &[StructureMember],
        ) -> Result<(), LevelViolation> {
            for member in members {
                let valid = match parent {
                    Some(p) => member.level() > p.level(),
                    None => member.level() == 1,
                };
                if !valid {
                    return Err(LevelViolation {
                        parent: parent.map(|p| p.name().to_string()),
                        member: member.name().to_string(),
                        level: member.level(),
                    });
                }
                check(Some(member), member.children())?;
            }
            Ok(())
        }

        check(None, &self.members)
    }

    /// Render back to declaration text that parses to the same tree
    pub fn to_declaration(&self) -> String {
        fn write(members: &[StructureMember], out: &mut String) {
            for member in members {
                let level = member.level() as usize;
                out.push_str(&" ".repeat(level * 2));
                if member.kind() != MemberKind::Include {
                    out.push_str(&format!("{} ", level));
                }
                out.push_str(&member.declaration());
                out.push('\n');
                write(member.children(), out);
            }
        }

        let mut out = format!("record {}\n(\n", self.name);
        write(&self.members, &mut out);
        out.push(')');
        out
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_declaration())
    }
}
