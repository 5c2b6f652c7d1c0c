//! Generated declarations: random level trees rendered with irregular
//! whitespace must parse to exactly the tree they were rendered from.

use super::builder::StructureParser;
use crate::config::compile_time::declaration::STATUS_BLOCK_INCLUDE;
use crate::config::runtime::DeclarationPreferences;
use crate::grammar::{DataType, MemberKind, Structure, StructureMember};
use proptest::prelude::*;

const SEPARATORS: [&str; 7] = [" ", "\n", "\t", "  ", "\n  ", " \n\t", "\r\n    "];

#[derive(Clone, Debug)]
enum Item {
    Typed { data_type: DataType, upper: bool },
    Character { length: u32, form: u8 },
    Group(Vec<Item>),
    List(Vec<Item>),
    Fixed(u32, Vec<Item>),
    Include,
}

impl Item {
    fn is_parent(&self) -> bool {
        matches!(self, Self::Group(_) | Self::List(_) | Self::Fixed(..))
    }
}

fn leaf_strategy() -> impl Strategy<Value = Item> {
    prop_oneof![
        // Index 0 is Char, which is only spelled as a length
        (1..DataType::ALL.len(), any::<bool>()).prop_map(|(index, upper)| Item::Typed {
            data_type: DataType::ALL[index],
            upper,
        }),
        (1u32..=300, 0u8..3).prop_map(|(length, form)| Item::Character { length, form }),
        Just(Item::Include),
    ]
}

fn item_strategy() -> impl Strategy<Value = Item> {
    leaf_strategy().prop_recursive(4, 48, 5, |inner| {
        let children = prop::collection::vec(inner, 0..5);
        prop_oneof![
            children.clone().prop_map(Item::Group),
            children.clone().prop_map(Item::List),
            (0u32..=20, children).prop_map(|(count, items)| Item::Fixed(count, items)),
        ]
    })
}

/// An include attaches to the deepest open parent, so one written right
/// after a parent sibling would land inside that sibling instead.
fn normalize(items: Vec<Item>) -> Vec<Item> {
    let mut kept: Vec<Item> = Vec::with_capacity(items.len());
    for item in items {
        if matches!(item, Item::Include) && kept.last().is_some_and(Item::is_parent) {
            continue;
        }
        kept.push(match item {
            Item::Group(children) => Item::Group(normalize(children)),
            Item::List(children) => Item::List(normalize(children)),
            Item::Fixed(count, children) => Item::Fixed(count, normalize(children)),
            leaf => leaf,
        });
    }
    kept
}

struct Rendered {
    text: String,
    expected: Vec<(String, u32, MemberKind)>,
    next_id: usize,
    separators: Vec<usize>,
    next_separator: usize,
    tight: bool,
}

impl Rendered {
    fn new(separators: Vec<usize>, tight: bool) -> Self {
        Self {
            text: String::new(),
            expected: Vec::new(),
            next_id: 0,
            separators,
            next_separator: 0,
            tight,
        }
    }

    fn separate(&mut self) {
        let index = self.separators[self.next_separator % self.separators.len()];
        self.next_separator += 1;
        self.text.push_str(SEPARATORS[index]);
    }

    fn id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn items(&mut self, items: &[Item], level: u32) {
        for item in items {
            self.separate();

            if let Item::Include = item {
                let path = format!("cclsource:inc_{}.inc", self.id());
                self.text.push_str(&format!("%i {}", path));
                self.expected.push((path, level, MemberKind::Include));
                continue;
            }

            let name = format!("m{}", self.id());
            self.text.push_str(&level.to_string());
            self.separate();
            self.text.push_str(&name);

            let equals = if self.tight { "=" } else { " = " };
            let kind = match item {
                Item::Typed { data_type, upper } => {
                    let token = data_type.as_str();
                    let token = if *upper { token.to_string() } else { token.to_ascii_lowercase() };
                    self.text.push_str(&format!("{}{}", equals, token));
                    MemberKind::Field
                }
                Item::Character { length, form } => {
                    let prefix = ["", "c", "C"][*form as usize];
                    self.text.push_str(&format!("{}{}{}", equals, prefix, length));
                    MemberKind::CharacterField
                }
                Item::Group(_) => MemberKind::Record,
                Item::List(_) => {
                    self.text.push_str(if self.tight { "[*]" } else { " [ * ]" });
                    MemberKind::List
                }
                Item::Fixed(count, _) => {
                    let clause = if self.tight {
                        format!("[{}]", count)
                    } else {
                        format!(" [ {} ]", count)
                    };
                    self.text.push_str(&clause);
                    MemberKind::FixedLengthList
                }
                Item::Include => unreachable!("handled above"),
            };
            self.expected.push((name, level, kind));

            if let Item::Group(children) | Item::List(children) | Item::Fixed(_, children) = item {
                self.items(children, level + 1);
            }
        }
    }

    fn status_block(&mut self) {
        self.separate();
        self.text.push_str(&format!("%i {}", STATUS_BLOCK_INCLUDE));
        let expanded = Structure::new("s", vec![StructureMember::status_block()]);
        self.expected.extend(
            expanded
                .flatten()
                .into_iter()
                .map(|row| (row.name, row.level, row.kind)),
        );
    }

    fn declaration(&self) -> String {
        format!("record generated\n(\n{}\n)", self.text)
    }
}

fn parser() -> StructureParser {
    StructureParser::with_preferences(DeclarationPreferences {
        case_insensitive_status_block: true,
        stop_on_first_error: false,
        validate_levels: true,
    })
}

fn rows(structure: &Structure) -> Vec<(String, u32, MemberKind)> {
    structure
        .flatten()
        .into_iter()
        .map(|row| (row.name, row.level, row.kind))
        .collect()
}

proptest! {
    #[test]
    fn generated_declarations_parse_to_their_tree(
        items in prop::collection::vec(item_strategy(), 1..6),
        with_status_block in any::<bool>(),
        separators in prop::collection::vec(0..SEPARATORS.len(), 1..32),
        tight in any::<bool>(),
    ) {
        let mut rendered = Rendered::new(separators, tight);
        rendered.items(&normalize(items), 1);
        if with_status_block {
            rendered.status_block();
        }

        let source = rendered.declaration();
        let structure = parser().parse_text(&source);
        prop_assert!(structure.is_ok(), "{:?}\n{}", structure.as_ref().err(), source);
        let structure = structure.unwrap();

        prop_assert_eq!(rows(&structure), rendered.expected);
        prop_assert!(structure.validate_levels().is_ok());
    }

    #[test]
    fn rendered_declarations_reparse_to_the_same_structure(
        items in prop::collection::vec(item_strategy(), 1..6),
        with_status_block in any::<bool>(),
        separators in prop::collection::vec(0..SEPARATORS.len(), 1..32),
    ) {
        let mut rendered = Rendered::new(separators, false);
        rendered.items(&normalize(items), 1);
        if with_status_block {
            rendered.status_block();
        }

        let first = parser().parse_text(&rendered.declaration());
        prop_assert!(first.is_ok());
        let first = first.unwrap();

        let again = parser().parse_text(&first.to_declaration());
        prop_assert!(again.is_ok(), "{:?}\n{}", again.as_ref().err(), first.to_declaration());
        prop_assert_eq!(again.unwrap(), first);
    }
}
