//! CCL `set` statements that rebuild a record remotely
//!
//! Each statement assigns one field through its breadcrumb path, e.g.
//! `set request->qual[2]->name = 'x' go`. Strings that would push a line
//! past CCL's 132-column limit are split across a `concat(...)` call.

use crate::types::{FieldValue, Record};
use ccl_structure::config::compile_time::record::{CCL_CONTINUATION_CHUNK, CCL_LINE_LENGTH};
use ccl_structure::config::runtime::RecordPreferences;
use ccl_structure::logging::codes;
use ccl_structure::{log_debug, log_success};
use chrono::NaiveDateTime;

/// Setter statements for every populated field of `record`
pub fn setter_commands(record: &Record) -> Vec<String> {
    setter_commands_with(record, &RecordPreferences::default())
}

pub fn setter_commands_with(record: &Record, preferences: &RecordPreferences) -> Vec<String> {
    let mut writer = SetterWriter {
        skip_defaults: preferences.skip_default_values,
        commands: Vec::new(),
    };
    let mut crumbs = vec![record.name().to_string()];
    writer.write_record(&mut crumbs, record);

    log_success!(
        codes::success::SETTER_COMMANDS_GENERATED,
        "Setter commands generated",
        "record" => record.name(),
        "commands" => writer.commands.len()
    );

    writer.commands
}

/// All setter statements as one script, one statement per line group
pub fn setter_script(record: &Record) -> String {
    setter_commands(record).join("\n")
}

struct SetterWriter {
    skip_defaults: bool,
    commands: Vec<String>,
}

impl SetterWriter {
    fn write_record(&mut self, crumbs: &mut Vec<String>, record: &Record) {
        for (definition, value) in record.entries() {
            let field = definition.name();

            match value {
                FieldValue::Record(nested) => {
                    crumbs.push(field.to_string());
                    self.write_record(crumbs, nested);
                    crumbs.pop();
                }
                FieldValue::List(list) => {
                    for (i, item) in list.iter().enumerate() {
                        crumbs.push(format!("{}[{}]", field, i + 1));
                        self.write_record(crumbs, item);
                        crumbs.pop();
                    }
                }
                FieldValue::DynamicList(list) => {
                    if list.is_empty() {
                        continue;
                    }
                    self.commands.push(format!(
                        "set stat = alterlist({}->{}, {}) go",
                        crumbs.join("->"),
                        field,
                        list.len()
                    ));
                    for (i, item) in list.iter().enumerate() {
                        crumbs.push(format!("{}[{}]", field, i + 1));
                        self.write_record(crumbs, item);
                        crumbs.pop();
                    }
                }
                scalar => {
                    if self.skip_defaults && scalar.is_default() {
                        continue;
                    }
                    let assignment = format!("set {}->{} = ", crumbs.join("->"), field);
                    if let Some(command) = scalar_command(&assignment, scalar) {
                        self.commands.push(command);
                    }
                }
            }
        }
    }
}

fn scalar_command(assignment: &str, value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Integer(value) => Some(format!("{}{} go", assignment, value)),
        FieldValue::Float(value) => Some(format!("{}{:.6} go", assignment, value)),
        FieldValue::DateTime(Some(value)) => Some(format!(
            "{}cnvtdatetime('{}') go",
            assignment,
            format_date_time(value)
        )),
        FieldValue::Text(text) => Some(string_command(assignment, text)),
        // Null dates have no CCL literal
        FieldValue::DateTime(None) => {
            log_debug!("Skipping null date", "assignment" => assignment.trim_end());
            None
        }
        FieldValue::Record(_) | FieldValue::List(_) | FieldValue::DynamicList(_) => None,
    }
}

/// `DD-MON-YYYY HH:MM:SS.mmm`, upper-cased
pub fn format_date_time(value: &NaiveDateTime) -> String {
    value
        .format("%d-%b-%Y %H:%M:%S%.3f")
        .to_string()
        .to_uppercase()
}

fn string_command(assignment: &str, value: &str) -> String {
    let chunks = split_value(assignment, value);

    if chunks.len() == 1 {
        return format!("{}{} go", assignment, quote(&chunks[0]));
    }

    let mut lines = vec![format!("{}concat({}", assignment, quote(&chunks[0]))];
    lines.extend(chunks[1..].iter().map(|chunk| format!(",{}", quote(chunk))));
    lines.push(") go".to_string());
    lines.join("\n")
}

/// Split `value` so that every line of the resulting command, quote
/// splicing included, stays within the CCL line length. The first piece
/// shares a line with the assignment; the rest go on continuation lines.
fn split_value(assignment: &str, value: &str) -> Vec<String> {
    let prefix = assignment.chars().count();
    let single_line = CCL_LINE_LENGTH.saturating_sub(prefix + " go".len());

    if quoted_width(value.chars().count(), value.matches('\'').count()) <= single_line {
        return vec![value.to_string()];
    }

    let first_line = CCL_LINE_LENGTH.saturating_sub(prefix + "concat(".len());
    let continuation_line = CCL_LINE_LENGTH - ",".len();

    let mut chunks = Vec::new();
    let mut current = String::new();
    let (mut chars, mut quotes) = (0, 0);

    for c in value.chars() {
        let budget = if chunks.is_empty() { first_line } else { continuation_line };
        let is_quote = usize::from(c == '\'');
        let fits = chars < CCL_CONTINUATION_CHUNK
            && quoted_width(chars + 1, quotes + is_quote) <= budget;

        if !fits && chars > 0 {
            chunks.push(std::mem::take(&mut current));
            chars = 0;
            quotes = 0;
        }

        current.push(c);
        chars += 1;
        quotes += is_quote;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Width of [`quote`]'s output for a value of `chars` characters holding
/// `quotes` single quotes
fn quoted_width(chars: usize, quotes: usize) -> usize {
    match quotes {
        0 => chars + 2,
        // `concat(` and `)` around it; each quote becomes `', "'", '`
        _ => chars + 2 + quotes * 8 + 8,
    }
}

/// Single-quoted CCL literal; embedded single quotes are spliced in with a
/// double-quoted `"'"`
fn quote(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }

    let pieces: Vec<String> = value.split('\'').map(|piece| format!("'{}'", piece)).collect();
    format!("concat({})", pieces.join(", \"'\", "))
}
