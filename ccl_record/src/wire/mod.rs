//! Wire formats exchanged with the CCL runtime
//!
//! Outbound, a record becomes `set` statements; inbound, a JSON reply is
//! loaded back into a record of the same structure.

pub mod reply;
pub mod setter;

pub use reply::{parse_json_date, put_from_json, put_from_json_with, put_from_value, ReplyError};
pub use setter::{format_date_time, setter_commands, setter_commands_with, setter_script};
