//! Normalization of a captured block into typed fields.
//!
//! A block such as
//!
//! ```text
//!     edit 12
//!         set name "test"
//!         set srcaddr "lan" "dmz"
//!     next
//! ```
//!
//! becomes `{id: 12, name: "test", srcaddr: ["lan", "dmz"]}`. Which keys survive and
//! how their values are typed is decided by [`FieldKind::of`] alone.

use std::collections::BTreeMap;

use log::trace;

use crate::capture::RawBlock;
use crate::line;

/// Typed value of one recognized field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Integer(u32),
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<u32> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(values) => Some(values),
            _ => None,
        }
    }
}

/// How a recognized key's value is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Scalar,
    List,
}

impl FieldKind {
    /// Allow-list of keys kept from a policy block.
    pub fn of(key: &str) -> Option<FieldKind> {
        match key {
            "id" => Some(FieldKind::Integer),
            "name" | "uuid" | "action" | "logtraffic" | "comments" => Some(FieldKind::Scalar),
            "srcintf" | "dstintf" | "srcaddr" | "dstaddr" | "schedule" | "service" => {
                Some(FieldKind::List)
            }
            _ => None,
        }
    }

    /// Parse `raw` as this kind. Malformed integers become `0`.
    pub fn parse(self, raw: &str) -> FieldValue {
        match self {
            FieldKind::Integer => {
                let digits = raw.trim().trim_matches('"');
                FieldValue::Integer(digits.parse().unwrap_or_else(|_| {
                    trace!("unparseable integer {digits:?}, using 0");
                    0
                }))
            }
            FieldKind::Scalar => FieldValue::Scalar(raw.trim().replace('"', "")),
            FieldKind::List => FieldValue::List(line::tokens(raw)),
        }
    }
}

/// Recognized fields of a block, keyed by field name.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Turn a captured block into its recognized fields.
///
/// The `edit <id>` header becomes the `id` field, `set` markers and the closing
/// `next` are dropped, and keys outside [`FieldKind::of`] are discarded.
pub fn normalize(block: &RawBlock) -> FieldMap {
    let mut fields = FieldMap::new();

    for entry in block.entries() {
        let Some((key, value)) = split_entry(entry) else {
            continue;
        };
        match FieldKind::of(key) {
            Some(kind) => {
                fields.insert(key.to_string(), kind.parse(value));
            }
            None => trace!("dropping field {key}"),
        }
    }

    fields
}

fn split_entry(entry: &str) -> Option<(&str, &str)> {
    if line::is_next(entry) || line::is_end(entry) {
        return None;
    }
    if let Some(name) = line::edit_name(entry) {
        return Some(("id", name));
    }
    if let Some(field) = line::set_field(entry) {
        return Some(field);
    }

    let trimmed = entry.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(key, value)| (key, value.trim())),
    )
}
