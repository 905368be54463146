//! Line-level classification for block-format configuration dumps.
//!
//! The format carries no meaningful indentation, so every helper tolerates leading
//! whitespace and only looks at the first tokens of a line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Token appended to every captured line; fields are split on it again during
/// normalization.
pub const FIELD_SEPARATOR: char = '|';

static CONFIG_GLOBAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*config global\b").expect("config global pattern"));
static CONFIG_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*config\s+(.+?)\s*$").expect("config section pattern"));
static NUMBERED_EDIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*edit\s(\d+)").expect("numbered edit pattern"));
static NAMED_EDIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*edit\s+(?:"([^"]*)"|(\S+))\s*$"#).expect("named edit pattern")
});
static NEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*next\b").expect("next pattern"));
static END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*end\s*$").expect("end pattern"));
static SET_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*set\s+(\S+)\s*(.*?)\s*$").expect("set field pattern"));

/// Whether `line` opens the global configuration block.
pub fn is_config_global(line: &str) -> bool {
    CONFIG_GLOBAL.is_match(line)
}

/// Path of a `config <path>` line, e.g. `firewall policy`.
pub fn config_section(line: &str) -> Option<&str> {
    CONFIG_SECTION
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether `line` opens the firewall policy table.
pub fn is_policy_section(line: &str) -> bool {
    config_section(line) == Some("firewall policy")
}

/// Digits of a numbered `edit <n>` header.
///
/// All consecutive digits are returned, so comparing the result against a target
/// ID never lets `5` match `edit 50`.
pub fn numbered_edit(line: &str) -> Option<&str> {
    NUMBERED_EDIT
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Name of an `edit <name>` or `edit "<name>"` header, without quotes.
pub fn edit_name(line: &str) -> Option<&str> {
    let caps = NAMED_EDIT.captures(line)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Whether `line` closes an edit block.
pub fn is_next(line: &str) -> bool {
    NEXT.is_match(line)
}

/// Whether `line` closes a config section.
pub fn is_end(line: &str) -> bool {
    END.is_match(line)
}

/// Split a `set <key> <value...>` line into key and raw value text.
pub fn set_field(line: &str) -> Option<(&str, &str)> {
    let caps = SET_FIELD.captures(line)?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2).map_or("", |m| m.as_str());
    Some((key, value))
}

/// Split a value into tokens, keeping quoted runs together and dropping the quotes.
///
/// `"Web Servers" lan` yields `["Web Servers", "lan"]`.
pub fn tokens(value: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for ch in value.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    out.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        out.push(current);
    }
    out
}
