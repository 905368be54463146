//! Semicolon-separated table output.
//!
//! Each policy is rendered as its own small table: a `sep=;` hint line for
//! spreadsheet tools, a header row and one data row. The columns and their order
//! are fixed by [`COLUMNS`].

use crate::policy::Policy;

pub const CSV_SEPARATOR: &str = ";";
/// Separator between items of a list-valued column.
pub const LIST_SEPARATOR: &str = ",";

/// One output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Name,
    Uuid,
    Srcintf,
    Dstintf,
    Srcaddr,
    Dstaddr,
    Service,
    Schedule,
    Action,
}

pub const COLUMNS: [Column; 10] = [
    Column::Id,
    Column::Name,
    Column::Uuid,
    Column::Srcintf,
    Column::Dstintf,
    Column::Srcaddr,
    Column::Dstaddr,
    Column::Service,
    Column::Schedule,
    Column::Action,
];

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Uuid => "uuid",
            Column::Srcintf => "srcintf",
            Column::Dstintf => "dstintf",
            Column::Srcaddr => "srcaddr",
            Column::Dstaddr => "dstaddr",
            Column::Service => "service",
            Column::Schedule => "schedule",
            Column::Action => "action",
        }
    }

    pub fn render(self, policy: &Policy) -> String {
        match self {
            Column::Id => policy.id.to_string(),
            Column::Name => policy.name.clone(),
            Column::Uuid => policy.uuid.clone(),
            Column::Srcintf => policy.srcintf.join(LIST_SEPARATOR),
            Column::Dstintf => policy.dstintf.join(LIST_SEPARATOR),
            Column::Srcaddr => policy.srcaddr.join(LIST_SEPARATOR),
            Column::Dstaddr => policy.dstaddr.join(LIST_SEPARATOR),
            Column::Service => policy.service.join(LIST_SEPARATOR),
            Column::Schedule => policy.schedule.join(LIST_SEPARATOR),
            Column::Action => policy.action.clone(),
        }
    }
}

/// Format one policy as `sep=;`, header row and data row.
pub fn policy_table(policy: &Policy) -> String {
    let head: Vec<&str> = COLUMNS.iter().map(|c| c.header()).collect();
    let row: Vec<String> = COLUMNS.iter().map(|c| c.render(policy)).collect();
    format!(
        "sep={CSV_SEPARATOR}\n{}\n{}",
        head.join(CSV_SEPARATOR),
        row.join(CSV_SEPARATOR)
    )
}

/// Format every policy as its own table, separated by newlines.
pub fn format_csv(policies: &[Policy]) -> String {
    policies
        .iter()
        .map(policy_table)
        .collect::<Vec<_>>()
        .join("\n")
}
