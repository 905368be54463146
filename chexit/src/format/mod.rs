//! Policy output formatters.

pub mod csv;
pub mod json;

pub use csv::{format_csv, Column, COLUMNS};
pub use json::format_json;

use crate::policy::Policy;
use crate::request::OutputFormat;

/// Render `policies` in the requested layout.
pub fn format_policies(
    policies: &[Policy],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => format_json(policies),
        OutputFormat::Csv => Ok(format_csv(policies)),
    }
}
