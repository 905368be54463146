use crate::policy::Policy;

/// Format policies as a compact JSON array.
pub fn format_json(policies: &[Policy]) -> Result<String, serde_json::Error> {
    serde_json::to_string(policies)
}
