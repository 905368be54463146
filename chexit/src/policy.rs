use blockcfg_core::{normalize, FieldMap, FieldValue, RawBlock};
use serde::{Deserialize, Serialize};

/// A firewall policy as extracted from a configuration dump.
///
/// A key that matched nothing yields `Policy::default()`; use [`Policy::is_found`]
/// to tell the two apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: u32,
    pub name: String,
    pub uuid: String,
    pub srcintf: Vec<String>,
    pub dstintf: Vec<String>,
    /// Address/group names, or subnets once expanded.
    pub srcaddr: Vec<String>,
    /// Address/group names, or subnets once expanded.
    pub dstaddr: Vec<String>,
    pub service: Vec<String>,
    pub schedule: Vec<String>,
    pub action: String,
}

impl Policy {
    /// Normalize a captured block and assemble the policy from its fields.
    pub fn from_block(block: &RawBlock) -> Self {
        Self::from_fields(&normalize(block))
    }

    /// Assemble a policy from normalized fields; absent fields keep their zero value.
    pub fn from_fields(fields: &FieldMap) -> Self {
        Self {
            id: fields
                .get("id")
                .and_then(FieldValue::as_integer)
                .unwrap_or_default(),
            name: scalar(fields, "name"),
            uuid: scalar(fields, "uuid"),
            srcintf: list(fields, "srcintf"),
            dstintf: list(fields, "dstintf"),
            srcaddr: list(fields, "srcaddr"),
            dstaddr: list(fields, "dstaddr"),
            service: list(fields, "service"),
            schedule: list(fields, "schedule"),
            action: scalar(fields, "action"),
        }
    }

    pub fn is_found(&self) -> bool {
        self.id != 0 || !self.uuid.is_empty()
    }
}

fn scalar(fields: &FieldMap, key: &str) -> String {
    fields
        .get(key)
        .and_then(FieldValue::as_scalar)
        .unwrap_or_default()
        .to_string()
}

fn list(fields: &FieldMap, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(FieldValue::as_list)
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const BLOCK: &str = "    edit 12|        set name \"test\"|        set uuid \"abc-123\"|        set srcintf \"port1\"|        set dstintf \"port2\"|        set srcaddr \"lan\" \"dmz\"|        set dstaddr \"all\"|        set action accept|        set schedule \"always\"|        set service \"HTTP\" \"HTTPS\"|        set nat enable|    next|";

    #[test]
    fn assembles_policy_from_block() {
        let policy = Policy::from_block(&RawBlock::new(BLOCK));
        assert_eq!(
            policy,
            Policy {
                id: 12,
                name: "test".into(),
                uuid: "abc-123".into(),
                srcintf: vec!["port1".into()],
                dstintf: vec!["port2".into()],
                srcaddr: vec!["lan".into(), "dmz".into()],
                dstaddr: vec!["all".into()],
                service: vec!["HTTP".into(), "HTTPS".into()],
                schedule: vec!["always".into()],
                action: "accept".into(),
            }
        );
        assert!(policy.is_found());
    }

    #[test]
    fn json_round_trip_keeps_every_field() {
        let policy = Policy::from_block(&RawBlock::new(BLOCK));
        let json = serde_json::to_value(&policy).expect("serialize");
        assert_eq!(json["id"], 12);
        assert_eq!(json["srcaddr"], serde_json::json!(["lan", "dmz"]));
        let back: Policy = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, policy);
    }

    #[test]
    fn default_policy_is_not_found() {
        assert!(!Policy::default().is_found());
        let json = serde_json::to_string(&Policy::default()).expect("serialize");
        assert_eq!(
            json,
            r#"{"id":0,"name":"","uuid":"","srcintf":[],"dstintf":[],"srcaddr":[],"dstaddr":[],"service":[],"schedule":[],"action":""}"#
        );
    }

    #[test]
    fn missing_fields_stay_empty() {
        let policy = Policy::from_block(&RawBlock::new("edit 4|set action deny|next|"));
        assert_eq!(policy.id, 4);
        assert_eq!(policy.action, "deny");
        assert!(policy.name.is_empty());
        assert!(policy.service.is_empty());
    }
}
