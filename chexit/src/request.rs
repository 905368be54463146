//! Lookup requests: which file to scan, which keys to look for, and how to present
//! the result.
//!
//! A request is assembled from command-line flags and, optionally, a request file,
//! then validated into a [`LookupRequest`] before any configuration file is scanned.

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use blockcfg_core::{BlockCapture, UuidCapture, VdomPolicyCapture};
use serde::Deserialize;
use thiserror::Error;

/// Separator between keys in a selector list.
pub const KEY_SEPARATOR: char = ':';

/// Which capture strategy a key list selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SearchBy {
    #[serde(rename = "UUID")]
    Uuid,
    #[serde(rename = "VDOM-AND-POLID")]
    VdomAndPolicyId,
}

/// Whether address fields are expanded into subnets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expander {
    None,
    #[default]
    Addr,
}

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// How keys are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// One full pass per key.
    #[default]
    Sequential,
    /// One pass for all keys, each line broadcast to a worker per key.
    FanOut,
}

/// One policy to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Uuid(String),
    VdomPolicy { vdom: String, policy_id: u32 },
}

impl LookupKey {
    /// Parse one key of the given kind (`<uuid>` or `<vdom>,<policyID>`).
    pub fn parse(search_by: SearchBy, raw: &str) -> Result<Self, RequestError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RequestError::MalformedKey {
                key: raw.to_string(),
                reason: "empty key",
            });
        }

        match search_by {
            SearchBy::Uuid => Ok(LookupKey::Uuid(raw.to_string())),
            SearchBy::VdomAndPolicyId => {
                let (vdom, policy_id) =
                    raw.split_once(',')
                        .ok_or_else(|| RequestError::MalformedKey {
                            key: raw.to_string(),
                            reason: "expected <vdom>,<policyID>",
                        })?;
                let vdom = vdom.trim();
                if vdom.is_empty() {
                    return Err(RequestError::MalformedKey {
                        key: raw.to_string(),
                        reason: "empty VDOM name",
                    });
                }
                let policy_id =
                    policy_id
                        .trim()
                        .parse()
                        .map_err(|_| RequestError::MalformedKey {
                            key: raw.to_string(),
                            reason: "policy ID is not a number",
                        })?;
                Ok(LookupKey::VdomPolicy {
                    vdom: vdom.to_string(),
                    policy_id,
                })
            }
        }
    }

    /// Fresh capture strategy for this key.
    pub fn capture(&self) -> Box<dyn BlockCapture + Send> {
        match self {
            LookupKey::Uuid(uuid) => Box::new(UuidCapture::new(uuid.clone())),
            LookupKey::VdomPolicy { vdom, policy_id } => {
                Box::new(VdomPolicyCapture::new(vdom.clone(), *policy_id))
            }
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Uuid(uuid) => f.write_str(uuid),
            LookupKey::VdomPolicy { vdom, policy_id } => write!(f, "{vdom},{policy_id}"),
        }
    }
}

/// Parse a `:`-separated key list.
pub fn parse_keys(search_by: SearchBy, list: &str) -> Result<Vec<LookupKey>, RequestError> {
    list.split(KEY_SEPARATOR)
        .map(|raw| LookupKey::parse(search_by, raw))
        .collect()
}

/// A validated request, ready to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub filename: PathBuf,
    pub keys: Vec<LookupKey>,
    pub expander: Expander,
    pub formatter: OutputFormat,
    pub execution: Execution,
}

/// Errors detected before scanning starts.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid arguments: {}", .0.join(", "))]
    InvalidArguments(Vec<String>),
    #[error("malformed lookup key {key:?}: {reason}")]
    MalformedKey { key: String, reason: &'static str },
    #[error("cannot read configuration file {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read request file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse request file {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to parse request file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Unvalidated request fields; every field is optional until [`RequestSpec::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSpec {
    pub filename: Option<PathBuf>,
    pub uuid: Option<String>,
    pub v_polid: Option<String>,
    pub expander: Option<Expander>,
    pub formatter: Option<OutputFormat>,
    pub parallel: Option<bool>,
}

impl RequestSpec {
    /// Fill fields missing from `self` with values from `fallback`.
    ///
    /// Selectors are taken as a pair: if `self` names either form, none of the
    /// fallback's selectors are used.
    pub fn or(self, fallback: RequestSpec) -> RequestSpec {
        let has_selector = self.uuid.is_some() || self.v_polid.is_some();
        RequestSpec {
            filename: self.filename.or(fallback.filename),
            uuid: if has_selector { self.uuid } else { fallback.uuid },
            v_polid: if has_selector {
                self.v_polid
            } else {
                fallback.v_polid
            },
            expander: self.expander.or(fallback.expander),
            formatter: self.formatter.or(fallback.formatter),
            parallel: self.parallel.or(fallback.parallel),
        }
    }

    /// Check argument combinations, parse keys, and confirm the file can be opened.
    pub fn validate(self) -> Result<LookupRequest, RequestError> {
        let uuid = non_empty(self.uuid);
        let v_polid = non_empty(self.v_polid);

        let mut problems = Vec::new();
        if self.filename.is_none() {
            problems.push("no filename".to_string());
        }
        if uuid.is_some() && v_polid.is_some() {
            problems.push("both UUID & VDOM/Policy ID set".to_string());
        }
        if uuid.is_none() && v_polid.is_none() {
            problems.push("UUID or VDOM/Policy ID not set".to_string());
        }

        let (filename, search_by, keys) = match (self.filename, uuid, v_polid) {
            (Some(filename), Some(keys), None) => (filename, SearchBy::Uuid, keys),
            (Some(filename), None, Some(keys)) => (filename, SearchBy::VdomAndPolicyId, keys),
            _ => return Err(RequestError::InvalidArguments(problems)),
        };

        let keys = parse_keys(search_by, &keys)?;
        File::open(&filename).map_err(|source| RequestError::Unreadable {
            path: filename.display().to_string(),
            source,
        })?;

        Ok(LookupRequest {
            filename,
            keys,
            expander: self.expander.unwrap_or_default(),
            formatter: self.formatter.unwrap_or_default(),
            execution: if self.parallel.unwrap_or(false) {
                Execution::FanOut
            } else {
                Execution::Sequential
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// On-disk request document.
///
/// `keys` with `search-by` is the record form; `uuid` and `v-polid` mirror the
/// command-line selectors.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RequestFile {
    filename: Option<PathBuf>,
    keys: Option<String>,
    search_by: Option<SearchBy>,
    uuid: Option<String>,
    #[serde(alias = "v_polid")]
    v_polid: Option<String>,
    expander: Option<Expander>,
    formatter: Option<OutputFormat>,
    parallel: Option<bool>,
}

impl RequestFile {
    fn into_spec(self) -> RequestSpec {
        let (mut uuid, mut v_polid) = (self.uuid, self.v_polid);
        match (self.search_by, self.keys) {
            (Some(SearchBy::Uuid), Some(keys)) if uuid.is_none() => uuid = Some(keys),
            (Some(SearchBy::VdomAndPolicyId), Some(keys)) if v_polid.is_none() => {
                v_polid = Some(keys)
            }
            _ => {}
        }
        RequestSpec {
            filename: self.filename,
            uuid,
            v_polid,
            expander: self.expander,
            formatter: self.formatter,
            parallel: self.parallel,
        }
    }
}

/// Load a request file. `.json` files are read as JSON, anything else as TOML.
pub fn load_request(path: &Path) -> Result<RequestSpec, RequestError> {
    let raw = fs::read_to_string(path).map_err(|source| RequestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    parse_request(&raw, path.display().to_string(), is_json)
}

fn parse_request(raw: &str, path: String, is_json: bool) -> Result<RequestSpec, RequestError> {
    let file: RequestFile = if is_json {
        serde_json::from_str(raw).map_err(|source| RequestError::Json { path, source })?
    } else {
        toml::from_str(raw).map_err(|source| RequestError::Toml { path, source })?
    };
    Ok(file.into_spec())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn spec_for(file: &Path) -> RequestSpec {
        RequestSpec {
            filename: Some(file.to_path_buf()),
            ..RequestSpec::default()
        }
    }

    #[test]
    fn parses_vdom_policy_keys() {
        let keys = parse_keys(SearchBy::VdomAndPolicyId, "root,12:dmz, 5").expect("keys");
        assert_eq!(
            keys,
            vec![
                LookupKey::VdomPolicy {
                    vdom: "root".into(),
                    policy_id: 12
                },
                LookupKey::VdomPolicy {
                    vdom: "dmz".into(),
                    policy_id: 5
                },
            ]
        );
        assert_eq!(keys[0].to_string(), "root,12");
    }

    #[test]
    fn rejects_malformed_vdom_policy_keys() {
        for raw in ["root", "root,abc", ",12", "root,12:"] {
            let err = parse_keys(SearchBy::VdomAndPolicyId, raw).expect_err(raw);
            assert!(matches!(err, RequestError::MalformedKey { .. }), "{raw}");
        }
    }

    #[test]
    fn reports_every_argument_problem_at_once() {
        let err = RequestSpec::default().validate().expect_err("invalid");
        let message = err.to_string();
        assert!(message.starts_with("Invalid arguments: "));
        assert!(message.contains("no filename"));
        assert!(message.contains("UUID or VDOM/Policy ID not set"));
    }

    #[test]
    fn both_selectors_are_rejected_before_io() {
        let spec = RequestSpec {
            filename: Some(PathBuf::from("/nonexistent/fgt.conf")),
            uuid: Some("abc".into()),
            v_polid: Some("root,1".into()),
            ..RequestSpec::default()
        };
        let err = spec.validate().expect_err("invalid");
        assert!(err.to_string().contains("both UUID & VDOM/Policy ID set"));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let spec = RequestSpec {
            uuid: Some("abc".into()),
            ..spec_for(Path::new("/nonexistent/fgt.conf"))
        };
        assert!(matches!(
            spec.validate(),
            Err(RequestError::Unreadable { .. })
        ));
    }

    #[test]
    fn validate_applies_defaults() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let request = RequestSpec {
            uuid: Some("a:b".into()),
            ..spec_for(file.path())
        }
        .validate()
        .expect("valid");
        assert_eq!(request.keys.len(), 2);
        assert_eq!(request.expander, Expander::Addr);
        assert_eq!(request.formatter, OutputFormat::Json);
        assert_eq!(request.execution, Execution::Sequential);
    }

    #[test]
    fn command_line_selector_overrides_file_selector() {
        let cli = RequestSpec {
            uuid: Some("abc".into()),
            ..RequestSpec::default()
        };
        let file = RequestSpec {
            filename: Some(PathBuf::from("fgt.conf")),
            v_polid: Some("root,1".into()),
            formatter: Some(OutputFormat::Csv),
            ..RequestSpec::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.uuid.as_deref(), Some("abc"));
        assert_eq!(merged.v_polid, None);
        assert_eq!(merged.filename, Some(PathBuf::from("fgt.conf")));
        assert_eq!(merged.formatter, Some(OutputFormat::Csv));
    }

    #[test]
    fn loads_record_style_json_request() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("tempfile");
        write!(
            file,
            r#"{{"expander":"none","filename":"fgt.conf","keys":"root,1:root,2","search-by":"VDOM-AND-POLID","formatter":"csv"}}"#
        )
        .expect("write");

        let spec = load_request(file.path()).expect("load");
        assert_eq!(spec.v_polid.as_deref(), Some("root,1:root,2"));
        assert_eq!(spec.uuid, None);
        assert_eq!(spec.expander, Some(Expander::None));
        assert_eq!(spec.formatter, Some(OutputFormat::Csv));
    }

    #[test]
    fn loads_toml_request_with_cli_style_selector() {
        let spec = parse_request(
            "filename = \"fgt.conf\"\nuuid = \"abc:def\"\nparallel = true\n",
            "inline".into(),
            false,
        )
        .expect("parse");
        assert_eq!(spec.uuid.as_deref(), Some("abc:def"));
        assert_eq!(spec.parallel, Some(true));
    }

    #[test]
    fn unknown_request_keys_are_rejected() {
        let err = parse_request("verbose = 2\n", "inline".into(), false).expect_err("unknown");
        assert!(matches!(err, RequestError::Toml { .. }));
    }
}
