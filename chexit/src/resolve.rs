//! Expansion of address and address-group names into subnets.
//!
//! Every name is looked up by re-scanning the configuration file from the start,
//! so each resolution pass is independent and passes can run concurrently.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::net::Ipv4Addr;
use std::path::PathBuf;

use blockcfg_core::line;
use blockcfg_core::{LineSource, SourceError};
use log::{debug, warn};

use crate::policy::Policy;

/// Name that stands for any address; it resolves to itself without a scan.
pub const ANY_ADDRESS: &str = "all";

/// Configuration sections holding address objects and groups.
const ADDRESS_SECTIONS: &[&str] = &["firewall address", "firewall addrgrp"];

/// Result of resolving a list of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Subnets in `<ip>/<prefix>` form, plus `all` when referenced.
    pub subnets: BTreeSet<String>,
    /// Names that were missing from the file or carried neither a subnet nor members.
    pub unresolved: Vec<String>,
}

/// What the block of one address name contained.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AddressEntry {
    Subnet(String),
    Members(Vec<String>),
    /// The object exists but has no `subnet` or `member` (FQDN, range, ...).
    Opaque,
}

/// Resolves names against one configuration file.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    path: PathBuf,
}

impl AddressResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve `names` transitively through group membership.
    ///
    /// Each name is expanded at most once, which also stops membership cycles.
    pub fn resolve(&self, names: &[String]) -> Result<Resolution, SourceError> {
        let mut queue: VecDeque<String> = names.iter().cloned().collect();
        let mut expanded = HashSet::new();
        let mut resolution = Resolution::default();

        while let Some(name) = queue.pop_front() {
            if !expanded.insert(name.clone()) {
                debug!("{name} already expanded");
                continue;
            }

            if name == ANY_ADDRESS {
                debug!("Found subnet all");
                resolution.subnets.insert(ANY_ADDRESS.to_string());
                continue;
            }

            match self.find(&name)? {
                Some(AddressEntry::Subnet(subnet)) => {
                    debug!("{name}: {subnet}");
                    resolution.subnets.insert(subnet);
                }
                Some(AddressEntry::Members(members)) => {
                    debug!("{name}: {}", members.join(" "));
                    queue.extend(members);
                }
                Some(AddressEntry::Opaque) => {
                    warn!("address {name} has no subnet or members, skipping");
                    resolution.unresolved.push(name);
                }
                None => {
                    warn!("address {name} not found in {}", self.path.display());
                    resolution.unresolved.push(name);
                }
            }
        }

        Ok(resolution)
    }

    /// Replace a policy's address names with the subnets they resolve to.
    ///
    /// Returns the names, from either list, that resolved to nothing.
    pub fn expand_policy(&self, policy: &mut Policy) -> Result<Vec<String>, SourceError> {
        let (src, dst) = rayon::join(
            || self.resolve(&policy.srcaddr),
            || self.resolve(&policy.dstaddr),
        );
        let (src, dst) = (src?, dst?);
        policy.srcaddr = src.subnets.into_iter().collect();
        policy.dstaddr = dst.subnets.into_iter().collect();

        let mut unresolved = src.unresolved;
        unresolved.extend(dst.unresolved);
        Ok(unresolved)
    }

    /// Scan for the block of `name` inside an address section.
    fn find(&self, name: &str) -> Result<Option<AddressEntry>, SourceError> {
        let mut in_addresses = false;
        let mut in_entry = false;

        for entry in LineSource::open(&self.path)? {
            let entry = entry?;

            if in_entry {
                if line::is_next(&entry) {
                    return Ok(Some(AddressEntry::Opaque));
                }
                match line::set_field(&entry) {
                    Some(("subnet", value)) => return Ok(Some(AddressEntry::Subnet(cidr(value)))),
                    Some(("member", value)) => {
                        return Ok(Some(AddressEntry::Members(line::tokens(value))))
                    }
                    _ => {}
                }
            } else if let Some(section) = line::config_section(&entry) {
                in_addresses = ADDRESS_SECTIONS.contains(&section);
            } else if line::is_end(&entry) {
                in_addresses = false;
            } else if in_addresses && line::edit_name(&entry) == Some(name) {
                in_entry = true;
            }
        }

        Ok(None)
    }
}

/// `<ip> <mask>` as `<ip>/<prefix>`.
fn cidr(value: &str) -> String {
    let mut parts = value.split_whitespace();
    let ip = parts.next().unwrap_or_default();
    let prefix = parts.next().map_or(0, mask_prefix);
    format!("{ip}/{prefix}")
}

/// Prefix length of a dotted-decimal IPv4 mask; malformed or non-contiguous masks
/// yield 0.
pub fn mask_prefix(mask: &str) -> u8 {
    mask.parse::<Ipv4Addr>()
        .ok()
        .and_then(|mask| ipnetwork::ipv4_mask_to_prefix(mask).ok())
        .unwrap_or(0)
}
