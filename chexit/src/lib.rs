//! Firewall policy extraction from block-format configuration dumps.
//!
//! Given a configuration export and a list of lookup keys (policy UUIDs, or
//! `vdom,policyID` pairs), this library finds each policy block, turns it into a
//! [`policy::Policy`] record and, when asked, replaces address and address-group
//! names with the subnets they stand for.
//!
//! - [`request`] — lookup keys, options and request validation
//! - [`lookup`] — sequential and fan-out scanning, one record per key
//! - [`policy`] — the policy record
//! - [`resolve`] — transitive address-group to subnet resolution
//! - [`format`] — JSON and semicolon-separated table output
//!
//! Line-level scanning, section tracking and block capture come from
//! `blockcfg-core`.

pub mod format;
pub mod lookup;
pub mod policy;
pub mod request;
pub mod resolve;
