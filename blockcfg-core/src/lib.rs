//! Streaming primitives for `config`/`edit`/`set`/`next`/`end` configuration dumps.
//!
//! Appliance exports in this format nest virtual domains, configuration sections and
//! numbered entries without meaningful indentation. This crate reads such a dump one
//! line at a time and provides:
//!
//! - [`source`] — forward-only line iteration over a file or reader
//! - [`line`] — classification of individual lines (`config`, `edit`, `set`, `next`)
//! - [`section`] — the four-state tracker that locates a VDOM's policy section
//! - [`capture`] — strategies that accumulate one `edit ... next` block for a key
//! - [`fields`] — normalization of a captured block into typed fields
//!
//! The policy record and address resolution live in
//! the consuming application.

pub mod capture;
pub mod fields;
pub mod line;
pub mod section;
pub mod source;

pub use capture::{run_capture, BlockCapture, RawBlock, UuidCapture, VdomPolicyCapture};
pub use fields::{normalize, FieldKind, FieldMap, FieldValue};
pub use section::{advance, Section, SectionTracker};
pub use source::{LineSource, SourceError};
