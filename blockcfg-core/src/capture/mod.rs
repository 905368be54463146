//! Strategies that capture a single `edit ... next` block for a lookup key.
//!
//! A strategy is fed one line at a time and never seeks back, so the same line
//! stream can be broadcast to several independent strategies. Once a block has
//! been captured the strategy is terminal and ignores further input.

mod policy_id;
mod uuid;

use std::fmt;

pub use policy_id::VdomPolicyCapture;
pub use uuid::UuidCapture;

use crate::line::FIELD_SEPARATOR;
use crate::source::SourceError;

/// Text of one captured block, each original line followed by [`FIELD_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawBlock(String);

impl RawBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Original lines of the block, in order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.0.split(FIELD_SEPARATOR).filter(|entry| !entry.is_empty())
    }
}

impl fmt::Display for RawBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A line-at-a-time block matcher for one lookup key.
pub trait BlockCapture {
    /// Key this strategy matches, as supplied by the caller.
    fn key(&self) -> &str;

    /// Feed the next line of input. Lines after a match are ignored.
    fn consume(&mut self, line: &str);

    /// Captured block, if any.
    fn found(&self) -> Option<&RawBlock>;

    /// Move the captured block out, leaving the strategy empty.
    fn take_found(&mut self) -> Option<RawBlock>;

    fn is_done(&self) -> bool {
        self.found().is_some()
    }
}

/// Feed `lines` to `capture` until it matches or the input ends.
///
/// Returns `Ok(None)` when the whole input was consumed without a match.
pub fn run_capture<C, I>(capture: &mut C, lines: I) -> Result<Option<RawBlock>, SourceError>
where
    C: BlockCapture + ?Sized,
    I: IntoIterator<Item = Result<String, SourceError>>,
{
    for line in lines {
        capture.consume(&line?);
        if capture.is_done() {
            break;
        }
    }
    Ok(capture.take_found())
}

/// Candidate-block accumulator shared by the strategies.
#[derive(Debug, Default)]
struct ScanBuffer {
    search: String,
    found: Option<RawBlock>,
}

impl ScanBuffer {
    fn is_open(&self) -> bool {
        !self.search.is_empty()
    }

    fn contains(&self, needle: &str) -> bool {
        self.search.contains(needle)
    }

    /// Start a new candidate with `line`, dropping any unmatched one.
    fn open(&mut self, line: &str) {
        self.search.clear();
        self.append(line);
    }

    /// Drop an unmatched candidate.
    fn discard(&mut self) {
        self.search.clear();
    }

    fn append(&mut self, line: &str) {
        self.search.push_str(line);
        self.search.push(FIELD_SEPARATOR);
    }

    /// Close the candidate with `line` and keep it as the match.
    fn finalize(&mut self, line: &str) {
        self.append(line);
        self.found = Some(RawBlock(std::mem::take(&mut self.search)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_block_entries_skip_trailing_separator() {
        let block = RawBlock::new("edit 1|set name x|next|");
        let entries: Vec<&str> = block.entries().collect();
        assert_eq!(entries, vec!["edit 1", "set name x", "next"]);
    }

    #[test]
    fn run_capture_stops_at_first_match() {
        let lines = ["edit 1", "set uuid aaa", "next", "edit 2", "set uuid aaa", "next"]
            .into_iter()
            .map(|l| Ok(l.to_string()));
        let mut capture = UuidCapture::new("aaa");
        let block = run_capture(&mut capture, lines).expect("scan").expect("found");
        assert_eq!(block.as_str(), "edit 1|set uuid aaa|next|");
    }

    #[test]
    fn run_capture_propagates_read_errors() {
        let lines = vec![
            Ok("edit 1".to_string()),
            Err(SourceError::Read {
                path: "mem".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
            }),
        ];
        let mut capture = UuidCapture::new("aaa");
        assert!(run_capture(&mut capture, lines).is_err());
    }
}
