use log::debug;

use super::{BlockCapture, RawBlock, ScanBuffer};
use crate::line;

/// Captures the numbered block whose text contains a UUID.
///
/// UUIDs are unique across VDOMs, so no section tracking is involved. The match is
/// a substring test on the accumulated block text.
#[derive(Debug)]
pub struct UuidCapture {
    uuid: String,
    buffer: ScanBuffer,
}

impl UuidCapture {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            buffer: ScanBuffer::default(),
        }
    }
}

impl BlockCapture for UuidCapture {
    fn key(&self) -> &str {
        &self.uuid
    }

    fn consume(&mut self, entry: &str) {
        if self.is_done() {
            return;
        }

        if line::numbered_edit(entry).is_some() {
            self.buffer.open(entry);
        } else if line::is_next(entry) && self.buffer.contains(&self.uuid) {
            self.buffer.finalize(entry);
            debug!("Found {}", self.uuid);
        } else if line::is_next(entry) {
            self.buffer.discard();
        } else {
            self.buffer.append(entry);
        }
    }

    fn found(&self) -> Option<&RawBlock> {
        self.buffer.found.as_ref()
    }

    fn take_found(&mut self) -> Option<RawBlock> {
        self.buffer.found.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(capture: &mut UuidCapture, text: &str) {
        for entry in text.lines() {
            capture.consume(entry);
        }
    }

    #[test]
    fn skips_blocks_without_the_uuid() {
        let mut capture = UuidCapture::new("bbb");
        feed(
            &mut capture,
            "config firewall policy\n    edit 1\n        set uuid aaa\n    next\n    edit 2\n        set uuid bbb\n    next\nend",
        );
        let block = capture.found().expect("found");
        assert!(block.as_str().starts_with("    edit 2|"));
        assert!(!block.as_str().contains("aaa"));
        assert!(block.as_str().ends_with("    next|"));
    }

    #[test]
    fn ignores_lines_after_match() {
        let mut capture = UuidCapture::new("aaa");
        feed(&mut capture, "edit 1\nset uuid aaa\nnext\nedit 2\nset uuid aaa\nnext");
        assert_eq!(
            capture.found().map(RawBlock::as_str),
            Some("edit 1|set uuid aaa|next|")
        );
    }

    #[test]
    fn unmatched_next_empties_the_buffer() {
        let mut capture = UuidCapture::new("nope");
        feed(&mut capture, "edit 1\nset uuid aaa\nnext");
        assert!(!capture.buffer.is_open());
    }

    #[test]
    fn match_in_unnumbered_block_excludes_earlier_blocks() {
        let mut capture = UuidCapture::new("nope");
        feed(
            &mut capture,
            "edit 1\nset uuid aaa\nnext\nend\nconfig firewall address\nedit \"x\"\nset uuid nope\nnext",
        );
        assert_eq!(
            capture.found().map(RawBlock::as_str),
            Some("end|config firewall address|edit \"x\"|set uuid nope|next|")
        );
    }

    #[test]
    fn absent_uuid_leaves_nothing_found() {
        let mut capture = UuidCapture::new("zzz");
        feed(&mut capture, "edit 1\nset uuid aaa\nnext");
        assert!(!capture.is_done());
        assert!(capture.take_found().is_none());
    }
}
