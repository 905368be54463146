use log::debug;

use super::{BlockCapture, RawBlock, ScanBuffer};
use crate::line;
use crate::section::{Section, SectionTracker};

/// Captures policy `<id>` from the policy table of one VDOM.
///
/// The same numeric ID may exist in several VDOMs, so a candidate is only opened
/// once the [`SectionTracker`] has reached the target VDOM's policy table.
#[derive(Debug)]
pub struct VdomPolicyCapture {
    key: String,
    policy_id: String,
    tracker: SectionTracker,
    buffer: ScanBuffer,
}

impl VdomPolicyCapture {
    pub fn new(vdom: impl Into<String>, policy_id: u32) -> Self {
        let vdom = vdom.into();
        Self {
            key: format!("{vdom},{policy_id}"),
            policy_id: policy_id.to_string(),
            tracker: SectionTracker::new(vdom),
            buffer: ScanBuffer::default(),
        }
    }
}

impl BlockCapture for VdomPolicyCapture {
    fn key(&self) -> &str {
        &self.key
    }

    fn consume(&mut self, entry: &str) {
        if self.is_done() {
            return;
        }

        let has_id = self.buffer.contains(&self.policy_id);
        let in_policies = self.tracker.advance(entry) == Section::InPolicySection;

        if in_policies && line::numbered_edit(entry) == Some(self.policy_id.as_str()) {
            self.buffer.open(entry);
        } else if line::is_next(entry) && has_id {
            self.buffer.finalize(entry);
            debug!(
                "Found ID {} in VDOM {}",
                self.policy_id,
                self.tracker.vdom()
            );
        } else if self.buffer.is_open() && in_policies {
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

    const MULTI_VDOM: &str = "\
config global
end
config vdom
edit dmz
config firewall policy
    edit 12
        set name \"dmz-rule\"
    next
end
next
edit root
config firewall policy
    edit 50
        set name \"fifty\"
    next
    edit 5
        set name \"five\"
    next
    edit 12
        set name \"root-rule\"
    next
end
next
end";

    fn capture(vdom: &str, id: u32) -> VdomPolicyCapture {
        let mut capture = VdomPolicyCapture::new(vdom, id);
        for entry in MULTI_VDOM.lines() {
            capture.consume(entry);
        }
        capture
    }

    #[test]
    fn picks_the_policy_from_the_requested_vdom() {
        let c = capture("root", 12);
        let block = c.found().expect("found");
        assert!(block.as_str().contains("root-rule"));
        assert!(!block.as_str().contains("dmz-rule"));
        assert_eq!(c.key(), "root,12");
    }

    #[test]
    fn id_five_does_not_match_fifty() {
        let c = capture("root", 5);
        let block = c.found().expect("found");
        assert!(block.as_str().starts_with("    edit 5|"));
        assert!(block.as_str().contains("five"));
        assert!(!block.as_str().contains("fifty"));
    }

    #[test]
    fn unknown_vdom_finds_nothing() {
        let c = capture("guest", 12);
        assert!(c.found().is_none());
        assert_eq!(c.tracker.state(), Section::AwaitingVdom);
    }

    #[test]
    fn unknown_policy_id_finds_nothing() {
        let c = capture("root", 7);
        assert!(c.found().is_none());
        assert_eq!(c.tracker.state(), Section::InPolicySection);
    }
}
