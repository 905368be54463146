use log::trace;

use crate::line;

/// Where a scan currently is relative to the target VDOM's policy table.
///
/// States only move forward during a pass; [`Section::InPolicySection`] is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    /// Before `config global`.
    #[default]
    PreGlobal,
    /// After `config global`, waiting for `edit <vdom>`.
    AwaitingVdom,
    /// Inside the target VDOM, waiting for `config firewall policy`.
    InVdom,
    /// Inside the target VDOM's policy table.
    InPolicySection,
}

/// Next section state after observing `line`.
///
/// The VDOM name must equal `target_vdom` exactly; `root` does not match `rootx`.
pub fn advance(state: Section, target_vdom: &str, line: &str) -> Section {
    match state {
        Section::PreGlobal if line::is_config_global(line) => Section::AwaitingVdom,
        Section::AwaitingVdom if line::edit_name(line) == Some(target_vdom) => Section::InVdom,
        Section::InVdom if line::is_policy_section(line) => Section::InPolicySection,
        other => other,
    }
}

/// [`advance`] bound to one VDOM name, holding the current state.
#[derive(Debug, Clone)]
pub struct SectionTracker {
    vdom: String,
    state: Section,
}

impl SectionTracker {
    pub fn new(vdom: impl Into<String>) -> Self {
        Self {
            vdom: vdom.into(),
            state: Section::default(),
        }
    }

    pub fn vdom(&self) -> &str {
        &self.vdom
    }

    pub fn state(&self) -> Section {
        self.state
    }

    pub fn advance(&mut self, line: &str) -> Section {
        let next = advance(self.state, &self.vdom, line);
        if next != self.state {
            trace!("vdom {}: {:?} -> {:?}", self.vdom, self.state, next);
            self.state = next;
        }
        next
    }
}
