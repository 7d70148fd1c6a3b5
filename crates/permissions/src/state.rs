//! Permission state store — decisions remembered for the life of the process.
//!
//! Nothing here is persisted. A tool name lives in at most one of the
//! allow/deny sets at any time.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// A decision that can be made without classifying or prompting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastPath {
    /// Global auto-allow is on.
    AllowAll,
    /// The tool is in the always-allow set.
    AllowTool,
    /// The tool is in the always-deny set.
    DenyTool,
}

impl FastPath {
    pub fn is_allow(self) -> bool {
        !matches!(self, Self::DenyTool)
    }
}

/// Snapshot of the remembered decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionState {
    pub auto_allow_all: bool,
    pub always_allow: BTreeSet<String>,
    pub always_deny: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct PermissionStateStore {
    state: PermissionState,
}

impl PermissionStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a remembered decision.
    ///
    /// Priority: auto-allow-all, then always-allow, then always-deny.
    pub fn fast_path_decision(&self, tool_name: &str) -> Option<FastPath> {
        if self.state.auto_allow_all {
            Some(FastPath::AllowAll)
        } else if self.state.always_allow.contains(tool_name) {
            Some(FastPath::AllowTool)
        } else if self.state.always_deny.contains(tool_name) {
            Some(FastPath::DenyTool)
        } else {
            None
        }
    }

    pub fn record_allow_all(&mut self) {
        debug!("Auto-allow enabled for all tools");
        self.state.auto_allow_all = true;
    }

    pub fn record_allow_forever(&mut self, tool_name: &str) {
        debug!(tool = %tool_name, "Remembering allow");
        self.state.always_deny.remove(tool_name);
        self.state.always_allow.insert(tool_name.to_string());
    }

    pub fn record_deny_forever(&mut self, tool_name: &str) {
        debug!(tool = %tool_name, "Remembering deny");
        self.state.always_allow.remove(tool_name);
        self.state.always_deny.insert(tool_name.to_string());
    }

    /// One-time allows leave no trace.
    pub fn record_allow_once(&mut self, _tool_name: &str) {}

    /// One-time denials leave no trace.
    pub fn record_deny_once(&mut self, _tool_name: &str) {}

    pub fn is_auto_allow_all(&self) -> bool {
        self.state.auto_allow_all
    }

    pub fn is_always_allowed(&self, tool_name: &str) -> bool {
        self.state.always_allow.contains(tool_name)
    }

    pub fn is_always_denied(&self, tool_name: &str) -> bool {
        self.state.always_deny.contains(tool_name)
    }

    pub fn snapshot(&self) -> PermissionState {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_fast_path() {
        let store = PermissionStateStore::new();
        assert_eq!(store.fast_path_decision("Write"), None);
        assert_eq!(store.snapshot(), PermissionState::default());
    }

    #[test]
    fn allow_then_deny_leaves_only_deny() {
        let mut store = PermissionStateStore::new();
        store.record_allow_forever("Write");
        assert!(store.is_always_allowed("Write"));

        store.record_deny_forever("Write");
        assert!(!store.is_always_allowed("Write"));
        assert!(store.is_always_denied("Write"));
        assert_eq!(store.fast_path_decision("Write"), Some(FastPath::DenyTool));
    }

    #[test]
    fn deny_then_allow_leaves_only_allow() {
        let mut store = PermissionStateStore::new();
        store.record_deny_forever("Bash");
        store.record_allow_forever("Bash");
        let state = store.snapshot();
        assert!(state.always_allow.contains("Bash"));
        assert!(state.always_deny.is_empty());
    }

    #[test]
    fn auto_allow_all_wins_over_deny() {
        let mut store = PermissionStateStore::new();
        store.record_deny_forever("Bash");
        store.record_allow_all();
        assert_eq!(store.fast_path_decision("Bash"), Some(FastPath::AllowAll));
        assert_eq!(store.fast_path_decision("anything"), Some(FastPath::AllowAll));
    }

    #[test]
    fn once_records_do_not_mutate() {
        let mut store = PermissionStateStore::new();
        store.record_allow_once("Read");
        store.record_deny_once("Read");
        assert_eq!(store.snapshot(), PermissionState::default());
    }

    #[test]
    fn decisions_are_per_tool_name() {
        let mut store = PermissionStateStore::new();
        store.record_deny_forever("Bash");
        assert_eq!(store.fast_path_decision("bash"), None);
        assert_eq!(store.fast_path_decision("Write"), None);
    }

    #[test]
    fn fast_path_allow_flags() {
        assert!(FastPath::AllowAll.is_allow());
        assert!(FastPath::AllowTool.is_allow());
        assert!(!FastPath::DenyTool.is_allow());
    }
}
