//! Audit trail — one structured entry per permission decision.
//!
//! Entries are kept in memory for the life of the process and forwarded to
//! any configured sinks. Nothing is written to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use toolgate_core::RiskLevel;
use uuid::Uuid;

use crate::prompt::PromptOutcome;
use crate::state::FastPath;

/// Maximum audit entries kept in memory.
const MAX_AUDIT_ENTRIES: usize = 5_000;

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub tool_name: String,
    pub event: AuditEvent,
    pub outcome: AuditOutcome,
    /// Present only when the request was classified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// How the decision was reached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Remembered state answered without a prompt
    FastPath { rule: String },
    /// The operator answered a prompt
    Prompted {
        answer: String,
        info_requests: usize,
    },
}

impl AuditEvent {
    pub fn fast_path(rule: FastPath) -> Self {
        let rule = match rule {
            FastPath::AllowAll => "allow_all",
            FastPath::AllowTool => "allow_tool",
            FastPath::DenyTool => "deny_tool",
        };
        Self::FastPath { rule: rule.into() }
    }

    pub fn prompted(answer: PromptOutcome, info_requests: usize) -> Self {
        let answer = match answer {
            PromptOutcome::AllowOnce => "allow_once",
            PromptOutcome::AllowAll => "allow_all",
            PromptOutcome::DenyToolForever => "deny_tool_forever",
            PromptOutcome::DenyOnce => "deny_once",
        };
        Self::Prompted {
            answer: answer.into(),
            info_requests,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Allowed,
    Denied,
}

/// Trait for audit log sinks (where entries are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// In-memory audit logger owned by one gateway.
pub struct AuditLogger {
    entries: Vec<AuditEntry>,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("entry_count", &self.entries.len())
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no sinks.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Create a new audit logger with the given sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: Vec::new(),
            sinks,
        }
    }

    /// Record a decision.
    pub fn log(
        &mut self,
        tool_name: &str,
        event: AuditEvent,
        outcome: AuditOutcome,
        risk_level: Option<RiskLevel>,
        reason: Option<String>,
    ) {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            tool_name: tool_name.into(),
            event,
            outcome,
            risk_level,
            reason,
        };

        for sink in &self.sinks {
            sink.record(&entry);
        }

        if self.entries.len() >= MAX_AUDIT_ENTRIES {
            self.entries.drain(..MAX_AUDIT_ENTRIES / 10);
        }
        self.entries.push(entry);
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn entries_by_outcome(&self, outcome: AuditOutcome) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.outcome == outcome).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// A tracing-based audit sink that logs entries via `tracing::info!`.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::info!(
            id = %entry.id,
            tool = %entry.tool_name,
            event = ?entry.event,
            outcome = ?entry.outcome,
            risk = ?entry.risk_level,
            reason = ?entry.reason,
            "AUDIT"
        );
    }
}
