//! Permission engine for Toolgate — risk classification, operator prompts,
//! and decision memory for agent tool calls.
//!
//! Provides:
//! - **Classifier**: Maps each tool request to a risk level with impacts and recommendations
//! - **Preview**: Shows the first lines a write or edit would put on disk
//! - **Prompt**: Renders the risk banner and collects one operator answer
//! - **State**: Remembers allow-all, per-tool allows, and per-tool denials for this run
//! - **Gateway**: Ties it together behind a single fail-closed `evaluate` call
//! - **Audit**: Structured record of every decision

pub mod audit;
pub mod classifier;
pub mod console;
pub mod gateway;
pub mod preview;
pub mod prompt;
pub mod state;
pub mod target;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
pub use classifier::{ExternalToolMatcher, PrefixMatcher, RiskClassifier};
pub use console::{ScriptedConsole, StdioConsole};
pub use gateway::{ONE_TIME_DENIAL, PermissionGateway, permanent_denial};
pub use preview::{ContentPreview, ContentPreviewer};
pub use prompt::{Answer, DecisionPrompt, PromptOutcome, PromptState, parse_answer};
pub use state::{FastPath, PermissionState, PermissionStateStore};
