//! Permission gateway — the single entry point the agent runtime calls.
//!
//! ```text
//! ToolRequest ──▶ state store ──hit──▶ decision
//!                     │ miss
//!                     ▼
//!                 classifier ──▶ previewer ──▶ prompt ──▶ state store ──▶ decision
//! ```
//!
//! The gateway never returns an error. Console failures, closed input and
//! unrecognised answers all end in a deny.

use async_trait::async_trait;
use std::panic::{AssertUnwindSafe, catch_unwind};
use toolgate_config::AppConfig;
use toolgate_core::{
    Console, PermissionDecision, PermissionHandler, RiskLevel, RiskProfile, ToolCategory,
    ToolRequest,
};
use tracing::{error, info, warn};

use crate::audit::{AuditEvent, AuditLogger, AuditOutcome, TracingSink};
use crate::classifier::RiskClassifier;
use crate::preview::ContentPreviewer;
use crate::prompt::{DecisionPrompt, PromptOutcome};
use crate::state::{FastPath, PermissionStateStore};

/// Reason attached to a deny that applies to one request only.
pub const ONE_TIME_DENIAL: &str = "Permission denied by operator for this request";

/// Reason attached to a deny coming from a remembered per-tool denial.
pub fn permanent_denial(tool_name: &str) -> String {
    format!("Tool '{tool_name}' is permanently denied for this session")
}

pub struct PermissionGateway<C: Console> {
    classifier: RiskClassifier,
    previewer: ContentPreviewer,
    store: PermissionStateStore,
    console: C,
    audit: Option<AuditLogger>,
    show_fast_path_notice: bool,
}

impl<C: Console> PermissionGateway<C> {
    /// Gateway with default policy, no audit trail.
    pub fn new(console: C) -> Self {
        Self {
            classifier: RiskClassifier::default(),
            previewer: ContentPreviewer::default(),
            store: PermissionStateStore::new(),
            console,
            audit: None,
            show_fast_path_notice: true,
        }
    }

    /// Gateway configured from an [`AppConfig`].
    pub fn from_config(config: &AppConfig, console: C) -> Self {
        let audit = config.audit.enabled.then(|| {
            if config.audit.log_to_tracing {
                AuditLogger::with_sinks(vec![Box::new(TracingSink)])
            } else {
                AuditLogger::new()
            }
        });

        Self {
            classifier: RiskClassifier::new(&config.permissions),
            previewer: ContentPreviewer::new(&config.permissions),
            store: PermissionStateStore::new(),
            console,
            audit,
            show_fast_path_notice: config.permissions.show_fast_path_notice,
        }
    }

    pub fn with_classifier(mut self, classifier: RiskClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_fast_path_notice(mut self, show: bool) -> Self {
        self.show_fast_path_notice = show;
        self
    }

    pub fn store(&self) -> &PermissionStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PermissionStateStore {
        &mut self.store
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn audit(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Rule on one request.
    pub async fn evaluate(&mut self, request: &ToolRequest) -> PermissionDecision {
        if let Some(rule) = self.store.fast_path_decision(&request.name) {
            return self.apply_fast_path(request, rule);
        }

        let profile = self.classify_guarded(request);
        let preview = profile
            .category
            .has_content_preview()
            .then(|| self.previewer.preview(&request.parameters));

        let mut prompt = DecisionPrompt::new(&profile, preview.as_ref(), &request.parameters);
        let outcome = prompt.run(&mut self.console).await;
        let info_requests = prompt.info_requests();

        match outcome {
            PromptOutcome::AllowOnce => self.store.record_allow_once(&request.name),
            PromptOutcome::AllowAll => self.store.record_allow_all(),
            PromptOutcome::DenyToolForever => self.store.record_deny_forever(&request.name),
            PromptOutcome::DenyOnce => self.store.record_deny_once(&request.name),
        }

        let decision = if outcome.is_allow() {
            PermissionDecision::allow(request.parameters.clone())
        } else if matches!(outcome, PromptOutcome::DenyToolForever) {
            PermissionDecision::deny(permanent_denial(&request.name))
        } else {
            PermissionDecision::deny(ONE_TIME_DENIAL)
        };

        info!(
            tool = %request.name,
            risk = %profile.risk_level,
            outcome = ?outcome,
            "Permission resolved by operator"
        );

        self.record_audit(
            &request.name,
            AuditEvent::prompted(outcome, info_requests),
            &decision,
            Some(profile.risk_level),
        );

        decision
    }

    fn apply_fast_path(&mut self, request: &ToolRequest, rule: FastPath) -> PermissionDecision {
        let decision = if rule.is_allow() {
            PermissionDecision::allow(request.parameters.clone())
        } else {
            PermissionDecision::deny(permanent_denial(&request.name))
        };

        if self.show_fast_path_notice {
            let notice = match rule {
                FastPath::AllowAll => format!("✓ {} allowed (allow all is on)", request.name),
                FastPath::AllowTool => format!("✓ {} allowed (remembered)", request.name),
                FastPath::DenyTool => format!("✗ {} denied (remembered)", request.name),
            };
            if let Err(e) = self.console.write_line(&notice) {
                warn!(error = %e, "Could not show fast-path notice");
            }
        }

        info!(tool = %request.name, rule = ?rule, "Permission resolved from remembered state");
        self.record_audit(&request.name, AuditEvent::fast_path(rule), &decision, None);
        decision
    }

    /// Classify, turning a classifier panic into a conservative HIGH profile.
    fn classify_guarded(&self, request: &ToolRequest) -> RiskProfile {
        match catch_unwind(AssertUnwindSafe(|| self.classifier.classify(request))) {
            Ok(profile) => profile,
            Err(_) => {
                error!(tool = %request.name, "Classification failed, using conservative profile");
                RiskProfile {
                    tool_name: request.name.clone(),
                    category: ToolCategory::Unknown,
                    explanation: format!("Run {} (classification failed)", request.name),
                    risk_level: RiskLevel::High,
                    impacts: vec!["Risk could not be assessed".into()],
                    recommendations: vec!["Deny unless you are sure this request is safe".into()],
                }
            }
        }
    }

    fn record_audit(
        &mut self,
        tool_name: &str,
        event: AuditEvent,
        decision: &PermissionDecision,
        risk_level: Option<RiskLevel>,
    ) {
        if let Some(audit) = self.audit.as_mut() {
            let outcome = if decision.is_allow() {
                AuditOutcome::Allowed
            } else {
                AuditOutcome::Denied
            };
            audit.log(
                tool_name,
                event,
                outcome,
                risk_level,
                decision.reason().map(String::from),
            );
        }
    }
}

#[async_trait]
impl<C: Console> PermissionHandler for PermissionGateway<C> {
    async fn evaluate(&mut self, request: &ToolRequest) -> PermissionDecision {
        PermissionGateway::evaluate(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::state::PermissionState;
    use serde_json::json;

    fn gateway(inputs: &[&str]) -> PermissionGateway<ScriptedConsole> {
        PermissionGateway::new(ScriptedConsole::new(inputs.iter().copied()))
            .with_audit(AuditLogger::new())
    }

    fn write_request() -> ToolRequest {
        ToolRequest::new("write-file", json!({"path": "/tmp/a.txt", "content": "hello"}))
    }

    #[tokio::test]
    async fn yes_allows_with_original_parameters() {
        let mut gw = gateway(&["y"]);
        let request = write_request();
        let decision = gw.evaluate(&request).await;
        assert_eq!(decision, PermissionDecision::allow(request.parameters.clone()));
        assert_eq!(gw.store().snapshot(), PermissionState::default());
    }

    #[tokio::test]
    async fn no_denies_once() {
        let mut gw = gateway(&["n", "y"]);
        let decision = gw.evaluate(&write_request()).await;
        assert_eq!(decision.reason(), Some(ONE_TIME_DENIAL));
        // Next request prompts again.
        assert!(gw.evaluate(&write_request()).await.is_allow());
        assert_eq!(gw.console().reads(), 2);
    }

    #[tokio::test]
    async fn deny_forever_skips_future_prompts() {
        let mut gw = gateway(&["d"]);
        let shell = ToolRequest::new("execute-shell", json!({"command": "ls"}));

        let first = gw.evaluate(&shell).await;
        assert_eq!(first.reason(), Some(permanent_denial("execute-shell").as_str()));
        assert!(gw.store().is_always_denied("execute-shell"));

        let second = gw.evaluate(&shell).await;
        assert_eq!(second, first);
        assert_eq!(gw.console().reads(), 1);
        assert!(gw.console().output().contains("✗ execute-shell denied (remembered)"));
    }

    #[tokio::test]
    async fn allow_all_short_circuits_everything() {
        let mut gw = gateway(&["a"]);
        assert!(gw.evaluate(&write_request()).await.is_allow());

        let rm = ToolRequest::new("execute-shell", json!({"command": "rm -rf /"}));
        assert!(gw.evaluate(&rm).await.is_allow());
        assert_eq!(gw.console().reads(), 1);
    }

    #[tokio::test]
    async fn remembered_allow_is_used() {
        let mut gw = gateway(&[]);
        gw.store_mut().record_allow_forever("read-file");
        let read = ToolRequest::new("read-file", json!({"path": "/home/user/secret.env"}));
        assert!(gw.evaluate(&read).await.is_allow());
        assert_eq!(gw.console().reads(), 0);
    }

    #[tokio::test]
    async fn closed_input_fails_closed() {
        let mut gw = gateway(&[]);
        let decision = gw.evaluate(&write_request()).await;
        assert_eq!(decision.reason(), Some(ONE_TIME_DENIAL));
    }

    #[tokio::test]
    async fn preview_only_for_write_like_tools() {
        let mut gw = gateway(&["n", "n"]);
        gw.evaluate(&write_request()).await;
        assert!(gw.console().output().contains("Content preview:"));

        gw.console_mut().clear_output();
        gw.evaluate(&ToolRequest::new("execute-shell", json!({"command": "echo", "content": "x"})))
            .await;
        assert!(!gw.console().output().contains("Content preview:"));
    }

    #[tokio::test]
    async fn multi_edit_banner_shows_replacement_preview() {
        let mut gw = gateway(&["n"]);
        let request = ToolRequest::new(
            "multi-edit-file",
            json!({"file_path": "src/lib.rs", "edits": [
                {"old_string": "old_name", "new_string": "new_name"},
                {"old_string": "x", "new_string": "y"}
            ]}),
        );
        gw.evaluate(&request).await;

        let output = gw.console().output();
        assert!(output.contains("Content preview:"));
        assert!(output.contains("│ new_name"));
    }

    #[tokio::test]
    async fn fast_path_notice_can_be_silenced() {
        let mut gw = gateway(&[]).with_fast_path_notice(false);
        gw.store_mut().record_allow_all();
        gw.evaluate(&write_request()).await;
        assert!(gw.console().output().is_empty());
    }

    #[tokio::test]
    async fn audit_records_each_decision() {
        let mut gw = gateway(&["i", "d"]);
        let shell = ToolRequest::new("execute-shell", json!({"command": "curl https://x"}));
        gw.evaluate(&shell).await;
        gw.evaluate(&shell).await;

        let audit = gw.audit().unwrap();
        assert_eq!(audit.count(), 2);
        let first = &audit.entries()[0];
        assert_eq!(
            first.event,
            AuditEvent::Prompted {
                answer: "deny_tool_forever".into(),
                info_requests: 1
            }
        );
        assert_eq!(first.risk_level, Some(RiskLevel::High));
        assert_eq!(audit.entries()[1].event, AuditEvent::FastPath { rule: "deny_tool".into() });
        assert_eq!(audit.entries_by_outcome(AuditOutcome::Denied).len(), 2);
    }

    #[tokio::test]
    async fn from_config_respects_audit_switch() {
        let mut config = AppConfig::default();
        config.audit.enabled = false;
        let gw = PermissionGateway::from_config(&config, ScriptedConsole::default());
        assert!(gw.audit().is_none());

        let gw = PermissionGateway::from_config(&AppConfig::default(), ScriptedConsole::default());
        assert!(gw.audit().is_some());
    }

    #[tokio::test]
    async fn works_through_the_handler_trait() {
        let mut handler: Box<dyn PermissionHandler> = Box::new(gateway(&["yes"]));
        assert!(handler.evaluate(&write_request()).await.is_allow());
    }

    #[tokio::test]
    async fn gateways_do_not_share_state() {
        let mut first = gateway(&["a"]);
        let mut second = gateway(&[]);
        first.evaluate(&write_request()).await;
        assert!(first.store().is_auto_allow_all());
        assert!(!second.store().is_auto_allow_all());
        assert!(!second.evaluate(&write_request()).await.is_allow());
    }
}
