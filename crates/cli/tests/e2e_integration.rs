//! End-to-end tests for the Toolgate permission pipeline.
//!
//! These drive a `PermissionGateway` with a scripted operator console and
//! check the decisions returned to the agent runtime, along with what was
//! remembered between requests.

use serde_json::{Value, json};

use toolgate_config::AppConfig;
use toolgate_core::{PermissionDecision, PermissionHandler, RiskLevel, ToolRequest};
use toolgate_permissions::{
    AuditOutcome, ONE_TIME_DENIAL, PermissionGateway, PermissionStateStore, RiskClassifier,
    ScriptedConsole, permanent_denial,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn gateway(answers: &[&str]) -> PermissionGateway<ScriptedConsole> {
    PermissionGateway::new(ScriptedConsole::new(answers.iter().copied()))
}

fn write_request(path: &str, content: &str) -> ToolRequest {
    ToolRequest::new("write-file", json!({"path": path, "content": content}))
}

fn params(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("test parameters are objects"),
    }
}

fn risk(name: &str, parameters: Value) -> RiskLevel {
    RiskClassifier::default()
        .classify(&ToolRequest::new(name, parameters))
        .risk_level
}

// ── Operator scenarios ──────────────────────────────────────────────────

#[tokio::test]
async fn scenario_allow_once() {
    let mut gate = gateway(&["y"]);
    let decision = gate.evaluate(&write_request("/tmp/a.txt", "hello")).await;

    assert_eq!(
        decision,
        PermissionDecision::allow(params(json!({"path": "/tmp/a.txt", "content": "hello"})))
    );
    // allow-once leaves nothing behind
    assert!(gate.store().fast_path_decision("write-file").is_none());
    assert!(gate.console().output().contains("hello"));
}

#[tokio::test]
async fn scenario_deny_once() {
    let mut gate = gateway(&["n"]);
    let decision = gate.evaluate(&write_request("/tmp/a.txt", "hello")).await;

    assert_eq!(decision, PermissionDecision::deny(ONE_TIME_DENIAL));
    assert!(gate.store().fast_path_decision("write-file").is_none());
}

#[tokio::test]
async fn scenario_allow_all_then_fast_path() {
    let mut gate = gateway(&["a"]);
    let first = gate
        .evaluate(&ToolRequest::new("execute-shell", json!({"command": "ls"})))
        .await;
    assert!(first.is_allow());

    let second = gate
        .evaluate(&ToolRequest::new("fetch-web-resource", json!({"url": "https://example.com"})))
        .await;
    assert!(second.is_allow());
    assert_eq!(gate.console().reads(), 1);
}

#[tokio::test]
async fn scenario_info_then_allow() {
    let mut gate = gateway(&["i", "y"]);
    let request = write_request("/tmp/a.txt", "hello");

    let decision = gate.evaluate(&request).await;

    assert_eq!(decision, PermissionDecision::allow(request.parameters.clone()));
    assert_eq!(gate.console().reads(), 2);
    assert_eq!(gate.store().snapshot(), PermissionStateStore::new().snapshot());

    // the banner was shown twice for the same request
    let output = gate.console().output();
    assert_eq!(output.matches("RISK · write-file").count(), 2);
}

#[tokio::test]
async fn unrecognised_and_empty_answers_deny() {
    for answer in ["", "maybe", "  ", "no thanks"] {
        let mut gate = gateway(&[answer]);
        let decision = gate.evaluate(&write_request("/tmp/a.txt", "x")).await;
        assert_eq!(decision.reason(), Some(ONE_TIME_DENIAL), "answer {answer:?}");
    }
}

#[tokio::test]
async fn answers_are_case_insensitive_and_trimmed() {
    let mut gate = gateway(&["  YES ", "D"]);
    assert!(gate.evaluate(&write_request("/tmp/a.txt", "x")).await.is_allow());
    let denied = gate
        .evaluate(&ToolRequest::new("Bash", json!({"command": "ls"})))
        .await;
    assert_eq!(denied.reason(), Some(permanent_denial("Bash").as_str()));
}

#[tokio::test]
async fn closed_input_denies() {
    let mut gate = gateway(&[]);
    let decision = gate.evaluate(&write_request("/tmp/a.txt", "x")).await;
    assert!(!decision.is_allow());
}

// ── Remembered decisions ────────────────────────────────────────────────

#[tokio::test]
async fn auto_allow_all_skips_the_prompt_for_every_request() {
    let mut gate = gateway(&[]);
    gate.store_mut().record_allow_all();

    let requests = [
        write_request("/etc/passwd", "root::0:0"),
        ToolRequest::new("execute-shell", json!({"command": "rm -rf /"})),
        ToolRequest::new("mcp__github__create_issue", json!({"title": "x"})),
    ];
    for request in &requests {
        let decision = gate.evaluate(request).await;
        assert_eq!(decision, PermissionDecision::allow(request.parameters.clone()));
    }
    assert_eq!(gate.console().reads(), 0);
}

#[tokio::test]
async fn always_denied_tool_skips_the_prompt() {
    let mut gate = gateway(&[]);
    gate.store_mut().record_deny_forever("execute-shell");

    for command in ["ls", "echo hi", "pwd"] {
        let decision = gate
            .evaluate(&ToolRequest::new("execute-shell", json!({"command": command})))
            .await;
        assert_eq!(decision.reason(), Some(permanent_denial("execute-shell").as_str()));
    }
    assert_eq!(gate.console().reads(), 0);
}

#[tokio::test]
async fn deny_forever_takes_effect_on_the_next_request() {
    let mut gate = gateway(&["i", "d", "y"]);
    let shell = ToolRequest::new("execute-shell", json!({"command": "ls"}));

    assert!(!gate.evaluate(&shell).await.is_allow());
    assert!(!gate.evaluate(&shell).await.is_allow());
    // other tools still prompt
    assert!(gate.evaluate(&write_request("/tmp/b.txt", "x")).await.is_allow());
    assert_eq!(gate.console().reads(), 3);
}

#[test]
fn allow_then_deny_forever_is_mutually_exclusive() {
    let mut store = PermissionStateStore::new();
    store.record_allow_forever("Write");
    store.record_deny_forever("Write");

    let state = store.snapshot();
    assert!(!state.always_allow.contains("Write"));
    assert!(state.always_deny.contains("Write"));
}

#[tokio::test]
async fn gateways_do_not_share_state() {
    let mut first = gateway(&["a"]);
    let mut second = gateway(&[]);

    first.evaluate(&write_request("/tmp/a.txt", "x")).await;
    let decision = second.evaluate(&write_request("/tmp/a.txt", "x")).await;

    assert!(first.store().is_auto_allow_all());
    assert!(!decision.is_allow());
}

// ── Classification ──────────────────────────────────────────────────────

#[test]
fn write_into_system_directory_is_critical() {
    assert_eq!(
        risk("write-file", json!({"path": "/etc/passwd", "content": "x"})),
        RiskLevel::Critical
    );
}

#[test]
fn write_new_file_is_low_and_overwrite_is_medium() {
    let dir = tempfile::tempdir().unwrap();
    let new_path = dir.path().join("new.txt");
    let existing = dir.path().join("existing.txt");
    std::fs::write(&existing, "old").unwrap();

    assert_eq!(
        risk("write-file", json!({"path": new_path.to_str().unwrap(), "content": "x"})),
        RiskLevel::Low
    );
    assert_eq!(
        risk("write-file", json!({"path": existing.to_str().unwrap(), "content": "x"})),
        RiskLevel::Medium
    );
}

#[test]
fn shell_commands_by_family() {
    assert_eq!(risk("execute-shell", json!({"command": "rm -rf /"})), RiskLevel::Critical);
    assert_eq!(
        risk("execute-shell", json!({"command": "curl https://example.com"})),
        RiskLevel::High
    );
    assert_eq!(risk("execute-shell", json!({"command": "ls -la"})), RiskLevel::Medium);
}

#[test]
fn reads_of_sensitive_names_are_high() {
    assert_eq!(
        risk("read-file", json!({"path": "/home/user/secret.env"})),
        RiskLevel::High
    );
    assert_eq!(
        risk("read-file", json!({"path": "/home/user/notes.txt"})),
        RiskLevel::Low
    );
}

#[test]
fn external_and_unknown_tools() {
    assert_eq!(risk("mcp__slack__post", json!({"text": "hi"})), RiskLevel::High);
    assert_eq!(risk("frobnicate", json!({})), RiskLevel::Medium);
}

// ── Configuration and handler seam ──────────────────────────────────────

#[tokio::test]
async fn configured_gateway_audits_through_the_handler_trait() {
    let mut config = AppConfig::default();
    config.permissions.external_tool_prefixes = vec!["ext_".into()];
    config.permissions.show_fast_path_notice = false;

    let mut gate = PermissionGateway::from_config(&config, ScriptedConsole::new(["d"]));
    {
        let handler: &mut dyn PermissionHandler = &mut gate;
        let request = ToolRequest::new("ext_deploy", json!({"env": "prod"}));
        assert!(!handler.evaluate(&request).await.is_allow());
        assert!(!handler.evaluate(&request).await.is_allow());
    }

    let audit = gate.audit().unwrap();
    assert_eq!(audit.count(), 2);
    assert_eq!(audit.entries_by_outcome(AuditOutcome::Denied).len(), 2);
    assert_eq!(audit.entries()[0].risk_level, Some(RiskLevel::High));
    assert!(!gate.console().output().contains("denied (remembered)"));
}
