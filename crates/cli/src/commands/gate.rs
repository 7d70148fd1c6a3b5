//! `toolgate gate` — Run a JSON-lines file of tool requests through the
//! interactive permission gate.
//!
//! Each request is shown to the operator on stdout and answered on stdin.
//! Remembered decisions carry across lines for the duration of the run.

use serde::Serialize;
use std::path::Path;
use toolgate_config::AppConfig;
use toolgate_core::{Console, PermissionDecision, ToolRequest};
use toolgate_permissions::{PermissionGateway, StdioConsole};

/// Decision for one input line.
#[derive(Debug, Serialize)]
pub struct GateResult {
    pub line: usize,
    pub tool_name: Option<String>,
    #[serde(flatten)]
    pub decision: PermissionDecision,
}

pub async fn run(requests: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let text = std::fs::read_to_string(requests)
        .map_err(|e| format!("Failed to read {}: {e}", requests.display()))?;

    let mut gateway = PermissionGateway::from_config(&config, StdioConsole::new());
    let results = gate_lines(&mut gateway, &text).await;

    let allowed = results.iter().filter(|r| r.decision.is_allow()).count();
    for result in &results {
        println!("{}", serde_json::to_string(result)?);
    }
    eprintln!(
        "{} request(s): {allowed} allowed, {} denied",
        results.len(),
        results.len() - allowed
    );
    Ok(())
}

/// Evaluate every request line in order.
///
/// Blank lines and `#` comments are skipped. A line that does not parse as a
/// request is denied without prompting.
pub async fn gate_lines<C: Console>(
    gateway: &mut PermissionGateway<C>,
    text: &str,
) -> Vec<GateResult> {
    let mut results = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let result = match ToolRequest::from_json(line) {
            Ok(request) => GateResult {
                line: idx + 1,
                tool_name: Some(request.name.clone()),
                decision: gateway.evaluate(&request).await,
            },
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "Skipping malformed request");
                GateResult {
                    line: idx + 1,
                    tool_name: None,
                    decision: PermissionDecision::deny(format!("Malformed request: {e}")),
                }
            }
        };
        results.push(result);
    }

    results
}
