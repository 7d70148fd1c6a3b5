//! Decision prompt — renders a risk banner and collects one operator answer.
//!
//! ```text
//!   ┌─────────┐  banner   ┌─────────────┐  y/a/d/n/other/EOF  ┌──────────┐
//!   │ Present │──────────▶│ AwaitInput  │────────────────────▶│ Resolved │
//!   └─────────┘           └─────────────┘                     └──────────┘
//!        ▲                      │ i
//!        └──────────────────────┘
//! ```
//!
//! The `i` loop is a plain state transition, so an operator can ask for more
//! information any number of times without growing the stack. Anything that
//! is not a recognised answer resolves to a one-time deny.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;
use toolgate_core::{Console, RiskLevel, RiskProfile};
use tracing::{debug, warn};

use crate::preview::ContentPreview;

/// How a prompt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptOutcome {
    AllowOnce,
    AllowAll,
    DenyToolForever,
    DenyOnce,
}

impl PromptOutcome {
    pub fn is_allow(self) -> bool {
        matches!(self, Self::AllowOnce | Self::AllowAll)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Present,
    AwaitInput,
    Resolved(PromptOutcome),
}

/// A parsed operator answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Decide(PromptOutcome),
    MoreInfo,
}

/// Normalise and interpret one line of operator input.
pub fn parse_answer(line: &str) -> Answer {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Answer::Decide(PromptOutcome::AllowOnce),
        "a" => Answer::Decide(PromptOutcome::AllowAll),
        "d" => Answer::Decide(PromptOutcome::DenyToolForever),
        "i" => Answer::MoreInfo,
        _ => Answer::Decide(PromptOutcome::DenyOnce),
    }
}

/// One prompt for one request.
pub struct DecisionPrompt<'a> {
    profile: &'a RiskProfile,
    preview: Option<&'a ContentPreview>,
    parameters: &'a Map<String, Value>,
    state: PromptState,
    info_requests: usize,
}

impl<'a> DecisionPrompt<'a> {
    pub fn new(
        profile: &'a RiskProfile,
        preview: Option<&'a ContentPreview>,
        parameters: &'a Map<String, Value>,
    ) -> Self {
        Self {
            profile,
            preview,
            parameters,
            state: PromptState::Present,
            info_requests: 0,
        }
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    /// How many times the operator asked for more information.
    pub fn info_requests(&self) -> usize {
        self.info_requests
    }

    /// Drive the machine until it resolves.
    pub async fn run<C: Console + ?Sized>(&mut self, console: &mut C) -> PromptOutcome {
        loop {
            self.state = match self.state {
                PromptState::Present => match console.write(&self.banner()) {
                    Ok(()) => PromptState::AwaitInput,
                    Err(e) => {
                        warn!(tool = %self.profile.tool_name, error = %e, "Could not show permission prompt, denying");
                        PromptState::Resolved(PromptOutcome::DenyOnce)
                    }
                },
                PromptState::AwaitInput => match console.read_line().await {
                    Ok(Some(line)) => match parse_answer(&line) {
                        Answer::Decide(outcome) => PromptState::Resolved(outcome),
                        Answer::MoreInfo => {
                            self.info_requests += 1;
                            debug!(tool = %self.profile.tool_name, "Operator asked for more information");
                            match console.write(&self.info_text()) {
                                Ok(()) => PromptState::Present,
                                Err(e) => {
                                    warn!(error = %e, "Could not show information, denying");
                                    PromptState::Resolved(PromptOutcome::DenyOnce)
                                }
                            }
                        }
                    },
                    Ok(None) => {
                        warn!(tool = %self.profile.tool_name, "Operator input closed, denying");
                        PromptState::Resolved(PromptOutcome::DenyOnce)
                    }
                    Err(e) => {
                        warn!(tool = %self.profile.tool_name, error = %e, "Failed to read operator input, denying");
                        PromptState::Resolved(PromptOutcome::DenyOnce)
                    }
                },
                PromptState::Resolved(outcome) => return outcome,
            };
        }
    }

    /// The fixed-layout risk banner followed by the prompt line.
    pub fn banner(&self) -> String {
        let p = self.profile;
        let mut out = String::new();

        let _ = writeln!(out);
        let _ = writeln!(out, "{} {} RISK · {}", p.risk_level.icon(), p.risk_level, p.tool_name);
        let _ = writeln!(out, "{}", "─".repeat(48));
        let _ = writeln!(out, "{}", p.explanation);

        if !p.impacts.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Impacts:");
            for impact in &p.impacts {
                let _ = writeln!(out, "  • {impact}");
            }
        }

        if !p.recommendations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Recommendations:");
            for rec in &p.recommendations {
                let _ = writeln!(out, "  • {rec}");
            }
        }

        if let Some(preview) = self.preview.filter(|p| !p.is_empty()) {
            let _ = writeln!(out);
            let _ = writeln!(out, "Content preview:");
            for (i, line) in preview.lines.iter().enumerate() {
                let _ = writeln!(out, "  {:>3} │ {line}", i + 1);
            }
            if preview.remaining_count > 0 {
                let _ = writeln!(out, "      … {} more line(s)", preview.remaining_count);
            }
        }

        let params = serde_json::to_string_pretty(self.parameters)
            .unwrap_or_else(|_| "<unprintable parameters>".into());
        let _ = writeln!(out);
        let _ = writeln!(out, "Parameters:");
        for line in params.lines() {
            let _ = writeln!(out, "  {line}");
        }

        let _ = writeln!(out);
        let _ = write!(
            out,
            "Allow? [y]es once · [n]o · [a]llow all · [d]eny tool forever · [i]nfo: "
        );
        out
    }

    fn info_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "About this request ({}):", self.profile.tool_name);
        let _ = writeln!(
            out,
            "  Risk {} means: {}",
            self.profile.risk_level,
            match self.profile.risk_level {
                RiskLevel::Low => "read-only or easily undone",
                RiskLevel::Medium => "changes local state; usually recoverable",
                RiskLevel::High => "touches the network, secrets, or third-party code",
                RiskLevel::Critical => "may cause irreversible or system-wide damage",
            }
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Answers:");
        let _ = writeln!(out, "  y  allow this request only");
        let _ = writeln!(out, "  n  deny this request only (also any unrecognised answer)");
        let _ = writeln!(out, "  a  allow this and every later request until exit");
        let _ = writeln!(out, "  d  deny '{}' for the rest of this session", self.profile.tool_name);
        let _ = writeln!(out, "  i  show this help and the request again");
        let _ = writeln!(out);
        let _ = writeln!(out, "Remembered answers are forgotten when the process exits.");
        out
    }
}
