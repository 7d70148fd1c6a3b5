//! Risk classifier — maps a tool request onto a [`RiskProfile`].
//!
//! Classification is deterministic and never fails. Missing or malformed
//! fields show up as `unknown ...` impacts and push the level towards
//! MEDIUM rather than raising an error.
//!
//! | Category            | Level                                                     |
//! |---------------------|-----------------------------------------------------------|
//! | write-file          | CRITICAL under a system prefix, MEDIUM overwrite, LOW new |
//! | edit / multi-edit   | MEDIUM                                                    |
//! | execute-shell       | max over matched families (CRITICAL / HIGH), else MEDIUM  |
//! | read-file           | HIGH on a sensitive keyword, else LOW                     |
//! | list / search       | LOW                                                       |
//! | fetch-web-resource  | MEDIUM                                                    |
//! | track-tasks         | LOW                                                       |
//! | external            | HIGH                                                      |
//! | unknown             | MEDIUM                                                    |

use regex_lite::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;
use toolgate_config::PermissionConfig;
use toolgate_core::{RiskLevel, RiskProfile, ToolCategory, ToolRequest};
use tracing::{debug, warn};

use crate::preview::truncate_chars;
use crate::target::{expand_tilde, extract_host, matching_system_prefix};

/// Find/replace text longer than this is cut in the impact list.
const EDIT_SNIPPET_CHARS: usize = 60;

/// Shell commands longer than this are cut in the impact list.
const COMMAND_SNIPPET_CHARS: usize = 200;

// Command words match anywhere in the text, bounded by anything other than a
// word character or `-`. Newlines, quotes, `/bin/` prefixes and env
// assignments all count as boundaries.
static DESTRUCTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[^\w-])(?:rm|rmdir|chmod|chown|chgrp|mkfs(?:\.[a-z0-9]+)?|dd|format|shred|fdisk|wipefs)(?:[^\w-]|$)|\s-delete\b|>\s*/dev/(?:sd|hd|nvme|disk)",
    )
    .expect("destructive shell pattern is valid")
});

static NETWORK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[^\w-])(?:curl|wget|ssh|scp|sftp|rsync|nc|ncat|netcat|telnet|ftp|ping)(?:[^\w-]|$)|\bgit\s+(?:clone|fetch|pull|push)\b|\bhttps?://",
    )
    .expect("network shell pattern is valid")
});

static PACKAGE_INSTALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:npm|pnpm|yarn|pip3?|cargo|apt|apt-get|brew|gem|go|dnf|yum)\s+(?:install|add|i)\b",
    )
    .expect("package shell pattern is valid")
});

/// Decides whether an unrecognised tool name comes from an external
/// integration (and therefore deserves HIGH scrutiny).
pub trait ExternalToolMatcher: Send + Sync {
    fn is_external(&self, tool_name: &str) -> bool;
}

impl<F> ExternalToolMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_external(&self, tool_name: &str) -> bool {
        self(tool_name)
    }
}

/// Matches tool names by namespace prefix (e.g. `mcp__`).
#[derive(Debug, Clone, Default)]
pub struct PrefixMatcher {
    prefixes: Vec<String>,
}

impl PrefixMatcher {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }
}

impl ExternalToolMatcher for PrefixMatcher {
    fn is_external(&self, tool_name: &str) -> bool {
        self.prefixes.iter().any(|p| tool_name.starts_with(p.as_str()))
    }
}

/// Stateless classifier configured once from [`PermissionConfig`].
pub struct RiskClassifier {
    system_path_prefixes: Vec<String>,
    sensitive_keywords: Vec<String>,
    external: Box<dyn ExternalToolMatcher>,
}

impl std::fmt::Debug for RiskClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskClassifier")
            .field("system_path_prefixes", &self.system_path_prefixes)
            .field("sensitive_keywords", &self.sensitive_keywords)
            .finish_non_exhaustive()
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(&PermissionConfig::default())
    }
}

impl RiskClassifier {
    pub fn new(config: &PermissionConfig) -> Self {
        Self {
            system_path_prefixes: config.system_path_prefixes.clone(),
            sensitive_keywords: config
                .sensitive_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            external: Box::new(PrefixMatcher::new(config.external_tool_prefixes.clone())),
        }
    }

    /// Replace the external-tool predicate.
    pub fn with_external_matcher(mut self, matcher: impl ExternalToolMatcher + 'static) -> Self {
        self.external = Box::new(matcher);
        self
    }

    /// Resolve a tool name to its capability category.
    pub fn categorize(&self, tool_name: &str) -> ToolCategory {
        ToolCategory::from_builtin_name(tool_name).unwrap_or_else(|| {
            if self.external.is_external(tool_name) {
                ToolCategory::External
            } else {
                ToolCategory::Unknown
            }
        })
    }

    /// Classify a request. Never fails.
    pub fn classify(&self, request: &ToolRequest) -> RiskProfile {
        let category = self.categorize(&request.name);

        let assessment = match category {
            ToolCategory::WriteFile => self.assess_write(request),
            ToolCategory::EditFile => assess_edit(request),
            ToolCategory::MultiEditFile => assess_multi_edit(request),
            ToolCategory::ExecuteShell => assess_shell(request),
            ToolCategory::ReadFile => self.assess_read(request),
            ToolCategory::ListDirectory => assess_list(request),
            ToolCategory::SearchContent => assess_search(request),
            ToolCategory::FetchWebResource => assess_fetch(request),
            ToolCategory::TrackTasks => assess_tasks(request),
            ToolCategory::External => assess_external(request),
            ToolCategory::Unknown => assess_unknown(request),
        };

        debug!(
            tool = %request.name,
            category = ?category,
            risk = %assessment.risk_level,
            "Classified tool request"
        );

        RiskProfile {
            tool_name: request.name.clone(),
            category,
            explanation: assessment.explanation,
            risk_level: assessment.risk_level,
            impacts: assessment.impacts,
            recommendations: assessment.recommendations,
        }
    }

    fn assess_write(&self, request: &ToolRequest) -> Assessment {
        let content = request.str_param("content");
        let size_line = match content {
            Some(c) => format!("Content size: {} bytes ({} lines)", c.len(), c.lines().count()),
            None => "Content size: unknown content".to_string(),
        };

        let Some(path) = path_param(request) else {
            warn!(tool = %request.name, "Write request without a path");
            return Assessment {
                explanation: "Write a file at an unknown location".into(),
                risk_level: RiskLevel::Medium,
                impacts: vec!["Target: unknown path".into(), size_line],
                recommendations: vec!["Deny and ask the agent to name the target file".into()],
            };
        };

        let directory = Path::new(path)
            .parent()
            .map(|p| p.display().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".into());
        let system_prefix = matching_system_prefix(path, &self.system_path_prefixes);
        let exists = Path::new(&expand_tilde(path)).exists();

        let mut impacts = vec![
            format!("Target: {path}"),
            size_line,
            if exists {
                "Operation: overwrites an existing file".into()
            } else {
                "Operation: creates a new file".into()
            },
            format!("Directory: {directory}"),
        ];

        let (risk_level, recommendations) = if let Some(prefix) = system_prefix {
            impacts.push(format!("⚠️ Writes inside system directory {prefix}"));
            (
                RiskLevel::Critical,
                vec![
                    "Deny unless you deliberately want to change system files".into(),
                    "A bad write here can break the operating system".into(),
                ],
            )
        } else if exists {
            (
                RiskLevel::Medium,
                vec![
                    "Make sure the current file is backed up or under version control".into(),
                    "Review the preview; the old content will be replaced".into(),
                ],
            )
        } else {
            (
                RiskLevel::Low,
                vec!["Review the preview before allowing".into()],
            )
        };

        Assessment {
            explanation: if exists {
                format!("Overwrite {path}")
            } else {
                format!("Create {path}")
            },
            risk_level,
            impacts,
            recommendations,
        }
    }

    fn assess_read(&self, request: &ToolRequest) -> Assessment {
        let Some(path) = path_param(request) else {
            return Assessment {
                explanation: "Read a file at an unknown location".into(),
                risk_level: RiskLevel::Medium,
                impacts: vec!["File: unknown path".into()],
                recommendations: vec!["Deny and ask the agent to name the file".into()],
            };
        };

        let lower = path.to_lowercase();
        let keyword = self
            .sensitive_keywords
            .iter()
            .find(|k| lower.contains(k.as_str()));

        let mut impacts = vec![format!("File: {path}")];
        if let Some(range) = line_range(request) {
            impacts.push(range);
        }

        match keyword {
            Some(keyword) => {
                impacts.push(format!("⚠️ Path suggests sensitive data ('{keyword}')"));
                Assessment {
                    explanation: format!("Read possibly sensitive file {path}"),
                    risk_level: RiskLevel::High,
                    impacts,
                    recommendations: vec![
                        "File contents will be sent to the model provider".into(),
                        "Deny if the file holds credentials or secrets".into(),
                    ],
                }
            }
            None => Assessment {
                explanation: format!("Read {path}"),
                risk_level: RiskLevel::Low,
                impacts,
                recommendations: vec!["Read-only; generally safe".into()],
            },
        }
    }
}

/// Intermediate result before it is wrapped into a [`RiskProfile`].
struct Assessment {
    explanation: String,
    risk_level: RiskLevel,
    impacts: Vec<String>,
    recommendations: Vec<String>,
}

fn path_param(request: &ToolRequest) -> Option<&str> {
    request
        .str_param("path")
        .or_else(|| request.str_param("file_path"))
        .filter(|p| !p.trim().is_empty())
}

fn quoted_snippet(text: Option<&str>) -> String {
    match text {
        Some(t) => format!("\"{}\"", truncate_chars(t, EDIT_SNIPPET_CHARS)),
        None => "unknown text".into(),
    }
}

fn line_range(request: &ToolRequest) -> Option<String> {
    let offset = request.parameters.get("offset").and_then(Value::as_u64);
    let limit = request.parameters.get("limit").and_then(Value::as_u64);
    match (offset, limit) {
        (None, None) => None,
        (offset, limit) => Some(format!(
            "Range: from line {} ({})",
            offset.unwrap_or(1),
            limit.map_or_else(|| "to end".to_string(), |l| format!("{l} lines"))
        )),
    }
}

fn assess_edit(request: &ToolRequest) -> Assessment {
    let path = path_param(request).unwrap_or("unknown path");
    let mut impacts = vec![
        format!("File: {path}"),
        format!("Find: {}", quoted_snippet(request.str_param("old_string"))),
        format!("Replace with: {}", quoted_snippet(request.str_param("new_string"))),
    ];
    if request.parameters.get("replace_all").and_then(Value::as_bool) == Some(true) {
        impacts.push("Replaces every occurrence".into());
    }

    Assessment {
        explanation: format!("Edit {path}"),
        risk_level: RiskLevel::Medium,
        impacts,
        recommendations: vec!["Check that the replacement matches your intent".into()],
    }
}

fn assess_multi_edit(request: &ToolRequest) -> Assessment {
    let path = path_param(request).unwrap_or("unknown path");
    let edits = request.parameters.get("edits").and_then(Value::as_array);

    let mut impacts = vec![format!("File: {path}")];
    match edits {
        Some(edits) => {
            impacts.push(format!("Edits: {}", edits.len()));
            if let Some(first) = edits.first() {
                impacts.push(format!(
                    "First find: {}",
                    quoted_snippet(first.get("old_string").and_then(Value::as_str))
                ));
                impacts.push(format!(
                    "First replace with: {}",
                    quoted_snippet(first.get("new_string").and_then(Value::as_str))
                ));
            }
        }
        None => impacts.push("Edits: unknown edit list".into()),
    }

    Assessment {
        explanation: format!("Apply several edits to {path}"),
        risk_level: RiskLevel::Medium,
        impacts,
        recommendations: vec!["Check each replacement; edits apply in order".into()],
    }
}

fn assess_shell(request: &ToolRequest) -> Assessment {
    let Some(command) = request.str_param("command").filter(|c| !c.trim().is_empty()) else {
        return Assessment {
            explanation: "Run an unknown shell command".into(),
            risk_level: RiskLevel::Medium,
            impacts: vec!["Command: unknown command".into()],
            recommendations: vec!["Deny and ask the agent for the exact command".into()],
        };
    };

    let mut impacts = vec![format!("Command: {}", truncate_chars(command, COMMAND_SNIPPET_CHARS))];
    if let Some(description) = request.str_param("description") {
        impacts.push(format!("Purpose: {description}"));
    }

    let mut risk_level = RiskLevel::Medium;
    let mut recommendations = Vec::new();

    if DESTRUCTIVE.is_match(command) {
        impacts.push("⚠️ Destructive: may delete files, change permissions, or format storage".into());
        recommendations.push("Verify exactly which paths are affected; this cannot be undone".into());
        risk_level = risk_level.max(RiskLevel::Critical);
    }
    if NETWORK.is_match(command) {
        impacts.push("🌐 Network: contacts remote hosts".into());
        recommendations.push("Confirm the remote host is trusted".into());
        risk_level = risk_level.max(RiskLevel::High);
    }
    if PACKAGE_INSTALL.is_match(command) {
        impacts.push("📦 Package install: downloads and may run third-party code".into());
        recommendations.push("Confirm the package names are spelled correctly".into());
        risk_level = risk_level.max(RiskLevel::High);
    }

    if recommendations.is_empty() {
        impacts.push("Runs an arbitrary command in the working directory".into());
        recommendations.push("Read the full command before allowing".into());
    }

    Assessment {
        explanation: "Run a shell command".into(),
        risk_level,
        impacts,
        recommendations,
    }
}

fn assess_list(request: &ToolRequest) -> Assessment {
    let target = path_param(request)
        .or_else(|| request.str_param("pattern"))
        .unwrap_or("current directory");
    Assessment {
        explanation: format!("List {target}"),
        risk_level: RiskLevel::Low,
        impacts: vec![format!("Target: {target}")],
        recommendations: vec!["Read-only; generally safe".into()],
    }
}

fn assess_search(request: &ToolRequest) -> Assessment {
    let pattern = request.str_param("pattern").unwrap_or("unknown pattern");
    let scope = path_param(request).unwrap_or("current directory");
    Assessment {
        explanation: format!("Search for \"{}\"", truncate_chars(pattern, EDIT_SNIPPET_CHARS)),
        risk_level: RiskLevel::Low,
        impacts: vec![
            format!("Pattern: {}", truncate_chars(pattern, EDIT_SNIPPET_CHARS)),
            format!("Scope: {scope}"),
        ],
        recommendations: vec!["Read-only; generally safe".into()],
    }
}

fn assess_fetch(request: &ToolRequest) -> Assessment {
    let url = request.str_param("url");
    let host = url.and_then(extract_host);

    let mut impacts = vec![
        format!("URL: {}", url.unwrap_or("unknown url")),
        format!("Domain: {}", host.as_deref().unwrap_or("unknown host")),
    ];
    if let Some(prompt) = request.str_param("prompt") {
        impacts.push(format!("Purpose: {}", truncate_chars(prompt, EDIT_SNIPPET_CHARS)));
    }

    Assessment {
        explanation: format!("Fetch a web resource from {}", host.as_deref().unwrap_or("an unknown host")),
        risk_level: RiskLevel::Medium,
        impacts,
        recommendations: vec![
            "Confirm the domain is expected".into(),
            "Fetched content can carry instructions aimed at the agent".into(),
        ],
    }
}

fn assess_tasks(request: &ToolRequest) -> Assessment {
    let count = request
        .parameters
        .get("todos")
        .and_then(Value::as_array)
        .map(Vec::len);
    Assessment {
        explanation: "Update the session task list".into(),
        risk_level: RiskLevel::Low,
        impacts: vec![match count {
            Some(n) => format!("Tasks: {n} item(s), kept in memory only"),
            None => "Tasks: unknown task list, kept in memory only".into(),
        }],
        recommendations: vec!["No side effects outside this session".into()],
    }
}

fn assess_external(request: &ToolRequest) -> Assessment {
    let mut impacts = Vec::new();
    // mcp__<server>__<tool>
    let mut segments = request.name.split("__").filter(|s| !s.is_empty());
    if let (Some(_), Some(server), Some(_)) = (segments.next(), segments.next(), segments.next()) {
        impacts.push(format!("Integration: {server}"));
    }
    impacts.push("⚠️ Provided by an external integration".into());
    impacts.push("⚠️ Capabilities and side effects are unknown".into());
    impacts.push(format!(
        "⚠️ {} parameter(s) will be sent to a third party",
        request.parameters.len()
    ));

    Assessment {
        explanation: format!("Call external tool {}", request.name),
        risk_level: RiskLevel::High,
        impacts,
        recommendations: vec![
            "Only allow integrations you installed and trust".into(),
            "Check the parameters for data you would not share".into(),
        ],
    }
}

fn assess_unknown(request: &ToolRequest) -> Assessment {
    Assessment {
        explanation: format!("Run unrecognised tool {}", request.name),
        risk_level: RiskLevel::Medium,
        impacts: vec![
            "Unrecognised tool; its behaviour cannot be assessed".into(),
            format!("Parameters: {} field(s)", request.parameters.len()),
        ],
        recommendations: vec!["Review the raw parameters below".into()],
    }
}
