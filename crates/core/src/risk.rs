//! Risk model — severity levels, capability categories, and risk profiles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a tool request, ordered from least to most dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Short marker used in the operator banner.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Medium => "🟡",
            Self::High => "🟠",
            Self::Critical => "🔴",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// The closed set of capability categories a tool name can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    WriteFile,
    EditFile,
    MultiEditFile,
    ExecuteShell,
    ReadFile,
    ListDirectory,
    SearchContent,
    FetchWebResource,
    TrackTasks,
    /// Supplied by a pluggable external integration.
    External,
    /// Not recognised at all.
    Unknown,
}

impl ToolCategory {
    /// Look up a built-in category by tool name.
    ///
    /// Returns `None` for names outside the known set; the caller decides
    /// between [`ToolCategory::External`] and [`ToolCategory::Unknown`].
    pub fn from_builtin_name(name: &str) -> Option<Self> {
        let category = match name {
            "write-file" | "Write" | "file_write" => Self::WriteFile,
            "edit-file" | "Edit" | "file_edit" => Self::EditFile,
            "multi-edit-file" | "MultiEdit" => Self::MultiEditFile,
            "execute-shell" | "Bash" | "shell" => Self::ExecuteShell,
            "read-file" | "Read" | "file_read" => Self::ReadFile,
            "list-directory" | "LS" | "Glob" => Self::ListDirectory,
            "search-content" | "Grep" => Self::SearchContent,
            "fetch-web-resource" | "WebFetch" | "web_fetch" | "http_request" => {
                Self::FetchWebResource
            }
            "track-tasks" | "TodoWrite" => Self::TrackTasks,
            _ => return None,
        };
        Some(category)
    }

    /// Whether requests in this category carry file content worth previewing.
    pub fn has_content_preview(self) -> bool {
        matches!(self, Self::WriteFile | Self::EditFile | Self::MultiEditFile)
    }
}

/// The result of classifying one request. Built fresh per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub tool_name: String,
    pub category: ToolCategory,
    /// One-line summary of what the tool is about to do
    pub explanation: String,
    pub risk_level: RiskLevel,
    pub impacts: Vec<String>,
    pub recommendations: Vec<String>,
}
