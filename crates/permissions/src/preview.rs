//! Content preview — the first few lines a write or edit would put on disk.

use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use toolgate_config::{MAX_PREVIEW_LINES, PermissionConfig};

/// Parameter keys that carry file content, in lookup order.
const CONTENT_KEYS: [&str; 2] = ["content", "new_string"];

/// A bounded view of textual content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentPreview {
    pub lines: Vec<String>,
    /// Lines not shown
    pub remaining_count: usize,
}

impl ContentPreview {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.remaining_count == 0
    }
}

#[derive(Debug, Clone)]
pub struct ContentPreviewer {
    max_lines: usize,
    max_line_chars: usize,
}

impl Default for ContentPreviewer {
    fn default() -> Self {
        Self::new(&PermissionConfig::default())
    }
}

impl ContentPreviewer {
    pub fn new(config: &PermissionConfig) -> Self {
        Self {
            max_lines: config.preview_lines.clamp(1, MAX_PREVIEW_LINES),
            max_line_chars: config.preview_line_width,
        }
    }

    /// Build a preview from request parameters.
    ///
    /// No textual content field means an empty preview. A multi-edit payload
    /// previews the replacement text of every edit, in order.
    pub fn preview(&self, parameters: &Map<String, Value>) -> ContentPreview {
        let Some(content) = content_of(parameters) else {
            return ContentPreview::default();
        };

        let total = content.lines().count();
        let lines = content
            .lines()
            .take(self.max_lines)
            .map(|line| truncate_chars(line, self.max_line_chars))
            .collect::<Vec<_>>();

        ContentPreview {
            remaining_count: total - lines.len(),
            lines,
        }
    }
}

fn content_of(parameters: &Map<String, Value>) -> Option<Cow<'_, str>> {
    if let Some(text) = CONTENT_KEYS
        .iter()
        .find_map(|key| parameters.get(*key).and_then(Value::as_str))
    {
        return Some(Cow::Borrowed(text));
    }

    let replacements = parameters
        .get("edits")?
        .as_array()?
        .iter()
        .filter_map(|edit| edit.get("new_string").and_then(Value::as_str))
        .collect::<Vec<_>>();
    (!replacements.is_empty()).then(|| Cow::Owned(replacements.join("\n")))
}

/// Cut `text` to at most `max` characters, appending `...` when cut.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
