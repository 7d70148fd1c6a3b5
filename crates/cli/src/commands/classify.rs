//! `toolgate classify` — Print the risk profile of a single request.
//!
//! Never prompts. Useful for checking how a tool call would be presented
//! before wiring the gate into an agent.

use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncReadExt;
use toolgate_config::AppConfig;
use toolgate_core::{RiskProfile, ToolRequest};
use toolgate_permissions::{ContentPreview, ContentPreviewer, RiskClassifier};

#[derive(Debug, Serialize)]
pub struct ClassifyReport {
    #[serde(flatten)]
    pub profile: RiskProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<ContentPreview>,
}

pub async fn run(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let text = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        read_source(source)?
    };

    let request = ToolRequest::from_json(&text)?;
    let report = build_report(&config, &request);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// A source is a file path if one exists there, otherwise inline JSON.
fn read_source(source: &str) -> std::io::Result<String> {
    let path = Path::new(source);
    if !source.trim_start().starts_with('{') && path.is_file() {
        std::fs::read_to_string(path)
    } else {
        Ok(source.to_string())
    }
}

pub fn build_report(config: &AppConfig, request: &ToolRequest) -> ClassifyReport {
    let classifier = RiskClassifier::new(&config.permissions);
    let profile = classifier.classify(request);
    let preview = profile
        .category
        .has_content_preview()
        .then(|| ContentPreviewer::new(&config.permissions).preview(&request.parameters));
    ClassifyReport { profile, preview }
}
