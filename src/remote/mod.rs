//! Remote collaborators: the content-moderation classifier and the chat model.
//!
//! Both are async traits so the moderation gate and chat service can run
//! against [`openai::OpenAiClient`] in production and counting mocks in tests.
//! The client is created via [`create_client`] from configuration.

pub mod openai;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::error::CompanionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One chat-completion call: a system instruction plus the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    /// Ask the model for a JSON object response.
    pub json_object: bool,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Per-category flags returned by a moderation classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierReport {
    pub categories: BTreeMap<String, bool>,
}

impl ClassifierReport {
    /// Names of the categories reported as flagged, in stable order.
    pub fn flagged_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Third-party content-moderation classifier.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierReport, CompanionError>;
}

/// General-purpose chat-completion model. Returns the assistant's raw text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompanionError>;
}

/// Create the remote client from config.
///
/// Returns `Ok(None)` when no API key is configured; callers then run with the
/// remote moderation layers disabled and canned chat replies.
pub fn create_client(config: &RemoteConfig) -> Result<Option<Arc<openai::OpenAiClient>>> {
    if !config.is_configured() {
        tracing::warn!("no API key configured, remote moderation and chat are disabled");
        return Ok(None);
    }
    let client = openai::OpenAiClient::new(config)?;
    tracing::info!(base_url = %config.base_url, model = %config.chat_model, "remote client ready");
    Ok(Some(Arc::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flagged_categories_are_filtered_and_sorted() {
        let mut report = ClassifierReport::default();
        report.categories.insert("violence".into(), true);
        report.categories.insert("harassment".into(), true);
        report.categories.insert("sexual".into(), false);
        assert_eq!(report.flagged_categories(), vec!["harassment", "violence"]);
    }

    #[test]
    fn create_client_without_key_is_none() {
        let config = RemoteConfig::default();
        assert!(create_client(&config).unwrap().is_none());
    }
}
