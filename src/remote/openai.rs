//! OpenAI-compatible REST client.
//!
//! Implements [`ContentClassifier`] against `/moderations` and [`ChatModel`]
//! against `/chat/completions`. Every transport, status, or envelope problem
//! surfaces as [`CompanionError::RemoteUnavailable`]; callers decide how to
//! degrade.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{ChatModel, ClassifierReport, CompletionRequest, ContentClassifier};
use crate::config::RemoteConfig;
use crate::error::{CompanionError, Result};

/// Longest error body excerpt kept in log messages.
const ERROR_BODY_PREVIEW: usize = 200;

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    moderation_model: String,
}

impl OpenAiClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CompanionError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            moderation_model: config.moderation_model.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let preview: String = text.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(CompanionError::RemoteUnavailable(format!(
                "{path} returned HTTP {status}: {preview}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| {
                CompanionError::RemoteUnavailable(format!("malformed {path} response: {e}"))
            })
    }
}

#[async_trait]
impl ContentClassifier for OpenAiClient {
    async fn classify(&self, text: &str) -> Result<ClassifierReport> {
        let body = json!({
            "model": self.moderation_model,
            "input": text,
        });
        let response = self.post_json("moderations", &body).await?;
        parse_moderation_response(&response)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_chat_body(&self.chat_model, request);
        let response = self.post_json("chat/completions", &body).await?;
        parse_chat_response(&response)
    }
}

fn build_chat_body(model: &str, request: &CompletionRequest) -> Value {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(json!({"role": "system", "content": request.system}));
    for message in &request.messages {
        messages.push(json!({"role": message.role, "content": message.content}));
    }

    let mut body = json!({
        "model": model,
        "messages": messages,
    });
    if request.json_object {
        body["response_format"] = json!({"type": "json_object"});
    }
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

/// Extract `results[0].categories` as a name → flagged map.
fn parse_moderation_response(body: &Value) -> Result<ClassifierReport> {
    let categories = body["results"]
        .get(0)
        .and_then(|r| r["categories"].as_object())
        .ok_or_else(|| {
            CompanionError::RemoteUnavailable("moderation response has no categories".into())
        })?;

    let categories = categories
        .iter()
        .map(|(name, flagged)| (name.clone(), flagged.as_bool().unwrap_or(false)))
        .collect();
    Ok(ClassifierReport { categories })
}

/// Extract `choices[0].message.content`.
fn parse_chat_response(body: &Value) -> Result<String> {
    body["choices"]
        .get(0)
        .and_then(|c| c["message"]["content"].as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| CompanionError::RemoteUnavailable("chat response has no content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ChatMessage;

    #[test]
    fn parses_moderation_categories() {
        let body = json!({
            "id": "modr-1",
            "results": [{
                "flagged": true,
                "categories": {
                    "harassment": false,
                    "self-harm": true,
                    "violence": true
                }
            }]
        });
        let report = parse_moderation_response(&body).unwrap();
        assert_eq!(report.flagged_categories(), vec!["self-harm", "violence"]);
    }

    #[test]
    fn moderation_without_results_is_remote_failure() {
        let err = parse_moderation_response(&json!({"results": []})).unwrap_err();
        assert!(matches!(err, CompanionError::RemoteUnavailable(_)));
    }

    #[test]
    fn parses_chat_content() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"is_ooc\": false}"}}]
        });
        assert_eq!(parse_chat_response(&body).unwrap(), "{\"is_ooc\": false}");
    }

    #[test]
    fn chat_without_content_is_remote_failure() {
        let err = parse_chat_response(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, CompanionError::RemoteUnavailable(_)));
    }

    #[test]
    fn chat_body_carries_system_and_json_format() {
        let request = CompletionRequest {
            system: "be nice".into(),
            messages: vec![ChatMessage::user("hi")],
            json_object: true,
            max_tokens: Some(64),
            temperature: None,
        };
        let body = build_chat_body("gpt-4o-mini", &request);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], 64);
        assert!(body.get("temperature").is_none());
    }
}
