//! Companion chat: moderation, request dedup, the model call, and canned
//! fallbacks.
//!
//! [`ChatService::respond`] is the single entry point. Every failure after
//! input validation degrades to an in-character reply instead of an error.

pub mod dedup;

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::companion::persona;
use crate::companion::types::{CompanionId, Mood};
use crate::config::KizunaConfig;
use crate::error::{CompanionError, Result};
use crate::moderation::{ModerationGate, ModerationVerdict};
use crate::remote::{ChatMessage, ChatModel, CompletionRequest};
use dedup::{request_key, RequestCache};

/// Most recent history messages forwarded to the model.
const MAX_PROMPT_HISTORY: usize = 10;
const REPLY_MAX_TOKENS: u32 = 150;
const REPLY_TEMPERATURE: f32 = 0.8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub companion: CompanionId,
    pub mood: Mood,
    pub affinity: i32,
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// Fresh answer from the chat model.
    Model,
    /// Served from the dedup cache.
    Cache,
    /// Canned reply; the model was unavailable or its answer was rejected.
    Fallback,
    /// The user's message was blocked by moderation.
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationVerdict>,
}

pub struct ChatService {
    gate: Arc<ModerationGate>,
    model: Option<Arc<dyn ChatModel>>,
    cache: Arc<RequestCache>,
    truncate_chars: usize,
    history_window: usize,
    remote_timeout: Duration,
}

impl ChatService {
    pub fn new(
        gate: Arc<ModerationGate>,
        model: Option<Arc<dyn ChatModel>>,
        cache: Arc<RequestCache>,
    ) -> Self {
        Self {
            gate,
            model,
            cache,
            truncate_chars: 50,
            history_window: 3,
            remote_timeout: Duration::from_secs(30),
        }
    }

    /// Apply the `[cache]` key shape and the `[remote]` timeout from config.
    pub fn configured(mut self, config: &KizunaConfig) -> Self {
        self.truncate_chars = config.cache.truncate_chars;
        self.history_window = config.cache.history_window;
        self.remote_timeout = config.remote.timeout();
        self
    }

    pub fn with_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    pub fn cache(&self) -> &Arc<RequestCache> {
        &self.cache
    }

    pub fn gate(&self) -> &Arc<ModerationGate> {
        &self.gate
    }

    /// Produce the companion's reply to `request`.
    ///
    /// Fails only on an empty message. Blocked input, cache hits, model
    /// failures, and rejected model output each map to a [`ReplySource`].
    pub async fn respond<R>(&self, request: &ChatRequest, rng: &mut R) -> Result<ChatReply>
    where
        R: Rng + Send + ?Sized,
    {
        if request.message.trim().is_empty() {
            return Err(CompanionError::InvalidInput("message must not be empty".into()));
        }

        let verdict = self.gate.moderate(&request.message).await?;
        if verdict.flagged {
            info!(
                companion = %request.companion,
                layer = ?verdict.layer,
                "user message blocked by moderation"
            );
            return Ok(ChatReply {
                text: persona::deflection(request.companion).to_string(),
                source: ReplySource::Blocked,
                moderation: Some(verdict),
            });
        }

        let key = request_key(
            request.companion,
            &request.message,
            &request.history,
            self.truncate_chars,
            self.history_window,
        );
        if let Some(cached) = self.cache.lookup(&key) {
            info!(companion = %request.companion, "chat reply served from cache");
            return Ok(ChatReply {
                text: cached,
                source: ReplySource::Cache,
                moderation: None,
            });
        }

        match self.ask_model(request).await {
            Some(text) => {
                self.cache.store(key, text.clone());
                Ok(ChatReply {
                    text,
                    source: ReplySource::Model,
                    moderation: None,
                })
            }
            None => Ok(ChatReply {
                text: persona::fallback_reply(request.companion, rng).to_string(),
                source: ReplySource::Fallback,
                moderation: None,
            }),
        }
    }

    /// `None` when there is no model, the call failed, or the answer was unusable.
    async fn ask_model(&self, request: &ChatRequest) -> Option<String> {
        let model = self.model.as_ref()?;

        let start = request.history.len().saturating_sub(MAX_PROMPT_HISTORY);
        let mut messages = request.history[start..].to_vec();
        messages.push(ChatMessage::user(request.message.clone()));

        let completion = CompletionRequest {
            system: persona::system_prompt(request.companion, request.mood, request.affinity),
            messages,
            json_object: false,
            max_tokens: Some(REPLY_MAX_TOKENS),
            temperature: Some(REPLY_TEMPERATURE),
        };

        let text = match timeout(self.remote_timeout, model.complete(&completion)).await {
            Ok(Ok(text)) => text.trim().to_string(),
            Ok(Err(e)) => {
                warn!(
                    companion = %request.companion,
                    error = %e,
                    "chat model failed, using fallback reply"
                );
                return None;
            }
            Err(_) => {
                warn!(companion = %request.companion, "chat model timed out, using fallback reply");
                return None;
            }
        };

        if text.is_empty() {
            warn!(companion = %request.companion, "chat model returned empty reply");
            return None;
        }

        match self.gate.check_local(&text) {
            Ok(verdict) if verdict.flagged => {
                warn!(
                    companion = %request.companion,
                    layer = ?verdict.layer,
                    "model reply rejected by moderation"
                );
                None
            }
            _ => Some(text),
        }
    }
}
