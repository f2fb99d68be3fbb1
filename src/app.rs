//! Wiring shared by the server and the terminal commands.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::chat::dedup::RequestCache;
use crate::chat::ChatService;
use crate::clock::SystemClock;
use crate::companion::dialogue::DialogueSelector;
use crate::config::KizunaConfig;
use crate::moderation::ModerationGate;
use crate::remote::{self, ChatModel};

/// Long-lived components built once from config.
#[derive(Clone)]
pub struct App {
    pub config: Arc<KizunaConfig>,
    pub selector: Arc<DialogueSelector>,
    pub gate: Arc<ModerationGate>,
    pub chat: Arc<ChatService>,
}

impl App {
    /// Build the selector, moderation gate, request cache, and chat service.
    ///
    /// Missing API credentials are not an error: the remote layers are simply
    /// left out.
    pub fn from_config(config: KizunaConfig) -> Result<Self> {
        let client = remote::create_client(&config.remote)?;

        let gate = ModerationGate::from_config(&config, client.clone())
            .context("failed to build moderation gate")?;
        let gate = Arc::new(gate);
        tracing::info!(
            keywords = gate.keywords().len(),
            patterns = gate.patterns().len(),
            "moderation gate ready"
        );

        let cache = Arc::new(RequestCache::new(
            config.cache.ttl(),
            config.cache.capacity,
            Arc::new(SystemClock::new()),
        ));

        let model = client.map(|c| c as Arc<dyn ChatModel>);
        let chat = ChatService::new(gate.clone(), model, cache).configured(&config);

        let selector = DialogueSelector::new(config.dialogue.fallback_line.clone());

        Ok(Self {
            config: Arc::new(config),
            selector: Arc::new(selector),
            gate,
            chat: Arc::new(chat),
        })
    }
}
