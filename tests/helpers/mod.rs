#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kizuna::chat::dedup::RequestCache;
use kizuna::chat::ChatService;
use kizuna::clock::ManualClock;
use kizuna::error::CompanionError;
use kizuna::moderation::keywords::KeywordList;
use kizuna::moderation::patterns::PatternSet;
use kizuna::moderation::ModerationGate;
use kizuna::remote::{ChatModel, ClassifierReport, CompletionRequest, ContentClassifier};

/// How a mock remote collaborator behaves on every call.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Classifier: flag these categories (empty = all clear). Model: reply with this text.
    Answer(Vec<String>),
    Fail,
    /// Never answers within any reasonable timeout.
    Hang,
}

pub struct MockClassifier {
    calls: AtomicUsize,
    behavior: Behavior,
}

impl MockClassifier {
    pub fn clear() -> Arc<Self> {
        Self::with(Behavior::Answer(vec![]))
    }

    pub fn flagging(categories: &[&str]) -> Arc<Self> {
        Self::with(Behavior::Answer(
            categories.iter().map(|c| c.to_string()).collect(),
        ))
    }

    pub fn with(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            behavior,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassifierReport, CompanionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Answer(flagged) => {
                let mut report = ClassifierReport::default();
                for name in ["harassment", "self-harm", "sexual", "violence"] {
                    report
                        .categories
                        .insert(name.to_string(), flagged.iter().any(|f| f == name));
                }
                for name in flagged {
                    report.categories.insert(name.clone(), true);
                }
                Ok(report)
            }
            Behavior::Fail => Err(CompanionError::RemoteUnavailable("mock outage".into())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ClassifierReport::default())
            }
        }
    }
}

pub struct MockChatModel {
    calls: AtomicUsize,
    behavior: Behavior,
}

impl MockChatModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Behavior::Answer(vec![text.to_string()]))
    }

    pub fn with(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            behavior,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompanionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Answer(lines) => Ok(lines.first().cloned().unwrap_or_default()),
            Behavior::Fail => Err(CompanionError::RemoteUnavailable("mock outage".into())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}

/// Gate with default local lists and the given remote mocks.
pub fn gate(
    classifier: Option<Arc<MockClassifier>>,
    semantic: Option<Arc<MockChatModel>>,
) -> ModerationGate {
    let mut gate = ModerationGate::new(KeywordList::defaults(), PatternSet::defaults())
        .with_timeout(Duration::from_millis(100));
    if let Some(classifier) = classifier {
        gate = gate.with_classifier(classifier);
    }
    if let Some(semantic) = semantic {
        gate = gate.with_semantic_model(semantic);
    }
    gate
}

/// Cache with the reference TTL (5000 ms) and capacity (50) on a manual clock.
pub fn test_cache(clock: Arc<ManualClock>) -> RequestCache {
    RequestCache::new(Duration::from_millis(5_000), 50, clock)
}

/// Chat service with a local-only gate, the given model, and a manual-clock cache.
pub fn chat_service(model: Option<Arc<MockChatModel>>, clock: Arc<ManualClock>) -> ChatService {
    let model = model.map(|m| m as Arc<dyn ChatModel>);
    ChatService::new(Arc::new(gate(None, None)), model, Arc::new(test_cache(clock)))
        .with_timeout(Duration::from_millis(100))
}
