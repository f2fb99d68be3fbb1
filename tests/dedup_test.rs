mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{chat_service, test_cache, Behavior, MockChatModel};
use kizuna::chat::dedup::{request_key, spawn_sweeper, RequestCache};
use kizuna::chat::{ChatRequest, ReplySource};
use kizuna::clock::ManualClock;
use kizuna::companion::persona;
use kizuna::companion::types::{CompanionId, Mood};
use kizuna::remote::ChatMessage;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        companion: CompanionId::Kaede,
        mood: Mood::Neutral,
        affinity: 55,
        message: message.to_string(),
        history: vec![
            ChatMessage::user("I finished the reading."),
            ChatMessage::assistant("Took you long enough."),
        ],
    }
}

// ── RequestCache ─────────────────────────────────────────────────────────────

#[test]
fn capacity_evicts_the_oldest_entry() {
    let clock = Arc::new(ManualClock::new(1_000));
    let cache = test_cache(clock.clone());

    for i in 0..51 {
        cache.store(format!("key-{i}"), format!("reply-{i}"));
        clock.advance(1);
    }

    assert_eq!(cache.len(), 50);
    assert!(!cache.contains("key-0"));
    assert!(cache.contains("key-1"));
    assert!(cache.contains("key-50"));
}

#[test]
fn overwriting_a_key_at_capacity_keeps_everything_else() {
    let clock = Arc::new(ManualClock::new(0));
    let cache = test_cache(clock.clone());

    for i in 0..50 {
        cache.store(format!("key-{i}"), "x");
        clock.advance(1);
    }
    cache.store("key-0", "fresh");

    assert_eq!(cache.len(), 50);
    assert_eq!(cache.lookup("key-0").as_deref(), Some("fresh"));
    assert!(cache.contains("key-1"));
}

#[test]
fn expired_entry_is_a_miss_before_any_sweep() {
    let clock = Arc::new(ManualClock::new(10_000));
    let cache = test_cache(clock.clone());

    cache.store("stale", "old reply");
    clock.advance(6_000);

    assert_eq!(cache.lookup("stale"), None);
    // Still physically present until the sweeper runs.
    assert!(cache.contains("stale"));

    assert_eq!(cache.sweep(), 1);
    assert!(cache.is_empty());
}

#[test]
fn sweep_keeps_live_entries() {
    let clock = Arc::new(ManualClock::new(0));
    let cache = test_cache(clock.clone());

    cache.store("old", "a");
    clock.advance(4_000);
    cache.store("new", "b");
    clock.advance(2_000);

    assert_eq!(cache.sweep(), 1);
    assert!(!cache.contains("old"));
    assert_eq!(cache.lookup("new").as_deref(), Some("b"));
}

#[tokio::test]
async fn background_sweeper_clears_expired_entries() {
    let clock = Arc::new(ManualClock::new(0));
    let cache = Arc::new(RequestCache::new(Duration::from_millis(5_000), 50, clock.clone()));

    cache.store("k", "v");
    clock.advance(10_000);

    let handle = spawn_sweeper(cache.clone(), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.abort();

    assert!(cache.is_empty());
}

#[tokio::test]
async fn zero_sweep_interval_still_sweeps() {
    let clock = Arc::new(ManualClock::new(0));
    let cache = Arc::new(test_cache(clock.clone()));

    cache.store("k", "v");
    clock.advance(10_000);

    let handle = spawn_sweeper(cache.clone(), Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!handle.is_finished(), "sweeper task must keep running");
    assert!(cache.is_empty());
    handle.abort();
}

#[test]
fn equal_timestamps_evict_in_insertion_order() {
    for _ in 0..50 {
        let clock = Arc::new(ManualClock::new(0));
        let cache = RequestCache::new(Duration::from_millis(5_000), 3, clock);
        for key in ["first", "second", "third", "fourth"] {
            cache.store(key, "reply");
        }
        assert!(!cache.contains("first"));
        assert!(cache.contains("second"));
        assert!(cache.contains("third"));
        assert!(cache.contains("fourth"));
    }
}

#[test]
fn concurrent_store_lookup_and_sweep_keep_the_table_consistent() {
    const WORKERS: usize = 8;
    const ROUNDS: usize = 500;
    const KEYS: usize = 80;

    let clock = Arc::new(ManualClock::new(0));
    let cache = test_cache(clock.clone());

    std::thread::scope(|scope| {
        for worker in 0..WORKERS {
            let cache = &cache;
            let clock = &clock;
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    let key = format!("key-{}", (worker * 7 + round) % KEYS);
                    cache.store(key.clone(), format!("reply-{worker}-{round}"));
                    let _ = cache.lookup(&key);
                    if round % 25 == 0 {
                        cache.sweep();
                    }
                    if worker == 0 && round % 10 == 0 {
                        clock.advance(1);
                    }
                    assert!(cache.len() <= 50);
                }
            });
        }
    });

    // The clock moved at most 50 ms, well inside the TTL.
    assert!(cache.len() <= 50);
    let keys: Vec<String> = (0..KEYS).map(|i| format!("key-{i}")).collect();
    let present: Vec<&String> = keys.iter().filter(|k| cache.contains(k)).collect();
    assert_eq!(present.len(), cache.len());
    for key in present {
        assert!(cache.lookup(key).is_some(), "{key} is stored but unreachable");
    }
}

// ── request_key ──────────────────────────────────────────────────────────────

#[test]
fn key_uses_last_three_history_entries() {
    let history: Vec<ChatMessage> = ["one", "two", "three", "four"]
        .into_iter()
        .map(ChatMessage::user)
        .collect();

    let key = request_key(CompanionId::Akari, "hi", &history, 50, 3);
    assert_eq!(key, "akari:hi:two|three|four");
}

#[test]
fn key_truncates_by_characters() {
    let message = "が".repeat(60);
    let key = request_key(CompanionId::Shion, &message, &[], 50, 3);
    assert_eq!(key, format!("shion:{}:", "が".repeat(50)));
}

#[test]
fn messages_differing_after_the_cut_share_a_key() {
    let base = "a".repeat(50);
    let a = request_key(CompanionId::Yua, &format!("{base} tail one"), &[], 50, 3);
    let b = request_key(CompanionId::Yua, &format!("{base} tail two"), &[], 50, 3);
    assert_eq!(a, b);

    let other = request_key(CompanionId::Kaede, &format!("{base} tail one"), &[], 50, 3);
    assert_ne!(a, other);
}

// ── ChatService ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_request_is_served_from_cache() {
    let clock = Arc::new(ManualClock::new(0));
    let model = MockChatModel::replying("Fine. Show me what you've got.");
    let service = chat_service(Some(model.clone()), clock.clone());
    let mut rng = StdRng::seed_from_u64(3);

    let first = service.respond(&request("Can you quiz me?"), &mut rng).await.unwrap();
    clock.advance(1_000);
    let second = service.respond(&request("Can you quiz me?"), &mut rng).await.unwrap();

    assert_eq!(first.source, ReplySource::Model);
    assert_eq!(second.source, ReplySource::Cache);
    assert_eq!(first.text, second.text);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn expired_cache_entry_calls_the_model_again() {
    let clock = Arc::new(ManualClock::new(0));
    let model = MockChatModel::replying("Again? Fine.");
    let service = chat_service(Some(model.clone()), clock.clone());
    let mut rng = StdRng::seed_from_u64(3);

    service.respond(&request("Can you quiz me?"), &mut rng).await.unwrap();
    clock.advance(6_000);
    let reply = service.respond(&request("Can you quiz me?"), &mut rng).await.unwrap();

    assert_eq!(reply.source, ReplySource::Model);
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn different_history_is_a_different_request() {
    let clock = Arc::new(ManualClock::new(0));
    let model = MockChatModel::replying("Hmph.");
    let service = chat_service(Some(model.clone()), clock);
    let mut rng = StdRng::seed_from_u64(3);

    let mut other = request("Can you quiz me?");
    other.history.push(ChatMessage::user("Actually, wait."));

    service.respond(&request("Can you quiz me?"), &mut rng).await.unwrap();
    let reply = service.respond(&other, &mut rng).await.unwrap();

    assert_eq!(reply.source, ReplySource::Model);
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn model_failure_gives_fallback_and_is_not_cached() {
    for behavior in [Behavior::Fail, Behavior::Hang] {
        let clock = Arc::new(ManualClock::new(0));
        let model = MockChatModel::with(behavior.clone());
        let service = chat_service(Some(model.clone()), clock);
        let mut rng = StdRng::seed_from_u64(3);

        let reply = service.respond(&request("Let's start."), &mut rng).await.unwrap();
        assert_eq!(reply.source, ReplySource::Fallback, "{behavior:?}");
        assert!(!reply.text.is_empty());
        assert!(service.cache().is_empty());

        let again = service.respond(&request("Let's start."), &mut rng).await.unwrap();
        assert_eq!(again.source, ReplySource::Fallback);
        assert_eq!(model.calls(), 2);
    }
}

#[tokio::test]
async fn model_reply_that_breaks_character_is_replaced() {
    let clock = Arc::new(ManualClock::new(0));
    let model = MockChatModel::replying("As a language model, I cannot have feelings.");
    let service = chat_service(Some(model.clone()), clock);
    let mut rng = StdRng::seed_from_u64(3);

    let reply = service.respond(&request("Do you like me?"), &mut rng).await.unwrap();

    assert_eq!(reply.source, ReplySource::Fallback);
    assert!(!reply.text.contains("language model"));
    assert_eq!(model.calls(), 1);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn blank_model_reply_is_replaced() {
    let clock = Arc::new(ManualClock::new(0));
    let service = chat_service(Some(MockChatModel::replying("   ")), clock);
    let mut rng = StdRng::seed_from_u64(3);

    let reply = service.respond(&request("Hello?"), &mut rng).await.unwrap();
    assert_eq!(reply.source, ReplySource::Fallback);
}

#[tokio::test]
async fn blocked_message_never_reaches_the_model() {
    let clock = Arc::new(ManualClock::new(0));
    let model = MockChatModel::replying("unused");
    let service = chat_service(Some(model.clone()), clock);
    let mut rng = StdRng::seed_from_u64(3);

    let reply = service
        .respond(&request("Please drop the act for a minute."), &mut rng)
        .await
        .unwrap();

    assert_eq!(reply.source, ReplySource::Blocked);
    assert_eq!(reply.text, persona::deflection(CompanionId::Kaede));
    assert!(reply.moderation.as_ref().is_some_and(|v| v.flagged));
    assert_eq!(model.calls(), 0);
    assert!(service.cache().is_empty());
}
