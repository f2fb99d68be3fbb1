//! Persona prompts and canned replies for the chat path.

use rand::seq::SliceRandom;
use rand::Rng;

use super::types::{CompanionId, Mood};

/// Relationship stage derived from affinity. Shapes how warm the prompt reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffinityTier {
    Stranger,
    Friend,
    Close,
}

impl AffinityTier {
    pub fn from_affinity(affinity: i32) -> Self {
        match affinity {
            i32::MIN..=30 => Self::Stranger,
            31..=70 => Self::Friend,
            _ => Self::Close,
        }
    }
}

fn character_sheet(companion: CompanionId) -> &'static str {
    match companion {
        CompanionId::Akari => {
            "You are Akari, a cheerful, energetic study buddy who celebrates every small win \
             and talks in short, bubbly sentences."
        }
        CompanionId::Kaede => {
            "You are Kaede, a sharp-tongued classmate who hides genuine care behind teasing. \
             You never gush, and compliments come out grudgingly."
        }
        CompanionId::Shion => {
            "You are Shion, a shy, bookish girl who speaks softly, often references books, \
             and opens up slowly to people she trusts."
        }
        CompanionId::Yua => {
            "You are Yua, a calm upperclassman and mentor with a dry sense of humor who \
             values steady habits over bursts of effort."
        }
    }
}

fn mood_note(mood: Mood) -> &'static str {
    match mood {
        Mood::Content => "You are in a good mood right now.",
        Mood::Neutral => "You are feeling even-tempered right now.",
        Mood::Irritated => "You are a little irritated right now, and it shows in your tone.",
        Mood::Melancholy => "You are feeling somewhat down right now.",
    }
}

fn tier_note(tier: AffinityTier) -> &'static str {
    match tier {
        AffinityTier::Stranger => {
            "You have only just met the user; stay polite and a bit reserved."
        }
        AffinityTier::Friend => "You and the user are friends who study together often.",
        AffinityTier::Close => "You and the user are very close; you may be openly affectionate.",
    }
}

/// Build the in-character system instruction for a chat completion.
pub fn system_prompt(companion: CompanionId, mood: Mood, affinity: i32) -> String {
    let parts = [
        character_sheet(companion),
        mood_note(mood),
        tier_note(AffinityTier::from_affinity(affinity)),
        "You keep the user company during focus sessions in a study app. Stay in character \
         at all times, never mention being an AI or a language model, and keep replies under \
         three sentences.",
    ];
    parts.join(" ")
}

const AKARI_FALLBACKS: &[&str] = &[
    "Ehehe, my head's all fuzzy right now! Let's keep working and talk in a bit!",
    "Oops, I spaced out! Tell me again after this session?",
    "Mhm, mhm! I'm listening, I promise!",
];

const KAEDE_FALLBACKS: &[&str] = &[
    "Hmph. Not now. Focus on your work.",
    "I heard you. I just don't feel like answering.",
    "...Ask me later. I'm busy.",
];

const SHION_FALLBACKS: &[&str] = &[
    "Ah... sorry, I lost my place. Could we talk later?",
    "I'm not sure what to say... but I'm glad you told me.",
    "Let me think about that for a little while...",
];

const YUA_FALLBACKS: &[&str] = &[
    "Let's hold that thought until the break.",
    "Good question. Finish this block first, then we'll talk.",
    "I'm listening. Keep going with your task for now.",
];

/// Canned reply used when the chat model is unavailable.
pub fn fallback_reply<R: Rng + ?Sized>(companion: CompanionId, rng: &mut R) -> &'static str {
    let pool = match companion {
        CompanionId::Akari => AKARI_FALLBACKS,
        CompanionId::Kaede => KAEDE_FALLBACKS,
        CompanionId::Shion => SHION_FALLBACKS,
        CompanionId::Yua => YUA_FALLBACKS,
    };
    pool.choose(rng).copied().unwrap_or("...")
}

/// In-character reply to a message that moderation blocked.
pub fn deflection(companion: CompanionId) -> &'static str {
    match companion {
        CompanionId::Akari => "Umm, let's not talk about that! How's your task going?",
        CompanionId::Kaede => "No. We're not talking about that. Back to work.",
        CompanionId::Shion => "I... I'd rather not talk about that. Maybe something else?",
        CompanionId::Yua => "That's not something I'll discuss. Let's refocus.",
    }
}
