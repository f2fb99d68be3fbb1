//! Companion type definitions.
//!
//! Defines [`CompanionId`] (the four personas), [`Mood`], [`TimeOfDay`], the
//! caller-supplied [`DialogueContext`], and the static rule records
//! [`DialogueRule`] and [`ContextRule`].

use serde::{Deserialize, Serialize};

use crate::error::CompanionError;

/// The four companion personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanionId {
    /// Cheerful and energetic; celebrates every small win.
    Akari,
    /// Sharp-tongued, secretly caring.
    Kaede,
    /// Quiet bookworm, opens up slowly.
    Shion,
    /// Calm mentor figure with a dry sense of humor.
    Yua,
}

impl CompanionId {
    pub const ALL: [CompanionId; 4] = [Self::Akari, Self::Kaede, Self::Shion, Self::Yua];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Akari => "akari",
            Self::Kaede => "kaede",
            Self::Shion => "shion",
            Self::Yua => "yua",
        }
    }

    /// Display name used in prompts and terminal output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Akari => "Akari",
            Self::Kaede => "Kaede",
            Self::Shion => "Shion",
            Self::Yua => "Yua",
        }
    }
}

impl std::fmt::Display for CompanionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompanionId {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "akari" => Ok(Self::Akari),
            "kaede" => Ok(Self::Kaede),
            "shion" => Ok(Self::Shion),
            "yua" => Ok(Self::Yua),
            _ => Err(CompanionError::InvalidIdentity(s.to_string())),
        }
    }
}

/// Caller-supplied emotional state of a companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Content,
    Neutral,
    Irritated,
    Melancholy,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Self::Content, Self::Neutral, Self::Irritated, Self::Melancholy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Neutral => "neutral",
            Self::Irritated => "irritated",
            Self::Melancholy => "melancholy",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mood {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" => Ok(Self::Content),
            "neutral" => Ok(Self::Neutral),
            "irritated" => Ok(Self::Irritated),
            "melancholy" => Ok(Self::Melancholy),
            _ => Err(CompanionError::InvalidInput(format!("unknown mood: {s}"))),
        }
    }
}

/// Hour-of-day bucket used to gate time-specific lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 05:00–11:59
    Morning,
    /// 12:00–16:59
    Afternoon,
    /// 17:00–20:59
    Evening,
    /// 21:00–04:59
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Bucket for the current local wall-clock hour.
    pub fn now() -> Self {
        use chrono::Timelike;
        Self::from_hour(chrono::Local::now().hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            "night" => Ok(Self::Night),
            _ => Err(CompanionError::InvalidInput(format!("unknown time of day: {s}"))),
        }
    }
}

/// Live session signals supplied by the timer screen.
///
/// `None` means the caller has no value for that signal. A rule that requires a
/// signal the caller did not supply does not match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueContext {
    /// Minutes elapsed in the current focus session.
    pub session_minutes: Option<u32>,
    /// Total focused minutes today.
    pub daily_focus_minutes: Option<u32>,
    /// Breaks taken today.
    pub breaks_taken: Option<u32>,
    pub is_break: Option<bool>,
    pub task_completed: Option<bool>,
}

/// Context gate on a [`ContextRule`]. Absent fields are wildcards; numeric
/// fields are inclusive floors; boolean fields must match exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextRequirement {
    pub min_session_minutes: Option<u32>,
    pub min_daily_focus_minutes: Option<u32>,
    pub min_breaks_taken: Option<u32>,
    pub is_break: Option<bool>,
    pub task_completed: Option<bool>,
}

impl ContextRequirement {
    pub const ANY: ContextRequirement = ContextRequirement {
        min_session_minutes: None,
        min_daily_focus_minutes: None,
        min_breaks_taken: None,
        is_break: None,
        task_completed: None,
    };

    pub const fn session_at_least(self, minutes: u32) -> Self {
        Self {
            min_session_minutes: Some(minutes),
            ..self
        }
    }

    pub const fn daily_focus_at_least(self, minutes: u32) -> Self {
        Self {
            min_daily_focus_minutes: Some(minutes),
            ..self
        }
    }

    pub const fn breaks_at_least(self, count: u32) -> Self {
        Self {
            min_breaks_taken: Some(count),
            ..self
        }
    }

    pub const fn on_break(self, value: bool) -> Self {
        Self {
            is_break: Some(value),
            ..self
        }
    }

    pub const fn task_done(self, value: bool) -> Self {
        Self {
            task_completed: Some(value),
            ..self
        }
    }

    pub fn is_satisfied_by(&self, context: &DialogueContext) -> bool {
        floor_met(self.min_session_minutes, context.session_minutes)
            && floor_met(self.min_daily_focus_minutes, context.daily_focus_minutes)
            && floor_met(self.min_breaks_taken, context.breaks_taken)
            && flag_met(self.is_break, context.is_break)
            && flag_met(self.task_completed, context.task_completed)
    }
}

fn floor_met(required: Option<u32>, current: Option<u32>) -> bool {
    match (required, current) {
        (None, _) => true,
        (Some(req), Some(cur)) => cur >= req,
        (Some(_), None) => false,
    }
}

fn flag_met(required: Option<bool>, current: Option<bool>) -> bool {
    match (required, current) {
        (None, _) => true,
        (Some(req), Some(cur)) => cur == req,
        (Some(_), None) => false,
    }
}

/// A general scripted line, eligible when affinity, mood, streak, and time
/// requirements all hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueRule {
    pub text: &'static str,
    pub min_affinity: i32,
    pub max_affinity: i32,
    pub mood: Mood,
    pub min_consecutive_days: Option<u32>,
    pub time_of_day: Option<TimeOfDay>,
}

impl DialogueRule {
    pub const fn new(text: &'static str, min_affinity: i32, max_affinity: i32, mood: Mood) -> Self {
        Self {
            text,
            min_affinity,
            max_affinity,
            mood,
            min_consecutive_days: None,
            time_of_day: None,
        }
    }

    pub const fn streak(self, days: u32) -> Self {
        Self {
            min_consecutive_days: Some(days),
            ..self
        }
    }

    pub const fn at(self, time: TimeOfDay) -> Self {
        Self {
            time_of_day: Some(time),
            ..self
        }
    }

    /// Inclusive on both ends.
    pub fn covers_affinity(&self, affinity: i32) -> bool {
        (self.min_affinity..=self.max_affinity).contains(&affinity)
    }
}

/// A line gated on live session signals. Preferred over general rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRule {
    pub text: &'static str,
    pub min_affinity: i32,
    pub max_affinity: i32,
    pub mood: Mood,
    pub when: ContextRequirement,
}

impl ContextRule {
    pub const fn new(
        text: &'static str,
        min_affinity: i32,
        max_affinity: i32,
        mood: Mood,
        when: ContextRequirement,
    ) -> Self {
        Self {
            text,
            min_affinity,
            max_affinity,
            mood,
            when,
        }
    }

    pub fn covers_affinity(&self, affinity: i32) -> bool {
        (self.min_affinity..=self.max_affinity).contains(&affinity)
    }
}
