//! MCP `companion_line` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use kizuna::companion::types::DialogueContext;

/// Parameters for the `companion_line` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompanionLineParams {
    #[schemars(description = "Companion persona: 'akari', 'kaede', 'shion', or 'yua'")]
    pub companion: String,

    #[schemars(description = "Current mood: 'content', 'neutral', 'irritated', or 'melancholy'")]
    pub mood: String,

    #[schemars(description = "Relationship progress, 0-100")]
    pub affinity: i32,

    #[schemars(description = "Consecutive days the user has studied. Defaults to 0.")]
    pub consecutive_days: Option<u32>,

    #[schemars(
        description = "Time-of-day bucket: 'morning', 'afternoon', 'evening', or 'night'. Defaults to the server's local time."
    )]
    pub time_of_day: Option<String>,

    /// Live session signals. When present, context-specific lines are preferred.
    #[schemars(description = "Live session signals from the timer screen")]
    pub context: Option<SessionContextParams>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SessionContextParams {
    #[schemars(description = "Minutes elapsed in the current focus session")]
    pub session_minutes: Option<u32>,

    #[schemars(description = "Total focused minutes today")]
    pub daily_focus_minutes: Option<u32>,

    #[schemars(description = "Breaks taken today")]
    pub breaks_taken: Option<u32>,

    #[schemars(description = "Whether the timer is currently in a break")]
    pub is_break: Option<bool>,

    #[schemars(description = "Whether the user just completed a task")]
    pub task_completed: Option<bool>,
}

impl From<SessionContextParams> for DialogueContext {
    fn from(p: SessionContextParams) -> Self {
        Self {
            session_minutes: p.session_minutes,
            daily_focus_minutes: p.daily_focus_minutes,
            breaks_taken: p.breaks_taken,
            is_break: p.is_break,
            task_completed: p.task_completed,
        }
    }
}
