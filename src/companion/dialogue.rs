//! Scripted line selection.
//!
//! [`DialogueSelector::select`] is the single entry point: a first-match scan of
//! the companion's context rules (only when a context is supplied), then a
//! uniform draw among all matching general rules, then the fallback line.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tables::{self, CompanionTables};
use super::types::{CompanionId, DialogueContext, DialogueRule, Mood, TimeOfDay};

/// Default line when nothing matches.
pub const DEFAULT_FALLBACK: &str = "Hello!";

/// Inputs for one selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueRequest {
    pub companion: CompanionId,
    pub mood: Mood,
    /// Expected in `[0, 100]`. Values outside never match a rule.
    pub affinity: i32,
    pub consecutive_days: u32,
    pub context: Option<DialogueContext>,
    /// When `None`, the local wall-clock bucket is used.
    pub time_of_day: Option<TimeOfDay>,
}

/// Where a selected line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    Context,
    General,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedLine {
    pub text: String,
    pub source: LineSource,
}

pub struct DialogueSelector {
    tables: HashMap<CompanionId, CompanionTables>,
    fallback: String,
}

impl DialogueSelector {
    /// Selector over the built-in tables.
    pub fn new(fallback: impl Into<String>) -> Self {
        let tables = CompanionId::ALL
            .into_iter()
            .map(|c| (c, tables::builtin(c)))
            .collect();
        Self::with_tables(tables, fallback)
    }

    /// Selector over caller-supplied tables. Companions without an entry
    /// always receive the fallback line.
    pub fn with_tables(
        tables: HashMap<CompanionId, CompanionTables>,
        fallback: impl Into<String>,
    ) -> Self {
        let fallback = fallback.into();
        let fallback = if fallback.trim().is_empty() {
            DEFAULT_FALLBACK.to_string()
        } else {
            fallback
        };
        Self { tables, fallback }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Pick one line for `request`. Never fails and never returns an empty line.
    pub fn select<R: Rng + ?Sized>(&self, request: &DialogueRequest, rng: &mut R) -> SelectedLine {
        let Some(tables) = self.tables.get(&request.companion) else {
            return self.fallback_line();
        };

        if let Some(context) = &request.context {
            let hit = tables.context.iter().find(|rule| {
                rule.covers_affinity(request.affinity)
                    && rule.mood == request.mood
                    && rule.when.is_satisfied_by(context)
            });
            if let Some(rule) = hit {
                tracing::debug!(companion = %request.companion, "context line matched");
                return SelectedLine {
                    text: rule.text.to_string(),
                    source: LineSource::Context,
                };
            }
        }

        let time_of_day = request.time_of_day.unwrap_or_else(TimeOfDay::now);
        let candidates: Vec<&DialogueRule> = tables
            .general
            .iter()
            .filter(|rule| general_matches(rule, request, time_of_day))
            .collect();

        match candidates.choose(rng) {
            Some(rule) => SelectedLine {
                text: rule.text.to_string(),
                source: LineSource::General,
            },
            None => {
                tracing::debug!(
                    companion = %request.companion,
                    mood = %request.mood,
                    affinity = request.affinity,
                    "no dialogue rule matched, using fallback"
                );
                self.fallback_line()
            }
        }
    }

    fn fallback_line(&self) -> SelectedLine {
        SelectedLine {
            text: self.fallback.clone(),
            source: LineSource::Fallback,
        }
    }
}

impl Default for DialogueSelector {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK)
    }
}

fn general_matches(rule: &DialogueRule, request: &DialogueRequest, time_of_day: TimeOfDay) -> bool {
    rule.covers_affinity(request.affinity)
        && rule.mood == request.mood
        && rule
            .min_consecutive_days
            .map_or(true, |days| request.consecutive_days >= days)
        && rule.time_of_day.map_or(true, |t| t == time_of_day)
}
