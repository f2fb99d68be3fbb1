pub mod chat;
pub mod line;
pub mod moderate;
pub mod patterns;

use anyhow::Result;

use kizuna::companion::types::{CompanionId, Mood};

/// Parse the companion and mood arguments shared by several commands.
fn parse_persona(companion: &str, mood: &str) -> Result<(CompanionId, Mood)> {
    Ok((companion.parse()?, mood.parse()?))
}
