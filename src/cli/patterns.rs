//! CLI `patterns` command: list the active prompt-injection patterns.

use anyhow::Result;

use kizuna::config::KizunaConfig;
use kizuna::moderation::patterns::{PatternSet, DEFAULT_PATTERNS};

pub fn patterns(config: &KizunaConfig) -> Result<()> {
    let mut extra = config.moderation.extra_patterns.clone();
    if let Some(path) = config.resolved_patterns_path() {
        extra.extend(PatternSet::read_file(&path)?);
    }
    let set = PatternSet::with_defaults(&extra)?;

    println!("Moderation patterns ({} active)", set.len());
    println!("{}", "=".repeat(40));
    for (i, source) in set.sources().enumerate() {
        let origin = if i < DEFAULT_PATTERNS.len() { "built-in" } else { "custom" };
        println!("  {:>2}. [{origin:<8}] {source}", i + 1);
    }
    Ok(())
}
