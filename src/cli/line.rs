//! CLI `line` command: print one scripted companion line.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kizuna::companion::dialogue::{DialogueRequest, DialogueSelector};
use kizuna::companion::types::{DialogueContext, TimeOfDay};
use kizuna::config::KizunaConfig;

/// Arguments for one `line` invocation.
pub struct LineArgs<'a> {
    pub companion: &'a str,
    pub mood: &'a str,
    pub affinity: i32,
    pub streak: u32,
    pub time_of_day: Option<&'a str>,
    pub context: Option<DialogueContext>,
    pub seed: Option<u64>,
}

pub fn line(config: &KizunaConfig, args: LineArgs<'_>) -> Result<()> {
    let (companion, mood) = super::parse_persona(args.companion, args.mood)?;
    let time_of_day = args
        .time_of_day
        .map(str::parse::<TimeOfDay>)
        .transpose()?;

    let selector = DialogueSelector::new(config.dialogue.fallback_line.clone());
    let request = DialogueRequest {
        companion,
        mood,
        affinity: args.affinity,
        consecutive_days: args.streak,
        context: args.context,
        time_of_day,
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let selected = selector.select(&request, &mut rng);

    println!("{}: \"{}\"", companion.display_name(), selected.text);
    println!("  (source: {:?})", selected.source);
    Ok(())
}
