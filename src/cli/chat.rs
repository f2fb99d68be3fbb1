//! CLI `chat` command: send one message to a companion.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kizuna::app::App;
use kizuna::chat::ChatRequest;
use kizuna::config::KizunaConfig;

pub async fn chat(
    config: KizunaConfig,
    companion: &str,
    mood: &str,
    affinity: i32,
    message: &str,
) -> Result<()> {
    let (companion, mood) = super::parse_persona(companion, mood)?;
    let app = App::from_config(config)?;

    let request = ChatRequest {
        companion,
        mood,
        affinity,
        message: message.to_string(),
        history: Vec::new(),
    };

    let mut rng = StdRng::from_entropy();
    let reply = app.chat.respond(&request, &mut rng).await?;

    println!("{}: {}", companion.display_name(), reply.text);
    println!("  (source: {:?})", reply.source);
    if let Some(reason) = reply.moderation.and_then(|v| v.reason) {
        println!("  (blocked: {reason})");
    }
    Ok(())
}
