//! CLI `moderate` command: run text through the moderation gate.

use anyhow::Result;

use kizuna::app::App;
use kizuna::config::KizunaConfig;

pub async fn moderate(config: KizunaConfig, text: &str, local_only: bool) -> Result<()> {
    let app = App::from_config(config)?;

    let verdict = if local_only {
        app.gate.check_local(text)?
    } else {
        app.gate.moderate(text).await?
    };

    if verdict.flagged {
        println!("FLAGGED");
        if let Some(layer) = verdict.layer {
            println!("  Layer:   {layer:?}");
        }
        if let Some(reason) = &verdict.reason {
            println!("  Reason:  {reason}");
        }
    } else {
        println!("OK");
    }

    Ok(())
}
