mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kizuna::companion::types::DialogueContext;
use kizuna::config::KizunaConfig;

#[derive(Parser)]
#[command(
    name = "kizuna",
    version,
    about = "Study companion dialogue, moderation, and chat server"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from config: stdio or http)
    Serve,
    /// Print one scripted companion line
    Line {
        /// Companion: akari, kaede, shion, yua
        companion: String,
        /// Mood: content, neutral, irritated, melancholy
        #[arg(long, default_value = "neutral")]
        mood: String,
        #[arg(long, default_value_t = 0)]
        affinity: i32,
        /// Consecutive study days
        #[arg(long, default_value_t = 0)]
        streak: u32,
        /// morning, afternoon, evening, night (defaults to local time)
        #[arg(long)]
        time: Option<String>,
        /// Minutes into the current session
        #[arg(long)]
        session_minutes: Option<u32>,
        /// Minutes focused today
        #[arg(long)]
        daily_minutes: Option<u32>,
        /// Breaks taken today
        #[arg(long)]
        breaks: Option<u32>,
        /// Currently on a break
        #[arg(long)]
        on_break: bool,
        /// A task was just completed
        #[arg(long)]
        task_done: bool,
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check text with the moderation gate
    Moderate {
        text: String,
        /// Skip the remote classifier and semantic layers
        #[arg(long)]
        local: bool,
    },
    /// Send one message to a companion
    Chat {
        companion: String,
        message: String,
        #[arg(long, default_value = "neutral")]
        mood: String,
        #[arg(long, default_value_t = 0)]
        affinity: i32,
    },
    /// List the active prompt-injection patterns
    Patterns,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = KizunaConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => match config.server.transport.as_str() {
            "http" => server::serve_http(config).await?,
            "stdio" => server::serve_stdio(config).await?,
            other => anyhow::bail!("unknown transport: {other}. Supported: stdio, http"),
        },
        Command::Line {
            companion,
            mood,
            affinity,
            streak,
            time,
            session_minutes,
            daily_minutes,
            breaks,
            on_break,
            task_done,
            seed,
        } => {
            let has_context = session_minutes.is_some()
                || daily_minutes.is_some()
                || breaks.is_some()
                || on_break
                || task_done;
            let context = has_context.then(|| DialogueContext {
                session_minutes,
                daily_focus_minutes: daily_minutes,
                breaks_taken: breaks,
                is_break: Some(on_break),
                task_completed: Some(task_done),
            });
            cli::line::line(
                &config,
                cli::line::LineArgs {
                    companion: &companion,
                    mood: &mood,
                    affinity,
                    streak,
                    time_of_day: time.as_deref(),
                    context,
                    seed,
                },
            )?;
        }
        Command::Moderate { text, local } => {
            cli::moderate::moderate(config, &text, local).await?;
        }
        Command::Chat {
            companion,
            message,
            mood,
            affinity,
        } => {
            cli::chat::chat(config, &companion, &mood, affinity, &message).await?;
        }
        Command::Patterns => {
            cli::patterns::patterns(&config)?;
        }
    }

    Ok(())
}
