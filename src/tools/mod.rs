pub mod companion_chat;
pub mod companion_line;
pub mod moderate_text;

use companion_chat::CompanionChatParams;
use companion_line::CompanionLineParams;
use moderate_text::ModerateTextParams;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};

use kizuna::app::App;
use kizuna::chat::ChatRequest;
use kizuna::companion::dialogue::DialogueRequest;
use kizuna::companion::types::{CompanionId, Mood, TimeOfDay};

/// The Kizuna MCP tool handler. Holds the shared [`App`] components and
/// exposes all MCP tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct KizunaTools {
    tool_router: ToolRouter<Self>,
    app: App,
}

#[tool_router]
impl KizunaTools {
    pub fn new(app: App) -> Self {
        Self {
            tool_router: Self::tool_router(),
            app,
        }
    }

    /// Pick a scripted companion line.
    #[tool(description = "Pick a scripted line for a companion given mood, affinity (0-100), streak, and optional live session signals. Context-specific lines win over general ones.")]
    async fn companion_line(
        &self,
        Parameters(params): Parameters<CompanionLineParams>,
    ) -> Result<String, String> {
        let companion: CompanionId = params.companion.parse().map_err(|e| format!("{e}"))?;
        let mood: Mood = params.mood.parse().map_err(|e| format!("{e}"))?;
        let time_of_day = params
            .time_of_day
            .as_deref()
            .map(str::parse::<TimeOfDay>)
            .transpose()
            .map_err(|e| format!("{e}"))?;

        let request = DialogueRequest {
            companion,
            mood,
            affinity: params.affinity,
            consecutive_days: params.consecutive_days.unwrap_or(0),
            context: params.context.map(Into::into),
            time_of_day,
        };

        let mut rng = StdRng::from_entropy();
        let line = self.app.selector.select(&request, &mut rng);

        tracing::info!(
            companion = %companion,
            mood = %mood,
            affinity = request.affinity,
            source = ?line.source,
            "companion_line called"
        );

        serde_json::to_string(&line).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Classify text with the moderation gate.
    #[tool(description = "Check text with the layered moderation gate (keywords, injection patterns, remote classifier, semantic role-break check). Returns {flagged, reason?, layer?}.")]
    async fn moderate_text(
        &self,
        Parameters(params): Parameters<ModerateTextParams>,
    ) -> Result<String, String> {
        tracing::info!(
            text_len = params.text.len(),
            local_only = params.local_only.unwrap_or(false),
            "moderate_text called"
        );

        let verdict = if params.local_only.unwrap_or(false) {
            self.app.gate.check_local(&params.text)
        } else {
            self.app.gate.moderate(&params.text).await
        }
        .map_err(|e| format!("{e}"))?;

        serde_json::to_string(&verdict).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Chat with a companion.
    #[tool(description = "Send a message to a companion and get an in-character reply. Blocked messages receive a deflection; model outages receive a canned reply.")]
    async fn companion_chat(
        &self,
        Parameters(params): Parameters<CompanionChatParams>,
    ) -> Result<String, String> {
        let companion: CompanionId = params.companion.parse().map_err(|e| format!("{e}"))?;
        let mood: Mood = match params.mood.as_deref() {
            Some(m) => m.parse().map_err(|e| format!("{e}"))?,
            None => Mood::Neutral,
        };
        let history = params
            .history
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.into_message())
            .collect::<Result<Vec<_>, _>>()?;

        let request = ChatRequest {
            companion,
            mood,
            affinity: params.affinity.unwrap_or(0),
            message: params.message,
            history,
        };

        tracing::info!(
            companion = %companion,
            message_len = request.message.len(),
            history = request.history.len(),
            "companion_chat called"
        );

        let mut rng = StdRng::from_entropy();
        let reply = self
            .app
            .chat
            .respond(&request, &mut rng)
            .await
            .map_err(|e| format!("{e}"))?;

        tracing::info!(source = ?reply.source, "companion reply ready");

        serde_json::to_string(&reply).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for KizunaTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Kizuna runs the study companions. Use companion_line for scripted lines, \
                 moderate_text to screen text, and companion_chat for free conversation."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
