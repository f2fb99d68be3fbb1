//! MCP `companion_chat` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use kizuna::remote::{ChatMessage, Role};

/// Parameters for the `companion_chat` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompanionChatParams {
    #[schemars(description = "Companion persona: 'akari', 'kaede', 'shion', or 'yua'")]
    pub companion: String,

    #[schemars(description = "The user's message")]
    pub message: String,

    #[schemars(description = "Current mood. Defaults to 'neutral'.")]
    pub mood: Option<String>,

    #[schemars(description = "Relationship progress, 0-100. Defaults to 0.")]
    pub affinity: Option<i32>,

    #[schemars(description = "Earlier messages in this conversation, oldest first")]
    pub history: Option<Vec<HistoryMessage>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HistoryMessage {
    #[schemars(description = "'user' or 'assistant'")]
    pub role: String,
    pub content: String,
}

impl HistoryMessage {
    pub fn into_message(self) -> Result<ChatMessage, String> {
        let role = match self.role.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => return Err(format!("unknown history role: {other}")),
        };
        Ok(ChatMessage {
            role,
            content: self.content,
        })
    }
}
