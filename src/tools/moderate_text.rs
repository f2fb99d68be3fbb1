//! MCP `moderate_text` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ModerateTextParams {
    #[schemars(description = "The text to check")]
    pub text: String,

    #[schemars(
        description = "If true, run only the keyword and pattern layers (no remote calls). Defaults to false."
    )]
    pub local_only: Option<bool>,
}
