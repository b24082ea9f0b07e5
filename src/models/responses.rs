use serde::{Deserialize, Serialize};
use crate::core::presets::Preset;
use crate::core::render::Block;

/// Successful dispatch response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub result: String,
}

/// Error body shared by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(rename = "aiConfigured")]
    pub ai_configured: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetsResponse {
    pub presets: &'static [Preset],
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatResponse {
    pub blocks: Vec<Block>,
    pub html: String,
}
