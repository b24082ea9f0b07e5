//! Fleet Dispatch - AI dispatch relay for the fleet logistics dashboard
//!
//! Renders a fleet snapshot (drivers, vehicles, trips) and a free-text
//! request into a prompt, forwards it to the Gemini API and relays the
//! answer. Also provides the text-to-block mapper used to display answers.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{format_response, to_html, Block, Inline, Prompt, PromptBuilder};
pub use crate::models::{DispatchRequest, DispatchResponse, ErrorResponse, FleetContext};
pub use crate::services::{DispatchError, Dispatcher};
