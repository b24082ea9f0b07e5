// Service exports
pub mod dispatch;
pub mod gemini;

pub use dispatch::{parse_request, DispatchError, Dispatcher, NO_RESPONSE_PLACEHOLDER};
pub use gemini::{GeminiClient, GeminiError};
