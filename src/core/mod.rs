// Core exports
pub mod locale;
pub mod presets;
pub mod prompt;
pub mod render;

pub use locale::{format_date_it, format_number_it};
pub use presets::{find_preset, Preset, PRESETS};
pub use prompt::{Prompt, PromptBuilder};
pub use render::{format_response, to_html, Block, Inline};
