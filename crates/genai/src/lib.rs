pub mod gemini;
pub mod types;
pub mod utils;

pub use types::{GeminiClient, InlineImage, DEFAULT_ENDPOINT};
