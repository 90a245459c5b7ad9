pub mod api_key;
pub mod error;
pub mod options;
pub mod saved_prompt;

pub use error::BetterPromptError;
pub use options::{Model, PromptType, Tone};
pub use saved_prompt::{CreateSavedPrompt, NewSavedPrompt, SavedPrompt};
