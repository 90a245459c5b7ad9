use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BetterPromptError;

/// Titles longer than this are cut and suffixed with `...`.
pub const TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPrompt {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub original_prompt: String,
    pub optimized_prompt: String,
    pub model: String,
    pub tone: String,
    #[serde(rename = "type")]
    pub prompt_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied save request. Every field is optional on the wire so that a
/// missing field surfaces as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSavedPrompt {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_prompt: Option<String>,
    #[serde(default)]
    pub optimized_prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default, rename = "type")]
    pub prompt_type: Option<String>,
}

/// A save request that passed validation and is ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSavedPrompt {
    pub title: String,
    pub original_prompt: String,
    pub optimized_prompt: String,
    pub model: String,
    pub tone: String,
    pub prompt_type: String,
}

impl CreateSavedPrompt {
    pub fn validate(&self) -> Result<NewSavedPrompt, BetterPromptError> {
        let title = required("title", &self.title)?;
        Ok(NewSavedPrompt {
            title: clamp_title(&title),
            original_prompt: required("originalPrompt", &self.original_prompt)?,
            optimized_prompt: required("optimizedPrompt", &self.optimized_prompt)?,
            model: required("model", &self.model)?,
            tone: required("tone", &self.tone)?,
            prompt_type: required("type", &self.prompt_type)?,
        })
    }
}

fn required(name: &'static str, value: &Option<String>) -> Result<String, BetterPromptError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(BetterPromptError::MissingField(name)),
    }
}

/// Cap a title at [`TITLE_MAX_CHARS`] characters plus an ellipsis.
pub fn clamp_title(title: &str) -> String {
    let title = title.trim();
    if title.chars().count() <= TITLE_MAX_CHARS {
        return title.to_string();
    }
    let cut: String = title.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}...", cut.trim_end())
}
