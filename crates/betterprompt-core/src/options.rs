//! Closed option sets for an optimization request.
//!
//! Tone and prompt type only ever contribute fixed suffix text to the system
//! instruction, so arbitrary client strings never reach the completion API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BetterPromptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "meta-llama/llama-3.1-8b-instruct:free")]
    Llama31_8b,
    #[serde(rename = "qwen/qwen-2.5-72b-instruct:free")]
    Qwen25_72b,
    #[default]
    #[serde(rename = "deepseek/deepseek-r1-distill-llama-70b:free")]
    DeepSeekR1Distill70b,
    #[serde(rename = "mistralai/mistral-7b-instruct:free")]
    Mistral7b,
    #[serde(rename = "moonshotai/kimi-dev-72b:free")]
    KimiDev72b,
    #[serde(rename = "microsoft/phi-4-reasoning:free")]
    Phi4Reasoning,
}

impl Model {
    pub const ALL: &[Model] = &[
        Model::Llama31_8b,
        Model::Qwen25_72b,
        Model::DeepSeekR1Distill70b,
        Model::Mistral7b,
        Model::KimiDev72b,
        Model::Phi4Reasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Llama31_8b => "meta-llama/llama-3.1-8b-instruct:free",
            Model::Qwen25_72b => "qwen/qwen-2.5-72b-instruct:free",
            Model::DeepSeekR1Distill70b => "deepseek/deepseek-r1-distill-llama-70b:free",
            Model::Mistral7b => "mistralai/mistral-7b-instruct:free",
            Model::KimiDev72b => "moonshotai/kimi-dev-72b:free",
            Model::Phi4Reasoning => "microsoft/phi-4-reasoning:free",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Model::Llama31_8b => "Llama 3.1 8B",
            Model::Qwen25_72b => "Qwen 2.5 72B",
            Model::DeepSeekR1Distill70b => "DeepSeek R1 Distill 70B",
            Model::Mistral7b => "Mistral 7B",
            Model::KimiDev72b => "Kimi Dev 72B",
            Model::Phi4Reasoning => "Microsoft Phi-4 Reasoning",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Friendly,
    Authoritative,
    Creative,
}

impl Tone {
    pub const ALL: &[Tone] = &[
        Tone::Professional,
        Tone::Casual,
        Tone::Friendly,
        Tone::Authoritative,
        Tone::Creative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Authoritative => "authoritative",
            Tone::Creative => "creative",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Text appended to the system instruction. The default tone adds nothing.
    pub fn instruction_suffix(&self) -> Option<&'static str> {
        match self {
            Tone::Professional => None,
            Tone::Casual => Some("\n\nTone: Make the optimized prompt casual."),
            Tone::Friendly => Some("\n\nTone: Make the optimized prompt friendly."),
            Tone::Authoritative => Some("\n\nTone: Make the optimized prompt authoritative."),
            Tone::Creative => Some("\n\nTone: Make the optimized prompt creative."),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PromptType {
    #[default]
    #[serde(rename = "general")]
    General,
    #[serde(rename = "code generation")]
    CodeGeneration,
    #[serde(rename = "content writing")]
    ContentWriting,
    #[serde(rename = "data analysis")]
    DataAnalysis,
    #[serde(rename = "creative writing")]
    CreativeWriting,
    #[serde(rename = "research")]
    Research,
}

impl PromptType {
    pub const ALL: &[PromptType] = &[
        PromptType::General,
        PromptType::CodeGeneration,
        PromptType::ContentWriting,
        PromptType::DataAnalysis,
        PromptType::CreativeWriting,
        PromptType::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::General => "general",
            PromptType::CodeGeneration => "code generation",
            PromptType::ContentWriting => "content writing",
            PromptType::DataAnalysis => "data analysis",
            PromptType::CreativeWriting => "creative writing",
            PromptType::Research => "research",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Text appended to the system instruction. `General` adds nothing.
    pub fn instruction_suffix(&self) -> Option<&'static str> {
        match self {
            PromptType::General => None,
            PromptType::CodeGeneration => {
                Some("\n\nPrompt Type: Optimize specifically for code generation.")
            }
            PromptType::ContentWriting => {
                Some("\n\nPrompt Type: Optimize specifically for content writing.")
            }
            PromptType::DataAnalysis => {
                Some("\n\nPrompt Type: Optimize specifically for data analysis.")
            }
            PromptType::CreativeWriting => {
                Some("\n\nPrompt Type: Optimize specifically for creative writing.")
            }
            PromptType::Research => Some("\n\nPrompt Type: Optimize specifically for research."),
        }
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve an optional client string against a closed option set,
/// using the default when the client sent nothing.
pub fn resolve_option<T: Default>(
    kind: &'static str,
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, BetterPromptError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(T::default()),
        Some(v) => parse(v).ok_or_else(|| BetterPromptError::UnsupportedOption {
            kind,
            value: v.to_string(),
        }),
    }
}
