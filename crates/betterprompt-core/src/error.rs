use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BetterPromptError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unsupported {kind}: '{value}'")]
    UnsupportedOption { kind: &'static str, value: String },
}
