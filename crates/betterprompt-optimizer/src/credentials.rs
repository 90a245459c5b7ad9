use std::fmt;

use serde::{Deserialize, Serialize};

/// One API key for the completion service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank values so an empty env var counts as unset.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw key, for building the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Which credential slot (or the local rewriter) produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditSource {
    Primary,
    Secondary,
    Local,
}

impl CreditSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditSource::Primary => "primary",
            CreditSource::Secondary => "secondary",
            CreditSource::Local => "local",
        }
    }
}

/// The two credential slots, tried in fixed order on every request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub primary: Option<Credential>,
    pub secondary: Option<Credential>,
}

impl Credentials {
    pub fn new(primary: Option<Credential>, secondary: Option<Credential>) -> Self {
        Self { primary, secondary }
    }

    /// Build from optional raw strings, treating blank values as unset.
    pub fn from_raw(primary: Option<&str>, secondary: Option<&str>) -> Self {
        Self {
            primary: primary.and_then(Credential::new),
            secondary: secondary.and_then(Credential::new),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}
