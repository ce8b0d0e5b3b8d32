//! Front-side inspection of route path schemas.
//!
//! The hub owns schema compilation and URL matching. This module only
//! normalizes the schema text and reports the `{name}` placeholders it
//! declares, for registration diagnostics.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Normalized path schema with its declared placeholder names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSchema {
    raw: String,
    placeholders: Vec<String>,
}

impl PathSchema {
    /// Trims `raw` and extracts declared placeholders in order of appearance.
    ///
    /// # Errors
    /// - `PathSchemaError::Empty` when the schema is blank.
    pub fn parse(raw: &str) -> Result<Self, PathSchemaError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathSchemaError::Empty);
        }

        let placeholders = PLACEHOLDER_RE
            .captures_iter(trimmed)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str().to_string())
            .collect();

        Ok(Self {
            raw: trimmed.to_string(),
            placeholders,
        })
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }
}

/// Path schema inspection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSchemaError {
    Empty,
}

impl Display for PathSchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "path schema must not be empty"),
        }
    }
}

impl Error for PathSchemaError {}
