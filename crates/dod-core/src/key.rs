use crate::error::{DodError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// TicketKey
// ---------------------------------------------------------------------------

/// A validated tracker issue key such as `ES-1281`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketKey(String);

static KEY_RE: OnceLock<Regex> = OnceLock::new();
static PROJECT_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*-[1-9][0-9]*$").unwrap())
}

fn project_re() -> &'static Regex {
    PROJECT_RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap())
}

/// True if `project` is a usable project key prefix (`ES`, `FW2`, ...).
pub fn is_valid_project_key(project: &str) -> bool {
    project_re().is_match(project)
}

impl TicketKey {
    /// Normalize user input into a key.
    ///
    /// Surrounding whitespace and quotes are stripped and the key is
    /// upper-cased. A bare issue number is prefixed with `project_key`.
    pub fn parse(input: &str, project_key: Option<&str>) -> Result<Self> {
        let cleaned = input
            .trim()
            .trim_matches(|c| c == '\'' || c == '"')
            .trim()
            .to_ascii_uppercase();

        let candidate = if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
            match project_key {
                Some(project) => format!("{}-{cleaned}", project.trim().to_ascii_uppercase()),
                None => return Err(DodError::InvalidTicketKey(input.to_string())),
            }
        } else {
            cleaned
        };

        if !key_re().is_match(&candidate) {
            return Err(DodError::InvalidTicketKey(input.to_string()));
        }
        Ok(TicketKey(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn project(&self) -> &str {
        self.0.split_once('-').map(|(p, _)| p).unwrap_or(&self.0)
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
