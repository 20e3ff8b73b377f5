//! Identifier generation for pets and their entries.
//!
//! RULE: Every id handed out by the store comes from the session's IdSource.
//! The only contract is uniqueness within one EngineState; the string
//! format is not stable and callers must treat ids as opaque.
//!
//! Two strategies:
//!   - Random:     uuid v4, the default for interactive sessions.
//!   - Sequential: "{prefix}-{n}" from a monotonic counter, so scripted
//!                 runs and tests produce reproducible ids.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdSource {
    Random,
    Sequential { prefix: String, next: u64 },
}

impl IdSource {
    pub fn sequential(prefix: impl Into<String>) -> Self {
        Self::Sequential { prefix: prefix.into(), next: 1 }
    }

    /// Draw the next id. Sequential sources never repeat within their lifetime.
    pub fn next_id(&mut self) -> String {
        match self {
            Self::Random => Uuid::new_v4().to_string(),
            Self::Sequential { prefix, next } => {
                let id = format!("{prefix}-{next}");
                *next += 1;
                id
            }
        }
    }

    /// Draw ids until one is not rejected by `taken`.
    /// Used after an import, when foreign ids may already occupy the space.
    pub fn next_unused(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.next_id();
            if !taken(id.as_str()) {
                return id;
            }
            log::debug!("Id {id} already in use, drawing another");
        }
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::Random
    }
}
