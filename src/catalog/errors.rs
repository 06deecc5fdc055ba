//! # Catalog Errors

use thiserror::Error;

/// A data kind string outside the closed catalog enum.
///
/// Reaching the synthesizer with one of these is a programmer error; the
/// validator reports unknown kinds as ordinary violations first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported data kind: {0}")]
pub struct UnsupportedKind(pub String);

impl UnsupportedKind {
    /// The rejected kind string
    pub fn kind(&self) -> &str {
        &self.0
    }
}
