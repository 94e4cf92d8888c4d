//! Error types for the viewer
//!
//! Typed errors surfaced by the library. The application edge (demo binary,
//! window setup) wraps these in `anyhow`.

use thiserror::Error;

/// Errors produced by asset loading, color parsing, rendering and the UI overlay.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Fetching or decoding an asset failed. The viewer recovers by logging
    /// and staying empty; this never reaches the end user.
    #[error("failed to load asset '{url}': {reason}")]
    AssetLoad { url: String, reason: String },

    #[error("invalid color '{0}': expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("failed to decode glTF document: {0}")]
    Decode(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("ui error: {0}")]
    Ui(String),
}

impl ViewerError {
    pub fn asset_load(url: &str, reason: impl ToString) -> Self {
        Self::AssetLoad {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;
