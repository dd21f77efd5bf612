//! Error types for folio_site

use folio_animation::{EasingParseError, PositionParseError};
use folio_scroll::ScrollError;
use thiserror::Error;

/// Errors that can occur while configuring or running the site
#[derive(Error, Debug)]
pub enum SiteError {
    /// Failed to read a config or content file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse `folio.toml`
    #[error("config parse failed: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to write `folio.toml`
    #[error("config serialization failed: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Failed to parse or write a content feed
    #[error("content feed error: {0}")]
    Json(#[from] serde_json::Error),

    /// An easing name in the config is invalid
    #[error(transparent)]
    Easing(#[from] EasingParseError),

    /// A timeline position is invalid
    #[error(transparent)]
    Position(#[from] PositionParseError),

    /// A threshold or trigger registration failed
    #[error(transparent)]
    Scroll(#[from] ScrollError),

    /// A config value is out of range
    #[error("invalid config: {0}")]
    Config(String),

    /// The content feed failed validation
    #[error("invalid content: {0}")]
    Content(String),

    /// A contact form submission was rejected
    #[error("form error: {0}")]
    Form(String),

    /// The scroll bootstrap is already bound to a different container
    #[error("scroll bootstrap is already bound to another container")]
    AlreadyBound,
}

/// Result type for folio_site operations
pub type Result<T> = std::result::Result<T, SiteError>;
