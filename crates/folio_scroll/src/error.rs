//! Error types for folio_scroll

use thiserror::Error;

/// Errors from trigger registration and threshold parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrollError {
    /// A threshold or toggle-action string could not be parsed
    #[error("invalid threshold: {0:?}")]
    ThresholdParse(String),

    /// The registration names a scroller other than the one the registry is bound to
    #[error("trigger references a scroller the registry is not bound to")]
    ForeignScroller,

    /// No scroller has been bound to the registry yet
    #[error("no scroller bound to the trigger registry")]
    NoScroller,

    /// The trigger element is not on the stage
    #[error("trigger element is missing from the stage")]
    MissingElement,
}

/// Result type for folio_scroll operations
pub type Result<T> = std::result::Result<T, ScrollError>;
