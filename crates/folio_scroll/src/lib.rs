//! Folio Scroll
//!
//! The eased smooth-scroll container and the viewport trigger registry that
//! reads its position.
//!
//! # Features
//!
//! - **Smooth scroll**: frame-rate independent lerp towards a wheel target
//! - **Programmatic scrolling**: eased `scroll_to` and instant jumps
//! - **Triggers**: threshold pairs, toggle actions, scrubbing and pinning
//! - **Refresh**: pin spacing, container update and boundary recalculation

pub mod error;
pub mod smooth;
pub mod threshold;
pub mod trigger;

pub use error::{Result, ScrollError};
pub use smooth::{
    Direction, ScrollCommand, ScrollListenerId, ScrollState, ScrollTo, SmoothPhase, SmoothScroll,
    SmoothScrollConfig, SmoothScrollHandle, COMMAND_LOG_CAPACITY,
};
pub use threshold::{Edge, EndThreshold, Scrub, Threshold, ToggleAction, ToggleActions};
pub use trigger::{
    RefreshListenerId, ScrollerProxy, ScrollerRef, TriggerConfig, TriggerHandle, TriggerId,
    TriggerInfo, TriggerPhase, ViewportTriggers,
};
