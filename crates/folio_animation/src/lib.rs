//! Folio Animation System
//!
//! Tweens, timelines and a deterministic scheduler rendering into a
//! [`folio_core::Stage`].
//!
//! # Features
//!
//! - **Easing**: power, back, elastic and sine curves parsed from names
//! - **Tweens**: from/to property animations with stagger, repeat and yoyo
//! - **Timelines**: sequenced tweens with relative position parameters
//! - **Scheduler**: frame-driven playback with play/reverse/seek control
//! - **RAII wrappers**: animations that are killed when their owner drops

pub mod easing;
pub mod scheduler;
pub mod timeline;
pub mod tween;

pub use easing::{Easing, EasingParseError};
pub use scheduler::{
    AnimatedTimeline, AnimatedTween, AnimationHandle, AnimationRef, AnimationScheduler,
    PlaybackState, TimelineId, TweenId,
};
pub use timeline::{Position, PositionParseError, Timeline};
pub use tween::{Callback, Props, TweenSpec};
