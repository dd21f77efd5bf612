//! Folio Core
//!
//! The headless page model shared by the animation, scroll and site crates:
//!
//! - **Element tree**: labelled nodes with layout geometry and style values
//! - **Pin spacing**: document height inserted by pinned regions
//! - **Pointer dispatch**: enter/leave/click handlers with default actions
//! - **Scroll lock**: page-level flag honoured by native scrolling

pub mod element;
pub mod events;
pub mod stage;
pub mod sync;

pub use element::{Element, ElementId, Layout, Property, Style, Viewport};
pub use events::{ListenerId, PointerEvent, PointerHandler, PointerKind};
pub use stage::{ElementTree, Stage, StageHandle};
pub use sync::lock;
