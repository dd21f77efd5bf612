//! Pointer event dispatch types
//!
//! Handlers are registered per element and kind on the stage. Dispatch
//! collects the matching handlers under the stage lock and invokes them
//! after releasing it, so a handler may freely call back into the stage
//! or into any animation/scroll handle.

use std::sync::Arc;

use slotmap::new_key_type;

use crate::element::ElementId;

new_key_type! {
    /// Handle to a registered pointer listener
    pub struct ListenerId;
}

/// Kinds of pointer events routed to elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Pointer moved onto the element (does not bubble)
    Enter,
    /// Pointer moved off the element (does not bubble)
    Leave,
    /// Primary button click
    Click,
}

/// A pointer event as seen by handlers
#[derive(Debug, Clone)]
pub struct PointerEvent {
    pub target: ElementId,
    pub kind: PointerKind,
    default_prevented: bool,
}

impl PointerEvent {
    pub fn new(target: ElementId, kind: PointerKind) -> Self {
        Self {
            target,
            kind,
            default_prevented: false,
        }
    }

    /// Suppress the default action (for links: the native anchor jump)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Pointer handler callback
pub type PointerHandler = Arc<dyn Fn(&mut PointerEvent) + Send + Sync>;

pub(crate) struct Listener {
    pub(crate) element: ElementId,
    pub(crate) kind: PointerKind,
    pub(crate) handler: PointerHandler,
}
