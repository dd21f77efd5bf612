//! The stage: a shared element tree
//!
//! `Stage` owns the tree; `StageHandle` is a weak reference handed to
//! animation, scroll and page controllers. Every handle operation is a
//! no-op (returning `None`/`false`) once the stage has been dropped, which
//! keeps teardown paths safe after a full unmount.

use std::sync::{Arc, Mutex, Weak};

use slotmap::SlotMap;

use crate::element::{Element, ElementId, Layout, Property, Viewport};
use crate::events::{Listener, ListenerId, PointerEvent, PointerHandler, PointerKind};
use crate::sync::lock;

/// The element tree plus page-level state (viewport, scroll lock, native scroll)
pub struct ElementTree {
    elements: SlotMap<ElementId, Element>,
    root: ElementId,
    viewport: Viewport,
    scroll_locked: bool,
    native_scroll: f32,
    native_jumps: u32,
    listeners: SlotMap<ListenerId, Listener>,
}

impl ElementTree {
    pub fn new(viewport: Viewport) -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(Element::new("document", None));
        Self {
            elements,
            root,
            viewport,
            scroll_locked: false,
            native_scroll: 0.0,
            native_jumps: 0,
            listeners: SlotMap::with_key(),
        }
    }

    /// The document root element
    pub fn root(&self) -> ElementId {
        self.root
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Create an element under `parent` (the root when `None`)
    ///
    /// Returns `None` if the parent does not exist.
    pub fn create(&mut self, label: &str, parent: Option<ElementId>) -> Option<ElementId> {
        let parent = parent.unwrap_or(self.root);
        if !self.elements.contains_key(parent) {
            return None;
        }
        let id = self.elements.insert(Element::new(label, Some(parent)));
        if let Some(p) = self.elements.get_mut(parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Remove an element and its whole subtree, including their listeners
    pub fn remove(&mut self, id: ElementId) -> bool {
        if id == self.root || !self.elements.contains_key(id) {
            return false;
        }

        if let Some(parent) = self.elements.get(id).and_then(|e| e.parent) {
            if let Some(p) = self.elements.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }

        let mut stack = vec![id];
        let mut removed = Vec::new();
        while let Some(next) = stack.pop() {
            if let Some(element) = self.elements.remove(next) {
                stack.extend(element.children.iter().copied());
                removed.push(next);
            }
        }
        self.listeners
            .retain(|_, listener| !removed.contains(&listener.element));

        tracing::trace!("stage: removed {} element(s)", removed.len());
        true
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.elements
            .get(id)
            .map(|e| e.children.to_vec())
            .unwrap_or_default()
    }

    /// Find the first element with the given label (anchor id)
    pub fn find(&self, label: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, e)| e.label == label)
            .map(|(id, _)| id)
    }

    /// Check whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = self.elements.get(id).and_then(|e| e.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.elements.get(p).and_then(|e| e.parent);
        }
        false
    }

    pub fn set_href(&mut self, id: ElementId, href: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(e) => {
                e.href = Some(href.to_string());
                true
            }
            None => false,
        }
    }

    pub fn href(&self, id: ElementId) -> Option<String> {
        self.elements.get(id).and_then(|e| e.href.clone())
    }

    // =========================================================================
    // Style
    // =========================================================================

    pub fn style(&self, id: ElementId, property: Property) -> Option<f32> {
        self.elements.get(id).map(|e| e.style.get(property))
    }

    pub fn set_style(&mut self, id: ElementId, property: Property, value: f32) -> bool {
        match self.elements.get_mut(id) {
            Some(e) => {
                e.style.set(property, value);
                true
            }
            None => false,
        }
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(e) => e.classes.insert(class.to_string()),
            None => false,
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements
            .get(id)
            .map(|e| e.has_class(class))
            .unwrap_or(false)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn layout(&self, id: ElementId) -> Option<Layout> {
        self.elements.get(id).map(|e| e.layout)
    }

    pub fn set_layout(&mut self, id: ElementId, layout: Layout) -> bool {
        match self.elements.get_mut(id) {
            Some(e) => {
                e.layout = layout;
                true
            }
            None => false,
        }
    }

    /// Record the document height a pinned element pushes its successors down by
    pub fn set_pin_spacing(&mut self, id: ElementId, spacing: f32) -> bool {
        match self.elements.get_mut(id) {
            Some(e) => {
                e.pin_spacing = spacing.max(0.0);
                true
            }
            None => false,
        }
    }

    /// Document top of an element including pin spacing of everything above it
    ///
    /// Spacing of ancestors and of the element itself does not shift it.
    pub fn effective_top(&self, id: ElementId) -> Option<f32> {
        let element = self.elements.get(id)?;
        let top = element.layout.top;
        let shift: f32 = self
            .elements
            .iter()
            .filter(|(other, e)| {
                *other != id
                    && e.pin_spacing > 0.0
                    && e.layout.top < top
                    && !self.is_ancestor(*other, id)
            })
            .map(|(_, e)| e.pin_spacing)
            .sum();
        Some(top + shift)
    }

    /// Height of an element including pin spacing of its descendants
    pub fn effective_height(&self, id: ElementId) -> Option<f32> {
        let element = self.elements.get(id)?;
        let extra: f32 = self
            .elements
            .iter()
            .filter(|(other, e)| e.pin_spacing > 0.0 && self.is_ancestor(id, *other))
            .map(|(_, e)| e.pin_spacing)
            .sum();
        Some(element.layout.height + extra)
    }

    // =========================================================================
    // Page state
    // =========================================================================

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    /// Native (un-eased) document scroll position
    pub fn native_scroll(&self) -> f32 {
        self.native_scroll
    }

    pub fn set_native_scroll(&mut self, offset: f32) {
        self.native_scroll = offset.max(0.0);
    }

    /// Number of native anchor jumps the page has performed
    pub fn native_jumps(&self) -> u32 {
        self.native_jumps
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn add_listener(
        &mut self,
        element: ElementId,
        kind: PointerKind,
        handler: PointerHandler,
    ) -> Option<ListenerId> {
        if !self.elements.contains_key(element) {
            return None;
        }
        Some(self.listeners.insert(Listener {
            element,
            kind,
            handler,
        }))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    /// Number of listeners attached to an element
    pub fn listener_count(&self, element: ElementId) -> usize {
        self.listeners
            .values()
            .filter(|l| l.element == element)
            .count()
    }

    /// Number of listeners on the whole tree
    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }

    fn handlers_for(&self, element: ElementId, kind: PointerKind) -> Vec<PointerHandler> {
        self.listeners
            .values()
            .filter(|l| l.element == element && l.kind == kind)
            .map(|l| Arc::clone(&l.handler))
            .collect()
    }

    fn follow_anchor(&mut self, link: ElementId) -> bool {
        let Some(href) = self.href(link) else {
            return false;
        };
        let Some(anchor) = href.strip_prefix('#') else {
            return false;
        };
        let Some(target) = self.find(anchor) else {
            return false;
        };
        let top = self.effective_top(target).unwrap_or(0.0);
        self.set_native_scroll(top);
        self.native_jumps += 1;
        tracing::debug!("stage: native anchor jump to #{} ({}px)", anchor, top);
        true
    }
}

/// Owner of the shared element tree
pub struct Stage {
    inner: Arc<Mutex<ElementTree>>,
}

impl Stage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ElementTree::new(viewport))),
        }
    }

    /// Get a weak handle for passing to controllers
    pub fn handle(&self) -> StageHandle {
        StageHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Run a closure with exclusive access to the tree
    pub fn with_tree<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ElementTree) -> R,
    {
        f(&mut lock(&self.inner))
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

/// A weak handle to the stage
#[derive(Clone)]
pub struct StageHandle {
    inner: Weak<Mutex<ElementTree>>,
}

impl StageHandle {
    /// A handle that is never alive (useful as a placeholder)
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// Check if the stage is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Run a closure with exclusive access to the tree
    ///
    /// Returns `None` if the stage has been dropped.
    pub fn with_tree<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut ElementTree) -> R,
    {
        self.inner.upgrade().map(|inner| f(&mut lock(&inner)))
    }

    pub fn root(&self) -> Option<ElementId> {
        self.with_tree(|t| t.root())
    }

    pub fn create(&self, label: &str, parent: Option<ElementId>) -> Option<ElementId> {
        self.with_tree(|t| t.create(label, parent)).flatten()
    }

    pub fn remove(&self, id: ElementId) -> bool {
        self.with_tree(|t| t.remove(id)).unwrap_or(false)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.with_tree(|t| t.contains(id)).unwrap_or(false)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.with_tree(|t| t.children(id)).unwrap_or_default()
    }

    pub fn find(&self, label: &str) -> Option<ElementId> {
        self.with_tree(|t| t.find(label)).flatten()
    }

    pub fn label(&self, id: ElementId) -> Option<String> {
        self.with_tree(|t| t.get(id).map(|e| e.label().to_string()))
            .flatten()
    }

    pub fn set_href(&self, id: ElementId, href: &str) -> bool {
        self.with_tree(|t| t.set_href(id, href)).unwrap_or(false)
    }

    pub fn style(&self, id: ElementId, property: Property) -> Option<f32> {
        self.with_tree(|t| t.style(id, property)).flatten()
    }

    pub fn set_style(&self, id: ElementId, property: Property, value: f32) -> bool {
        self.with_tree(|t| t.set_style(id, property, value))
            .unwrap_or(false)
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.with_tree(|t| t.has_class(id, class)).unwrap_or(false)
    }

    pub fn layout(&self, id: ElementId) -> Option<Layout> {
        self.with_tree(|t| t.layout(id)).flatten()
    }

    pub fn set_layout(&self, id: ElementId, layout: Layout) -> bool {
        self.with_tree(|t| t.set_layout(id, layout)).unwrap_or(false)
    }

    pub fn effective_top(&self, id: ElementId) -> Option<f32> {
        self.with_tree(|t| t.effective_top(id)).flatten()
    }

    pub fn effective_height(&self, id: ElementId) -> Option<f32> {
        self.with_tree(|t| t.effective_height(id)).flatten()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.with_tree(|t| t.viewport())
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.with_tree(|t| t.set_viewport(viewport));
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.with_tree(|t| t.is_scroll_locked()).unwrap_or(false)
    }

    pub fn set_scroll_locked(&self, locked: bool) {
        self.with_tree(|t| t.set_scroll_locked(locked));
    }

    pub fn native_scroll(&self) -> f32 {
        self.with_tree(|t| t.native_scroll()).unwrap_or(0.0)
    }

    pub fn native_jumps(&self) -> u32 {
        self.with_tree(|t| t.native_jumps()).unwrap_or(0)
    }

    /// Scroll the document natively; ignored while scrolling is locked
    pub fn scroll_native_by(&self, delta: f32) -> bool {
        self.with_tree(|t| {
            if t.is_scroll_locked() {
                return false;
            }
            let next = t.native_scroll() + delta;
            t.set_native_scroll(next);
            true
        })
        .unwrap_or(false)
    }

    pub fn add_listener<F>(&self, element: ElementId, kind: PointerKind, f: F) -> Option<ListenerId>
    where
        F: Fn(&mut PointerEvent) + Send + Sync + 'static,
    {
        self.with_tree(|t| t.add_listener(element, kind, Arc::new(f)))
            .flatten()
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.with_tree(|t| t.remove_listener(id)).unwrap_or(false)
    }

    pub fn listener_count(&self, element: ElementId) -> usize {
        self.with_tree(|t| t.listener_count(element)).unwrap_or(0)
    }

    pub fn total_listeners(&self) -> usize {
        self.with_tree(|t| t.total_listeners()).unwrap_or(0)
    }

    /// Dispatch a pointer event to the element's handlers
    ///
    /// Handlers run after the stage lock is released.
    pub fn dispatch(&self, element: ElementId, kind: PointerKind) -> Option<PointerEvent> {
        let handlers = self.with_tree(|t| {
            if t.contains(element) {
                Some(t.handlers_for(element, kind))
            } else {
                None
            }
        })??;

        let mut event = PointerEvent::new(element, kind);
        for handler in handlers {
            handler(&mut event);
        }
        Some(event)
    }

    /// Click an element, following its `#anchor` href unless a handler prevented it
    pub fn click(&self, element: ElementId) -> Option<PointerEvent> {
        let event = self.dispatch(element, PointerKind::Click)?;
        if !event.is_default_prevented() {
            self.with_tree(|t| t.follow_anchor(element));
        }
        Some(event)
    }
}
