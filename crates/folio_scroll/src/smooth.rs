//! Smooth-scroll container
//!
//! Wraps the page's scroll root and eases the visible scroll offset towards
//! a wheel-driven target. The eased offset is the scroll source of truth for
//! everything downstream; triggers read it through [`ScrollerProxy`].
//!
//! # State machine
//!
//! ```text
//! Idle --wheel--> Easing --settled--> Idle
//!   |               |
//!   +--scroll_to--> Animating --finished--> Idle
//! ```
//!
//! A wheel event during a programmatic scroll hands control back to the
//! user (`Animating -> Easing`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use folio_animation::Easing;
use folio_core::{lock, ElementId, StageHandle};
use slotmap::{new_key_type, SlotMap};

use crate::trigger::ScrollerProxy;

/// Reference frame-time the lerp factor is expressed against (60 fps)
const FRAME_MS: f32 = 1000.0 / 60.0;

/// Distance below which easing snaps to its target
const SETTLE_EPSILON: f32 = 0.1;

// ============================================================================
// Configuration
// ============================================================================

/// Smooth-scroll configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothScrollConfig {
    /// Ease wheel input (default: true)
    pub smooth: bool,
    /// Ease touch input as well (default: true)
    pub smooth_touch: bool,
    /// Wheel delta multiplier (default: 1.0)
    pub multiplier: f32,
    /// Class added to observed elements once they enter the viewport
    pub reveal_class: String,
    /// Track scroll direction (default: true)
    pub direction_tracking: bool,
    /// Fraction of the remaining distance covered per 60 fps frame (default: 0.1)
    pub lerp: f32,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            smooth: true,
            smooth_touch: true,
            multiplier: 1.0,
            reveal_class: "is-reveal".to_string(),
            direction_tracking: true,
            lerp: 0.1,
        }
    }
}

/// Options for a programmatic scroll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTo {
    pub duration_ms: f32,
    pub easing: Easing,
    /// Jump without easing even if smoothing is on
    pub disable_lerp: bool,
}

impl ScrollTo {
    /// Instantaneous jump
    pub fn instant() -> Self {
        Self {
            duration_ms: 0.0,
            easing: Easing::Linear,
            disable_lerp: true,
        }
    }

    /// Animated scroll over `duration_ms`
    pub fn animated(duration_ms: f32, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
            disable_lerp: false,
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// Scroll direction of the most recent movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Up,
    #[default]
    Down,
}

/// Eased scroll position as seen by listeners
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    pub offset: f32,
    pub direction: Direction,
}

/// Container phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothPhase {
    #[default]
    Idle,
    /// Lerping towards a wheel target
    Easing,
    /// Running a programmatic scroll
    Animating,
}

/// Inputs that move the container between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothEvent {
    Wheel,
    ScrollTo,
    Jump,
    Settled,
}

impl SmoothPhase {
    /// Phase after `event`, or `None` if the event does not change it
    pub fn on_event(&self, event: SmoothEvent) -> Option<Self> {
        match (self, event) {
            (SmoothPhase::Idle, SmoothEvent::Wheel) => Some(SmoothPhase::Easing),
            (SmoothPhase::Animating, SmoothEvent::Wheel) => Some(SmoothPhase::Easing),
            (SmoothPhase::Easing, SmoothEvent::Wheel) => None,

            (SmoothPhase::Animating, SmoothEvent::ScrollTo) => None,
            (_, SmoothEvent::ScrollTo) => Some(SmoothPhase::Animating),

            (SmoothPhase::Idle, SmoothEvent::Jump | SmoothEvent::Settled) => None,
            (_, SmoothEvent::Jump | SmoothEvent::Settled) => Some(SmoothPhase::Idle),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SmoothPhase::Idle)
    }
}

/// Most recent commands kept for diagnostics
pub const COMMAND_LOG_CAPACITY: usize = 64;

/// Commands received by the container, recorded for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollCommand {
    Wheel { delta: f32 },
    ScrollTo { target: f32, duration_ms: f32, disable_lerp: bool },
    Update { limit: f32 },
    Destroy,
}

new_key_type! {
    /// Handle to a scroll listener
    pub struct ScrollListenerId;
}

/// Scroll listener callback
pub type ScrollListener = Arc<dyn Fn(ScrollState) + Send + Sync>;

struct ScrollAnimation {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

struct SmoothInner {
    stage: StageHandle,
    container: ElementId,
    config: SmoothScrollConfig,
    phase: SmoothPhase,
    offset: f32,
    target: f32,
    limit: f32,
    direction: Direction,
    animation: Option<ScrollAnimation>,
    listeners: SlotMap<ScrollListenerId, ScrollListener>,
    observed: Vec<ElementId>,
    commands: VecDeque<ScrollCommand>,
    scroll_tos: usize,
    destroyed: bool,
}

impl SmoothInner {
    fn record(&mut self, command: ScrollCommand) {
        if matches!(command, ScrollCommand::ScrollTo { .. }) {
            self.scroll_tos += 1;
        }
        if self.commands.len() == COMMAND_LOG_CAPACITY {
            self.commands.pop_front();
        }
        self.commands.push_back(command);
    }

    fn transition(&mut self, event: SmoothEvent) {
        if let Some(next) = self.phase.on_event(event) {
            tracing::trace!("smooth scroll: {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
    }

    /// Move the eased offset, returning the state to publish if it changed
    fn set_offset(&mut self, offset: f32) -> Option<ScrollState> {
        let offset = offset.clamp(0.0, self.limit);
        if offset == self.offset {
            return None;
        }
        if self.config.direction_tracking {
            self.direction = if offset > self.offset {
                Direction::Down
            } else {
                Direction::Up
            };
        }
        self.offset = offset;
        self.reveal_observed();
        Some(self.state())
    }

    fn state(&self) -> ScrollState {
        ScrollState {
            offset: self.offset,
            direction: self.direction,
        }
    }

    fn reveal_observed(&mut self) {
        if self.observed.is_empty() {
            return;
        }
        let offset = self.offset;
        let class = self.config.reveal_class.clone();
        let observed = std::mem::take(&mut self.observed);
        let pending = self
            .stage
            .with_tree(|tree| {
                let view_bottom = offset + tree.viewport().height;
                observed
                    .iter()
                    .copied()
                    .filter(|el| {
                        let (Some(top), Some(height)) =
                            (tree.effective_top(*el), tree.effective_height(*el))
                        else {
                            return false;
                        };
                        if top < view_bottom && top + height > offset {
                            tree.add_class(*el, &class);
                            false
                        } else {
                            true
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        self.observed = pending;
    }

    fn listeners(&self) -> Vec<ScrollListener> {
        self.listeners.values().cloned().collect()
    }
}

fn notify(listeners: Vec<ScrollListener>, state: Option<ScrollState>) {
    if let Some(state) = state {
        for listener in listeners {
            listener(state);
        }
    }
}

// ============================================================================
// Owner and handle
// ============================================================================

/// The smooth-scroll container
pub struct SmoothScroll {
    inner: Arc<Mutex<SmoothInner>>,
}

impl SmoothScroll {
    /// Wrap `container`; the scroll limit is computed by [`SmoothScrollHandle::update`]
    pub fn new(stage: StageHandle, container: ElementId, config: SmoothScrollConfig) -> Self {
        tracing::debug!(
            "smooth scroll: created (smooth={}, multiplier={}, lerp={})",
            config.smooth,
            config.multiplier,
            config.lerp
        );
        let inner = SmoothInner {
            stage,
            container,
            config,
            phase: SmoothPhase::Idle,
            offset: 0.0,
            target: 0.0,
            limit: 0.0,
            direction: Direction::Down,
            animation: None,
            listeners: SlotMap::with_key(),
            observed: Vec::new(),
            commands: VecDeque::with_capacity(COMMAND_LOG_CAPACITY),
            scroll_tos: 0,
            destroyed: false,
        };
        let scroll = Self {
            inner: Arc::new(Mutex::new(inner)),
        };
        scroll.handle().update();
        scroll
    }

    pub fn handle(&self) -> SmoothScrollHandle {
        SmoothScrollHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// A weak handle to the smooth-scroll container
#[derive(Clone)]
pub struct SmoothScrollHandle {
    inner: Weak<Mutex<SmoothInner>>,
}

impl SmoothScrollHandle {
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn with_inner<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut SmoothInner) -> R,
    {
        self.inner.upgrade().map(|inner| f(&mut lock(&inner)))
    }

    /// The wrapped scroll root
    pub fn container(&self) -> Option<ElementId> {
        self.with_inner(|inner| inner.container)
    }

    pub fn config(&self) -> Option<SmoothScrollConfig> {
        self.with_inner(|inner| inner.config.clone())
    }

    /// Apply wheel input; ignored while the page has scrolling locked
    pub fn wheel(&self, delta: f32) -> bool {
        let published = self.with_inner(|inner| {
            if inner.destroyed || inner.stage.is_scroll_locked() {
                return None;
            }
            inner.record(ScrollCommand::Wheel { delta });
            inner.animation = None;
            inner.target = (inner.target + delta * inner.config.multiplier).clamp(0.0, inner.limit);

            if inner.config.smooth {
                inner.transition(SmoothEvent::Wheel);
                Some(None)
            } else {
                let target = inner.target;
                let state = inner.set_offset(target);
                Some(state.map(|s| (inner.listeners(), s)))
            }
        });
        match published.flatten() {
            Some(Some((listeners, state))) => {
                notify(listeners, Some(state));
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// Scroll programmatically to `y`
    pub fn scroll_to(&self, y: f32, options: ScrollTo) {
        let published = self.with_inner(|inner| {
            if inner.destroyed {
                return None;
            }
            let target = y.clamp(0.0, inner.limit);
            inner.record(ScrollCommand::ScrollTo {
                target,
                duration_ms: options.duration_ms,
                disable_lerp: options.disable_lerp,
            });
            inner.target = target;

            if options.duration_ms <= 0.0 {
                inner.animation = None;
                inner.transition(SmoothEvent::Jump);
                let state = inner.set_offset(target);
                return state.map(|s| (inner.listeners(), s));
            }

            inner.animation = Some(ScrollAnimation {
                from: inner.offset,
                to: target,
                elapsed: 0.0,
                duration: options.duration_ms,
                easing: options.easing,
            });
            inner.transition(SmoothEvent::ScrollTo);
            None
        });
        if let Some((listeners, state)) = published.flatten() {
            notify(listeners, Some(state));
        }
    }

    /// Advance easing by `dt_ms`; returns true while still moving
    pub fn tick(&self, dt_ms: f32) -> bool {
        let result = self.with_inner(|inner| {
            let next = match inner.phase {
                SmoothPhase::Idle => return (false, None),
                SmoothPhase::Easing => {
                    let factor = 1.0 - (1.0 - inner.config.lerp.clamp(0.0, 1.0)).powf(dt_ms / FRAME_MS);
                    let next = inner.offset + (inner.target - inner.offset) * factor;
                    if (inner.target - next).abs() < SETTLE_EPSILON {
                        inner.transition(SmoothEvent::Settled);
                        inner.target
                    } else {
                        next
                    }
                }
                SmoothPhase::Animating => {
                    let step = inner.animation.as_mut().map(|animation| {
                        animation.elapsed += dt_ms;
                        let p = (animation.elapsed / animation.duration).min(1.0);
                        let eased = animation.easing.apply(p);
                        (animation.from + (animation.to - animation.from) * eased, p >= 1.0)
                    });
                    match step {
                        Some((next, done)) => {
                            if done {
                                inner.animation = None;
                                inner.transition(SmoothEvent::Settled);
                            }
                            next
                        }
                        None => {
                            inner.transition(SmoothEvent::Settled);
                            inner.offset
                        }
                    }
                }
            };
            let state = inner.set_offset(next);
            let published = state.map(|s| (inner.listeners(), s));
            (inner.phase.is_active(), published)
        });

        match result {
            Some((moving, published)) => {
                if let Some((listeners, state)) = published {
                    notify(listeners, Some(state));
                }
                moving
            }
            None => false,
        }
    }

    /// Recompute the scroll limit from the container's current height
    pub fn update(&self) {
        self.with_inner(|inner| {
            if inner.destroyed {
                return;
            }
            let container = inner.container;
            let limit = inner
                .stage
                .with_tree(|tree| {
                    let height = tree.effective_height(container).unwrap_or(0.0);
                    (height - tree.viewport().height).max(0.0)
                })
                .unwrap_or(0.0);
            inner.limit = limit;
            inner.target = inner.target.min(limit);
            inner.offset = inner.offset.min(limit);
            inner.record(ScrollCommand::Update { limit });
            tracing::trace!("smooth scroll: limit {}", limit);
        });
    }

    /// Register a listener called with every eased position change
    pub fn on_scroll<F>(&self, f: F) -> Option<ScrollListenerId>
    where
        F: Fn(ScrollState) + Send + Sync + 'static,
    {
        self.with_inner(|inner| inner.listeners.insert(Arc::new(f)))
    }

    pub fn off(&self, id: ScrollListenerId) -> bool {
        self.with_inner(|inner| inner.listeners.remove(id).is_some())
            .unwrap_or(false)
    }

    pub fn listener_count(&self) -> usize {
        self.with_inner(|inner| inner.listeners.len()).unwrap_or(0)
    }

    /// Add the reveal class to `element` once it is inside the viewport
    pub fn observe(&self, element: ElementId) {
        self.with_inner(|inner| {
            if !inner.observed.contains(&element) {
                inner.observed.push(element);
            }
            inner.reveal_observed();
        });
    }

    /// Stop scrolling and drop all listeners; later calls do nothing
    pub fn destroy(&self) {
        self.with_inner(|inner| {
            if inner.destroyed {
                return;
            }
            inner.destroyed = true;
            inner.listeners.clear();
            inner.observed.clear();
            inner.animation = None;
            inner.phase = SmoothPhase::Idle;
            inner.record(ScrollCommand::Destroy);
            tracing::debug!("smooth scroll: destroyed");
        });
    }

    pub fn is_destroyed(&self) -> bool {
        self.with_inner(|inner| inner.destroyed).unwrap_or(true)
    }

    pub fn state(&self) -> ScrollState {
        self.with_inner(|inner| inner.state()).unwrap_or_default()
    }

    pub fn phase(&self) -> SmoothPhase {
        self.with_inner(|inner| inner.phase).unwrap_or_default()
    }

    pub fn limit(&self) -> f32 {
        self.with_inner(|inner| inner.limit).unwrap_or(0.0)
    }

    /// The last [`COMMAND_LOG_CAPACITY`] commands, oldest first
    pub fn commands(&self) -> Vec<ScrollCommand> {
        self.with_inner(|inner| inner.commands.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of programmatic scroll commands received since creation
    pub fn scroll_to_count(&self) -> usize {
        self.with_inner(|inner| inner.scroll_tos).unwrap_or(0)
    }
}

impl ScrollerProxy for SmoothScrollHandle {
    fn scroll_top(&self) -> f32 {
        self.state().offset
    }

    fn set_scroll_top(&self, value: f32) {
        self.scroll_to(value, ScrollTo::instant());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Layout, Stage, Viewport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup(height: f32) -> (Stage, ElementId, SmoothScroll) {
        let stage = Stage::new(Viewport::new(1440.0, 900.0));
        let handle = stage.handle();
        let container = handle.create("main", None).unwrap();
        handle.set_layout(container, Layout::new(0.0, 0.0, 1440.0, height));
        let scroll = SmoothScroll::new(handle, container, SmoothScrollConfig::default());
        (stage, container, scroll)
    }

    #[test]
    fn test_phase_transitions() {
        assert_eq!(SmoothPhase::Idle.on_event(SmoothEvent::Wheel), Some(SmoothPhase::Easing));
        assert_eq!(SmoothPhase::Easing.on_event(SmoothEvent::Wheel), None);
        assert_eq!(
            SmoothPhase::Easing.on_event(SmoothEvent::ScrollTo),
            Some(SmoothPhase::Animating)
        );
        assert_eq!(
            SmoothPhase::Animating.on_event(SmoothEvent::Wheel),
            Some(SmoothPhase::Easing)
        );
        assert_eq!(SmoothPhase::Easing.on_event(SmoothEvent::Settled), Some(SmoothPhase::Idle));
    }

    #[test]
    fn test_wheel_eases_towards_target() {
        let (_stage, _container, scroll) = setup(5000.0);
        let handle = scroll.handle();
        assert_eq!(handle.limit(), 4100.0);

        handle.wheel(500.0);
        assert_eq!(handle.phase(), SmoothPhase::Easing);
        handle.tick(FRAME_MS);
        let first = handle.state().offset;
        assert!(first > 0.0 && first < 500.0);
        assert_eq!(handle.state().direction, Direction::Down);

        for _ in 0..200 {
            handle.tick(FRAME_MS);
        }
        assert_eq!(handle.state().offset, 500.0);
        assert_eq!(handle.phase(), SmoothPhase::Idle);
    }

    #[test]
    fn test_wheel_clamps_to_limit() {
        let (_stage, _container, scroll) = setup(1500.0);
        let handle = scroll.handle();
        handle.wheel(10_000.0);
        for _ in 0..300 {
            handle.tick(FRAME_MS);
        }
        assert_eq!(handle.state().offset, 600.0);
    }

    #[test]
    fn test_wheel_ignored_while_locked() {
        let (stage, _container, scroll) = setup(5000.0);
        stage.handle().set_scroll_locked(true);
        assert!(!scroll.handle().wheel(100.0));
        assert_eq!(scroll.handle().phase(), SmoothPhase::Idle);
    }

    #[test]
    fn test_scroll_to_animates_with_easing() {
        let (_stage, _container, scroll) = setup(5000.0);
        let handle = scroll.handle();
        handle.scroll_to(1000.0, ScrollTo::animated(1000.0, Easing::Linear));
        assert_eq!(handle.phase(), SmoothPhase::Animating);

        handle.tick(500.0);
        assert_eq!(handle.state().offset, 500.0);
        handle.tick(500.0);
        assert_eq!(handle.state().offset, 1000.0);
        assert_eq!(handle.phase(), SmoothPhase::Idle);
        assert_eq!(handle.scroll_to_count(), 1);
    }

    #[test]
    fn test_instant_jump_notifies_listeners() {
        let (_stage, _container, scroll) = setup(5000.0);
        let handle = scroll.handle();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        handle.on_scroll(move |state| {
            assert_eq!(state.offset, 300.0);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handle.set_scroll_top(300.0);
        assert_eq!(handle.scroll_top(), 300.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_observe_adds_reveal_class() {
        let (stage, container, scroll) = setup(5000.0);
        let handle = scroll.handle();
        let near = stage.handle().create("near", Some(container)).unwrap();
        let far = stage.handle().create("far", Some(container)).unwrap();
        stage.handle().set_layout(near, Layout::new(100.0, 0.0, 1440.0, 200.0));
        stage.handle().set_layout(far, Layout::new(3000.0, 0.0, 1440.0, 200.0));

        handle.observe(near);
        handle.observe(far);
        assert!(stage.handle().has_class(near, "is-reveal"));
        assert!(!stage.handle().has_class(far, "is-reveal"));

        handle.set_scroll_top(2500.0);
        assert!(stage.handle().has_class(far, "is-reveal"));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (_stage, _container, scroll) = setup(5000.0);
        let handle = scroll.handle();
        handle.on_scroll(|_| {});
        handle.destroy();
        handle.destroy();
        assert!(handle.is_destroyed());
        assert_eq!(handle.listener_count(), 0);
        assert!(!handle.wheel(100.0));
        let destroys = handle
            .commands()
            .iter()
            .filter(|c| **c == ScrollCommand::Destroy)
            .count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn test_command_log_is_bounded() {
        let (_stage, _container, scroll) = setup(5000.0);
        let handle = scroll.handle();
        handle.scroll_to(400.0, ScrollTo::instant());
        for i in 0..10_000 {
            handle.wheel(if i % 2 == 0 { 10.0 } else { -10.0 });
        }
        handle.scroll_to(800.0, ScrollTo::instant());

        let commands = handle.commands();
        assert_eq!(commands.len(), COMMAND_LOG_CAPACITY);
        assert!(matches!(
            commands.last(),
            Some(ScrollCommand::ScrollTo { target, .. }) if *target == 800.0
        ));
        assert_eq!(handle.scroll_to_count(), 2);
    }
}
