//! Viewport triggers
//!
//! A registry of scroll-position triggers. Each trigger watches one element
//! and maps the scroll offset onto a `Before`/`Active`/`After` phase; phase
//! changes apply toggle actions to an animation, and scrubbed triggers seek
//! the animation to the scroll progress instead.
//!
//! The registry reads the scroll offset through a [`ScrollerProxy`] bound
//! with [`TriggerHandle::scroller_proxy`]. Every registration must name the
//! same [`ScrollerRef`]; anything else is rejected with
//! [`ScrollError::ForeignScroller`].
//!
//! Animation commands and callbacks are collected under the registry lock
//! and applied after it is released. Lock order is registry, smooth scroll,
//! scheduler, stage.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use folio_animation::{AnimationHandle, AnimationRef};
use folio_core::{lock, ElementId, Property, StageHandle};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{Result, ScrollError};
use crate::threshold::{Edge, EndThreshold, Scrub, Threshold, ToggleAction, ToggleActions};

/// Progress difference below which smoothed scrubbing snaps to its target
const SCRUB_EPSILON: f32 = 1e-4;

/// Scroll position source used by the trigger registry
pub trait ScrollerProxy: Send + Sync {
    /// Current (eased) scroll offset
    fn scroll_top(&self) -> f32;

    /// Jump to `value` without animating
    fn set_scroll_top(&self, value: f32);
}

/// Identity of the scroll container triggers are evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrollerRef(ElementId);

impl ScrollerRef {
    pub fn new(container: ElementId) -> Self {
        Self(container)
    }

    pub fn element(&self) -> ElementId {
        self.0
    }
}

new_key_type! {
    /// Handle to a registered trigger
    pub struct TriggerId;
    /// Handle to a refresh listener
    pub struct RefreshListenerId;
}

/// Called with `true` when a trigger becomes active and `false` when it stops
pub type ToggleCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Called during refresh, after pin spacing and before boundaries
pub type RefreshListener = Arc<dyn Fn() + Send + Sync>;

// ============================================================================
// Configuration
// ============================================================================

/// A trigger registration
#[derive(Clone)]
pub struct TriggerConfig {
    pub(crate) name: Option<String>,
    pub(crate) trigger: ElementId,
    pub(crate) scroller: ScrollerRef,
    pub(crate) start: Threshold,
    pub(crate) end: EndThreshold,
    pub(crate) toggle_actions: ToggleActions,
    pub(crate) scrub: Scrub,
    pub(crate) pin: bool,
    pub(crate) invalidate_on_refresh: bool,
    pub(crate) animation: Option<AnimationRef>,
    pub(crate) on_toggle: Option<ToggleCallback>,
}

impl TriggerConfig {
    /// Watch `trigger` inside `scroller`, active from `"top bottom"` to `"bottom top"`
    pub fn new(trigger: ElementId, scroller: ScrollerRef) -> Self {
        Self {
            name: None,
            trigger,
            scroller,
            start: Threshold::new(Edge::Top, Edge::Bottom),
            end: EndThreshold::At(Threshold::new(Edge::Bottom, Edge::Top)),
            toggle_actions: ToggleActions::default(),
            scrub: Scrub::Off,
            pin: false,
            invalidate_on_refresh: false,
            animation: None,
            on_toggle: None,
        }
    }

    /// Name used by [`TriggerHandle::get_by_id`] and [`TriggerHandle::kill_by_id`]
    pub fn id(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn start(mut self, start: Threshold) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: impl Into<EndThreshold>) -> Self {
        self.end = end.into();
        self
    }

    pub fn toggle_actions(mut self, actions: ToggleActions) -> Self {
        self.toggle_actions = actions;
        self
    }

    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    /// Hold the trigger element in place while active
    pub fn pin(mut self, pin: bool) -> Self {
        self.pin = pin;
        self
    }

    /// Re-render scrubbed values from scratch after each refresh
    pub fn invalidate_on_refresh(mut self, invalidate: bool) -> Self {
        self.invalidate_on_refresh = invalidate;
        self
    }

    pub fn animation(mut self, animation: impl Into<AnimationRef>) -> Self {
        self.animation = Some(animation.into());
        self
    }

    pub fn on_toggle<F: Fn(bool) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_toggle = Some(Arc::new(f));
        self
    }

    pub fn trigger(&self) -> ElementId {
        self.trigger
    }
}

impl fmt::Debug for TriggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerConfig")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("toggle_actions", &self.toggle_actions)
            .field("scrub", &self.scrub)
            .field("pin", &self.pin)
            .finish()
    }
}

// ============================================================================
// State
// ============================================================================

/// Where the scroll offset lies relative to a trigger's range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPhase {
    #[default]
    Before,
    Active,
    After,
}

impl TriggerPhase {
    fn at(offset: f32, start: f32, end: f32) -> Self {
        if offset < start {
            TriggerPhase::Before
        } else if offset > end {
            TriggerPhase::After
        } else {
            TriggerPhase::Active
        }
    }

    /// Toggle actions crossed when moving from `self` to `next`, in order
    fn crossings(self, next: Self, actions: &ToggleActions) -> SmallVec<[ToggleAction; 2]> {
        use TriggerPhase::*;
        let mut crossed = SmallVec::new();
        match (self, next) {
            (Before, Active) => crossed.push(actions.on_enter),
            (Active, After) => crossed.push(actions.on_leave),
            (Before, After) => {
                crossed.push(actions.on_enter);
                crossed.push(actions.on_leave);
            }
            (After, Active) => crossed.push(actions.on_enter_back),
            (Active, Before) => crossed.push(actions.on_leave_back),
            (After, Before) => {
                crossed.push(actions.on_enter_back);
                crossed.push(actions.on_leave_back);
            }
            _ => {}
        }
        crossed
    }

    /// Active-state changes when moving from `self` to `next`, in order
    fn toggles(self, next: Self) -> SmallVec<[bool; 2]> {
        use TriggerPhase::*;
        match (self, next) {
            (Before | After, Active) => smallvec::smallvec![true],
            (Active, Before | After) => smallvec::smallvec![false],
            (Before, After) | (After, Before) => smallvec::smallvec![true, false],
            _ => SmallVec::new(),
        }
    }
}

/// Read-only view of a registered trigger
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerInfo {
    pub id: TriggerId,
    pub name: Option<String>,
    pub trigger: ElementId,
    pub start: f32,
    pub end: f32,
    pub phase: TriggerPhase,
    pub pin: bool,
    pub scrub: Scrub,
    /// Scroll progress through the range (0..1)
    pub progress: f32,
    pub animation: Option<AnimationRef>,
}

struct TriggerEntry {
    config: TriggerConfig,
    start: f32,
    end: f32,
    phase: TriggerPhase,
    progress: f32,
    /// Progress last written to a scrubbed animation
    displayed: Option<f32>,
    seq: u64,
}

impl TriggerEntry {
    fn info(&self, id: TriggerId) -> TriggerInfo {
        TriggerInfo {
            id,
            name: self.config.name.clone(),
            trigger: self.config.trigger,
            start: self.start,
            end: self.end,
            phase: self.phase,
            pin: self.config.pin,
            scrub: self.config.scrub,
            progress: self.progress,
            animation: self.config.animation,
        }
    }
}

/// Work deferred until the registry lock is released
enum Pending {
    Action(AnimationRef, ToggleAction),
    Seek(AnimationRef, f32),
    Toggle(ToggleCallback, bool),
}

fn apply(animations: &AnimationHandle, pending: Vec<Pending>) {
    for work in pending {
        match work {
            Pending::Action(anim, action) => match action {
                ToggleAction::Play => animations.play(anim),
                ToggleAction::Pause => animations.pause(anim),
                ToggleAction::Resume => animations.resume(anim),
                ToggleAction::Reverse => animations.reverse(anim),
                ToggleAction::Restart => animations.restart(anim),
                ToggleAction::Reset => animations.reset(anim),
                ToggleAction::Complete => animations.complete(anim),
                ToggleAction::None => {}
            },
            Pending::Seek(anim, progress) => animations.seek_progress(anim, progress),
            Pending::Toggle(callback, active) => callback(active),
        }
    }
}

struct RegistryInner {
    stage: StageHandle,
    animations: AnimationHandle,
    scroller: Option<ScrollerRef>,
    proxy: Option<Arc<dyn ScrollerProxy>>,
    triggers: SlotMap<TriggerId, TriggerEntry>,
    refresh_listeners: SlotMap<RefreshListenerId, RefreshListener>,
    next_seq: u64,
    generation: u64,
}

impl RegistryInner {
    fn scroll_offset(&self) -> f32 {
        match &self.proxy {
            Some(proxy) => proxy.scroll_top(),
            None => self.stage.native_scroll(),
        }
    }

    /// Trigger ids in registration order
    fn ordered(&self) -> Vec<TriggerId> {
        let mut ids: Vec<(u64, TriggerId)> = self
            .triggers
            .iter()
            .map(|(id, entry)| (entry.seq, id))
            .collect();
        ids.sort_by_key(|(seq, _)| *seq);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Start and end scroll offsets of a trigger from current geometry
    fn boundaries(&self, config: &TriggerConfig) -> (f32, f32) {
        let top = self.stage.effective_top(config.trigger).unwrap_or(0.0);
        let height = self.stage.effective_height(config.trigger).unwrap_or(0.0);
        let viewport = self.stage.viewport().map(|v| v.height).unwrap_or(0.0);

        let start = config.start.scroll_offset(top, height, viewport);
        let end = match &config.end {
            EndThreshold::At(threshold) => threshold.scroll_offset(top, height, viewport),
            EndThreshold::Distance(distance) => start + distance,
            EndThreshold::Computed(distance) => start + distance(),
        };
        (start, end.max(start))
    }

    fn pin_distance(&self, config: &TriggerConfig) -> f32 {
        let (start, end) = self.boundaries(config);
        (end - start).max(0.0)
    }

    fn unpin(&self, config: &TriggerConfig) {
        if config.pin {
            self.stage.with_tree(|tree| {
                tree.set_pin_spacing(config.trigger, 0.0);
                tree.set_style(config.trigger, Property::PinShift, 0.0);
            });
        }
    }

    fn apply_pin_spacing(&mut self) {
        for id in self.ordered() {
            let Some(entry) = self.triggers.get(id) else {
                continue;
            };
            if !entry.config.pin {
                continue;
            }
            let spacing = self.pin_distance(&entry.config);
            let trigger = entry.config.trigger;
            self.stage.with_tree(|tree| tree.set_pin_spacing(trigger, spacing));
        }
    }

    fn compute_boundaries(&mut self) {
        for id in self.ordered() {
            let Some((start, end)) = self.triggers.get(id).map(|e| self.boundaries(&e.config)) else {
                continue;
            };
            if let Some(entry) = self.triggers.get_mut(id) {
                entry.start = start;
                entry.end = end;
                if entry.config.invalidate_on_refresh {
                    entry.displayed = None;
                }
            }
        }
        self.generation += 1;
    }

    fn update(&mut self, pending: &mut Vec<Pending>) {
        let offset = self.scroll_offset();
        for id in self.ordered() {
            let Some(entry) = self.triggers.get_mut(id) else {
                continue;
            };
            let (start, end) = (entry.start, entry.end);

            let next = TriggerPhase::at(offset, start, end);
            if next != entry.phase {
                if entry.config.scrub == Scrub::Off {
                    if let Some(anim) = entry.config.animation {
                        for action in entry.phase.crossings(next, &entry.config.toggle_actions) {
                            if action != ToggleAction::None {
                                pending.push(Pending::Action(anim, action));
                            }
                        }
                    }
                }
                if let Some(callback) = &entry.config.on_toggle {
                    for active in entry.phase.toggles(next) {
                        pending.push(Pending::Toggle(Arc::clone(callback), active));
                    }
                }
                tracing::trace!("trigger {:?}: {:?} -> {:?} at {}", id, entry.phase, next, offset);
                entry.phase = next;
            }

            entry.progress = if end > start {
                ((offset - start) / (end - start)).clamp(0.0, 1.0)
            } else if offset >= start {
                1.0
            } else {
                0.0
            };

            if let Some(anim) = entry.config.animation {
                match entry.config.scrub {
                    Scrub::Off => {}
                    Scrub::Immediate => {
                        entry.displayed = Some(entry.progress);
                        pending.push(Pending::Seek(anim, entry.progress));
                    }
                    Scrub::Smoothed(_) => {
                        if entry.displayed.is_none() {
                            entry.displayed = Some(entry.progress);
                            pending.push(Pending::Seek(anim, entry.progress));
                        }
                    }
                }
            }

            if entry.config.pin {
                let shift = match next {
                    TriggerPhase::Before => 0.0,
                    TriggerPhase::Active => offset - start,
                    TriggerPhase::After => end - start,
                };
                let trigger = entry.config.trigger;
                self.stage
                    .with_tree(|tree| tree.set_style(trigger, Property::PinShift, shift));
            }
        }
    }

    fn tick(&mut self, dt_ms: f32, pending: &mut Vec<Pending>) -> bool {
        let mut moving = false;
        for entry in self.triggers.values_mut() {
            let (Scrub::Smoothed(secs), Some(anim)) = (entry.config.scrub, entry.config.animation)
            else {
                continue;
            };
            let Some(displayed) = entry.displayed else {
                continue;
            };
            let diff = entry.progress - displayed;
            if diff == 0.0 {
                continue;
            }
            let tau = (secs * 1000.0 / 4.0).max(f32::EPSILON);
            let next = if diff.abs() < SCRUB_EPSILON {
                entry.progress
            } else {
                displayed + diff * (1.0 - (-dt_ms / tau).exp())
            };
            entry.displayed = Some(next);
            pending.push(Pending::Seek(anim, next));
            moving |= next != entry.progress;
        }
        moving
    }

    fn remove(&mut self, id: TriggerId) -> bool {
        match self.triggers.remove(id) {
            Some(entry) => {
                self.unpin(&entry.config);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Owner and handle
// ============================================================================

/// The trigger registry
pub struct ViewportTriggers {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ViewportTriggers {
    pub fn new(stage: StageHandle, animations: AnimationHandle) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                stage,
                animations,
                scroller: None,
                proxy: None,
                triggers: SlotMap::with_key(),
                refresh_listeners: SlotMap::with_key(),
                next_seq: 0,
                generation: 0,
            })),
        }
    }

    pub fn handle(&self) -> TriggerHandle {
        TriggerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn count(&self) -> usize {
        lock(&self.inner).triggers.len()
    }
}

/// A weak handle to the trigger registry
#[derive(Clone)]
pub struct TriggerHandle {
    inner: Weak<Mutex<RegistryInner>>,
}

impl TriggerHandle {
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn with_inner<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut RegistryInner) -> R,
    {
        self.inner.upgrade().map(|inner| f(&mut lock(&inner)))
    }

    /// Run `f` with a pending-work queue, then apply the queue unlocked
    fn with_pending<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut RegistryInner, &mut Vec<Pending>) -> R,
    {
        let mut pending = Vec::new();
        let (result, animations) = self.with_inner(|inner| {
            let result = f(inner, &mut pending);
            (result, inner.animations.clone())
        })?;
        apply(&animations, pending);
        Some(result)
    }

    // =========================================================================
    // Scroller binding
    // =========================================================================

    /// Bind the registry to `scroller`, reading positions through `proxy`
    pub fn scroller_proxy(&self, scroller: ScrollerRef, proxy: Arc<dyn ScrollerProxy>) {
        self.with_inner(|inner| {
            inner.scroller = Some(scroller);
            inner.proxy = Some(proxy);
        });
        tracing::debug!("triggers: scroller proxy installed");
    }

    /// Remove the proxy and scroller binding
    pub fn clear_scroller_proxy(&self) {
        self.with_inner(|inner| {
            inner.scroller = None;
            inner.proxy = None;
        });
    }

    pub fn scroller(&self) -> Option<ScrollerRef> {
        self.with_inner(|inner| inner.scroller).flatten()
    }

    pub fn has_proxy(&self) -> bool {
        self.with_inner(|inner| inner.proxy.is_some())
            .unwrap_or(false)
    }

    /// Current scroll offset as the triggers see it
    pub fn scroll_offset(&self) -> f32 {
        self.with_inner(|inner| inner.scroll_offset()).unwrap_or(0.0)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a trigger and evaluate it against the current scroll offset
    pub fn register(&self, config: TriggerConfig) -> Result<TriggerId> {
        let scrubbed = match (config.scrub, config.animation) {
            (Scrub::Off, _) | (_, None) => None,
            (_, Some(anim)) => Some(anim),
        };

        let (id, animations) = self
            .with_inner(|inner| -> Result<(TriggerId, AnimationHandle)> {
                let bound = inner.scroller.ok_or(ScrollError::NoScroller)?;
                if config.scroller != bound {
                    return Err(ScrollError::ForeignScroller);
                }
                if !inner.stage.contains(config.trigger) {
                    return Err(ScrollError::MissingElement);
                }

                if config.pin {
                    let spacing = inner.pin_distance(&config);
                    let trigger = config.trigger;
                    inner
                        .stage
                        .with_tree(|tree| tree.set_pin_spacing(trigger, spacing));
                }
                let (start, end) = inner.boundaries(&config);
                inner.next_seq += 1;
                let seq = inner.next_seq;
                let id = inner.triggers.insert(TriggerEntry {
                    config,
                    start,
                    end,
                    phase: TriggerPhase::Before,
                    progress: 0.0,
                    displayed: None,
                    seq,
                });
                tracing::debug!("triggers: registered {:?} ({}..{})", id, start, end);
                Ok((id, inner.animations.clone()))
            })
            .ok_or(ScrollError::NoScroller)??;

        if let Some(anim) = scrubbed {
            animations.pause(anim);
        }
        self.update();
        Ok(id)
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Re-evaluate every trigger against the current scroll offset
    pub fn update(&self) {
        self.with_pending(|inner, pending| inner.update(pending));
    }

    /// Advance smoothed scrubbing by `dt_ms`; returns true while catching up
    pub fn tick(&self, dt_ms: f32) -> bool {
        self.with_pending(|inner, pending| inner.tick(dt_ms, pending))
            .unwrap_or(false)
    }

    /// Recalculate everything after a geometry change
    ///
    /// Runs pin spacing, then the refresh listeners, then trigger
    /// boundaries, then an update.
    pub fn refresh(&self) {
        let Some(listeners) = self.with_inner(|inner| {
            inner.apply_pin_spacing();
            inner
                .refresh_listeners
                .values()
                .cloned()
                .collect::<Vec<_>>()
        }) else {
            return;
        };

        for listener in listeners {
            listener();
        }

        self.with_inner(|inner| inner.compute_boundaries());
        self.update();
        tracing::debug!("triggers: refreshed");
    }

    /// Number of completed boundary passes
    pub fn generation(&self) -> u64 {
        self.with_inner(|inner| inner.generation).unwrap_or(0)
    }

    pub fn add_refresh_listener<F>(&self, f: F) -> Option<RefreshListenerId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.with_inner(|inner| inner.refresh_listeners.insert(Arc::new(f)))
    }

    pub fn remove_refresh_listener(&self, id: RefreshListenerId) -> bool {
        self.with_inner(|inner| inner.refresh_listeners.remove(id).is_some())
            .unwrap_or(false)
    }

    pub fn refresh_listener_count(&self) -> usize {
        self.with_inner(|inner| inner.refresh_listeners.len())
            .unwrap_or(0)
    }

    // =========================================================================
    // Queries and removal
    // =========================================================================

    pub fn count(&self) -> usize {
        self.with_inner(|inner| inner.triggers.len()).unwrap_or(0)
    }

    pub fn info(&self, id: TriggerId) -> Option<TriggerInfo> {
        self.with_inner(|inner| inner.triggers.get(id).map(|e| e.info(id)))
            .flatten()
    }

    /// All triggers in registration order
    pub fn infos(&self) -> Vec<TriggerInfo> {
        self.with_inner(|inner| {
            inner
                .ordered()
                .into_iter()
                .filter_map(|id| inner.triggers.get(id).map(|e| e.info(id)))
                .collect()
        })
        .unwrap_or_default()
    }

    /// Find a trigger by the name given with [`TriggerConfig::id`]
    pub fn get_by_id(&self, name: &str) -> Option<TriggerId> {
        self.infos()
            .into_iter()
            .find(|info| info.name.as_deref() == Some(name))
            .map(|info| info.id)
    }

    /// Remove a trigger, releasing its pin; the animation is left alone
    pub fn kill(&self, id: TriggerId) -> bool {
        self.with_inner(|inner| inner.remove(id)).unwrap_or(false)
    }

    pub fn kill_by_id(&self, name: &str) -> bool {
        match self.get_by_id(name) {
            Some(id) => self.kill(id),
            None => false,
        }
    }

    /// Remove every trigger matching `predicate`, returning how many
    pub fn kill_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&TriggerInfo) -> bool,
    {
        self.with_inner(|inner| {
            let doomed: Vec<TriggerId> = inner
                .triggers
                .iter()
                .filter(|(id, entry)| predicate(&entry.info(*id)))
                .map(|(id, _)| id)
                .collect();
            doomed.into_iter().filter(|id| inner.remove(*id)).count()
        })
        .unwrap_or(0)
    }

    /// Remove the triggers whose trigger element is `element`
    pub fn kill_for_element(&self, element: ElementId) -> usize {
        self.kill_where(|info| info.trigger == element)
    }

    pub fn kill_all(&self) -> usize {
        self.kill_where(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::{AnimationScheduler, Easing, Position, Props, Timeline, TweenSpec};
    use folio_core::{Layout, Stage, Viewport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProxy(Mutex<f32>);

    impl ScrollerProxy for FixedProxy {
        fn scroll_top(&self) -> f32 {
            *lock(&self.0)
        }

        fn set_scroll_top(&self, value: f32) {
            *lock(&self.0) = value;
        }
    }

    struct Fixture {
        stage: Stage,
        scheduler: AnimationScheduler,
        triggers: ViewportTriggers,
        proxy: Arc<FixedProxy>,
        scroller: ScrollerRef,
        section: ElementId,
    }

    fn fixture() -> Fixture {
        let stage = Stage::new(Viewport::new(1440.0, 1000.0));
        let handle = stage.handle();
        let main = handle.create("main", None).unwrap();
        handle.set_layout(main, Layout::new(0.0, 0.0, 1440.0, 6000.0));
        let section = handle.create("about", Some(main)).unwrap();
        handle.set_layout(section, Layout::new(2000.0, 0.0, 1440.0, 800.0));

        let scheduler = AnimationScheduler::new(stage.handle());
        let triggers = ViewportTriggers::new(stage.handle(), scheduler.handle());
        let proxy = Arc::new(FixedProxy(Mutex::new(0.0)));
        let scroller = ScrollerRef::new(main);
        triggers.handle().scroller_proxy(scroller, proxy.clone());

        Fixture {
            stage,
            scheduler,
            triggers,
            proxy,
            scroller,
            section,
        }
    }

    fn reveal_config(f: &Fixture) -> TriggerConfig {
        TriggerConfig::new(f.section, f.scroller)
            .start("top 80%".parse().unwrap())
            .end("bottom 20%".parse::<Threshold>().unwrap())
            .toggle_actions(ToggleActions::play_reverse())
    }

    fn scroll(f: &Fixture, offset: f32) {
        f.proxy.set_scroll_top(offset);
        f.triggers.handle().update();
    }

    #[test]
    fn test_register_rejects_foreign_scroller() {
        let f = fixture();
        let other = f.stage.handle().create("sidebar", None).unwrap();
        let result = f
            .triggers
            .handle()
            .register(TriggerConfig::new(f.section, ScrollerRef::new(other)));
        assert_eq!(result, Err(ScrollError::ForeignScroller));

        f.triggers.handle().clear_scroller_proxy();
        let result = f.triggers.handle().register(reveal_config(&f));
        assert_eq!(result, Err(ScrollError::NoScroller));
    }

    #[test]
    fn test_register_rejects_missing_element() {
        let f = fixture();
        let gone = f.stage.handle().create("gone", None).unwrap();
        f.stage.handle().remove(gone);
        let result = f
            .triggers
            .handle()
            .register(TriggerConfig::new(gone, f.scroller));
        assert_eq!(result, Err(ScrollError::MissingElement));
    }

    #[test]
    fn test_boundaries() {
        let f = fixture();
        let id = f.triggers.handle().register(reveal_config(&f)).unwrap();
        let info = f.triggers.handle().info(id).unwrap();
        assert_eq!(info.start, 1200.0);
        assert_eq!(info.end, 2600.0);
        assert_eq!(info.phase, TriggerPhase::Before);
    }

    #[test]
    fn test_toggle_actions_fire_once_per_crossing() {
        let f = fixture();
        let plays = Arc::new(AtomicUsize::new(0));
        let reversals = Arc::new(AtomicUsize::new(0));

        let p = Arc::clone(&plays);
        let r = Arc::clone(&reversals);
        let timeline = Timeline::new()
            .paused(true)
            .then(
                TweenSpec::from_to(
                    vec![f.section],
                    Props::new().set(Property::Opacity, 0.0),
                    Props::new().set(Property::Opacity, 1.0),
                )
                .duration(100.0)
                .ease(Easing::Linear),
                Position::End,
            )
            .on_start(move || {
                p.fetch_add(1, Ordering::SeqCst);
            })
            .on_reverse_complete(move || {
                r.fetch_add(1, Ordering::SeqCst);
            });
        let tl = f.scheduler.handle().register_timeline(timeline).unwrap();
        f.triggers
            .handle()
            .register(reveal_config(&f).animation(tl))
            .unwrap();

        for offset in [1300.0, 1400.0, 1500.0] {
            scroll(&f, offset);
            f.scheduler.advance(50.0);
        }
        f.scheduler.advance(100.0);
        assert_eq!(plays.load(Ordering::SeqCst), 1);
        assert_eq!(f.stage.handle().style(f.section, Property::Opacity), Some(1.0));

        for offset in [1100.0, 1000.0, 900.0] {
            scroll(&f, offset);
            f.scheduler.advance(50.0);
        }
        f.scheduler.advance(100.0);
        assert_eq!(reversals.load(Ordering::SeqCst), 1);
        assert_eq!(f.stage.handle().style(f.section, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_jump_past_range_enters_then_leaves() {
        let f = fixture();
        let toggles = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&toggles);
        let tween = f
            .scheduler
            .handle()
            .register_tween(
                TweenSpec::to(vec![f.section], Props::new().set(Property::Y, 10.0)).paused(true),
            )
            .unwrap();
        f.triggers
            .handle()
            .register(
                reveal_config(&f)
                    .animation(tween)
                    .on_toggle(move |active| lock(&seen).push(active)),
            )
            .unwrap();

        scroll(&f, 5000.0);
        assert!(f.scheduler.handle().is_active(tween));
        assert_eq!(f.triggers.handle().infos()[0].phase, TriggerPhase::After);
        assert_eq!(*lock(&toggles), vec![true, false]);
    }

    #[test]
    fn test_immediate_scrub_tracks_progress() {
        let f = fixture();
        let bar = f.stage.handle().create("progress", None).unwrap();
        let tween = f
            .scheduler
            .handle()
            .register_tween(
                TweenSpec::from_to(
                    vec![bar],
                    Props::new().set(Property::WidthPct, 0.0),
                    Props::new().set(Property::WidthPct, 100.0),
                )
                .ease(Easing::Linear),
            )
            .unwrap();
        let main = f.scroller.element();
        f.triggers
            .handle()
            .register(
                TriggerConfig::new(main, f.scroller)
                    .id("progressBar")
                    .start(Threshold::top_top())
                    .end(Threshold::new(Edge::Bottom, Edge::Bottom))
                    .scrub(Scrub::Immediate)
                    .animation(tween),
            )
            .unwrap();

        scroll(&f, 2500.0);
        assert_eq!(f.stage.handle().style(bar, Property::WidthPct), Some(50.0));
        // Scrubbed animations do not play on their own
        f.scheduler.advance(1000.0);
        assert_eq!(f.stage.handle().style(bar, Property::WidthPct), Some(50.0));

        assert!(f.triggers.handle().get_by_id("progressBar").is_some());
        assert!(f.triggers.handle().kill_by_id("progressBar"));
        assert!(f.triggers.handle().get_by_id("progressBar").is_none());
    }

    #[test]
    fn test_smoothed_scrub_catches_up() {
        let f = fixture();
        let tween = f
            .scheduler
            .handle()
            .register_tween(
                TweenSpec::from_to(
                    vec![f.section],
                    Props::new().set(Property::X, 0.0),
                    Props::new().set(Property::X, -1000.0),
                )
                .ease(Easing::Linear),
            )
            .unwrap();
        f.triggers
            .handle()
            .register(
                TriggerConfig::new(f.section, f.scroller)
                    .start(Threshold::top_top())
                    .end(EndThreshold::Distance(1000.0))
                    .scrub(Scrub::Smoothed(1.0))
                    .animation(tween),
            )
            .unwrap();

        scroll(&f, 2500.0);
        assert!(f.triggers.handle().tick(16.0));
        let lagging = f.stage.handle().style(f.section, Property::X).unwrap();
        assert!(lagging > -500.0 && lagging < 0.0);

        for _ in 0..300 {
            f.triggers.handle().tick(16.0);
        }
        let settled = f.stage.handle().style(f.section, Property::X).unwrap();
        assert!((settled + 500.0).abs() < 0.01);
    }

    #[test]
    fn test_pin_holds_element_and_adds_spacing() {
        let f = fixture();
        let contact = f.stage.handle().create("contact", Some(f.scroller.element())).unwrap();
        f.stage
            .handle()
            .set_layout(contact, Layout::new(2800.0, 0.0, 1440.0, 800.0));

        let id = f
            .triggers
            .handle()
            .register(
                TriggerConfig::new(f.section, f.scroller)
                    .start(Threshold::top_top())
                    .end(EndThreshold::Distance(1800.0))
                    .pin(true),
            )
            .unwrap();
        f.triggers.handle().refresh();

        assert_eq!(f.stage.handle().effective_top(contact), Some(4600.0));
        scroll(&f, 2900.0);
        assert_eq!(f.stage.handle().style(f.section, Property::PinShift), Some(900.0));
        scroll(&f, 5000.0);
        assert_eq!(f.stage.handle().style(f.section, Property::PinShift), Some(1800.0));

        f.triggers.handle().kill(id);
        assert_eq!(f.stage.handle().effective_top(contact), Some(2800.0));
        assert_eq!(f.stage.handle().style(f.section, Property::PinShift), Some(0.0));
    }

    #[test]
    fn test_refresh_runs_listeners_between_spacing_and_boundaries() {
        let f = fixture();
        f.triggers
            .handle()
            .register(
                TriggerConfig::new(f.section, f.scroller)
                    .start(Threshold::top_top())
                    .end(EndThreshold::Distance(1000.0))
                    .pin(true),
            )
            .unwrap();

        let observed = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&observed);
        let registry = f.triggers.handle();
        let stage = f.stage.handle();
        let main = f.scroller.element();
        f.triggers.handle().add_refresh_listener(move || {
            *lock(&slot) = Some((registry.generation(), stage.effective_height(main)));
        });

        let before = f.triggers.handle().generation();
        f.triggers.handle().refresh();
        assert_eq!(*lock(&observed), Some((before, Some(7000.0))));
        assert_eq!(f.triggers.handle().generation(), before + 1);
    }

    #[test]
    fn test_kill_for_element_spares_other_sections() {
        let f = fixture();
        let other = f.stage.handle().create("contact", None).unwrap();
        f.triggers.handle().register(reveal_config(&f)).unwrap();
        f.triggers.handle().register(reveal_config(&f)).unwrap();
        f.triggers
            .handle()
            .register(TriggerConfig::new(other, f.scroller))
            .unwrap();

        assert_eq!(f.triggers.handle().kill_for_element(f.section), 2);
        assert_eq!(f.triggers.count(), 1);
        assert_eq!(f.triggers.handle().kill_all(), 1);
        assert_eq!(f.triggers.handle().kill_all(), 0);
    }

    #[test]
    fn test_native_scroll_without_proxy() {
        let f = fixture();
        f.stage.handle().scroll_native_by(750.0);
        assert_eq!(f.triggers.handle().scroll_offset(), 0.0);
        f.triggers.handle().clear_scroller_proxy();
        assert_eq!(f.triggers.handle().scroll_offset(), 750.0);
    }
}
