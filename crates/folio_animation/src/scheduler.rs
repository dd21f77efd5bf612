//! Animation Scheduler
//!
//! Owns every live tween and timeline and advances them frame by frame.
//!
//! `AnimationScheduler` is the owner; controllers receive a weak
//! `AnimationHandle`. Handle operations become no-ops once the scheduler is
//! dropped. Lifecycle callbacks are collected while the scheduler is locked
//! and invoked after the lock is released, so a callback may call back into
//! any handle.
//!
//! The scheduler renders into the stage it was created with. Lock order is
//! scheduler, then stage.

use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use folio_core::{lock, ElementId, ElementTree, StageHandle};
use slotmap::{new_key_type, SlotMap};

use crate::timeline::Timeline;
use crate::tween::{Callback, TweenCore, TweenSpec};

new_key_type! {
    /// Handle to a standalone tween
    pub struct TweenId;
    /// Handle to a timeline
    pub struct TimelineId;
}

/// Reference to any scheduled animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationRef {
    Tween(TweenId),
    Timeline(TimelineId),
}

impl From<TweenId> for AnimationRef {
    fn from(id: TweenId) -> Self {
        AnimationRef::Tween(id)
    }
}

impl From<TimelineId> for AnimationRef {
    fn from(id: TimelineId) -> Self {
        AnimationRef::Timeline(id)
    }
}

/// Snapshot of an animation's playhead
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub time_ms: f32,
    pub duration_ms: f32,
    pub reversed: bool,
    pub paused: bool,
}

impl PlaybackState {
    /// Progress in 0..1 (always 0 for infinite animations)
    pub fn progress(&self) -> f32 {
        if self.duration_ms.is_finite() && self.duration_ms > 0.0 {
            (self.time_ms / self.duration_ms).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Whether the playhead will move on the next frame
    pub fn is_active(&self) -> bool {
        !self.paused
            && if self.reversed {
                self.time_ms > 0.0
            } else {
                self.time_ms < self.duration_ms
            }
    }
}

#[derive(Debug, Clone, Copy)]
struct Playback {
    reversed: bool,
    paused: bool,
    /// Delay still to elapse before a forward play from the start moves
    delay_remaining: f32,
}

struct TweenSlot {
    core: TweenCore,
    playback: Playback,
    seq: u64,
}

struct TimelineSlot {
    timeline: Timeline,
    playback: Playback,
    seq: u64,
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    stage: StageHandle,
    tweens: SlotMap<TweenId, TweenSlot>,
    timelines: SlotMap<TimelineId, TimelineSlot>,
    next_seq: u64,
    last_frame: Instant,
}

impl SchedulerInner {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn playback(&self, anim: AnimationRef) -> Option<PlaybackState> {
        match anim {
            AnimationRef::Tween(id) => self.tweens.get(id).map(|slot| PlaybackState {
                time_ms: slot.core.time(),
                duration_ms: slot.core.total_ms(),
                reversed: slot.playback.reversed,
                paused: slot.playback.paused,
            }),
            AnimationRef::Timeline(id) => self.timelines.get(id).map(|slot| PlaybackState {
                time_ms: slot.timeline.time(),
                duration_ms: slot.timeline.duration_ms(),
                reversed: slot.playback.reversed,
                paused: slot.playback.paused,
            }),
        }
    }

    fn playback_mut(&mut self, anim: AnimationRef) -> Option<&mut Playback> {
        match anim {
            AnimationRef::Tween(id) => self.tweens.get_mut(id).map(|s| &mut s.playback),
            AnimationRef::Timeline(id) => self.timelines.get_mut(id).map(|s| &mut s.playback),
        }
    }

    /// Seek an animation to an absolute time, rendering into the stage
    fn seek(&mut self, anim: AnimationRef, time: f32, events: &mut Vec<Callback>) -> bool {
        let stage = self.stage.clone();
        match anim {
            AnimationRef::Tween(id) => match self.tweens.get_mut(id) {
                Some(slot) => {
                    stage.with_tree(|tree| slot.core.render(time, tree, events));
                    true
                }
                None => false,
            },
            AnimationRef::Timeline(id) => match self.timelines.get_mut(id) {
                Some(slot) => {
                    stage.with_tree(|tree| slot.timeline.render(time, tree, events));
                    true
                }
                None => false,
            },
        }
    }

    fn delay_of(&self, anim: AnimationRef) -> f32 {
        match anim {
            AnimationRef::Tween(id) => self
                .tweens
                .get(id)
                .map(|s| s.core.spec().delay_ms())
                .unwrap_or(0.0),
            AnimationRef::Timeline(_) => 0.0,
        }
    }

    fn targets_of(&self, anim: AnimationRef) -> Vec<ElementId> {
        match anim {
            AnimationRef::Tween(id) => self
                .tweens
                .get(id)
                .map(|s| s.core.targets().to_vec())
                .unwrap_or_default(),
            AnimationRef::Timeline(id) => self
                .timelines
                .get(id)
                .map(|s| s.timeline.targets().to_vec())
                .unwrap_or_default(),
        }
    }

    fn kill(&mut self, anim: AnimationRef) -> bool {
        match anim {
            AnimationRef::Tween(id) => self.tweens.remove(id).is_some(),
            AnimationRef::Timeline(id) => self.timelines.remove(id).is_some(),
        }
    }

    fn advance(&mut self, dt_ms: f32, events: &mut Vec<Callback>) -> bool {
        let stage = self.stage.clone();
        let mut moves: Vec<(AnimationRef, f32)> = Vec::new();

        for (id, slot) in self.tweens.iter_mut() {
            if let Some(time) = step(&mut slot.playback, slot.core.time(), slot.core.total_ms(), dt_ms)
            {
                moves.push((AnimationRef::Tween(id), time));
            }
        }
        for (id, slot) in self.timelines.iter_mut() {
            let duration = slot.timeline.duration_ms();
            if let Some(time) = step(&mut slot.playback, slot.timeline.time(), duration, dt_ms) {
                moves.push((AnimationRef::Timeline(id), time));
            }
        }

        if !moves.is_empty() {
            let (tweens, timelines) = (&mut self.tweens, &mut self.timelines);
            stage.with_tree(|tree| {
                for (anim, time) in moves {
                    render_slot(tweens, timelines, anim, time, tree, events);
                }
            });
        }

        self.has_active()
    }

    fn has_active(&self) -> bool {
        self.tweens
            .keys()
            .map(AnimationRef::Tween)
            .chain(self.timelines.keys().map(AnimationRef::Timeline))
            .filter_map(|anim| self.playback(anim))
            .any(|state| state.is_active())
    }
}

/// Compute the playhead after `dt_ms`, or `None` if it does not move
fn step(playback: &mut Playback, time: f32, duration: f32, dt_ms: f32) -> Option<f32> {
    if playback.paused || dt_ms <= 0.0 {
        return None;
    }
    if playback.reversed {
        if time <= 0.0 {
            return None;
        }
        return Some((time - dt_ms).max(0.0));
    }
    if time >= duration {
        return None;
    }
    let mut dt = dt_ms;
    if playback.delay_remaining > 0.0 {
        let used = dt.min(playback.delay_remaining);
        playback.delay_remaining -= used;
        dt -= used;
        if dt <= 0.0 {
            return None;
        }
    }
    Some((time + dt).min(duration))
}

fn render_slot(
    tweens: &mut SlotMap<TweenId, TweenSlot>,
    timelines: &mut SlotMap<TimelineId, TimelineSlot>,
    anim: AnimationRef,
    time: f32,
    tree: &mut ElementTree,
    events: &mut Vec<Callback>,
) {
    match anim {
        AnimationRef::Tween(id) => {
            if let Some(slot) = tweens.get_mut(id) {
                slot.core.render(time, tree, events);
            }
        }
        AnimationRef::Timeline(id) => {
            if let Some(slot) = timelines.get_mut(id) {
                slot.timeline.render(time, tree, events);
            }
        }
    }
}

fn fire(events: Vec<Callback>) {
    for event in events {
        event();
    }
}

/// The animation scheduler
///
/// Held by the page; controllers use the `AnimationHandle` from
/// [`handle()`](Self::handle).
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new(stage: StageHandle) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                stage,
                tweens: SlotMap::with_key(),
                timelines: SlotMap::with_key(),
                next_seq: 0,
                last_frame: Instant::now(),
            })),
        }
    }

    /// Get a weak handle for passing to controllers
    pub fn handle(&self) -> AnimationHandle {
        AnimationHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Advance every playing animation by `dt_ms`
    ///
    /// Returns true if any animation is still active.
    pub fn advance(&self, dt_ms: f32) -> bool {
        let mut events = Vec::new();
        let active = {
            let mut inner = lock(&self.inner);
            inner.last_frame = Instant::now();
            inner.advance(dt_ms, &mut events)
        };
        fire(events);
        active
    }

    /// Advance by the wall-clock time since the previous frame
    pub fn tick(&self) -> bool {
        let dt_ms = {
            let mut inner = lock(&self.inner);
            let now = Instant::now();
            let dt = (now - inner.last_frame).as_secs_f32() * 1000.0;
            inner.last_frame = now;
            dt
        };
        let mut events = Vec::new();
        let active = lock(&self.inner).advance(dt_ms, &mut events);
        fire(events);
        active
    }

    pub fn has_active_animations(&self) -> bool {
        lock(&self.inner).has_active()
    }

    pub fn tween_count(&self) -> usize {
        lock(&self.inner).tweens.len()
    }

    pub fn timeline_count(&self) -> usize {
        lock(&self.inner).timelines.len()
    }

    /// Number of live tweens plus timelines
    pub fn animation_count(&self) -> usize {
        let inner = lock(&self.inner);
        inner.tweens.len() + inner.timelines.len()
    }
}

/// A weak handle to the animation scheduler
#[derive(Clone)]
pub struct AnimationHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl AnimationHandle {
    /// A handle that is never alive
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Run `f` under the scheduler lock, then fire collected callbacks
    fn with_inner<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut SchedulerInner, &mut Vec<Callback>) -> R,
    {
        let inner = self.inner.upgrade()?;
        let mut events = Vec::new();
        let result = {
            let mut guard = lock(&inner);
            f(&mut guard, &mut events)
        };
        fire(events);
        Some(result)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a standalone tween
    ///
    /// A `from_to` tween renders its from-state immediately. Unless the spec
    /// is paused, it starts playing on the next frame.
    pub fn register_tween(&self, spec: TweenSpec) -> Option<TweenId> {
        self.with_inner(|inner, _| {
            if spec.overwrite {
                let targets = spec.targets().to_vec();
                inner
                    .tweens
                    .retain(|_, slot| !slot.core.targets().iter().any(|t| targets.contains(t)));
            }

            let playback = Playback {
                reversed: false,
                paused: spec.is_paused(),
                delay_remaining: spec.delay_ms(),
            };
            let mut core = TweenCore::new(spec);
            inner.stage.with_tree(|tree| core.render_initial(tree));

            let seq = inner.next_seq();
            let id = inner.tweens.insert(TweenSlot {
                core,
                playback,
                seq,
            });
            tracing::trace!("animation: registered tween {:?}", id);
            id
        })
    }

    /// Register a timeline
    pub fn register_timeline(&self, mut timeline: Timeline) -> Option<TimelineId> {
        self.with_inner(|inner, _| {
            inner.stage.with_tree(|tree| timeline.render_initial(tree));
            let playback = Playback {
                reversed: false,
                paused: timeline.is_paused(),
                delay_remaining: 0.0,
            };
            let seq = inner.next_seq();
            let id = inner.timelines.insert(TimelineSlot {
                timeline,
                playback,
                seq,
            });
            tracing::trace!("animation: registered timeline {:?}", id);
            id
        })
    }

    // =========================================================================
    // Playback control
    // =========================================================================

    /// Play forward from the current time
    pub fn play(&self, anim: impl Into<AnimationRef>) {
        let anim = anim.into();
        self.with_inner(|inner, _| {
            let delay = inner.delay_of(anim);
            let at_start = inner.playback(anim).map(|s| s.time_ms <= 0.0).unwrap_or(false);
            if let Some(playback) = inner.playback_mut(anim) {
                playback.reversed = false;
                playback.paused = false;
                if at_start {
                    playback.delay_remaining = delay;
                }
            }
        });
    }

    /// Play backwards from the current time
    pub fn reverse(&self, anim: impl Into<AnimationRef>) {
        let anim = anim.into();
        self.with_inner(|inner, _| {
            if let Some(playback) = inner.playback_mut(anim) {
                playback.reversed = true;
                playback.paused = false;
                playback.delay_remaining = 0.0;
            }
        });
    }

    pub fn pause(&self, anim: impl Into<AnimationRef>) {
        let anim = anim.into();
        self.with_inner(|inner, _| {
            if let Some(playback) = inner.playback_mut(anim) {
                playback.paused = true;
            }
        });
    }

    /// Resume in the current direction
    pub fn resume(&self, anim: impl Into<AnimationRef>) {
        let anim = anim.into();
        self.with_inner(|inner, _| {
            if let Some(playback) = inner.playback_mut(anim) {
                playback.paused = false;
            }
        });
    }

    /// Jump to the start and play forward
    pub fn restart(&self, anim: impl Into<AnimationRef>) {
        let anim = anim.into();
        self.with_inner(|inner, events| {
            if inner.seek(anim, 0.0, events) {
                let delay = inner.delay_of(anim);
                if let Some(playback) = inner.playback_mut(anim) {
                    playback.reversed = false;
                    playback.paused = false;
                    playback.delay_remaining = delay;
                }
            }
        });
    }

    /// Jump to the start without playing
    pub fn reset(&self, anim: impl Into<AnimationRef>) {
        let anim = anim.into();
        self.with_inner(|inner, events| {
            if inner.seek(anim, 0.0, events) {
                if let Some(playback) = inner.playback_mut(anim) {
                    playback.paused = true;
                }
            }
        });
    }

    /// Jump to the end without playing
    pub fn complete(&self, anim: impl Into<AnimationRef>) {
        let anim = anim.into();
        self.with_inner(|inner, events| {
            let Some(duration) = inner.playback(anim).map(|s| s.duration_ms) else {
                return;
            };
            if duration.is_finite() && inner.seek(anim, duration, events) {
                if let Some(playback) = inner.playback_mut(anim) {
                    playback.paused = true;
                }
            }
        });
    }

    /// Seek to a progress fraction (0..1) without changing the play state
    pub fn seek_progress(&self, anim: impl Into<AnimationRef>, progress: f32) {
        let anim = anim.into();
        self.with_inner(|inner, events| {
            let Some(duration) = inner.playback(anim).map(|s| s.duration_ms) else {
                return;
            };
            if duration.is_finite() {
                inner.seek(anim, duration * progress.clamp(0.0, 1.0), events);
            }
        });
    }

    pub fn progress(&self, anim: impl Into<AnimationRef>) -> Option<f32> {
        let anim = anim.into();
        self.with_inner(|inner, _| inner.playback(anim).map(|s| s.progress()))
            .flatten()
    }

    pub fn playback(&self, anim: impl Into<AnimationRef>) -> Option<PlaybackState> {
        let anim = anim.into();
        self.with_inner(|inner, _| inner.playback(anim)).flatten()
    }

    /// Whether the animation exists and its playhead is moving
    pub fn is_active(&self, anim: impl Into<AnimationRef>) -> bool {
        self.playback(anim).map(|s| s.is_active()).unwrap_or(false)
    }

    pub fn exists(&self, anim: impl Into<AnimationRef>) -> bool {
        self.playback(anim).is_some()
    }

    /// Remove an animation, leaving its targets at their current values
    pub fn kill(&self, anim: impl Into<AnimationRef>) -> bool {
        let anim = anim.into();
        self.with_inner(|inner, _| inner.kill(anim)).unwrap_or(false)
    }

    // =========================================================================
    // Queries by element
    // =========================================================================

    /// Standalone tweens animating `element`, oldest first
    pub fn tweens_of(&self, element: ElementId) -> Vec<TweenId> {
        self.with_inner(|inner, _| {
            let mut found: Vec<(u64, TweenId)> = inner
                .tweens
                .iter()
                .filter(|(_, slot)| slot.core.targets().contains(&element))
                .map(|(id, slot)| (slot.seq, id))
                .collect();
            found.sort_by_key(|(seq, _)| *seq);
            found.into_iter().map(|(_, id)| id).collect()
        })
        .unwrap_or_default()
    }

    /// Kill every standalone tween animating `element`
    pub fn kill_tweens_of(&self, element: ElementId) -> usize {
        self.with_inner(|inner, _| {
            let before = inner.tweens.len();
            inner
                .tweens
                .retain(|_, slot| !slot.core.targets().contains(&element));
            before - inner.tweens.len()
        })
        .unwrap_or(0)
    }

    /// Number of live tweens and timelines animating any of `elements`
    pub fn live_referencing(&self, elements: &[ElementId]) -> usize {
        self.with_inner(|inner, _| {
            inner
                .tweens
                .keys()
                .map(AnimationRef::Tween)
                .chain(inner.timelines.keys().map(AnimationRef::Timeline))
                .filter(|anim| {
                    inner
                        .targets_of(*anim)
                        .iter()
                        .any(|t| elements.contains(t))
                })
                .count()
        })
        .unwrap_or(0)
    }

    pub fn animation_count(&self) -> usize {
        self.with_inner(|inner, _| inner.tweens.len() + inner.timelines.len())
            .unwrap_or(0)
    }

    /// Kill every tween and timeline
    pub fn kill_all(&self) -> usize {
        self.with_inner(|inner, _| {
            let count = inner.tweens.len() + inner.timelines.len();
            inner.tweens.clear();
            inner.timelines.clear();
            count
        })
        .unwrap_or(0)
    }

    /// Advance every playing animation by `dt_ms`
    pub fn advance(&self, dt_ms: f32) -> bool {
        self.with_inner(|inner, events| inner.advance(dt_ms, events))
            .unwrap_or(false)
    }
}

// ============================================================================
// RAII wrappers
// ============================================================================

/// A standalone tween that is killed when dropped
pub struct AnimatedTween {
    handle: AnimationHandle,
    id: Option<TweenId>,
}

impl AnimatedTween {
    pub fn new(handle: AnimationHandle, spec: TweenSpec) -> Self {
        let id = handle.register_tween(spec);
        Self { handle, id }
    }

    pub fn id(&self) -> Option<TweenId> {
        self.id
    }

    pub fn play(&self) {
        if let Some(id) = self.id {
            self.handle.play(id);
        }
    }

    pub fn reverse(&self) {
        if let Some(id) = self.id {
            self.handle.reverse(id);
        }
    }

    pub fn restart(&self) {
        if let Some(id) = self.id {
            self.handle.restart(id);
        }
    }

    pub fn progress(&self) -> f32 {
        self.id
            .and_then(|id| self.handle.progress(id))
            .unwrap_or(0.0)
    }

    pub fn is_active(&self) -> bool {
        self.id.map(|id| self.handle.is_active(id)).unwrap_or(false)
    }

    /// Kill the tween; later calls do nothing
    pub fn kill(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.kill(id);
        }
    }
}

impl Drop for AnimatedTween {
    fn drop(&mut self) {
        self.kill();
    }
}

/// A timeline that is killed when dropped
pub struct AnimatedTimeline {
    handle: AnimationHandle,
    id: Option<TimelineId>,
}

impl AnimatedTimeline {
    pub fn new(handle: AnimationHandle, timeline: Timeline) -> Self {
        let id = handle.register_timeline(timeline);
        Self { handle, id }
    }

    pub fn id(&self) -> Option<TimelineId> {
        self.id
    }

    pub fn play(&self) {
        if let Some(id) = self.id {
            self.handle.play(id);
        }
    }

    pub fn reverse(&self) {
        if let Some(id) = self.id {
            self.handle.reverse(id);
        }
    }

    pub fn progress(&self) -> f32 {
        self.id
            .and_then(|id| self.handle.progress(id))
            .unwrap_or(0.0)
    }

    pub fn is_active(&self) -> bool {
        self.id.map(|id| self.handle.is_active(id)).unwrap_or(false)
    }

    /// Kill the timeline; later calls do nothing
    pub fn kill(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.kill(id);
        }
    }
}

impl Drop for AnimatedTimeline {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::timeline::Position;
    use crate::tween::Props;
    use folio_core::{Property, Stage, Viewport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Stage, AnimationScheduler, ElementId) {
        let stage = Stage::new(Viewport::default());
        let el = stage.handle().create("card", None).unwrap();
        let scheduler = AnimationScheduler::new(stage.handle());
        (stage, scheduler, el)
    }

    fn lift(el: ElementId) -> TweenSpec {
        TweenSpec::to(vec![el], Props::new().set(Property::Y, -10.0))
            .duration(100.0)
            .ease(Easing::Linear)
    }

    #[test]
    fn test_scheduler_advance() {
        let (stage, scheduler, el) = setup();
        let handle = scheduler.handle();
        handle.register_tween(lift(el)).unwrap();

        assert!(scheduler.advance(50.0));
        assert_eq!(stage.handle().style(el, Property::Y), Some(-5.0));

        assert!(!scheduler.advance(100.0));
        assert_eq!(stage.handle().style(el, Property::Y), Some(-10.0));
    }

    #[test]
    fn test_reverse_animates_back() {
        let (stage, scheduler, el) = setup();
        let handle = scheduler.handle();
        let id = handle.register_tween(lift(el).paused(true)).unwrap();

        scheduler.advance(50.0);
        assert_eq!(stage.handle().style(el, Property::Y), Some(0.0));

        handle.play(id);
        scheduler.advance(80.0);
        handle.reverse(id);
        scheduler.advance(40.0);
        // Continues from -8 back towards 0 rather than snapping
        assert_eq!(stage.handle().style(el, Property::Y), Some(-4.0));
        scheduler.advance(100.0);
        assert_eq!(stage.handle().style(el, Property::Y), Some(0.0));
        assert!(!handle.is_active(id));
    }

    #[test]
    fn test_delay_applies_on_forward_play() {
        let (stage, scheduler, el) = setup();
        let handle = scheduler.handle();
        handle.register_tween(lift(el).delay(100.0)).unwrap();

        scheduler.advance(100.0);
        assert_eq!(stage.handle().style(el, Property::Y), Some(0.0));
        scheduler.advance(50.0);
        assert_eq!(stage.handle().style(el, Property::Y), Some(-5.0));
    }

    #[test]
    fn test_overwrite_kills_sharing_tweens() {
        let (_stage, scheduler, el) = setup();
        let handle = scheduler.handle();
        let first = handle.register_tween(lift(el)).unwrap();
        let second = handle.register_tween(lift(el).overwrite(true)).unwrap();

        assert!(!handle.exists(first));
        assert!(handle.exists(second));
        assert_eq!(handle.tweens_of(el), vec![second]);
    }

    #[test]
    fn test_tweens_of_in_creation_order() {
        let (_stage, scheduler, el) = setup();
        let handle = scheduler.handle();
        let a = handle.register_tween(lift(el)).unwrap();
        let b = handle.register_tween(lift(el)).unwrap();
        let c = handle.register_tween(lift(el)).unwrap();
        handle.kill(b);
        let d = handle.register_tween(lift(el)).unwrap();

        assert_eq!(handle.tweens_of(el), vec![a, c, d]);
        assert_eq!(handle.kill_tweens_of(el), 3);
        assert_eq!(handle.live_referencing(&[el]), 0);
    }

    #[test]
    fn test_timeline_callbacks_fire_after_unlock() {
        let (_stage, scheduler, el) = setup();
        let handle = scheduler.handle();
        let completions = Arc::new(AtomicUsize::new(0));

        let reentrant = handle.clone();
        let counter = Arc::clone(&completions);
        let timeline = Timeline::new()
            .then(lift(el), Position::End)
            .on_complete(move || {
                // Calling back into the scheduler from a callback must not deadlock
                reentrant.animation_count();
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let id = handle.register_timeline(timeline).unwrap();

        scheduler.advance(100.0);
        scheduler.advance(100.0);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(handle.progress(id), Some(1.0));
    }

    #[test]
    fn test_seek_progress_scrubs() {
        let (stage, scheduler, el) = setup();
        let handle = scheduler.handle();
        let spec = TweenSpec::from_to(
            vec![el],
            Props::new().set(Property::X, 0.0),
            Props::new().set(Property::X, -1800.0),
        )
        .duration(1000.0)
        .ease(Easing::Linear)
        .paused(true);
        let id = handle.register_tween(spec).unwrap();

        handle.seek_progress(id, 0.5);
        assert_eq!(stage.handle().style(el, Property::X), Some(-900.0));
        assert!(!handle.is_active(id));
    }

    #[test]
    fn test_animated_tween_kills_on_drop() {
        let (_stage, scheduler, el) = setup();
        {
            let mut tween = AnimatedTween::new(scheduler.handle(), lift(el));
            assert_eq!(scheduler.animation_count(), 1);
            tween.kill();
            tween.kill();
            assert_eq!(scheduler.animation_count(), 0);
        }
        {
            let _timeline = AnimatedTimeline::new(
                scheduler.handle(),
                Timeline::new().then(lift(el), Position::End),
            );
            assert_eq!(scheduler.timeline_count(), 1);
        }
        assert_eq!(scheduler.animation_count(), 0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let (_stage, scheduler, el) = setup();
        let handle = scheduler.handle();
        drop(scheduler);
        assert!(!handle.is_alive());
        assert!(handle.register_tween(lift(el)).is_none());
        assert_eq!(handle.kill_all(), 0);
    }
}
