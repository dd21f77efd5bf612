//! Tweens
//!
//! A `TweenSpec` describes a property animation over one or more target
//! elements. `TweenCore` is the seekable runtime state built from it; the
//! scheduler owns cores directly (standalone tweens) or through a
//! [`Timeline`](crate::Timeline).

use std::fmt;
use std::sync::Arc;

use folio_core::{ElementId, ElementTree, Property};
use smallvec::SmallVec;

use crate::easing::Easing;

/// Animation lifecycle callback
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// A set of property values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(SmallVec<[(Property, f32); 4]>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any earlier value for it
    pub fn set(mut self, property: Property, value: f32) -> Self {
        match self.0.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.0.push((property, value)),
        }
        self
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        self.0
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Description of a tween
#[derive(Clone)]
pub struct TweenSpec {
    pub(crate) targets: SmallVec<[ElementId; 4]>,
    pub(crate) from: Option<Props>,
    pub(crate) to: Props,
    pub(crate) duration_ms: f32,
    pub(crate) delay_ms: f32,
    pub(crate) stagger_ms: f32,
    pub(crate) easing: Easing,
    /// Extra iterations; -1 repeats forever
    pub(crate) repeat: i32,
    pub(crate) yoyo: bool,
    pub(crate) paused: bool,
    pub(crate) overwrite: bool,
    pub(crate) on_start: Option<Callback>,
    pub(crate) on_complete: Option<Callback>,
    pub(crate) on_reverse_complete: Option<Callback>,
}

impl TweenSpec {
    fn new(targets: impl IntoIterator<Item = ElementId>, from: Option<Props>, to: Props) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            from,
            to,
            duration_ms: 500.0,
            delay_ms: 0.0,
            stagger_ms: 0.0,
            easing: Easing::default(),
            repeat: 0,
            yoyo: false,
            paused: false,
            overwrite: false,
            on_start: None,
            on_complete: None,
            on_reverse_complete: None,
        }
    }

    /// Animate from the targets' current values to `to`
    ///
    /// Start values are read from the stage the first time the playhead moves.
    pub fn to(targets: impl IntoIterator<Item = ElementId>, to: Props) -> Self {
        Self::new(targets, None, to)
    }

    /// Animate from explicit `from` values to `to`
    ///
    /// The from-state is rendered as soon as the tween is registered.
    pub fn from_to(targets: impl IntoIterator<Item = ElementId>, from: Props, to: Props) -> Self {
        Self::new(targets, Some(from), to)
    }

    pub fn duration(mut self, ms: f32) -> Self {
        self.duration_ms = ms.max(1.0);
        self
    }

    pub fn delay(mut self, ms: f32) -> Self {
        self.delay_ms = ms.max(0.0);
        self
    }

    /// Offset between consecutive targets' start times
    pub fn stagger(mut self, ms: f32) -> Self {
        self.stagger_ms = ms.max(0.0);
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn repeat(mut self, repeat: i32) -> Self {
        self.repeat = repeat.max(-1);
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Kill other standalone tweens sharing a target when this one registers
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn on_start<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_start = Some(Arc::new(f));
        self
    }

    pub fn on_complete<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }

    pub fn on_reverse_complete<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_reverse_complete = Some(Arc::new(f));
        self
    }

    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn delay_ms(&self) -> f32 {
        self.delay_ms
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Length of one iteration across all staggered targets
    pub fn cycle_ms(&self) -> f32 {
        let extra = self.targets.len().saturating_sub(1) as f32;
        self.duration_ms + self.stagger_ms * extra
    }

    /// Total length including repeats (infinite for `repeat(-1)`)
    pub fn total_ms(&self) -> f32 {
        if self.repeat < 0 {
            f32::INFINITY
        } else {
            self.cycle_ms() * (self.repeat as f32 + 1.0)
        }
    }
}

impl fmt::Debug for TweenSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenSpec")
            .field("targets", &self.targets.len())
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration_ms", &self.duration_ms)
            .field("delay_ms", &self.delay_ms)
            .field("stagger_ms", &self.stagger_ms)
            .field("easing", &self.easing)
            .field("repeat", &self.repeat)
            .field("yoyo", &self.yoyo)
            .finish()
    }
}

/// Seekable runtime state of a tween
pub(crate) struct TweenCore {
    spec: TweenSpec,
    /// Start values per target, in `to` property order
    starts: Vec<SmallVec<[f32; 4]>>,
    captured: bool,
    time: f32,
}

impl TweenCore {
    pub(crate) fn new(spec: TweenSpec) -> Self {
        let (starts, captured) = match &spec.from {
            Some(from) => {
                let row: SmallVec<[f32; 4]> = spec
                    .to
                    .iter()
                    .map(|(p, _)| from.get(p).unwrap_or_else(|| p.default_value()))
                    .collect();
                (vec![row; spec.targets.len()], true)
            }
            None => (Vec::new(), false),
        };
        Self {
            spec,
            starts,
            captured,
            time: 0.0,
        }
    }

    pub(crate) fn spec(&self) -> &TweenSpec {
        &self.spec
    }

    pub(crate) fn time(&self) -> f32 {
        self.time
    }

    pub(crate) fn total_ms(&self) -> f32 {
        self.spec.total_ms()
    }

    pub(crate) fn targets(&self) -> &[ElementId] {
        &self.spec.targets
    }

    /// Render the explicit from-state (no-op for `to` tweens)
    pub(crate) fn render_initial(&mut self, tree: &mut ElementTree) {
        if self.captured {
            self.apply(tree);
        }
    }

    /// Move the playhead to `time` and write the resulting values
    ///
    /// Lifecycle callbacks crossed by the move are pushed onto `events`.
    pub(crate) fn render(&mut self, time: f32, tree: &mut ElementTree, events: &mut Vec<Callback>) {
        let total = self.total_ms();
        let time = time.clamp(0.0, total);
        let prev = self.time;
        if time == prev {
            return;
        }

        if time > 0.0 && !self.captured {
            self.capture(tree);
        }
        if prev == 0.0 && time > 0.0 {
            events.extend(self.spec.on_start.clone());
        }

        self.time = time;
        self.apply(tree);

        if time >= total && prev < total {
            events.extend(self.spec.on_complete.clone());
        }
        if time == 0.0 && prev > 0.0 {
            events.extend(self.spec.on_reverse_complete.clone());
        }
    }

    fn capture(&mut self, tree: &ElementTree) {
        self.starts = self
            .spec
            .targets
            .iter()
            .map(|target| {
                self.spec
                    .to
                    .iter()
                    .map(|(p, _)| {
                        tree.style(*target, p)
                            .unwrap_or_else(|| p.default_value())
                    })
                    .collect()
            })
            .collect();
        self.captured = true;
    }

    /// Playhead position within the current iteration, folded for yoyo
    fn cycle_time(&self) -> f32 {
        let cycle = self.spec.cycle_ms();
        let total = self.total_ms();
        let (iteration, within) = if self.time >= total {
            (self.spec.repeat.max(0) as u32, cycle)
        } else {
            let iteration = (self.time / cycle).floor();
            (iteration as u32, self.time - iteration * cycle)
        };
        if self.spec.yoyo && iteration % 2 == 1 {
            cycle - within
        } else {
            within
        }
    }

    fn apply(&self, tree: &mut ElementTree) {
        let t = self.cycle_time();
        for (index, target) in self.spec.targets.iter().enumerate() {
            let local = t - index as f32 * self.spec.stagger_ms;
            let eased = self
                .spec
                .easing
                .apply(local / self.spec.duration_ms);
            let Some(starts) = self.starts.get(index) else {
                continue;
            };
            for ((property, end), start) in self.spec.to.iter().zip(starts.iter()) {
                tree.set_style(*target, property, start + (end - start) * eased);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Viewport;

    fn tree_with(n: usize) -> (ElementTree, Vec<ElementId>) {
        let mut tree = ElementTree::new(Viewport::default());
        let ids = (0..n)
            .map(|i| tree.create(&format!("el{i}"), None).unwrap())
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_from_to_renders_initial_state() {
        let (mut tree, ids) = tree_with(1);
        let spec = TweenSpec::from_to(
            ids.clone(),
            Props::new().set(Property::Opacity, 0.0),
            Props::new().set(Property::Opacity, 1.0),
        );
        let mut core = TweenCore::new(spec);
        core.render_initial(&mut tree);
        assert_eq!(tree.style(ids[0], Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_to_captures_current_value() {
        let (mut tree, ids) = tree_with(1);
        tree.set_style(ids[0], Property::X, 40.0);
        let spec = TweenSpec::to(ids.clone(), Props::new().set(Property::X, 0.0))
            .duration(100.0)
            .ease(Easing::Linear);
        let mut core = TweenCore::new(spec);
        let mut events = Vec::new();

        core.render(50.0, &mut tree, &mut events);
        assert_eq!(tree.style(ids[0], Property::X), Some(20.0));

        core.render(0.0, &mut tree, &mut events);
        assert_eq!(tree.style(ids[0], Property::X), Some(40.0));
    }

    #[test]
    fn test_stagger_offsets_targets() {
        let (mut tree, ids) = tree_with(3);
        let spec = TweenSpec::from_to(
            ids.clone(),
            Props::new().set(Property::Y, 20.0),
            Props::new().set(Property::Y, 0.0),
        )
        .duration(100.0)
        .stagger(100.0)
        .ease(Easing::Linear);
        let mut core = TweenCore::new(spec);
        assert_eq!(core.total_ms(), 300.0);

        let mut events = Vec::new();
        core.render(150.0, &mut tree, &mut events);
        assert_eq!(tree.style(ids[0], Property::Y), Some(0.0));
        assert_eq!(tree.style(ids[1], Property::Y), Some(10.0));
        assert_eq!(tree.style(ids[2], Property::Y), Some(20.0));
    }

    #[test]
    fn test_yoyo_repeat_returns_to_start() {
        let (mut tree, ids) = tree_with(1);
        let spec = TweenSpec::to(ids.clone(), Props::new().set(Property::Scale, 0.9))
            .duration(200.0)
            .repeat(1)
            .yoyo(true)
            .ease(Easing::Linear);
        let mut core = TweenCore::new(spec);
        assert_eq!(core.total_ms(), 400.0);

        let mut events = Vec::new();
        core.render(200.0, &mut tree, &mut events);
        assert!((tree.style(ids[0], Property::Scale).unwrap() - 0.9).abs() < 1e-6);
        core.render(400.0, &mut tree, &mut events);
        assert!((tree.style(ids[0], Property::Scale).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lifecycle_callbacks() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let (mut tree, ids) = tree_with(1);
        let starts = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&starts);
        let spec = TweenSpec::to(ids, Props::new().set(Property::Glow, 1.0))
            .duration(100.0)
            .on_start(move || {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .on_complete(|| {})
            .on_reverse_complete(|| {});
        let mut core = TweenCore::new(spec);

        let mut events = Vec::new();
        core.render(50.0, &mut tree, &mut events);
        assert_eq!(events.len(), 1);
        core.render(100.0, &mut tree, &mut events);
        assert_eq!(events.len(), 2);
        core.render(0.0, &mut tree, &mut events);
        assert_eq!(events.len(), 3);

        for event in &events {
            event();
        }
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_infinite_repeat_has_no_end() {
        let (_, ids) = tree_with(1);
        let spec = TweenSpec::to(ids, Props::new().set(Property::Scale, 1.05)).repeat(-1);
        assert!(spec.total_ms().is_infinite());
    }
}
