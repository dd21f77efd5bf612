//! Preloader gate
//!
//! Plays the intro sequence over a full-screen overlay with scrolling locked,
//! then unlocks scrolling and fires a single completion callback. Everything
//! else on the page waits for that callback.

use std::sync::{Arc, Mutex};

use folio_animation::{AnimatedTimeline, AnimationHandle, Easing, Position, Props, Timeline, TweenSpec};
use folio_core::{lock, ElementId, Property, StageHandle};

use crate::page::PreloaderElements;

/// One step of the intro sequence
#[derive(Clone)]
pub struct IntroStep {
    pub spec: TweenSpec,
    pub position: Position,
}

impl IntroStep {
    pub fn new(spec: TweenSpec, position: Position) -> Self {
        Self { spec, position }
    }
}

/// Text reveal, bar fill, then fade-out of the bar and the overlay
pub fn default_intro(elements: &PreloaderElements) -> Vec<IntroStep> {
    vec![
        IntroStep::new(
            TweenSpec::from_to(
                [elements.text],
                Props::new().set(Property::Opacity, 0.0).set(Property::Scale, 0.8),
                Props::new().set(Property::Opacity, 1.0).set(Property::Scale, 1.0),
            )
            .duration(800.0)
            .ease(Easing::PowerOut(2)),
            Position::End,
        ),
        IntroStep::new(
            TweenSpec::from_to(
                [elements.bar],
                Props::new().set(Property::WidthPct, 0.0),
                Props::new().set(Property::WidthPct, 100.0),
            )
            .duration(1500.0)
            .delay(300.0)
            .ease(Easing::PowerInOut(2)),
            Position::End,
        ),
        IntroStep::new(
            TweenSpec::to([elements.bar], Props::new().set(Property::Opacity, 0.0)).duration(300.0),
            Position::FromEnd(300.0),
        ),
        IntroStep::new(
            TweenSpec::to(
                [elements.overlay],
                Props::new().set(Property::Opacity, 0.0).set(Property::Scale, 0.9),
            )
            .duration(800.0)
            .ease(Easing::PowerIn(2)),
            Position::FromEnd(-200.0),
        ),
    ]
}

type Completion = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    Running,
    Complete,
    Detached,
}

struct GateShared {
    state: GateState,
    completion: Option<Completion>,
}

/// Blocks the page behind the intro sequence
pub struct PreloaderGate {
    stage: StageHandle,
    animations: AnimationHandle,
    overlay: Option<ElementId>,
    steps: Vec<IntroStep>,
    shared: Arc<Mutex<GateShared>>,
    timeline: Option<AnimatedTimeline>,
}

impl PreloaderGate {
    pub fn new(
        stage: StageHandle,
        animations: AnimationHandle,
        overlay: Option<ElementId>,
        steps: Vec<IntroStep>,
    ) -> Self {
        Self {
            stage,
            animations,
            overlay,
            steps,
            shared: Arc::new(Mutex::new(GateShared {
                state: GateState::Idle,
                completion: None,
            })),
            timeline: None,
        }
    }

    /// Gate using the stock intro for the page's preloader elements
    pub fn with_default_intro(
        stage: StageHandle,
        animations: AnimationHandle,
        elements: &PreloaderElements,
    ) -> Self {
        Self::new(stage, animations, Some(elements.overlay), default_intro(elements))
    }

    /// Lock scrolling and start the intro
    ///
    /// `on_complete` runs exactly once, after scrolling is unlocked. Returns
    /// `false` if the gate was already activated.
    pub fn activate<F>(&mut self, on_complete: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut shared = lock(&self.shared);
            if shared.state != GateState::Idle {
                tracing::debug!("preloader: already activated");
                return false;
            }
            shared.state = GateState::Running;
            shared.completion = Some(Box::new(on_complete));
        }

        self.stage.set_scroll_locked(true);
        tracing::debug!(steps = self.steps.len(), "preloader: activated");

        if self.steps.is_empty() {
            finish(&self.stage, self.overlay, &self.shared);
            return true;
        }

        let stage = self.stage.clone();
        let overlay = self.overlay;
        let shared = Arc::downgrade(&self.shared);
        let mut timeline = Timeline::new().on_complete(move || {
            if let Some(shared) = shared.upgrade() {
                finish(&stage, overlay, &shared);
            }
        });
        for step in self.steps.drain(..) {
            timeline.push(step.spec, step.position);
        }
        self.timeline = Some(AnimatedTimeline::new(self.animations.clone(), timeline));
        true
    }

    /// Stop the intro; the completion callback will not run
    pub fn detach(&mut self) {
        let was_running = {
            let mut shared = lock(&self.shared);
            let running = shared.state == GateState::Running;
            if running {
                shared.state = GateState::Detached;
                shared.completion = None;
            }
            running
        };
        if let Some(mut timeline) = self.timeline.take() {
            timeline.kill();
        }
        if was_running {
            self.stage.set_scroll_locked(false);
            tracing::debug!("preloader: detached before completion");
        }
    }

    pub fn state(&self) -> GateState {
        lock(&self.shared).state
    }

    pub fn is_complete(&self) -> bool {
        self.state() == GateState::Complete
    }

    /// Total length of the intro, or of the timeline once running
    pub fn duration_ms(&self) -> f32 {
        match &self.timeline {
            Some(timeline) => timeline
                .id()
                .and_then(|id| self.animations.playback(id))
                .map(|s| s.duration_ms)
                .unwrap_or(0.0),
            None => {
                let mut timeline = Timeline::new();
                for step in &self.steps {
                    timeline.push(step.spec.clone(), step.position);
                }
                timeline.duration_ms()
            }
        }
    }
}

impl Drop for PreloaderGate {
    fn drop(&mut self) {
        self.detach();
    }
}

fn finish(stage: &StageHandle, overlay: Option<ElementId>, shared: &Mutex<GateShared>) {
    let completion = {
        let mut shared = lock(shared);
        if shared.state != GateState::Running {
            return;
        }
        shared.state = GateState::Complete;
        shared.completion.take()
    };

    if let Some(overlay) = overlay {
        stage.set_style(overlay, Property::Visibility, 0.0);
    }
    stage.set_scroll_locked(false);
    tracing::info!("preloader: complete");

    if let Some(completion) = completion {
        completion();
    }
}
