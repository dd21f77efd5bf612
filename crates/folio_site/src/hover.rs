//! Hover micro-interactions
//!
//! One paused tween per element: pointer-enter plays it forward and
//! pointer-leave reverses it from wherever it is, so rapid enter/leave never
//! snaps and never stacks tweens.

use folio_animation::{AnimatedTween, AnimationHandle, Easing, Props, TweenId, TweenSpec};
use folio_core::{ElementId, ListenerId, PointerKind, Property, StageHandle};

/// Description of a hover effect
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSpec {
    pub target: ElementId,
    pub to: Props,
    pub duration_ms: f32,
    pub easing: Easing,
    /// Add a drop shadow while the tween is away from its start
    pub drop_shadow: bool,
    /// Loop the tween back and forth while hovered
    pub pulse: bool,
}

impl HoverSpec {
    pub fn new(target: ElementId, to: Props) -> Self {
        Self {
            target,
            to,
            duration_ms: 300.0,
            easing: Easing::PowerOut(2),
            drop_shadow: false,
            pulse: false,
        }
    }

    pub fn duration(mut self, ms: f32) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn drop_shadow(mut self) -> Self {
        self.drop_shadow = true;
        self
    }

    pub fn pulse(mut self) -> Self {
        self.pulse = true;
        self
    }

    fn tween_spec(&self, stage: &StageHandle) -> TweenSpec {
        let mut spec = TweenSpec::to([self.target], self.to.clone())
            .duration(self.duration_ms)
            .ease(self.easing)
            .paused(true);
        if self.pulse {
            spec = spec.repeat(-1).yoyo(true);
        }
        if self.drop_shadow {
            let (on, off) = (stage.clone(), stage.clone());
            let target = self.target;
            spec = spec
                .on_start(move || {
                    on.set_style(target, Property::DropShadow, 1.0);
                })
                .on_reverse_complete(move || {
                    off.set_style(target, Property::DropShadow, 0.0);
                });
        }
        spec
    }
}

/// A hover effect bound to an element's pointer events
pub struct HoverInteraction {
    stage: StageHandle,
    target: ElementId,
    tween: AnimatedTween,
    listeners: Vec<ListenerId>,
}

impl HoverInteraction {
    /// Bind `spec` to its target, or `None` if the target is missing
    pub fn attach(stage: &StageHandle, animations: &AnimationHandle, spec: &HoverSpec) -> Option<Self> {
        if !stage.contains(spec.target) {
            tracing::debug!("hover: target missing, skipping");
            return None;
        }
        let tween = AnimatedTween::new(animations.clone(), spec.tween_spec(stage));
        let id = tween.id()?;

        let mut listeners = Vec::with_capacity(2);
        let play = animations.clone();
        listeners.extend(stage.add_listener(spec.target, PointerKind::Enter, move |_| {
            play.play(id);
        }));
        let reverse = animations.clone();
        listeners.extend(stage.add_listener(spec.target, PointerKind::Leave, move |_| {
            reverse.reverse(id);
        }));

        Some(Self {
            stage: stage.clone(),
            target: spec.target,
            tween,
            listeners,
        })
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn tween_id(&self) -> Option<TweenId> {
        self.tween.id()
    }

    /// Remove both listeners and kill the tween
    pub fn detach(&mut self) {
        for id in self.listeners.drain(..) {
            self.stage.remove_listener(id);
        }
        self.tween.kill();
    }
}

impl Drop for HoverInteraction {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::AnimationScheduler;
    use folio_core::{Stage, Viewport};

    fn setup() -> (Stage, AnimationScheduler, ElementId) {
        let stage = Stage::new(Viewport::default());
        let scheduler = AnimationScheduler::new(stage.handle());
        let card = stage.handle().create("card", None).unwrap();
        (stage, scheduler, card)
    }

    #[test]
    fn test_enter_leave_reuses_one_tween() {
        let (stage, scheduler, card) = setup();
        let handle = stage.handle();
        let spec = HoverSpec::new(card, Props::new().set(Property::Scale, 1.1)).duration(200.0);
        let hover = HoverInteraction::attach(&handle, &scheduler.handle(), &spec).unwrap();

        for _ in 0..5 {
            handle.dispatch(card, PointerKind::Enter);
            scheduler.advance(50.0);
            handle.dispatch(card, PointerKind::Leave);
            scheduler.advance(20.0);
        }
        assert_eq!(scheduler.tween_count(), 1);
        assert_eq!(scheduler.handle().tweens_of(card), vec![hover.tween_id().unwrap()]);

        handle.dispatch(card, PointerKind::Enter);
        scheduler.advance(500.0);
        let scale = handle.style(card, Property::Scale).unwrap();
        assert!((scale - 1.1).abs() < 1e-5, "scale was {scale}");
        handle.dispatch(card, PointerKind::Leave);
        scheduler.advance(500.0);
        assert_eq!(handle.style(card, Property::Scale), Some(1.0));
    }

    #[test]
    fn test_leave_reverses_from_current_value() {
        let (stage, scheduler, card) = setup();
        let handle = stage.handle();
        let spec = HoverSpec::new(card, Props::new().set(Property::Y, -10.0))
            .duration(300.0)
            .ease(Easing::Linear);
        let _hover = HoverInteraction::attach(&handle, &scheduler.handle(), &spec).unwrap();

        handle.dispatch(card, PointerKind::Enter);
        scheduler.advance(150.0);
        handle.dispatch(card, PointerKind::Leave);
        scheduler.advance(50.0);
        let y = handle.style(card, Property::Y).unwrap();
        assert!((y - -3.333).abs() < 0.01, "y was {y}");
    }

    #[test]
    fn test_drop_shadow_toggles() {
        let (stage, scheduler, image) = setup();
        let handle = stage.handle();
        let spec = HoverSpec::new(image, Props::new().set(Property::Scale, 1.05)).drop_shadow();
        let _hover = HoverInteraction::attach(&handle, &scheduler.handle(), &spec).unwrap();

        handle.dispatch(image, PointerKind::Enter);
        scheduler.advance(100.0);
        assert_eq!(handle.style(image, Property::DropShadow), Some(1.0));

        handle.dispatch(image, PointerKind::Leave);
        scheduler.advance(500.0);
        assert_eq!(handle.style(image, Property::DropShadow), Some(0.0));
    }

    #[test]
    fn test_pulse_keeps_running_while_hovered() {
        let (stage, scheduler, cta) = setup();
        let handle = stage.handle();
        let spec = HoverSpec::new(cta, Props::new().set(Property::Scale, 1.05))
            .duration(600.0)
            .ease(Easing::PowerInOut(1))
            .pulse();
        let hover = HoverInteraction::attach(&handle, &scheduler.handle(), &spec).unwrap();
        let id = hover.tween_id().unwrap();

        handle.dispatch(cta, PointerKind::Enter);
        scheduler.advance(5000.0);
        assert!(scheduler.handle().is_active(id));

        handle.dispatch(cta, PointerKind::Leave);
        for _ in 0..100 {
            scheduler.advance(100.0);
        }
        assert!(!scheduler.handle().is_active(id));
        assert_eq!(handle.style(cta, Property::Scale), Some(1.0));
    }

    #[test]
    fn test_detach_removes_listeners_and_tween() {
        let (stage, scheduler, card) = setup();
        let handle = stage.handle();
        let spec = HoverSpec::new(card, Props::new().set(Property::Glow, 1.0));
        let mut hover = HoverInteraction::attach(&handle, &scheduler.handle(), &spec).unwrap();
        assert_eq!(handle.listener_count(card), 2);

        hover.detach();
        hover.detach();
        assert_eq!(handle.listener_count(card), 0);
        assert_eq!(scheduler.animation_count(), 0);
    }

    #[test]
    fn test_missing_target() {
        let (stage, scheduler, card) = setup();
        let handle = stage.handle();
        handle.remove(card);
        let spec = HoverSpec::new(card, Props::new().set(Property::Glow, 1.0));
        assert!(HoverInteraction::attach(&handle, &scheduler.handle(), &spec).is_none());
        assert_eq!(scheduler.animation_count(), 0);
    }
}
