//! Section reveal controller
//!
//! Each section gets one paused timeline of two to four steps and a single
//! trigger on the section root that plays it on the way down and rewinds it
//! on the way back up. Steps whose targets are gone are skipped, so a section
//! with missing pieces still reveals what is there. Ambient loops (the glow
//! orbs) start at attach and run until the section is detached.

use folio_animation::{
    AnimatedTimeline, AnimatedTween, Easing, Position, Props, Timeline, TimelineId, TweenSpec,
};
use folio_core::ElementId;
use folio_scroll::{Threshold, ToggleActions, TriggerId};

use crate::bootstrap::ScrollContext;
use crate::config::RevealRange;
use crate::hover::{HoverInteraction, HoverSpec};

/// What starts a reveal timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealGate {
    /// Play as soon as the section is attached
    Immediate,
    /// Drive the timeline from a trigger on the section root
    Scroll {
        start: Threshold,
        end: Threshold,
        actions: ToggleActions,
    },
}

impl From<RevealRange> for RevealGate {
    fn from(range: RevealRange) -> Self {
        RevealGate::Scroll {
            start: range.start,
            end: range.end,
            actions: range.actions,
        }
    }
}

/// One animated step of a reveal
#[derive(Debug, Clone, PartialEq)]
pub struct RevealStep {
    pub targets: Vec<ElementId>,
    pub from: Props,
    pub to: Props,
    pub duration_ms: f32,
    pub stagger_ms: f32,
    pub easing: Easing,
    pub position: Position,
}

impl RevealStep {
    pub fn new(targets: impl IntoIterator<Item = ElementId>, from: Props, to: Props) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            from,
            to,
            duration_ms: 1000.0,
            stagger_ms: 0.0,
            easing: Easing::PowerOut(3),
            position: Position::End,
        }
    }

    pub fn duration(mut self, ms: f32) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn stagger(mut self, ms: f32) -> Self {
        self.stagger_ms = ms;
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

/// An endless back-and-forth drift on one element
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLoop {
    pub target: ElementId,
    pub to: Props,
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub easing: Easing,
}

impl AmbientLoop {
    pub fn new(target: ElementId, to: Props) -> Self {
        Self {
            target,
            to,
            duration_ms: 3000.0,
            delay_ms: 0.0,
            easing: Easing::PowerInOut(1),
        }
    }

    pub fn duration(mut self, ms: f32) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn delay(mut self, ms: f32) -> Self {
        self.delay_ms = ms;
        self
    }

    fn tween(&self) -> TweenSpec {
        TweenSpec::to([self.target], self.to.clone())
            .duration(self.duration_ms)
            .delay(self.delay_ms)
            .ease(self.easing)
            .repeat(-1)
            .yoyo(true)
    }
}

/// Steps, gate, hover effects and ambient loops of one section
#[derive(Debug, Clone, PartialEq)]
pub struct RevealRecipe {
    pub name: &'static str,
    pub gate: RevealGate,
    pub steps: Vec<RevealStep>,
    pub hovers: Vec<HoverSpec>,
    pub ambient: Vec<AmbientLoop>,
}

impl RevealRecipe {
    pub fn new(name: &'static str, gate: RevealGate) -> Self {
        Self {
            name,
            gate,
            steps: Vec::new(),
            hovers: Vec::new(),
            ambient: Vec::new(),
        }
    }

    pub fn step(mut self, step: RevealStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn hover(mut self, hover: HoverSpec) -> Self {
        self.hovers.push(hover);
        self
    }

    pub fn hovers(mut self, hovers: impl IntoIterator<Item = HoverSpec>) -> Self {
        self.hovers.extend(hovers);
        self
    }

    pub fn ambient(mut self, ambient: impl IntoIterator<Item = AmbientLoop>) -> Self {
        self.ambient.extend(ambient);
        self
    }
}

/// A mounted section reveal
pub struct SectionReveal {
    ctx: ScrollContext,
    name: &'static str,
    root: Option<ElementId>,
    timeline: Option<AnimatedTimeline>,
    trigger: Option<TriggerId>,
    hovers: Vec<HoverInteraction>,
    ambient: Vec<AnimatedTween>,
    orbs: Vec<ElementId>,
    elements: Vec<ElementId>,
}

impl SectionReveal {
    /// Build the section's timeline, trigger and hover effects
    ///
    /// A missing root leaves the controller inert.
    pub fn attach(ctx: &ScrollContext, root: ElementId, recipe: RevealRecipe) -> Self {
        let mut reveal = Self {
            ctx: ctx.clone(),
            name: recipe.name,
            root: None,
            timeline: None,
            trigger: None,
            hovers: Vec::new(),
            ambient: Vec::new(),
            orbs: Vec::new(),
            elements: Vec::new(),
        };
        if !ctx.stage.contains(root) {
            tracing::warn!(section = recipe.name, "reveal: root element missing, skipping");
            return reveal;
        }
        reveal.root = Some(root);
        reveal.elements.push(root);

        let paused = matches!(recipe.gate, RevealGate::Scroll { .. });
        let mut timeline = Timeline::new().paused(paused);
        for step in recipe.steps {
            let targets: Vec<ElementId> = step
                .targets
                .iter()
                .copied()
                .filter(|t| ctx.stage.contains(*t))
                .collect();
            if targets.is_empty() {
                tracing::debug!(section = recipe.name, "reveal: step target missing, skipping");
                continue;
            }
            reveal.elements.extend(&targets);
            timeline.push(
                TweenSpec::from_to(targets, step.from, step.to)
                    .duration(step.duration_ms)
                    .stagger(step.stagger_ms)
                    .ease(step.easing),
                step.position,
            );
        }

        if !timeline.is_empty() {
            let timeline = AnimatedTimeline::new(ctx.animations.clone(), timeline);
            if let (RevealGate::Scroll { start, end, actions }, Some(id)) = (recipe.gate, timeline.id())
            {
                let config = ctx
                    .trigger(root)
                    .start(start)
                    .end(end)
                    .toggle_actions(actions)
                    .animation(id);
                match ctx.triggers.register(config) {
                    Ok(trigger) => reveal.trigger = Some(trigger),
                    Err(err) => {
                        tracing::warn!(section = recipe.name, "reveal: trigger rejected ({err}), showing statically");
                        ctx.animations.complete(id);
                    }
                }
            }
            reveal.timeline = Some(timeline);
        }

        for spec in &recipe.hovers {
            if let Some(hover) = HoverInteraction::attach(&ctx.stage, &ctx.animations, spec) {
                reveal.elements.push(hover.target());
                reveal.hovers.push(hover);
            }
        }

        for ambient in &recipe.ambient {
            if !ctx.stage.contains(ambient.target) {
                tracing::debug!(section = recipe.name, "reveal: ambient target missing, skipping");
                continue;
            }
            reveal.orbs.push(ambient.target);
            reveal.elements.push(ambient.target);
            reveal
                .ambient
                .push(AnimatedTween::new(ctx.animations.clone(), ambient.tween()));
        }

        ctx.smooth.observe(root);
        tracing::debug!(
            section = recipe.name,
            hovers = reveal.hovers.len(),
            ambient = reveal.ambient.len(),
            "reveal: attached"
        );
        reveal
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn timeline_id(&self) -> Option<TimelineId> {
        self.timeline.as_ref().and_then(|t| t.id())
    }

    pub fn trigger_id(&self) -> Option<TriggerId> {
        self.trigger
    }

    pub fn hover_count(&self) -> usize {
        self.hovers.len()
    }

    /// Elements running an ambient loop
    pub fn orbs(&self) -> &[ElementId] {
        &self.orbs
    }

    pub fn is_attached(&self) -> bool {
        self.root.is_some()
    }

    /// Root, step, hover and ambient targets this controller animates
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// Kill the timeline, hovers, ambient loops and the root's triggers
    pub fn detach(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        if let Some(mut timeline) = self.timeline.take() {
            timeline.kill();
        }
        for mut hover in self.hovers.drain(..) {
            hover.detach();
        }
        for mut tween in self.ambient.drain(..) {
            tween.kill();
        }
        for orb in self.orbs.drain(..) {
            self.ctx.animations.kill_tweens_of(orb);
        }
        let killed = self.ctx.triggers.kill_for_element(root);
        self.trigger = None;
        tracing::debug!(section = self.name, triggers = killed, "reveal: detached");
    }
}

impl Drop for SectionReveal {
    fn drop(&mut self) {
        self.detach();
    }
}
