//! Global scroll bootstrap
//!
//! Wires the smooth-scroll container to the trigger registry exactly once and
//! hands the resulting [`ScrollContext`] to every section controller. The
//! wiring order matters: the proxy must be installed before the first
//! refresh, and the refresh hook must be in place so the container's limit is
//! recomputed before trigger boundaries are.

use std::sync::Arc;

use folio_animation::{AnimatedTween, AnimationHandle, Easing, Props, TweenSpec};
use folio_core::{ElementId, Property, StageHandle};
use folio_scroll::{
    Edge, RefreshListenerId, ScrollListenerId, ScrollerRef, Scrub, SmoothScroll, SmoothScrollConfig,
    SmoothScrollHandle, Threshold, TriggerConfig, TriggerHandle, TriggerId,
};

use crate::error::{Result, SiteError};

/// Trigger id of the scroll progress bar
pub const PROGRESS_BAR_ID: &str = "progressBar";

/// Everything a section controller needs to register scroll-driven animations
#[derive(Clone)]
pub struct ScrollContext {
    pub stage: StageHandle,
    pub animations: AnimationHandle,
    pub triggers: TriggerHandle,
    pub scroller: ScrollerRef,
    pub smooth: SmoothScrollHandle,
}

impl ScrollContext {
    /// Trigger config on `element` bound to this context's scroller
    pub fn trigger(&self, element: ElementId) -> TriggerConfig {
        TriggerConfig::new(element, self.scroller)
    }
}

/// Bootstrap steps, recorded in the order they ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStep {
    Construct,
    ScrollListener,
    Proxy,
    RefreshHook,
    Refresh,
    ProgressBar,
}

struct Bound {
    container: ElementId,
    smooth: SmoothScroll,
    scroll_listener: Option<ScrollListenerId>,
    refresh_listener: Option<RefreshListenerId>,
    progress: Option<(AnimatedTween, TriggerId)>,
    context: ScrollContext,
}

/// Owns the smooth-scroll container for the lifetime of the page
pub struct ScrollBootstrap {
    stage: StageHandle,
    animations: AnimationHandle,
    triggers: TriggerHandle,
    config: SmoothScrollConfig,
    bound: Option<Bound>,
    steps: Vec<BootStep>,
    constructed: usize,
}

impl ScrollBootstrap {
    pub fn new(
        stage: StageHandle,
        animations: AnimationHandle,
        triggers: TriggerHandle,
        config: SmoothScrollConfig,
    ) -> Self {
        Self {
            stage,
            animations,
            triggers,
            config,
            bound: None,
            steps: Vec::new(),
            constructed: 0,
        }
    }

    /// Bind smooth scrolling to `container`
    ///
    /// Calling again with the same container returns the existing context.
    /// A different container is refused with [`SiteError::AlreadyBound`]; a
    /// container that is not on the stage is a no-op returning `None`.
    pub fn initialize(
        &mut self,
        container: ElementId,
        progress_bar: Option<ElementId>,
    ) -> Result<Option<ScrollContext>> {
        if let Some(bound) = &self.bound {
            if bound.container == container {
                tracing::debug!("bootstrap: already initialized");
                return Ok(Some(bound.context.clone()));
            }
            return Err(SiteError::AlreadyBound);
        }
        if !self.stage.contains(container) {
            tracing::warn!("bootstrap: scroll container missing, staying on native scroll");
            return Ok(None);
        }

        let smooth = SmoothScroll::new(self.stage.clone(), container, self.config.clone());
        let handle = smooth.handle();
        self.constructed += 1;
        self.steps.push(BootStep::Construct);

        let triggers = self.triggers.clone();
        let scroll_listener = handle.on_scroll(move |_| triggers.update());
        self.steps.push(BootStep::ScrollListener);

        let scroller = ScrollerRef::new(container);
        self.triggers.scroller_proxy(scroller, Arc::new(handle.clone()));
        self.steps.push(BootStep::Proxy);

        let refresh_target = handle.clone();
        let refresh_listener = self
            .triggers
            .add_refresh_listener(move || refresh_target.update());
        self.steps.push(BootStep::RefreshHook);

        self.triggers.refresh();
        self.steps.push(BootStep::Refresh);

        let context = ScrollContext {
            stage: self.stage.clone(),
            animations: self.animations.clone(),
            triggers: self.triggers.clone(),
            scroller,
            smooth: handle,
        };

        let progress = progress_bar.and_then(|bar| self.bind_progress_bar(&context, container, bar));

        tracing::info!("bootstrap: smooth scroll bound");
        self.bound = Some(Bound {
            container,
            smooth,
            scroll_listener,
            refresh_listener,
            progress,
            context: context.clone(),
        });
        Ok(Some(context))
    }

    fn bind_progress_bar(
        &mut self,
        context: &ScrollContext,
        container: ElementId,
        bar: ElementId,
    ) -> Option<(AnimatedTween, TriggerId)> {
        if !self.stage.contains(bar) {
            tracing::debug!("bootstrap: no progress bar on the page");
            return None;
        }
        let tween = AnimatedTween::new(
            self.animations.clone(),
            TweenSpec::from_to(
                [bar],
                Props::new().set(Property::WidthPct, 0.0),
                Props::new().set(Property::WidthPct, 100.0),
            )
            .ease(Easing::Linear)
            .paused(true),
        );
        let id = tween.id()?;
        let config = context
            .trigger(container)
            .id(PROGRESS_BAR_ID)
            .start(Threshold::top_top())
            .end(Threshold::new(Edge::Bottom, Edge::Bottom))
            .scrub(Scrub::Immediate)
            .animation(id);
        match self.triggers.register(config) {
            Ok(trigger) => {
                self.steps.push(BootStep::ProgressBar);
                Some((tween, trigger))
            }
            Err(err) => {
                tracing::warn!("bootstrap: progress bar trigger rejected: {err}");
                None
            }
        }
    }

    /// Tear down the bindings made by [`initialize`](Self::initialize)
    ///
    /// Each removal is attempted even if an earlier one found nothing to
    /// remove. Calling this more than once does nothing.
    pub fn shutdown(&mut self) {
        let Some(mut bound) = self.bound.take() else {
            return;
        };
        let handle = bound.smooth.handle();

        if let Some(id) = bound.scroll_listener.take() {
            handle.off(id);
        }
        handle.destroy();
        let killed = self.triggers.kill_all();
        if let Some(id) = bound.refresh_listener.take() {
            self.triggers.remove_refresh_listener(id);
        }
        if let Some((mut tween, _)) = bound.progress.take() {
            self.triggers.kill_by_id(PROGRESS_BAR_ID);
            tween.kill();
        }
        self.triggers.clear_scroller_proxy();
        tracing::info!(triggers = killed, "bootstrap: torn down");
    }

    pub fn context(&self) -> Option<ScrollContext> {
        self.bound.as_ref().map(|b| b.context.clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.bound.is_some()
    }

    /// Steps of every initialization so far, in order
    pub fn steps(&self) -> &[BootStep] {
        &self.steps
    }

    /// Number of smooth-scroll containers constructed
    pub fn constructed(&self) -> usize {
        self.constructed
    }
}

impl Drop for ScrollBootstrap {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::AnimationScheduler;
    use folio_core::{Layout, Stage, Viewport};
    use folio_scroll::ViewportTriggers;
    use std::sync::Mutex;

    struct Fixture {
        stage: Stage,
        scheduler: AnimationScheduler,
        registry: ViewportTriggers,
        main: ElementId,
        bar: ElementId,
    }

    fn fixture() -> Fixture {
        let stage = Stage::new(Viewport::new(1440.0, 1000.0));
        let handle = stage.handle();
        let scheduler = AnimationScheduler::new(handle.clone());
        let registry = ViewportTriggers::new(handle.clone(), scheduler.handle());
        let main = handle.create("main", None).unwrap();
        handle.set_layout(main, Layout::new(0.0, 0.0, 1440.0, 5000.0));
        let bar = handle.create("progress-bar", None).unwrap();
        Fixture {
            stage,
            scheduler,
            registry,
            main,
            bar,
        }
    }

    fn bootstrap(f: &Fixture) -> ScrollBootstrap {
        ScrollBootstrap::new(
            f.stage.handle(),
            f.scheduler.handle(),
            f.registry.handle(),
            SmoothScrollConfig::default(),
        )
    }

    #[test]
    fn test_initialize_order() {
        let f = fixture();
        let mut boot = bootstrap(&f);

        let proxy_at_refresh = Arc::new(Mutex::new(None));
        let seen = proxy_at_refresh.clone();
        let triggers = f.registry.handle();
        f.registry.handle().add_refresh_listener(move || {
            seen.lock().unwrap().get_or_insert(triggers.has_proxy());
        });

        let ctx = boot.initialize(f.main, Some(f.bar)).unwrap().unwrap();
        assert_eq!(
            boot.steps(),
            [
                BootStep::Construct,
                BootStep::ScrollListener,
                BootStep::Proxy,
                BootStep::RefreshHook,
                BootStep::Refresh,
                BootStep::ProgressBar,
            ]
        );
        assert_eq!(*proxy_at_refresh.lock().unwrap(), Some(true));
        assert_eq!(ctx.smooth.limit(), 4000.0);
        assert!(f.registry.handle().get_by_id(PROGRESS_BAR_ID).is_some());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let f = fixture();
        let mut boot = bootstrap(&f);
        let first = boot.initialize(f.main, Some(f.bar)).unwrap().unwrap();
        let second = boot.initialize(f.main, Some(f.bar)).unwrap().unwrap();

        assert_eq!(boot.constructed(), 1);
        assert_eq!(first.scroller, second.scroller);
        assert_eq!(first.smooth.listener_count(), 1);
        assert_eq!(f.registry.count(), 1);

        let other = f.stage.handle().create("other", None).unwrap();
        assert!(matches!(
            boot.initialize(other, None),
            Err(SiteError::AlreadyBound)
        ));
    }

    #[test]
    fn test_missing_container_is_noop() {
        let f = fixture();
        let mut boot = bootstrap(&f);
        f.stage.handle().remove(f.main);
        assert!(boot.initialize(f.main, None).unwrap().is_none());
        assert!(!boot.is_initialized());
        assert_eq!(boot.constructed(), 0);
    }

    #[test]
    fn test_progress_bar_follows_scroll() {
        let f = fixture();
        let mut boot = bootstrap(&f);
        let ctx = boot.initialize(f.main, Some(f.bar)).unwrap().unwrap();

        ctx.smooth.scroll_to(2000.0, folio_scroll::ScrollTo::instant());
        ctx.smooth.tick(16.0);
        let width = f.stage.handle().style(f.bar, Property::WidthPct).unwrap();
        assert!((width - 50.0).abs() < 0.01, "width was {width}");
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let f = fixture();
        let mut boot = bootstrap(&f);
        let ctx = boot.initialize(f.main, Some(f.bar)).unwrap().unwrap();

        boot.shutdown();
        boot.shutdown();

        assert!(ctx.smooth.is_destroyed());
        assert_eq!(f.registry.count(), 0);
        assert_eq!(f.registry.handle().refresh_listener_count(), 0);
        assert!(!f.registry.handle().has_proxy());
        assert_eq!(f.scheduler.animation_count(), 0);
        assert!(boot.context().is_none());
    }
}
