//! Horizontal gallery
//!
//! On wide viewports the project strip is pinned and translated sideways as
//! the page scrolls: the section holds still for exactly the strip's overflow
//! while a scrubbed tween moves the strip from `x = 0` to `x = -overflow`.
//! Narrow viewports fall back to a native horizontal swipe with no pin.

use std::sync::{Arc, Mutex};

use folio_animation::{AnimatedTween, Easing, Props, TweenSpec};
use folio_core::{lock, ElementId, Property, StageHandle};
use folio_scroll::{EndThreshold, RefreshListenerId, Scrub, Threshold, TriggerId, TriggerPhase};

use crate::bootstrap::ScrollContext;

/// Geometry of an active pinned region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinnedScrollRegion {
    pub scroll_distance: f32,
    pub is_pinned: bool,
}

struct Region {
    distance: f32,
    tween: AnimatedTween,
    trigger: TriggerId,
}

struct GalleryInner {
    ctx: ScrollContext,
    section: ElementId,
    wrapper: ElementId,
    strip: ElementId,
    breakpoint: f32,
    scrub: Scrub,
    region: Option<Region>,
    attached: bool,
}

/// Pinned horizontal scroll for the projects strip
///
/// The region follows the strip geometry on every trigger refresh, so a
/// content change only needs `triggers.refresh()` to keep the pin length
/// and the translation equal.
pub struct HorizontalGallery {
    inner: Arc<Mutex<GalleryInner>>,
    ctx: ScrollContext,
    refresh_listener: Option<RefreshListenerId>,
}

/// Overflow of the strip past its wrapper
fn scroll_distance(stage: &StageHandle, wrapper: ElementId, strip: ElementId) -> Option<f32> {
    let strip = stage.layout(strip)?;
    let wrapper = stage.layout(wrapper)?;
    Some(strip.scroll_width - wrapper.offset_width())
}

impl GalleryInner {
    /// Bring the region in line with the viewport and strip geometry
    ///
    /// Returns true if a trigger was added or removed, meaning the caller
    /// must refresh the registry unless a refresh is already running.
    fn sync(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        let stage = self.ctx.stage.clone();
        let elements_present = [self.section, self.wrapper, self.strip]
            .iter()
            .all(|el| stage.contains(*el));
        if !elements_present {
            tracing::debug!("gallery: elements missing, no pinned region");
            return self.clear_region();
        }

        let width = stage.viewport().map(|v| v.width).unwrap_or(0.0);
        let distance = scroll_distance(&stage, self.wrapper, self.strip).unwrap_or(0.0);

        if width < self.breakpoint || distance <= 0.0 {
            tracing::debug!(width, distance, "gallery: native horizontal scroll");
            let removed = self.clear_region();
            stage.set_style(self.strip, Property::X, 0.0);
            return removed;
        }

        if self.region.as_ref().is_some_and(|r| r.distance == distance) {
            return false;
        }

        self.clear_region();
        self.build_region(distance);
        true
    }

    fn build_region(&mut self, distance: f32) {
        let tween = AnimatedTween::new(
            self.ctx.animations.clone(),
            TweenSpec::from_to(
                [self.strip],
                Props::new().set(Property::X, 0.0),
                Props::new().set(Property::X, -distance),
            )
            .ease(Easing::Linear)
            .paused(true),
        );
        let Some(id) = tween.id() else {
            return;
        };

        let stage = self.ctx.stage.clone();
        let (wrapper, strip) = (self.wrapper, self.strip);
        let end = EndThreshold::Computed(Arc::new(move || {
            scroll_distance(&stage, wrapper, strip).unwrap_or(0.0).max(0.0)
        }));
        let config = self
            .ctx
            .trigger(self.section)
            .start(Threshold::top_top())
            .end(end)
            .scrub(self.scrub)
            .pin(true)
            .invalidate_on_refresh(true)
            .animation(id);

        match self.ctx.triggers.register(config) {
            Ok(trigger) => {
                tracing::info!(distance, "gallery: pinned region created");
                self.region = Some(Region {
                    distance,
                    tween,
                    trigger,
                });
            }
            Err(err) => tracing::warn!("gallery: trigger rejected: {err}"),
        }
    }

    /// Kill the region and any pin trigger on the section; true if anything was removed
    fn clear_region(&mut self) -> bool {
        let mut removed = false;
        if let Some(mut region) = self.region.take() {
            removed |= self.ctx.triggers.kill(region.trigger);
            region.tween.kill();
        }
        let section = self.section;
        removed |= self
            .ctx
            .triggers
            .kill_where(|info| info.pin && info.trigger == section)
            > 0;
        removed
    }
}

impl HorizontalGallery {
    /// Attach to the section and build the region if the viewport allows it
    pub fn attach(
        ctx: &ScrollContext,
        section: ElementId,
        wrapper: ElementId,
        strip: ElementId,
        breakpoint: f32,
        scrub: Scrub,
    ) -> Self {
        let inner = Arc::new(Mutex::new(GalleryInner {
            ctx: ctx.clone(),
            section,
            wrapper,
            strip,
            breakpoint,
            scrub,
            region: None,
            attached: true,
        }));

        // Runs inside a refresh, after pin spacing and before boundaries
        let weak = Arc::downgrade(&inner);
        let refresh_listener = ctx.triggers.add_refresh_listener(move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner).sync();
            }
        });

        let mut gallery = Self {
            inner,
            ctx: ctx.clone(),
            refresh_listener,
        };
        gallery.recompute();
        gallery
    }

    /// Rebuild the region for the current viewport and strip geometry
    ///
    /// Call after a resize or an orientation change. Content changes are
    /// also picked up by any trigger refresh.
    pub fn recompute(&mut self) -> Option<PinnedScrollRegion> {
        // The gallery lock must be released before refreshing: the refresh
        // listener takes it again.
        let changed = lock(&self.inner).sync();
        if changed {
            self.ctx.triggers.refresh();
        }
        self.region()
    }

    /// Current region, if one exists
    pub fn region(&self) -> Option<PinnedScrollRegion> {
        let (distance, trigger) = {
            let inner = lock(&self.inner);
            let region = inner.region.as_ref()?;
            (region.distance, region.trigger)
        };
        let is_pinned = self
            .ctx
            .triggers
            .info(trigger)
            .is_some_and(|info| info.phase == TriggerPhase::Active);
        Some(PinnedScrollRegion {
            scroll_distance: distance,
            is_pinned,
        })
    }

    pub fn trigger_id(&self) -> Option<TriggerId> {
        lock(&self.inner).region.as_ref().map(|r| r.trigger)
    }

    /// Tear down the region; later calls and recomputes do nothing
    pub fn detach(&mut self) {
        if let Some(id) = self.refresh_listener.take() {
            self.ctx.triggers.remove_refresh_listener(id);
        }
        let removed = {
            let mut inner = lock(&self.inner);
            if !inner.attached {
                return;
            }
            inner.attached = false;
            inner.clear_region()
        };
        if removed {
            self.ctx.triggers.refresh();
        }
        tracing::debug!("gallery: detached");
    }
}

impl Drop for HorizontalGallery {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::ScrollBootstrap;
    use folio_animation::AnimationScheduler;
    use folio_core::{Layout, Stage, Viewport};
    use folio_scroll::{SmoothScrollConfig, ViewportTriggers};

    struct Fixture {
        stage: Stage,
        scheduler: AnimationScheduler,
        registry: ViewportTriggers,
        _boot: ScrollBootstrap,
        ctx: ScrollContext,
        section: ElementId,
        wrapper: ElementId,
        strip: ElementId,
        contact: ElementId,
    }

    fn fixture(strip_width: f32) -> Fixture {
        let stage = Stage::new(Viewport::new(1200.0, 1000.0));
        let handle = stage.handle();
        let scheduler = AnimationScheduler::new(handle.clone());
        let registry = ViewportTriggers::new(handle.clone(), scheduler.handle());

        let main = handle.create("main", None).unwrap();
        handle.set_layout(main, Layout::new(0.0, 0.0, 1200.0, 5000.0));
        let section = handle.create("projects", Some(main)).unwrap();
        handle.set_layout(section, Layout::new(1000.0, 0.0, 1200.0, 1000.0));
        let wrapper = handle.create("projects-wrapper", Some(section)).unwrap();
        handle.set_layout(wrapper, Layout::new(1000.0, 0.0, 1200.0, 1000.0));
        let strip = handle.create("projects-strip", Some(wrapper)).unwrap();
        handle.set_layout(
            strip,
            Layout::new(1100.0, 0.0, 1200.0, 500.0).with_scroll_width(strip_width),
        );
        let contact = handle.create("contact", Some(main)).unwrap();
        handle.set_layout(contact, Layout::new(2000.0, 0.0, 1200.0, 1000.0));

        let mut boot = ScrollBootstrap::new(
            handle,
            scheduler.handle(),
            registry.handle(),
            SmoothScrollConfig::default(),
        );
        let ctx = boot.initialize(main, None).unwrap().unwrap();
        Fixture {
            stage,
            scheduler,
            registry,
            _boot: boot,
            ctx,
            section,
            wrapper,
            strip,
            contact,
        }
    }

    fn attach(f: &Fixture) -> HorizontalGallery {
        HorizontalGallery::attach(
            &f.ctx,
            f.section,
            f.wrapper,
            f.strip,
            768.0,
            Scrub::Smoothed(1.0),
        )
    }

    #[test]
    fn test_region_distance_and_pin_spacing() {
        let f = fixture(3000.0);
        let gallery = attach(&f);
        let region = gallery.region().unwrap();
        assert_eq!(region.scroll_distance, 1800.0);
        assert!(!region.is_pinned);
        assert_eq!(f.stage.handle().effective_top(f.contact), Some(3800.0));
        assert_eq!(f.ctx.smooth.limit(), 5800.0);
    }

    #[test]
    fn test_no_region_without_overflow() {
        let f = fixture(1200.0);
        let gallery = attach(&f);
        assert!(gallery.region().is_none());
        assert_eq!(f.registry.count(), 0);
    }

    #[test]
    fn test_breakpoint_toggle() {
        let f = fixture(3000.0);
        let mut gallery = attach(&f);
        assert!(gallery.region().is_some());

        f.ctx.smooth.scroll_to(1900.0, folio_scroll::ScrollTo::instant());
        for _ in 0..200 {
            f.registry.handle().tick(16.0);
            f.scheduler.advance(16.0);
        }
        assert!(gallery.region().unwrap().is_pinned);
        assert!(f.stage.handle().style(f.strip, Property::X).unwrap() < 0.0);

        f.stage.handle().set_viewport(Viewport::new(600.0, 1000.0));
        assert!(gallery.recompute().is_none());
        assert_eq!(f.registry.count(), 0);
        assert_eq!(f.stage.handle().style(f.strip, Property::X), Some(0.0));
        assert_eq!(f.stage.handle().effective_top(f.contact), Some(2000.0));
        assert_eq!(f.scheduler.animation_count(), 0);

        f.stage.handle().set_viewport(Viewport::new(1200.0, 1000.0));
        assert_eq!(gallery.recompute().unwrap().scroll_distance, 1800.0);
        assert_eq!(f.registry.count(), 1);
    }

    #[test]
    fn test_rebuilds_when_distance_changes() {
        let f = fixture(3000.0);
        let mut gallery = attach(&f);
        let first = gallery.trigger_id().unwrap();

        assert_eq!(gallery.recompute().unwrap().scroll_distance, 1800.0);
        assert_eq!(gallery.trigger_id(), Some(first));

        let strip = f.stage.handle().layout(f.strip).unwrap();
        f.stage.handle().set_layout(f.strip, strip.with_scroll_width(2400.0));
        assert_eq!(gallery.recompute().unwrap().scroll_distance, 1200.0);
        assert_ne!(gallery.trigger_id(), Some(first));
        assert_eq!(f.registry.count(), 1);
        assert_eq!(f.scheduler.animation_count(), 1);
    }

    #[test]
    fn test_detach_unpins() {
        let f = fixture(3000.0);
        let mut gallery = attach(&f);
        gallery.detach();
        gallery.detach();
        assert!(gallery.recompute().is_none());
        assert_eq!(f.registry.count(), 0);
        assert_eq!(f.stage.handle().effective_top(f.contact), Some(2000.0));
    }

    #[test]
    fn test_refresh_alone_follows_content_change() {
        let f = fixture(3000.0);
        let gallery = attach(&f);
        assert_eq!(f.registry.handle().refresh_listener_count(), 2);

        let strip = f.stage.handle().layout(f.strip).unwrap();
        f.stage.handle().set_layout(f.strip, strip.with_scroll_width(2400.0));
        f.registry.handle().refresh();

        let region = gallery.region().unwrap();
        assert_eq!(region.scroll_distance, 1200.0);
        let info = f.registry.handle().info(gallery.trigger_id().unwrap()).unwrap();
        assert_eq!(info.end - info.start, 1200.0);
        assert_eq!(f.scheduler.animation_count(), 1);

        f.ctx.smooth.scroll_to(info.end + 200.0, folio_scroll::ScrollTo::instant());
        f.registry.handle().update();
        for _ in 0..400 {
            f.registry.handle().tick(16.0);
            f.scheduler.advance(16.0);
        }
        let x = f.stage.handle().style(f.strip, Property::X).unwrap();
        assert!((x - -1200.0).abs() < 0.05, "x was {x}");
    }

    #[test]
    fn test_refresh_drops_region_when_overflow_vanishes() {
        let f = fixture(3000.0);
        let gallery = attach(&f);

        let strip = f.stage.handle().layout(f.strip).unwrap();
        f.stage.handle().set_layout(f.strip, strip.with_scroll_width(1200.0));
        f.registry.handle().refresh();

        assert!(gallery.region().is_none());
        assert_eq!(f.registry.count(), 0);
        assert_eq!(f.stage.handle().effective_top(f.contact), Some(2000.0));
        assert_eq!(f.stage.handle().style(f.strip, Property::X), Some(0.0));
    }

    #[test]
    fn test_detach_removes_refresh_listener() {
        let f = fixture(3000.0);
        let before = f.registry.handle().refresh_listener_count();
        let mut gallery = attach(&f);
        assert_eq!(f.registry.handle().refresh_listener_count(), before + 1);
        gallery.detach();
        assert_eq!(f.registry.handle().refresh_listener_count(), before);
    }
}
