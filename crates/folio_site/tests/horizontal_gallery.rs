use folio_animation::AnimationScheduler;
use folio_core::{ElementId, Layout, Property, Stage, Viewport};
use folio_scroll::{Scrub, ScrollTo, SmoothScrollConfig, ViewportTriggers};
use folio_site::{HorizontalGallery, ScrollBootstrap, ScrollContext};

struct Page {
    stage: Stage,
    scheduler: AnimationScheduler,
    registry: ViewportTriggers,
    _boot: ScrollBootstrap,
    ctx: ScrollContext,
    section: ElementId,
    wrapper: ElementId,
    strip: ElementId,
}

fn page(viewport_width: f32, strip_width: f32) -> Page {
    let stage = Stage::new(Viewport::new(viewport_width, 1000.0));
    let handle = stage.handle();
    let scheduler = AnimationScheduler::new(handle.clone());
    let registry = ViewportTriggers::new(handle.clone(), scheduler.handle());

    let main = handle.create("main", None).unwrap();
    handle.set_layout(main, Layout::new(0.0, 0.0, viewport_width, 4000.0));
    let section = handle.create("projects", Some(main)).unwrap();
    handle.set_layout(section, Layout::new(1000.0, 0.0, viewport_width, 1000.0));
    let wrapper = handle.create("projects-wrapper", Some(section)).unwrap();
    handle.set_layout(wrapper, Layout::new(1000.0, 0.0, 1200.0, 1000.0));
    let strip = handle.create("projects-strip", Some(wrapper)).unwrap();
    handle.set_layout(
        strip,
        Layout::new(1100.0, 0.0, 1200.0, 500.0).with_scroll_width(strip_width),
    );

    let mut boot = ScrollBootstrap::new(
        handle,
        scheduler.handle(),
        registry.handle(),
        SmoothScrollConfig::default(),
    );
    let ctx = boot.initialize(main, None).unwrap().unwrap();
    Page {
        stage,
        scheduler,
        registry,
        _boot: boot,
        ctx,
        section,
        wrapper,
        strip,
    }
}

fn gallery(page: &Page) -> HorizontalGallery {
    HorizontalGallery::attach(
        &page.ctx,
        page.section,
        page.wrapper,
        page.strip,
        768.0,
        Scrub::Smoothed(1.0),
    )
}

#[test]
fn test_strip_reaches_half_distance_at_half_progress() {
    let page = page(1200.0, 3000.0);
    let gallery = gallery(&page);
    assert_eq!(gallery.region().unwrap().scroll_distance, 1800.0);

    page.ctx.smooth.scroll_to(1000.0 + 900.0, ScrollTo::instant());
    for _ in 0..250 {
        page.registry.handle().tick(16.0);
        page.scheduler.advance(16.0);
    }

    let x = page.stage.handle().style(page.strip, Property::X).unwrap();
    assert!((x - -900.0).abs() < 0.05, "x was {x}");
    assert!(gallery.region().unwrap().is_pinned);
}

#[test]
fn test_smoothing_lags_behind_the_scroll() {
    let page = page(1200.0, 3000.0);
    let _gallery = gallery(&page);

    page.ctx.smooth.scroll_to(1900.0, ScrollTo::instant());
    page.registry.handle().tick(16.0);
    page.scheduler.advance(16.0);

    let x = page.stage.handle().style(page.strip, Property::X).unwrap();
    assert!(x < 0.0 && x > -900.0, "x was {x}");
}

#[test]
fn test_equal_widths_create_no_region() {
    let page = page(1200.0, 1200.0);
    let gallery = gallery(&page);
    assert!(gallery.region().is_none());
    assert_eq!(page.registry.count(), 0);
    assert_eq!(page.stage.handle().style(page.strip, Property::X), Some(0.0));
}

#[test]
fn test_narrow_viewport_uses_native_swipe() {
    let page = page(700.0, 3000.0);
    let gallery = gallery(&page);
    assert!(gallery.region().is_none());
    assert_eq!(page.registry.count(), 0);
    assert_eq!(page.stage.handle().effective_height(page.section), Some(1000.0));
}
