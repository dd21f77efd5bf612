//! Anchored navigation and the mobile menu
//!
//! Anchor links never use the native jump: the click is intercepted and the
//! smooth scroller is asked to glide to the target section, leaving room for
//! the fixed navbar.

use std::sync::{Arc, Mutex, Weak};

use folio_animation::{AnimatedTween, AnimationHandle, Easing, Props, TweenSpec};
use folio_core::{lock, ElementId, ListenerId, PointerEvent, PointerKind, Property, StageHandle};
use folio_scroll::{ScrollTo, SmoothScrollHandle};

use crate::page::NavElements;

/// Called after a link click has been handled
pub type NavigateHook = Arc<dyn Fn() + Send + Sync>;

/// Document offset to scroll to for `href`, or `None` if it names no element
pub fn anchor_offset(stage: &StageHandle, href: &str, header_offset: f32) -> Option<f32> {
    let anchor = href.strip_prefix('#')?;
    if anchor.is_empty() {
        return None;
    }
    let target = stage.find(anchor)?;
    let top = stage.effective_top(target)?;
    Some((top - header_offset).max(0.0))
}

/// Routes `#anchor` link clicks to the smooth scroller
pub struct AnchorNavigator {
    stage: StageHandle,
    smooth: SmoothScrollHandle,
    header_offset: f32,
    navigation: ScrollTo,
    on_navigate: Option<NavigateHook>,
    bindings: Vec<(ElementId, ListenerId)>,
}

impl AnchorNavigator {
    pub fn new(
        stage: StageHandle,
        smooth: SmoothScrollHandle,
        header_offset: f32,
        navigation: ScrollTo,
    ) -> Self {
        Self {
            stage,
            smooth,
            header_offset,
            navigation,
            on_navigate: None,
            bindings: Vec::new(),
        }
    }

    /// Run `hook` after every handled click on links bound from now on
    pub fn on_navigate<F>(&mut self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_navigate = Some(Arc::new(hook));
    }

    /// Intercept clicks on `link` and scroll to `href` instead
    ///
    /// Returns false if the link is not on the stage.
    pub fn bind_link(&mut self, link: ElementId, href: &str) -> bool {
        let stage = self.stage.clone();
        let smooth = self.smooth.clone();
        let header_offset = self.header_offset;
        let navigation = self.navigation;
        let hook = self.on_navigate.clone();
        let href = href.to_string();

        let listener = self.stage.add_listener(link, PointerKind::Click, move |event: &mut PointerEvent| {
            event.prevent_default();
            match anchor_offset(&stage, &href, header_offset) {
                Some(y) => {
                    tracing::debug!(href = %href, y, "nav: scrolling to anchor");
                    smooth.scroll_to(y, navigation);
                }
                None => tracing::debug!(href = %href, "nav: unknown anchor ignored"),
            }
            if let Some(hook) = &hook {
                hook();
            }
        });

        match listener {
            Some(id) => {
                self.bindings.push((link, id));
                true
            }
            None => false,
        }
    }

    /// Bind every link in `links` using the href stored on the stage
    ///
    /// Links without an href are skipped. Returns how many were bound.
    pub fn bind_links(&mut self, links: impl IntoIterator<Item = ElementId>) -> usize {
        let mut bound = 0;
        for link in links {
            let href = self.stage.with_tree(|t| t.href(link)).flatten();
            match href {
                Some(href) if self.bind_link(link, &href) => bound += 1,
                Some(_) => {}
                None => tracing::debug!("nav: link without href skipped"),
            }
        }
        bound
    }

    pub fn bound(&self) -> usize {
        self.bindings.len()
    }

    /// Remove every click handler installed by this navigator
    pub fn unbind_all(&mut self) {
        for (_, id) in self.bindings.drain(..) {
            self.stage.remove_listener(id);
        }
    }
}

impl Drop for AnchorNavigator {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

// ============================================================================
// Mobile menu
// ============================================================================

const MENU_SLIDE_MS: f32 = 500.0;
const MENU_LINK_MS: f32 = 300.0;
const MENU_LINK_STAGGER_MS: f32 = 100.0;

struct MenuInner {
    stage: StageHandle,
    animations: AnimationHandle,
    menu: ElementId,
    links: Vec<ElementId>,
    open: bool,
    slide: Option<AnimatedTween>,
    links_in: Option<AnimatedTween>,
}

impl MenuInner {
    fn set_open(&mut self, open: bool) {
        if self.open == open {
            return;
        }
        self.open = open;

        let offscreen = self.stage.viewport().map(|v| v.width).unwrap_or(0.0);
        let (x, opacity) = if open { (0.0, 1.0) } else { (offscreen, 0.0) };
        let slide = AnimatedTween::new(
            self.animations.clone(),
            TweenSpec::to(
                [self.menu],
                Props::new().set(Property::X, x).set(Property::Opacity, opacity),
            )
            .duration(MENU_SLIDE_MS)
            .ease(Easing::PowerInOut(3))
            .overwrite(true),
        );
        self.slide = Some(slide);

        self.links_in = if open && !self.links.is_empty() {
            Some(AnimatedTween::new(
                self.animations.clone(),
                TweenSpec::from_to(
                    self.links.iter().copied(),
                    Props::new().set(Property::Opacity, 0.0).set(Property::Y, 20.0),
                    Props::new().set(Property::Opacity, 1.0).set(Property::Y, 0.0),
                )
                .duration(MENU_LINK_MS)
                .stagger(MENU_LINK_STAGGER_MS)
                .delay(MENU_SLIDE_MS - 200.0)
                .ease(Easing::PowerOut(2)),
            ))
        } else {
            None
        };
        tracing::debug!(open, "nav: mobile menu toggled");
    }
}

/// Weak reference to a [`MobileMenu`]
#[derive(Clone)]
pub struct MobileMenuHandle {
    inner: Weak<Mutex<MenuInner>>,
}

impl MobileMenuHandle {
    fn with_inner<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut MenuInner) -> R,
    {
        self.inner.upgrade().map(|inner| f(&mut lock(&inner)))
    }

    /// Flip the menu; returns the new open state
    pub fn toggle(&self) -> bool {
        self.with_inner(|inner| {
            let open = !inner.open;
            inner.set_open(open);
            open
        })
        .unwrap_or(false)
    }

    pub fn open(&self) {
        self.with_inner(|inner| inner.set_open(true));
    }

    pub fn close(&self) {
        self.with_inner(|inner| inner.set_open(false));
    }

    pub fn is_open(&self) -> bool {
        self.with_inner(|inner| inner.open).unwrap_or(false)
    }
}

/// Slide-in navigation panel for narrow viewports
pub struct MobileMenu {
    inner: Arc<Mutex<MenuInner>>,
    stage: StageHandle,
    listener: Option<ListenerId>,
}

impl MobileMenu {
    /// Wire the menu button; `None` if the button or panel is missing
    pub fn attach(stage: &StageHandle, animations: &AnimationHandle, nav: &NavElements) -> Option<Self> {
        if !stage.contains(nav.menu_button) || !stage.contains(nav.mobile_menu) {
            tracing::debug!("nav: mobile menu missing");
            return None;
        }
        let inner = Arc::new(Mutex::new(MenuInner {
            stage: stage.clone(),
            animations: animations.clone(),
            menu: nav.mobile_menu,
            links: nav.mobile_links.clone(),
            open: false,
            slide: None,
            links_in: None,
        }));
        let handle = MobileMenuHandle {
            inner: Arc::downgrade(&inner),
        };
        let listener = stage.add_listener(nav.menu_button, PointerKind::Click, move |_| {
            handle.toggle();
        });
        Some(Self {
            inner,
            stage: stage.clone(),
            listener,
        })
    }

    pub fn handle(&self) -> MobileMenuHandle {
        MobileMenuHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn toggle(&self) -> bool {
        self.handle().toggle()
    }

    pub fn close(&self) {
        self.handle().close();
    }

    pub fn is_open(&self) -> bool {
        lock(&self.inner).open
    }

    /// Remove the button handler and kill the menu tweens
    pub fn detach(&mut self) {
        if let Some(id) = self.listener.take() {
            self.stage.remove_listener(id);
        }
        let (slide, links_in) = {
            let mut inner = lock(&self.inner);
            (inner.slide.take(), inner.links_in.take())
        };
        drop(slide);
        drop(links_in);
    }
}

impl Drop for MobileMenu {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SiteContent;
    use crate::page::PageElements;
    use folio_animation::AnimationScheduler;
    use folio_core::{Layout, Stage, Viewport};
    use folio_scroll::{ScrollCommand, SmoothScroll, SmoothScrollConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        stage: Stage,
        smooth: SmoothScroll,
        contact: ElementId,
        link: ElementId,
    }

    fn fixture() -> Fixture {
        let stage = Stage::new(Viewport::new(1440.0, 900.0));
        let handle = stage.handle();
        let main = handle.create("main", None).unwrap();
        handle.set_layout(main, Layout::new(0.0, 0.0, 1440.0, 4000.0));
        let contact = handle.create("contact", Some(main)).unwrap();
        handle.set_layout(contact, Layout::new(2500.0, 0.0, 1440.0, 900.0));
        let link = handle.create("nav-link", None).unwrap();
        handle.set_href(link, "#contact");
        let smooth = SmoothScroll::new(handle, main, SmoothScrollConfig::default());
        Fixture {
            stage,
            smooth,
            contact,
            link,
        }
    }

    fn navigator(f: &Fixture) -> AnchorNavigator {
        AnchorNavigator::new(
            f.stage.handle(),
            f.smooth.handle(),
            70.0,
            ScrollTo::animated(1500.0, Easing::PowerInOut(3)),
        )
    }

    #[test]
    fn test_click_scrolls_once_without_native_jump() {
        let f = fixture();
        let mut nav = navigator(&f);
        assert!(nav.bind_link(f.link, "#contact"));

        let event = f.stage.handle().click(f.link).unwrap();
        assert!(event.is_default_prevented());
        assert_eq!(f.stage.handle().native_jumps(), 0);
        assert_eq!(f.smooth.handle().scroll_to_count(), 1);
        assert_eq!(
            f.smooth.handle().commands().last(),
            Some(&ScrollCommand::ScrollTo {
                target: 2430.0,
                duration_ms: 1500.0,
                disable_lerp: false,
            })
        );

        for _ in 0..120 {
            f.smooth.handle().tick(16.0);
        }
        assert_eq!(f.smooth.handle().state().offset, 2430.0);
        assert_eq!(f.stage.handle().effective_top(f.contact), Some(2500.0));
    }

    #[test]
    fn test_unknown_anchor_is_absorbed() {
        let f = fixture();
        let mut nav = navigator(&f);
        nav.bind_link(f.link, "#nowhere");

        let event = f.stage.handle().click(f.link).unwrap();
        assert!(event.is_default_prevented());
        assert_eq!(f.smooth.handle().scroll_to_count(), 0);
        assert_eq!(f.stage.handle().native_jumps(), 0);
    }

    #[test]
    fn test_unbound_link_jumps_natively() {
        let f = fixture();
        let mut nav = navigator(&f);
        nav.bind_link(f.link, "#contact");
        nav.unbind_all();

        f.stage.handle().click(f.link);
        assert_eq!(f.stage.handle().native_jumps(), 1);
        assert_eq!(f.smooth.handle().scroll_to_count(), 0);
    }

    #[test]
    fn test_navigate_hook_runs_per_click() {
        let f = fixture();
        let mut nav = navigator(&f);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        nav.on_navigate(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(nav.bind_links([f.link]), 1);

        f.stage.handle().click(f.link);
        f.stage.handle().click(f.link);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_anchor_offset_clamps_at_top() {
        let f = fixture();
        let handle = f.stage.handle();
        let hero = handle.create("hero", None).unwrap();
        handle.set_layout(hero, Layout::new(0.0, 0.0, 1440.0, 900.0));
        assert_eq!(anchor_offset(&handle, "#hero", 70.0), Some(0.0));
        assert_eq!(anchor_offset(&handle, "#", 70.0), None);
        assert_eq!(anchor_offset(&handle, "contact", 70.0), None);
    }

    #[test]
    fn test_mobile_menu_toggle() {
        let stage = Stage::new(Viewport::new(375.0, 812.0));
        let handle = stage.handle();
        let scheduler = AnimationScheduler::new(handle.clone());
        let page = PageElements::build(&handle, &SiteContent::default()).unwrap();
        let mut menu = MobileMenu::attach(&handle, &scheduler.handle(), &page.nav).unwrap();
        let panel = page.nav.mobile_menu;

        handle.click(page.nav.menu_button);
        assert!(menu.is_open());
        scheduler.advance(2000.0);
        assert_eq!(handle.style(panel, Property::X), Some(0.0));
        assert_eq!(handle.style(panel, Property::Opacity), Some(1.0));
        for link in &page.nav.mobile_links {
            assert_eq!(handle.style(*link, Property::Opacity), Some(1.0));
        }

        handle.click(page.nav.menu_button);
        assert!(!menu.is_open());
        scheduler.advance(2000.0);
        assert_eq!(handle.style(panel, Property::X), Some(375.0));
        assert_eq!(handle.style(panel, Property::Opacity), Some(0.0));

        menu.detach();
        assert_eq!(handle.listener_count(page.nav.menu_button), 0);
        assert_eq!(scheduler.animation_count(), 0);
    }
}
