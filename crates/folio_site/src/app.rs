//! Portfolio page application
//!
//! Owns the stage, the animation scheduler and the trigger registry, and runs
//! the page lifecycle frame by frame:
//!
//! 1. `mount()` starts the preloader, which locks scrolling
//! 2. when the intro finishes, a short settle timer runs
//! 3. the timer expiring boots smooth scrolling and attaches every controller
//! 4. from then on each frame eases the scroller and the scrubbed triggers
//!
//! `unmount()` tears everything down and is safe to call more than once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use folio_animation::{AnimatedTween, AnimationHandle, AnimationScheduler, Easing, Props, TweenSpec};
use folio_core::{ElementId, PointerEvent, PointerKind, Property, Stage, StageHandle, Viewport};
use folio_scroll::{TriggerHandle, ViewportTriggers};

use crate::bootstrap::{ScrollBootstrap, ScrollContext};
use crate::config::{ResolvedConfig, SiteConfig};
use crate::contact::{ContactForm, SubmissionSink};
use crate::content::SiteContent;
use crate::error::{Result, SiteError};
use crate::gallery::HorizontalGallery;
use crate::nav::{AnchorNavigator, MobileMenu};
use crate::page::PageElements;
use crate::preloader::{GateState, PreloaderGate};
use crate::reveal::SectionReveal;
use crate::sections;

const MAIN_FADE_DELAY_MS: f32 = 200.0;

/// Where the page is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// Built but not mounted
    Created,
    /// Intro playing, scrolling locked
    Preloading,
    /// Intro done, waiting for the settle timer
    Settling,
    /// Smooth scrolling bound and controllers attached
    Running,
    Unmounted,
}

/// Controllers created at boot
struct Controllers {
    sections: Vec<SectionReveal>,
    gallery: HorizontalGallery,
    navigator: AnchorNavigator,
    menu: Option<MobileMenu>,
    main_fade: AnimatedTween,
}

impl Controllers {
    fn detach(&mut self) {
        for section in &mut self.sections {
            section.detach();
        }
        self.gallery.detach();
        self.navigator.unbind_all();
        if let Some(menu) = &mut self.menu {
            menu.detach();
        }
        self.main_fade.kill();
    }
}

/// The whole animated portfolio page
pub struct PortfolioApp {
    config: ResolvedConfig,
    content: SiteContent,
    phase: AppPhase,
    preloaded: Arc<AtomicBool>,
    settle_remaining_ms: f32,

    // Dropped in this order: controllers before the owners they point into
    controllers: Option<Controllers>,
    form: ContactForm,
    bootstrap: ScrollBootstrap,
    preloader: PreloaderGate,
    page: PageElements,
    triggers: ViewportTriggers,
    scheduler: AnimationScheduler,
    stage: Stage,
}

impl PortfolioApp {
    /// Build the page for `viewport`
    ///
    /// Fails if the config or the content does not validate.
    pub fn new(config: SiteConfig, content: SiteContent, viewport: Viewport) -> Result<Self> {
        let config = config.resolve()?;
        content.validate()?;

        let stage = Stage::new(viewport);
        let scheduler = AnimationScheduler::new(stage.handle());
        let triggers = ViewportTriggers::new(stage.handle(), scheduler.handle());
        let page = PageElements::build(&stage.handle(), &content)
            .ok_or_else(|| SiteError::Content("page could not be built".to_string()))?;

        let preloader =
            PreloaderGate::with_default_intro(stage.handle(), scheduler.handle(), &page.preloader);
        let bootstrap = ScrollBootstrap::new(
            stage.handle(),
            scheduler.handle(),
            triggers.handle(),
            config.smooth.clone(),
        );
        let form = ContactForm::new(scheduler.handle(), Some(page.contact.submit));

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            projects = content.projects.len(),
            "app: page built"
        );

        Ok(Self {
            config,
            content,
            phase: AppPhase::Created,
            preloaded: Arc::new(AtomicBool::new(false)),
            settle_remaining_ms: 0.0,
            controllers: None,
            form,
            bootstrap,
            preloader,
            page,
            triggers,
            scheduler,
            stage,
        })
    }

    /// Send contact form submissions to `sink` instead of the log
    pub fn with_sink(mut self, sink: Arc<dyn SubmissionSink>) -> Self {
        self.form = ContactForm::with_sink(
            self.scheduler.handle(),
            Some(self.page.contact.submit),
            sink,
        );
        self
    }

    /// Start the preloader; later calls do nothing
    pub fn mount(&mut self) {
        if self.phase != AppPhase::Created {
            tracing::debug!(phase = ?self.phase, "app: mount ignored");
            return;
        }
        self.phase = AppPhase::Preloading;
        let preloaded = self.preloaded.clone();
        self.preloader.activate(move || {
            preloaded.store(true, Ordering::SeqCst);
        });
        tracing::info!(intro_ms = self.preloader.duration_ms(), "app: mounted");
    }

    /// Run one frame of `dt_ms`
    pub fn advance(&mut self, dt_ms: f32) -> Result<AppPhase> {
        if matches!(self.phase, AppPhase::Created | AppPhase::Unmounted) {
            return Ok(self.phase);
        }
        self.scheduler.advance(dt_ms);

        match self.phase {
            AppPhase::Preloading => {
                if self.preloaded.load(Ordering::SeqCst) {
                    self.phase = AppPhase::Settling;
                    self.settle_remaining_ms = self.config.settle_ms;
                    tracing::debug!(settle_ms = self.config.settle_ms, "app: preloader finished");
                }
            }
            AppPhase::Settling => {
                self.settle_remaining_ms -= dt_ms;
                if self.settle_remaining_ms <= 0.0 {
                    self.boot()?;
                }
            }
            AppPhase::Running => {
                if let Some(ctx) = self.bootstrap.context() {
                    ctx.smooth.tick(dt_ms);
                }
                self.triggers.handle().tick(dt_ms);
            }
            AppPhase::Created | AppPhase::Unmounted => {}
        }
        Ok(self.phase)
    }

    fn boot(&mut self) -> Result<()> {
        let stage = self.stage.handle();
        let Some(ctx) = self
            .bootstrap
            .initialize(self.page.main, Some(self.page.progress_bar))?
        else {
            tracing::warn!("app: no scroll container, showing the page statically");
            stage.set_style(self.page.main, Property::Opacity, 1.0);
            self.phase = AppPhase::Running;
            return Ok(());
        };

        let page = &self.page;
        let width = stage.viewport().map(|v| v.width).unwrap_or(0.0);
        let sections = vec![
            SectionReveal::attach(&ctx, page.hero.root, sections::hero(page, width)),
            SectionReveal::attach(&ctx, page.about.root, sections::about(page, self.config.sections)),
            SectionReveal::attach(&ctx, page.projects.root, sections::projects(page, self.config.sections)),
            SectionReveal::attach(&ctx, page.contact.root, sections::contact(page, self.config.sections)),
            SectionReveal::attach(&ctx, page.footer.root, sections::footer(page, self.config.footer)),
        ];

        let gallery = HorizontalGallery::attach(
            &ctx,
            page.projects.root,
            page.projects.wrapper,
            page.projects.strip,
            self.config.breakpoint,
            self.config.gallery_scrub,
        );

        let menu = MobileMenu::attach(&stage, &ctx.animations, &page.nav);
        let mut navigator = AnchorNavigator::new(
            stage.clone(),
            ctx.smooth.clone(),
            self.config.header_offset,
            self.config.navigation,
        );
        if let Some(menu) = &menu {
            let menu = menu.handle();
            navigator.on_navigate(move || menu.close());
        }
        let links = page
            .nav
            .links
            .iter()
            .chain(&page.nav.mobile_links)
            .chain(&page.footer.links)
            .copied()
            .chain([page.hero.cta]);
        let bound = navigator.bind_links(links);

        let main_fade = AnimatedTween::new(
            ctx.animations.clone(),
            TweenSpec::from_to(
                [page.main],
                Props::new().set(Property::Opacity, 0.0),
                Props::new().set(Property::Opacity, 1.0),
            )
            .duration(self.config.main_fade_ms)
            .delay(MAIN_FADE_DELAY_MS)
            .ease(Easing::PowerOut(2)),
        );

        tracing::info!(
            sections = sections.len(),
            links = bound,
            pinned = gallery.region().is_some(),
            "app: booted"
        );
        self.controllers = Some(Controllers {
            sections,
            gallery,
            navigator,
            menu,
            main_fade,
        });
        self.phase = AppPhase::Running;
        Ok(())
    }

    /// Feed wheel input; smooth once booted, native before
    pub fn wheel(&self, delta: f32) -> bool {
        match (self.phase, self.bootstrap.context()) {
            (AppPhase::Running, Some(ctx)) => ctx.smooth.wheel(delta),
            (AppPhase::Unmounted, _) => false,
            _ => self.stage.handle().scroll_native_by(delta),
        }
    }

    /// Re-lay the page for a new viewport and rebuild scroll geometry
    pub fn resize(&mut self, viewport: Viewport) {
        if self.phase == AppPhase::Unmounted {
            return;
        }
        let stage = self.stage.handle();
        stage.set_viewport(viewport);
        self.page.layout(&stage);
        if let Some(controllers) = &mut self.controllers {
            controllers.gallery.recompute();
        }
        self.triggers.handle().refresh();
        tracing::debug!(width = viewport.width, height = viewport.height, "app: resized");
    }

    pub fn pointer(&self, element: ElementId, kind: PointerKind) -> Option<PointerEvent> {
        self.stage.handle().dispatch(element, kind)
    }

    pub fn click(&self, element: ElementId) -> Option<PointerEvent> {
        self.stage.handle().click(element)
    }

    /// Cancel everything: controllers, preloader, scroll bindings, animations
    pub fn unmount(&mut self) {
        if self.phase == AppPhase::Unmounted {
            return;
        }
        if let Some(mut controllers) = self.controllers.take() {
            controllers.detach();
        }
        self.form.detach();
        self.preloader.detach();
        self.bootstrap.shutdown();
        let killed = self.scheduler.handle().kill_all();
        self.phase = AppPhase::Unmounted;
        tracing::info!(animations = killed, "app: unmounted");
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    pub fn stage(&self) -> StageHandle {
        self.stage.handle()
    }

    pub fn elements(&self) -> &PageElements {
        &self.page
    }

    pub fn animations(&self) -> AnimationHandle {
        self.scheduler.handle()
    }

    pub fn triggers(&self) -> TriggerHandle {
        self.triggers.handle()
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn content(&self) -> &SiteContent {
        &self.content
    }

    /// Scroll context, once booted
    pub fn context(&self) -> Option<ScrollContext> {
        self.bootstrap.context()
    }

    pub fn bootstrap(&self) -> &ScrollBootstrap {
        &self.bootstrap
    }

    pub fn preloader_state(&self) -> GateState {
        self.preloader.state()
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContactForm {
        &mut self.form
    }

    /// Reveal controller for a section by name
    pub fn section(&self, name: &str) -> Option<&SectionReveal> {
        self.controllers
            .as_ref()?
            .sections
            .iter()
            .find(|s| s.name() == name)
    }

    pub fn gallery(&self) -> Option<&HorizontalGallery> {
        self.controllers.as_ref().map(|c| &c.gallery)
    }

    pub fn menu(&self) -> Option<&MobileMenu> {
        self.controllers.as_ref()?.menu.as_ref()
    }
}

impl Drop for PortfolioApp {
    fn drop(&mut self) {
        self.unmount();
    }
}
