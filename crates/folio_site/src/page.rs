//! Page structure
//!
//! Builds the element tree for the portfolio page and lays it out for a
//! viewport. Fixed chrome (preloader, navbar, progress bar, mobile menu) hangs
//! off the document root; the sections live inside the `main` scroll
//! container. Section labels double as anchor ids.

use folio_core::{ElementId, Layout, Property, StageHandle, Viewport};

use crate::content::SiteContent;

/// Height of the fixed navbar
pub const NAV_HEIGHT: f32 = 70.0;
/// Thickness of the scroll progress bar
pub const PROGRESS_HEIGHT: f32 = 4.0;
/// Height of the footer section
pub const FOOTER_HEIGHT: f32 = 320.0;

const CARD_WIDTH: f32 = 400.0;
const CARD_GAP: f32 = 32.0;
const STRIP_PADDING: f32 = 48.0;

/// Glow orb placement: size, then top and left as fractions of the section
type OrbPlacement = (f32, f32, f32);

const HERO_ORBS: [OrbPlacement; 4] = [
    (200.0, 0.10, 0.05),
    (300.0, 0.55, 0.70),
    (250.0, 0.30, 0.62),
    (180.0, 0.75, 0.30),
];
const ABOUT_ORBS: [OrbPlacement; 2] = [(220.0, 0.15, 0.80), (180.0, 0.70, 0.10)];
const PROJECTS_ORBS: [OrbPlacement; 2] = [(250.0, 0.10, 0.05), (300.0, 0.60, 0.75)];
const CONTACT_ORBS: [OrbPlacement; 2] = [(180.0, 0.20, 0.85), (200.0, 0.70, 0.05)];

#[derive(Debug, Clone, Copy)]
pub struct PreloaderElements {
    pub overlay: ElementId,
    pub text: ElementId,
    pub bar: ElementId,
}

#[derive(Debug, Clone)]
pub struct NavElements {
    pub bar: ElementId,
    pub links: Vec<ElementId>,
    pub menu_button: ElementId,
    pub mobile_menu: ElementId,
    pub mobile_links: Vec<ElementId>,
}

#[derive(Debug, Clone, Copy)]
pub struct HeroElements {
    pub root: ElementId,
    pub headline: ElementId,
    pub subtitle: ElementId,
    pub cta: ElementId,
    pub visual: ElementId,
    pub orbs: [ElementId; 4],
}

#[derive(Debug, Clone)]
pub struct AboutElements {
    pub root: ElementId,
    pub heading: ElementId,
    pub image: ElementId,
    pub bio: ElementId,
    pub skills: Vec<ElementId>,
    pub orbs: [ElementId; 2],
}

#[derive(Debug, Clone)]
pub struct ProjectsElements {
    pub root: ElementId,
    pub heading: ElementId,
    pub wrapper: ElementId,
    pub strip: ElementId,
    pub cards: Vec<ElementId>,
    pub orbs: [ElementId; 2],
}

#[derive(Debug, Clone)]
pub struct ContactElements {
    pub root: ElementId,
    pub heading: ElementId,
    pub form: ElementId,
    pub fields: Vec<ElementId>,
    pub submit: ElementId,
    pub socials: Vec<ElementId>,
    pub orbs: [ElementId; 2],
}

#[derive(Debug, Clone)]
pub struct FooterElements {
    pub root: ElementId,
    pub links: Vec<ElementId>,
    pub socials: Vec<ElementId>,
}

/// Every element the controllers address
#[derive(Debug, Clone)]
pub struct PageElements {
    pub preloader: PreloaderElements,
    pub progress_bar: ElementId,
    pub nav: NavElements,
    pub main: ElementId,
    pub hero: HeroElements,
    pub about: AboutElements,
    pub projects: ProjectsElements,
    pub contact: ContactElements,
    pub footer: FooterElements,
}

impl PageElements {
    /// Build the element tree for `content` and lay it out
    ///
    /// Returns `None` if the stage has been dropped.
    pub fn build(stage: &StageHandle, content: &SiteContent) -> Option<Self> {
        let root = stage.root()?;
        let el = |label: &str, parent: ElementId| stage.create(label, Some(parent));

        let overlay = el("preloader", root)?;
        let preloader = PreloaderElements {
            overlay,
            text: el("preloader-text", overlay)?,
            bar: el("preloader-bar", overlay)?,
        };

        let progress_bar = el("progress-bar", root)?;

        let bar = el("navbar", root)?;
        let mut links = Vec::with_capacity(content.nav.len());
        for link in &content.nav {
            let id = el("nav-link", bar)?;
            stage.set_href(id, &link.href);
            links.push(id);
        }
        let menu_button = el("menu-button", bar)?;
        let mobile_menu = el("mobile-menu", root)?;
        let mut mobile_links = Vec::with_capacity(content.nav.len());
        for link in &content.nav {
            let id = el("mobile-nav-link", mobile_menu)?;
            stage.set_href(id, &link.href);
            mobile_links.push(id);
        }
        let nav = NavElements {
            bar,
            links,
            menu_button,
            mobile_menu,
            mobile_links,
        };

        let main = el("main", root)?;

        let hero_root = el("hero", main)?;
        let hero = HeroElements {
            root: hero_root,
            headline: el("hero-headline", hero_root)?,
            subtitle: el("hero-subtitle", hero_root)?,
            cta: el("hero-cta", hero_root)?,
            visual: el("hero-visual", hero_root)?,
            orbs: orbs(stage, hero_root)?,
        };
        stage.set_href(hero.cta, "#contact");

        let about_root = el("about", main)?;
        let heading = el("about-heading", about_root)?;
        let image = el("about-image", about_root)?;
        let bio = el("about-bio", about_root)?;
        let skill_grid = el("skills", about_root)?;
        let skills = content
            .skills
            .iter()
            .map(|_| el("skill", skill_grid))
            .collect::<Option<Vec<_>>>()?;
        let about = AboutElements {
            root: about_root,
            heading,
            image,
            bio,
            skills,
            orbs: orbs(stage, about_root)?,
        };

        let projects_root = el("projects", main)?;
        let heading = el("projects-heading", projects_root)?;
        let wrapper = el("projects-wrapper", projects_root)?;
        let strip = el("projects-strip", wrapper)?;
        let cards = content
            .projects
            .iter()
            .map(|_| el("project-card", strip))
            .collect::<Option<Vec<_>>>()?;
        let projects = ProjectsElements {
            root: projects_root,
            heading,
            wrapper,
            strip,
            cards,
            orbs: orbs(stage, projects_root)?,
        };

        let contact_root = el("contact", main)?;
        let heading = el("contact-heading", contact_root)?;
        let form = el("contact-form", contact_root)?;
        let fields = ["contact-name", "contact-email", "contact-message"]
            .into_iter()
            .map(|label| el(label, form))
            .collect::<Option<Vec<_>>>()?;
        let submit = el("contact-submit", form)?;
        let contact_socials = el("contact-socials", contact_root)?;
        let socials = content
            .socials
            .iter()
            .map(|_| el("social-icon", contact_socials))
            .collect::<Option<Vec<_>>>()?;
        let contact = ContactElements {
            root: contact_root,
            heading,
            form,
            fields,
            submit,
            socials,
            orbs: orbs(stage, contact_root)?,
        };

        let footer_root = el("footer", main)?;
        let mut footer_links = Vec::with_capacity(content.nav.len());
        for link in &content.nav {
            let id = el("footer-link", footer_root)?;
            stage.set_href(id, &link.href);
            footer_links.push(id);
        }
        let footer_socials = content
            .socials
            .iter()
            .map(|_| el("footer-social", footer_root))
            .collect::<Option<Vec<_>>>()?;
        let footer = FooterElements {
            root: footer_root,
            links: footer_links,
            socials: footer_socials,
        };

        let page = Self {
            preloader,
            progress_bar,
            nav,
            main,
            hero,
            about,
            projects,
            contact,
            footer,
        };
        page.apply_initial_styles(stage);
        page.layout(stage);
        tracing::debug!(elements = stage.with_tree(|t| t.len()).unwrap_or(0), "page built");
        Some(page)
    }

    fn apply_initial_styles(&self, stage: &StageHandle) {
        let width = stage.viewport().unwrap_or_default().width;
        stage.set_style(self.main, Property::Opacity, 0.0);
        stage.set_style(self.progress_bar, Property::WidthPct, 0.0);
        stage.set_style(self.nav.mobile_menu, Property::X, width);
        stage.set_style(self.nav.mobile_menu, Property::Opacity, 0.0);
    }

    /// Lay the page out for the stage's current viewport
    pub fn layout(&self, stage: &StageHandle) {
        let Some(Viewport { width, height }) = stage.viewport() else {
            return;
        };
        let set = |id, layout| {
            stage.set_layout(id, layout);
        };

        set(self.preloader.overlay, Layout::new(0.0, 0.0, width, height));
        set(self.preloader.text, Layout::new(height / 2.0 - 40.0, 0.0, width, 60.0));
        set(self.preloader.bar, Layout::new(height / 2.0 + 40.0, width * 0.25, width * 0.5, 4.0));
        set(self.progress_bar, Layout::new(0.0, 0.0, width, PROGRESS_HEIGHT));
        set(self.nav.bar, Layout::new(0.0, 0.0, width, NAV_HEIGHT));
        set(self.nav.menu_button, Layout::new(15.0, width - 55.0, 40.0, 40.0));
        set(self.nav.mobile_menu, Layout::new(0.0, 0.0, width, height));
        for (i, link) in self.nav.mobile_links.iter().enumerate() {
            set(*link, Layout::new(120.0 + i as f32 * 64.0, 0.0, width, 48.0));
        }

        let mut top = 0.0;

        let hero_height = height;
        set(self.hero.root, Layout::new(top, 0.0, width, hero_height));
        set(self.hero.headline, Layout::new(top + hero_height * 0.3, 0.0, width, 120.0));
        set(self.hero.subtitle, Layout::new(top + hero_height * 0.3 + 140.0, 0.0, width, 40.0));
        set(self.hero.cta, Layout::new(top + hero_height * 0.3 + 200.0, 0.0, 200.0, 56.0));
        set(self.hero.visual, Layout::new(top, width * 0.5, width * 0.5, hero_height));
        place_orbs(stage, &self.hero.orbs, &HERO_ORBS, top, width, hero_height);
        top += hero_height;

        let about_height = height.max(900.0);
        set(self.about.root, Layout::new(top, 0.0, width, about_height));
        set(self.about.heading, Layout::new(top + 80.0, 0.0, width, 60.0));
        set(self.about.image, Layout::new(top + 180.0, 0.0, width * 0.4, 400.0));
        set(self.about.bio, Layout::new(top + 180.0, width * 0.45, width * 0.5, 200.0));
        for (i, skill) in self.about.skills.iter().enumerate() {
            set(*skill, Layout::new(top + 420.0 + (i / 3) as f32 * 120.0, 0.0, 100.0, 100.0));
        }
        place_orbs(stage, &self.about.orbs, &ABOUT_ORBS, top, width, about_height);
        top += about_height;

        let projects_height = height;
        set(self.projects.root, Layout::new(top, 0.0, width, projects_height));
        set(self.projects.heading, Layout::new(top + 40.0, 0.0, width, 60.0));
        let card_width = if width < CARD_WIDTH * 1.25 { width * 0.8 } else { CARD_WIDTH };
        let count = self.projects.cards.len() as f32;
        let strip_width = if count > 0.0 {
            count * card_width + (count - 1.0) * CARD_GAP + STRIP_PADDING * 2.0
        } else {
            0.0
        };
        set(self.projects.wrapper, Layout::new(top, 0.0, width, projects_height));
        set(
            self.projects.strip,
            Layout::new(top + 140.0, 0.0, width, 480.0).with_scroll_width(strip_width),
        );
        for (i, card) in self.projects.cards.iter().enumerate() {
            let left = STRIP_PADDING + i as f32 * (card_width + CARD_GAP);
            set(*card, Layout::new(top + 140.0, left, card_width, 480.0));
        }
        place_orbs(stage, &self.projects.orbs, &PROJECTS_ORBS, top, width, projects_height);
        top += projects_height;

        let contact_height = height.max(800.0);
        set(self.contact.root, Layout::new(top, 0.0, width, contact_height));
        set(self.contact.heading, Layout::new(top + 80.0, 0.0, width, 60.0));
        set(self.contact.form, Layout::new(top + 180.0, 0.0, width.min(640.0), 420.0));
        for (i, field) in self.contact.fields.iter().enumerate() {
            set(*field, Layout::new(top + 200.0 + i as f32 * 90.0, 0.0, width.min(600.0), 64.0));
        }
        set(self.contact.submit, Layout::new(top + 480.0, 0.0, 180.0, 56.0));
        for (i, icon) in self.contact.socials.iter().enumerate() {
            set(*icon, Layout::new(top + 640.0, i as f32 * 64.0, 48.0, 48.0));
        }
        place_orbs(stage, &self.contact.orbs, &CONTACT_ORBS, top, width, contact_height);
        top += contact_height;

        set(self.footer.root, Layout::new(top, 0.0, width, FOOTER_HEIGHT));
        for (i, link) in self.footer.links.iter().chain(&self.footer.socials).enumerate() {
            set(*link, Layout::new(top + 60.0, i as f32 * 120.0, 100.0, 24.0));
        }
        top += FOOTER_HEIGHT;

        set(self.main, Layout::new(0.0, 0.0, width, top));
        tracing::trace!(width, height, document = top, "page laid out");
    }

    /// The section element for an `#anchor` href
    pub fn section_for(&self, href: &str) -> Option<ElementId> {
        match href.strip_prefix('#')? {
            "hero" => Some(self.hero.root),
            "about" => Some(self.about.root),
            "projects" => Some(self.projects.root),
            "contact" => Some(self.contact.root),
            "footer" => Some(self.footer.root),
            _ => None,
        }
    }

    /// All section roots in document order
    pub fn sections(&self) -> [ElementId; 5] {
        [
            self.hero.root,
            self.about.root,
            self.projects.root,
            self.contact.root,
            self.footer.root,
        ]
    }

    /// Every glow orb on the page
    pub fn orbs(&self) -> Vec<ElementId> {
        self.hero
            .orbs
            .iter()
            .chain(&self.about.orbs)
            .chain(&self.projects.orbs)
            .chain(&self.contact.orbs)
            .copied()
            .collect()
    }
}

fn orbs<const N: usize>(stage: &StageHandle, parent: ElementId) -> Option<[ElementId; N]> {
    let ids = (0..N)
        .map(|_| stage.create("glow-orb", Some(parent)))
        .collect::<Option<Vec<_>>>()?;
    ids.try_into().ok()
}

fn place_orbs(
    stage: &StageHandle,
    orbs: &[ElementId],
    placements: &[OrbPlacement],
    top: f32,
    width: f32,
    height: f32,
) {
    for (orb, (size, y, x)) in orbs.iter().zip(placements) {
        stage.set_layout(*orb, Layout::new(top + height * y, width * x, *size, *size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Stage;

    #[test]
    fn test_build_and_layout() {
        let stage = Stage::new(Viewport::new(1440.0, 900.0));
        let handle = stage.handle();
        let content = SiteContent::default();
        let page = PageElements::build(&handle, &content).unwrap();

        assert_eq!(page.projects.cards.len(), 6);
        assert_eq!(page.nav.links.len(), 4);
        assert_eq!(handle.find("contact"), Some(page.contact.root));
        assert_eq!(page.section_for("#about"), Some(page.about.root));
        assert_eq!(page.section_for("#nowhere"), None);
        assert_eq!(page.orbs().len(), 10);

        let orb = handle.layout(page.hero.orbs[1]).unwrap();
        assert_eq!(orb.width, 300.0);
        assert_eq!(orb.left, 1440.0 * 0.70);

        let about = handle.layout(page.about.root).unwrap();
        assert_eq!(about.top, 900.0);
        assert_eq!(about.height, 900.0);

        let strip = handle.layout(page.projects.strip).unwrap();
        let wrapper = handle.layout(page.projects.wrapper).unwrap();
        assert_eq!(strip.scroll_width, 6.0 * 400.0 + 5.0 * 32.0 + 96.0);
        assert_eq!(wrapper.offset_width(), 1440.0);

        let main = handle.layout(page.main).unwrap();
        let footer = handle.layout(page.footer.root).unwrap();
        assert_eq!(main.height, footer.bottom());
        assert_eq!(handle.style(page.main, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_relayout_on_narrow_viewport() {
        let stage = Stage::new(Viewport::new(1440.0, 900.0));
        let handle = stage.handle();
        let page = PageElements::build(&handle, &SiteContent::default()).unwrap();

        handle.set_viewport(Viewport::new(375.0, 812.0));
        page.layout(&handle);

        let card = handle.layout(page.projects.cards[0]).unwrap();
        assert_eq!(card.width, 300.0);
        assert_eq!(handle.layout(page.hero.root).unwrap().height, 812.0);
    }
}
