//! Reveal recipes for each page section

use folio_animation::{Easing, Position, Props};
use folio_core::{ElementId, Property};

use crate::config::RevealRange;
use crate::hover::HoverSpec;
use crate::page::PageElements;
use crate::reveal::{AmbientLoop, RevealGate, RevealRecipe, RevealStep};

fn fade_blur() -> (Props, Props) {
    (
        Props::new().set(Property::Opacity, 0.0).set(Property::Blur, 10.0),
        Props::new().set(Property::Opacity, 1.0).set(Property::Blur, 0.0),
    )
}

fn glow(target: ElementId) -> HoverSpec {
    HoverSpec::new(target, Props::new().set(Property::Glow, 1.0))
}

/// Delay and duration of each orb's drift, in milliseconds
const HERO_DRIFT: [(f32, f32); 4] = [(0.0, 3000.0), (1500.0, 3000.0), (800.0, 3000.0), (2200.0, 3000.0)];
const ABOUT_DRIFT: [(f32, f32); 2] = [(500.0, 4000.0), (1800.0, 3500.0)];
const PROJECTS_DRIFT: [(f32, f32); 2] = [(0.0, 3000.0), (1000.0, 4000.0)];
const CONTACT_DRIFT: [(f32, f32); 2] = [(200.0, 3800.0), (1500.0, 3000.0)];

fn drift<'a>(
    orbs: &'a [ElementId],
    timing: &'a [(f32, f32)],
) -> impl Iterator<Item = AmbientLoop> + 'a {
    orbs.iter().zip(timing).map(|(orb, (delay, duration))| {
        AmbientLoop::new(*orb, Props::new().set(Property::Y, -20.0).set(Property::X, 10.0))
            .delay(*delay)
            .duration(*duration)
    })
}

/// Headline, subtitle, call to action and visual, played once at mount
///
/// `visual_offset` is how far right the visual starts (the viewport width).
pub fn hero(page: &PageElements, visual_offset: f32) -> RevealRecipe {
    let hero = &page.hero;
    RevealRecipe::new("hero", RevealGate::Immediate)
        .step(
            RevealStep::new(
                [hero.headline],
                Props::new()
                    .set(Property::Opacity, 0.0)
                    .set(Property::Y, 50.0)
                    .set(Property::Blur, 10.0),
                Props::new()
                    .set(Property::Opacity, 1.0)
                    .set(Property::Y, 0.0)
                    .set(Property::Blur, 0.0),
            )
            .duration(1000.0)
            .ease(Easing::PowerOut(3)),
        )
        .step(
            RevealStep::new(
                [hero.subtitle],
                Props::new().set(Property::Opacity, 0.0).set(Property::Y, 20.0),
                Props::new().set(Property::Opacity, 1.0).set(Property::Y, 0.0),
            )
            .duration(800.0)
            .ease(Easing::PowerOut(2))
            .at(Position::FromEnd(-500.0)),
        )
        .step(
            RevealStep::new(
                [hero.cta],
                Props::new().set(Property::Opacity, 0.0).set(Property::Scale, 0.8),
                Props::new().set(Property::Opacity, 1.0).set(Property::Scale, 1.0),
            )
            .duration(700.0)
            .ease(Easing::ElasticOut {
                amplitude: 1.0,
                period: 0.5,
            })
            .at(Position::FromEnd(-300.0)),
        )
        .step(
            RevealStep::new(
                [hero.visual],
                Props::new()
                    .set(Property::Opacity, 0.0)
                    .set(Property::X, visual_offset),
                Props::new().set(Property::Opacity, 1.0).set(Property::X, 0.0),
            )
            .duration(1200.0)
            .ease(Easing::PowerOut(3))
            .at(Position::FromEnd(-800.0)),
        )
        .hover(
            HoverSpec::new(hero.cta, Props::new().set(Property::Scale, 1.05))
                .duration(600.0)
                .ease(Easing::PowerInOut(1))
                .pulse()
                .drop_shadow(),
        )
        .ambient(drift(&hero.orbs, &HERO_DRIFT))
}

/// Section fade, image swing-in, bio rise and skill icons
pub fn about(page: &PageElements, range: RevealRange) -> RevealRecipe {
    let about = &page.about;
    let (from, to) = fade_blur();
    RevealRecipe::new("about", range.into())
        .step(
            RevealStep::new([about.root], from, to)
                .duration(1000.0)
                .ease(Easing::PowerOut(2)),
        )
        .step(
            RevealStep::new(
                [about.image],
                Props::new()
                    .set(Property::Opacity, 0.0)
                    .set(Property::X, -100.0)
                    .set(Property::Rotate, -15.0),
                Props::new()
                    .set(Property::Opacity, 1.0)
                    .set(Property::X, 0.0)
                    .set(Property::Rotate, 0.0),
            )
            .duration(1000.0)
            .ease(Easing::PowerOut(3))
            .at(Position::FromPrevStart(300.0)),
        )
        .step(
            RevealStep::new(
                [about.bio],
                Props::new().set(Property::Opacity, 0.0).set(Property::Y, 50.0),
                Props::new().set(Property::Opacity, 1.0).set(Property::Y, 0.0),
            )
            .duration(800.0)
            .ease(Easing::PowerOut(2))
            .at(Position::FromPrevStart(200.0)),
        )
        .step(
            RevealStep::new(
                about.skills.iter().copied(),
                Props::new().set(Property::Opacity, 0.0).set(Property::Y, 20.0),
                Props::new().set(Property::Opacity, 1.0).set(Property::Y, 0.0),
            )
            .duration(500.0)
            .stagger(100.0)
            .ease(Easing::BackOut(1.7))
            .at(Position::FromPrevStart(200.0)),
        )
        .hover(
            HoverSpec::new(
                about.image,
                Props::new().set(Property::Rotate, 5.0).set(Property::Y, -5.0),
            )
            .duration(500.0)
            .ease(Easing::PowerInOut(1))
            .drop_shadow(),
        )
        .ambient(drift(&about.orbs, &ABOUT_DRIFT))
}

/// Section fade and staggered project cards
pub fn projects(page: &PageElements, range: RevealRange) -> RevealRecipe {
    let projects = &page.projects;
    let (from, to) = fade_blur();
    RevealRecipe::new("projects", range.into())
        .step(
            RevealStep::new([projects.root], from, to)
                .duration(1000.0)
                .ease(Easing::PowerOut(2)),
        )
        .step(
            RevealStep::new(
                projects.cards.iter().copied(),
                Props::new()
                    .set(Property::Opacity, 0.0)
                    .set(Property::Y, 50.0)
                    .set(Property::Scale, 0.9),
                Props::new()
                    .set(Property::Opacity, 1.0)
                    .set(Property::Y, 0.0)
                    .set(Property::Scale, 1.0),
            )
            .duration(800.0)
            .stagger(100.0)
            .ease(Easing::PowerOut(3))
            .at(Position::FromPrevStart(300.0)),
        )
        .hovers(projects.cards.iter().map(|card| {
            HoverSpec::new(
                *card,
                Props::new()
                    .set(Property::Y, -10.0)
                    .set(Property::Scale, 1.02)
                    .set(Property::Glow, 1.0),
            )
        }))
        .ambient(drift(&projects.orbs, &PROJECTS_DRIFT))
}

/// Section fade, form fields from the left and social icons
pub fn contact(page: &PageElements, range: RevealRange) -> RevealRecipe {
    let contact = &page.contact;
    let (from, to) = fade_blur();
    let inputs = contact.fields.iter().copied().chain([contact.submit]);
    RevealRecipe::new("contact", range.into())
        .step(
            RevealStep::new([contact.root], from, to)
                .duration(1000.0)
                .ease(Easing::PowerOut(2)),
        )
        .step(
            RevealStep::new(
                inputs,
                Props::new().set(Property::Opacity, 0.0).set(Property::X, -50.0),
                Props::new().set(Property::Opacity, 1.0).set(Property::X, 0.0),
            )
            .duration(600.0)
            .stagger(100.0)
            .ease(Easing::PowerOut(2))
            .at(Position::FromPrevStart(300.0)),
        )
        .step(
            RevealStep::new(
                contact.socials.iter().copied(),
                Props::new().set(Property::Opacity, 0.0).set(Property::Y, 20.0),
                Props::new().set(Property::Opacity, 1.0).set(Property::Y, 0.0),
            )
            .duration(500.0)
            .stagger(100.0)
            .ease(Easing::BackOut(1.7))
            .at(Position::FromPrevStart(300.0)),
        )
        .hover(glow(contact.submit))
        .hovers(contact.socials.iter().copied().map(glow))
        .ambient(drift(&contact.orbs, &CONTACT_DRIFT))
}

/// Footer rise followed by its links and icons
pub fn footer(page: &PageElements, range: RevealRange) -> RevealRecipe {
    let footer = &page.footer;
    RevealRecipe::new("footer", range.into())
        .step(
            RevealStep::new(
                [footer.root],
                Props::new()
                    .set(Property::Opacity, 0.0)
                    .set(Property::Y, 60.0)
                    .set(Property::Blur, 10.0),
                Props::new()
                    .set(Property::Opacity, 1.0)
                    .set(Property::Y, 0.0)
                    .set(Property::Blur, 0.0),
            )
            .duration(1000.0)
            .ease(Easing::PowerOut(2)),
        )
        .step(
            RevealStep::new(
                footer.links.iter().chain(&footer.socials).copied(),
                Props::new().set(Property::Opacity, 0.0).set(Property::Y, 20.0),
                Props::new().set(Property::Opacity, 1.0).set(Property::Y, 0.0),
            )
            .duration(500.0)
            .stagger(50.0)
            .ease(Easing::PowerOut(2))
            .at(Position::FromPrevStart(300.0)),
        )
        .hovers(footer.socials.iter().copied().map(glow))
}
