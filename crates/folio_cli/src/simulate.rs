//! Headless page simulation
//!
//! Mounts the page, waits for the boot, then scrolls to the bottom one wheel
//! step per frame while recording when each section is revealed. Finishes by
//! unmounting and counting whatever was left behind.

use anyhow::{bail, Result};
use folio_core::Viewport;
use folio_site::{AppPhase, PortfolioApp, SiteConfig, SiteContent};
use tracing::{debug, info};

const SECTION_NAMES: [&str; 5] = ["hero", "about", "projects", "contact", "footer"];

/// Frames allowed for the preloader and settle delay
const BOOT_FRAME_LIMIT: usize = 10_000;

pub struct SimulationOptions {
    pub width: f32,
    pub height: f32,
    /// Wheel delta fed every frame
    pub step: f32,
    pub frame_ms: f32,
    pub max_frames: usize,
}

#[derive(Debug)]
pub struct Reveal {
    pub section: &'static str,
    pub at_ms: f32,
    pub offset: f32,
}

#[derive(Debug)]
pub struct SimulationReport {
    pub boot_ms: f32,
    pub scroll_ms: f32,
    pub limit: f32,
    pub final_offset: f32,
    pub pinned_distance: Option<f32>,
    pub reveals: Vec<Reveal>,
    pub leaked_animations: usize,
    pub leaked_triggers: usize,
    pub leaked_listeners: usize,
}

impl SimulationReport {
    pub fn is_clean(&self) -> bool {
        self.leaked_animations == 0 && self.leaked_triggers == 0 && self.leaked_listeners == 0
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "boot_ms": self.boot_ms,
            "scroll_ms": self.scroll_ms,
            "limit": self.limit,
            "final_offset": self.final_offset,
            "pinned_distance": self.pinned_distance,
            "reveals": self.reveals.iter().map(|r| serde_json::json!({
                "section": r.section,
                "at_ms": r.at_ms,
                "offset": r.offset,
            })).collect::<Vec<_>>(),
            "leaks": {
                "animations": self.leaked_animations,
                "triggers": self.leaked_triggers,
                "listeners": self.leaked_listeners,
            },
        })
    }
}

pub fn run(config: SiteConfig, content: SiteContent, options: &SimulationOptions) -> Result<SimulationReport> {
    if options.frame_ms <= 0.0 {
        bail!("frame time must be positive, got {}", options.frame_ms);
    }
    let reveal_class = config.scroll.reveal_class.clone();
    let mut app = PortfolioApp::new(config, content, Viewport::new(options.width, options.height))?;
    app.mount();

    let mut elapsed = 0.0;
    let mut booted = false;
    for _ in 0..BOOT_FRAME_LIMIT {
        elapsed += options.frame_ms;
        if app.advance(options.frame_ms)? == AppPhase::Running {
            booted = true;
            break;
        }
    }
    if !booted {
        bail!("page did not boot within {} frames", BOOT_FRAME_LIMIT);
    }
    let boot_ms = elapsed;
    info!("Booted after {:.0}ms", boot_ms);

    let Some(ctx) = app.context() else {
        bail!("page booted without a scroll container");
    };
    let roots = app.elements().sections();
    let stage = app.stage();
    let mut reveals = Vec::new();
    let mut revealed = [false; SECTION_NAMES.len()];

    let mut frames = 0;
    let limit = ctx.smooth.limit();
    while frames < options.max_frames {
        if ctx.smooth.state().offset >= limit - 0.5 {
            break;
        }
        app.wheel(options.step);
        app.advance(options.frame_ms)?;
        elapsed += options.frame_ms;
        frames += 1;

        let offset = ctx.smooth.state().offset;
        for (i, root) in roots.iter().enumerate() {
            if !revealed[i] && stage.has_class(*root, &reveal_class) {
                revealed[i] = true;
                debug!("{} revealed at {:.0}px", SECTION_NAMES[i], offset);
                reveals.push(Reveal {
                    section: SECTION_NAMES[i],
                    at_ms: elapsed - boot_ms,
                    offset,
                });
            }
        }
    }

    let report_offset = ctx.smooth.state().offset;
    let pinned_distance = app
        .gallery()
        .and_then(|g| g.region())
        .map(|r| r.scroll_distance);

    app.unmount();
    let report = SimulationReport {
        boot_ms,
        scroll_ms: elapsed - boot_ms,
        limit,
        final_offset: report_offset,
        pinned_distance,
        reveals,
        leaked_animations: app.animations().animation_count(),
        leaked_triggers: app.triggers().count(),
        leaked_listeners: app.stage().total_listeners(),
    };
    Ok(report)
}

pub fn print_report(report: &SimulationReport) {
    println!("Simulation");
    println!("==========");
    println!();
    println!("Boot:        {:.0}ms", report.boot_ms);
    println!("Scrolled:    {:.0}px of {:.0}px in {:.0}ms", report.final_offset, report.limit, report.scroll_ms);
    match report.pinned_distance {
        Some(distance) => println!("Gallery:     pinned for {:.0}px", distance),
        None => println!("Gallery:     native swipe"),
    }
    println!();
    println!("Reveals:");
    for reveal in &report.reveals {
        println!("  - {:<10} {:>7.0}ms {:>8.0}px", reveal.section, reveal.at_ms, reveal.offset);
    }
    println!();
    if report.is_clean() {
        println!("Teardown:    clean");
    } else {
        println!(
            "Teardown:    {} animations, {} triggers, {} listeners left",
            report.leaked_animations, report.leaked_triggers, report.leaked_listeners
        );
    }
}
