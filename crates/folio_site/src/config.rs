//! Site configuration (`folio.toml`)
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock page behavior. String-typed easings and thresholds are parsed once in
//! [`SiteConfig::resolve`], and a config that fails to resolve is rejected by
//! [`SiteConfig::validate`].

use std::fs;
use std::path::Path;

use folio_animation::Easing;
use folio_scroll::{Scrub, ScrollTo, SmoothScrollConfig, Threshold, ToggleActions};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

/// Default config file name
pub const CONFIG_FILE: &str = "folio.toml";

/// Complete `folio.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub scroll: ScrollSection,
    #[serde(default)]
    pub layout: LayoutSection,
    #[serde(default)]
    pub timing: TimingSection,
    #[serde(default)]
    pub reveal: RevealSection,
}

// =============================================================================
// [scroll]
// =============================================================================

/// Smooth-scroll container settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScrollSection {
    #[serde(default = "default_true")]
    pub smooth: bool,
    #[serde(default = "default_true")]
    pub smooth_touch: bool,
    /// Wheel delta multiplier
    #[serde(default = "default_multiplier")]
    pub multiplier: f32,
    /// Fraction of the remaining distance covered per 60 fps frame
    #[serde(default = "default_lerp")]
    pub lerp: f32,
    /// Class added to observed sections once they enter the viewport
    #[serde(default = "default_reveal_class")]
    pub reveal_class: String,
    #[serde(default = "default_true")]
    pub direction_tracking: bool,
}

impl Default for ScrollSection {
    fn default() -> Self {
        Self {
            smooth: true,
            smooth_touch: true,
            multiplier: default_multiplier(),
            lerp: default_lerp(),
            reveal_class: default_reveal_class(),
            direction_tracking: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_multiplier() -> f32 {
    1.0
}

fn default_lerp() -> f32 {
    0.1
}

fn default_reveal_class() -> String {
    "is-reveal".to_string()
}

// =============================================================================
// [layout]
// =============================================================================

/// Responsive layout settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayoutSection {
    /// Minimum viewport width for the pinned horizontal gallery
    #[serde(default = "default_breakpoint")]
    pub breakpoint: f32,
    /// Height of the fixed header subtracted from anchor targets
    #[serde(default = "default_header_offset")]
    pub header_offset: f32,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            breakpoint: default_breakpoint(),
            header_offset: default_header_offset(),
        }
    }
}

fn default_breakpoint() -> f32 {
    768.0
}

fn default_header_offset() -> f32 {
    70.0
}

// =============================================================================
// [timing]
// =============================================================================

/// Durations and easings not owned by a single section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimingSection {
    /// Delay between the preloader finishing and the scroll bootstrap
    #[serde(default = "default_settle_ms")]
    pub settle_ms: f32,
    /// Duration of anchored navigation scrolls
    #[serde(default = "default_nav_duration_ms")]
    pub nav_duration_ms: f32,
    #[serde(default = "default_nav_easing")]
    pub nav_easing: String,
    /// Seconds the gallery scrub takes to catch up with the scroll position
    #[serde(default = "default_gallery_scrub")]
    pub gallery_scrub: f32,
    /// Fade-in of the main content after boot
    #[serde(default = "default_main_fade_ms")]
    pub main_fade_ms: f32,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            nav_duration_ms: default_nav_duration_ms(),
            nav_easing: default_nav_easing(),
            gallery_scrub: default_gallery_scrub(),
            main_fade_ms: default_main_fade_ms(),
        }
    }
}

fn default_settle_ms() -> f32 {
    500.0
}

fn default_nav_duration_ms() -> f32 {
    1500.0
}

fn default_nav_easing() -> String {
    "power3.inOut".to_string()
}

fn default_gallery_scrub() -> f32 {
    1.0
}

fn default_main_fade_ms() -> f32 {
    1000.0
}

// =============================================================================
// [reveal]
// =============================================================================

/// Trigger ranges for the section reveals
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RevealSection {
    #[serde(default = "default_reveal_start")]
    pub start: String,
    #[serde(default = "default_reveal_end")]
    pub end: String,
    #[serde(default = "default_toggle_actions")]
    pub toggle_actions: String,
    #[serde(default = "default_footer_start")]
    pub footer_start: String,
    #[serde(default = "default_footer_end")]
    pub footer_end: String,
}

impl Default for RevealSection {
    fn default() -> Self {
        Self {
            start: default_reveal_start(),
            end: default_reveal_end(),
            toggle_actions: default_toggle_actions(),
            footer_start: default_footer_start(),
            footer_end: default_footer_end(),
        }
    }
}

fn default_reveal_start() -> String {
    "top 80%".to_string()
}

fn default_reveal_end() -> String {
    "bottom 20%".to_string()
}

fn default_toggle_actions() -> String {
    "play none none reverse".to_string()
}

fn default_footer_start() -> String {
    "top 90%".to_string()
}

fn default_footer_end() -> String {
    "bottom 100%".to_string()
}

// =============================================================================
// Resolved values
// =============================================================================

/// Trigger range and toggle actions shared by the section reveals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealRange {
    pub start: Threshold,
    pub end: Threshold,
    pub actions: ToggleActions,
}

/// Config with every string parsed into its typed form
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub smooth: SmoothScrollConfig,
    pub breakpoint: f32,
    pub header_offset: f32,
    pub settle_ms: f32,
    pub navigation: ScrollTo,
    pub gallery_scrub: Scrub,
    pub main_fade_ms: f32,
    pub sections: RevealRange,
    pub footer: RevealRange,
}

impl SiteConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded site config");
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    /// Parse every string field and range-check the numeric ones
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let scroll = &self.scroll;
        if !(scroll.lerp > 0.0 && scroll.lerp <= 1.0) {
            return Err(SiteError::Config(format!(
                "scroll.lerp must be in (0, 1], got {}",
                scroll.lerp
            )));
        }
        if scroll.multiplier <= 0.0 {
            return Err(SiteError::Config(format!(
                "scroll.multiplier must be positive, got {}",
                scroll.multiplier
            )));
        }
        if self.layout.breakpoint < 0.0 || self.layout.header_offset < 0.0 {
            return Err(SiteError::Config(
                "layout values must not be negative".to_string(),
            ));
        }
        let timing = &self.timing;
        if timing.settle_ms < 0.0 || timing.nav_duration_ms < 0.0 || timing.main_fade_ms < 0.0 {
            return Err(SiteError::Config(
                "timing durations must not be negative".to_string(),
            ));
        }

        let nav_easing: Easing = timing.nav_easing.parse()?;
        let gallery_scrub = if timing.gallery_scrub > 0.0 {
            Scrub::Smoothed(timing.gallery_scrub)
        } else {
            Scrub::Immediate
        };

        let actions: ToggleActions = self.reveal.toggle_actions.parse()?;
        let sections = RevealRange {
            start: self.reveal.start.parse()?,
            end: self.reveal.end.parse()?,
            actions,
        };
        let footer = RevealRange {
            start: self.reveal.footer_start.parse()?,
            end: self.reveal.footer_end.parse()?,
            actions,
        };

        Ok(ResolvedConfig {
            smooth: SmoothScrollConfig {
                smooth: scroll.smooth,
                smooth_touch: scroll.smooth_touch,
                multiplier: scroll.multiplier,
                reveal_class: scroll.reveal_class.clone(),
                direction_tracking: scroll.direction_tracking,
                lerp: scroll.lerp,
            },
            breakpoint: self.layout.breakpoint,
            header_offset: self.layout.header_offset,
            settle_ms: timing.settle_ms,
            navigation: ScrollTo::animated(timing.nav_duration_ms, nav_easing),
            gallery_scrub,
            main_fade_ms: timing.main_fade_ms,
            sections,
            footer,
        })
    }
}
