//! Folio Site
//!
//! The animated portfolio page: preloader, smooth-scroll bootstrap, section
//! reveals, the pinned project gallery and the page chrome around them.
//!
//! # Example
//!
//! ```ignore
//! use folio_site::prelude::*;
//!
//! let mut app = PortfolioApp::new(
//!     SiteConfig::default(),
//!     SiteContent::default(),
//!     Viewport::new(1440.0, 900.0),
//! )?;
//! app.mount();
//! while app.advance(16.0)? != AppPhase::Running {}
//! app.wheel(400.0);
//! ```

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod gallery;
pub mod hover;
pub mod nav;
pub mod page;
pub mod preloader;
pub mod reveal;
pub mod sections;

pub use app::{AppPhase, PortfolioApp};
pub use bootstrap::{BootStep, ScrollBootstrap, ScrollContext, PROGRESS_BAR_ID};
pub use config::{ResolvedConfig, RevealRange, SiteConfig, CONFIG_FILE};
pub use contact::{ContactForm, ContactMessage, Field, FormStatus, SubmissionSink, TracingSink};
pub use content::{icon_glyph, IconKind, NavLink, Project, SiteContent, Skill, SocialLink};
pub use error::{Result, SiteError};
pub use gallery::{HorizontalGallery, PinnedScrollRegion};
pub use hover::{HoverInteraction, HoverSpec};
pub use nav::{anchor_offset, AnchorNavigator, MobileMenu, MobileMenuHandle};
pub use page::PageElements;
pub use preloader::{GateState, IntroStep, PreloaderGate};
pub use reveal::{AmbientLoop, RevealGate, RevealRecipe, RevealStep, SectionReveal};

/// Common imports for driving the page
pub mod prelude {
    pub use crate::{
        AppPhase, ContactMessage, Field, FormStatus, PortfolioApp, Result, SiteConfig, SiteContent,
        SiteError,
    };
    pub use folio_core::{PointerKind, Property, Viewport};
}
