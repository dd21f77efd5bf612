//! Static content feed
//!
//! Skills, projects, social links and navigation entries. Icons are carried
//! as [`IconKind`] identifiers and only turned into glyphs at the presentation
//! boundary through [`icon_glyph`].

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

/// Icon identifiers used by the content feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconKind {
    FileHtml,
    TagChevron,
    BracketsCurly,
    Cube,
    Sparkle,
    Code,
    GithubLogo,
    LinkedinLogo,
    DribbbleLogo,
}

/// Presentation data for an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconGlyph {
    pub name: &'static str,
    pub glyph: &'static str,
}

const ICON_TABLE: &[(IconKind, IconGlyph)] = &[
    (IconKind::FileHtml, IconGlyph { name: "file-html", glyph: "</>" }),
    (IconKind::TagChevron, IconGlyph { name: "tag-chevron", glyph: "#" }),
    (IconKind::BracketsCurly, IconGlyph { name: "brackets-curly", glyph: "{}" }),
    (IconKind::Cube, IconGlyph { name: "cube", glyph: "[]" }),
    (IconKind::Sparkle, IconGlyph { name: "sparkle", glyph: "*" }),
    (IconKind::Code, IconGlyph { name: "code", glyph: "<>" }),
    (IconKind::GithubLogo, IconGlyph { name: "github-logo", glyph: "gh" }),
    (IconKind::LinkedinLogo, IconGlyph { name: "linkedin-logo", glyph: "in" }),
    (IconKind::DribbbleLogo, IconGlyph { name: "dribbble-logo", glyph: "db" }),
];

/// Resolve an icon identifier to its glyph
pub fn icon_glyph(kind: IconKind) -> IconGlyph {
    ICON_TABLE
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(IconGlyph { name: "unknown", glyph: "?" })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Skill {
    pub name: String,
    pub icon: IconKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u32,
    pub image: String,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub cta_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
    pub icon: IconKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NavLink {
    pub name: String,
    pub href: String,
}

/// Everything the page renders that isn't markup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteContent {
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub socials: Vec<SocialLink>,
    pub nav: Vec<NavLink>,
}

impl SiteContent {
    /// Parse and validate a JSON feed
    pub fn from_json_str(json: &str) -> Result<Self> {
        let content: Self = serde_json::from_str(json)?;
        content.validate()?;
        Ok(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every list must be non-empty and every key unique
    pub fn validate(&self) -> Result<()> {
        unique("skills", self.skills.iter().map(|s| s.name.clone()))?;
        unique("projects", self.projects.iter().map(|p| p.id.to_string()))?;
        unique("socials", self.socials.iter().map(|s| s.name.clone()))?;
        unique("nav", self.nav.iter().map(|n| n.href.clone()))?;

        if let Some(link) = self.nav.iter().find(|n| !n.href.starts_with('#')) {
            return Err(SiteError::Content(format!(
                "nav link {:?} must point at an in-page anchor",
                link.name
            )));
        }
        Ok(())
    }

    /// Projects grouped by technology, in first-seen order
    pub fn projects_by_tech(&self) -> IndexMap<&str, Vec<u32>> {
        let mut groups: IndexMap<&str, Vec<u32>> = IndexMap::new();
        for project in &self.projects {
            for tech in &project.tech_stack {
                groups.entry(tech.as_str()).or_default().push(project.id);
            }
        }
        groups
    }

    /// Section anchors referenced by the navigation, without the leading `#`
    pub fn anchors(&self) -> impl Iterator<Item = &str> {
        self.nav.iter().map(|n| n.href.trim_start_matches('#'))
    }
}

fn unique(list: &str, keys: impl Iterator<Item = String>) -> Result<()> {
    let mut seen = FxHashSet::default();
    let mut empty = true;
    for key in keys {
        empty = false;
        if !seen.insert(key.clone()) {
            return Err(SiteError::Content(format!("duplicate {list} key {key:?}")));
        }
    }
    if empty {
        return Err(SiteError::Content(format!("{list} must not be empty")));
    }
    Ok(())
}

impl Default for SiteContent {
    fn default() -> Self {
        let skill = |name: &str, icon| Skill {
            name: name.to_string(),
            icon,
        };
        let project = |id: u32, title: &str, description: &str, tech: &[&str]| Project {
            id,
            image: format!("https://picsum.photos/seed/project{id}/800/600"),
            title: title.to_string(),
            description: description.to_string(),
            tech_stack: tech.iter().map(|t| t.to_string()).collect(),
            cta_link: "#".to_string(),
        };
        let social = |name: &str, url: &str, icon| SocialLink {
            name: name.to_string(),
            url: url.to_string(),
            icon,
        };
        let nav = |name: &str, href: &str| NavLink {
            name: name.to_string(),
            href: href.to_string(),
        };

        Self {
            skills: vec![
                skill("HTML5", IconKind::FileHtml),
                skill("CSS3", IconKind::TagChevron),
                skill("JavaScript", IconKind::BracketsCurly),
                skill("React", IconKind::Cube),
                skill("GSAP", IconKind::Sparkle),
                skill("TypeScript", IconKind::Code),
            ],
            projects: vec![
                project(
                    1,
                    "Futuristic Dashboard",
                    "A data dashboard with live charts and a dark, neon-accented interface.",
                    &["React", "TypeScript", "Tailwind CSS", "D3.js"],
                ),
                project(
                    2,
                    "E-commerce Platform",
                    "A storefront with product search, a persistent cart and card payments.",
                    &["Next.js", "Node.js", "MongoDB", "Stripe"],
                ),
                project(
                    3,
                    "AI Chatbot Integration",
                    "A support assistant that answers questions from a product knowledge base.",
                    &["React", "Python", "Gemini API", "Flask"],
                ),
                project(
                    4,
                    "Mobile Game Development",
                    "A casual puzzle game shipped to both mobile platforms from one codebase.",
                    &["React Native", "Expo", "TypeScript"],
                ),
                project(
                    5,
                    "Personal Blog System",
                    "A statically generated blog fed from a headless CMS.",
                    &["Gatsby", "GraphQL", "Contentful", "Tailwind CSS"],
                ),
                project(
                    6,
                    "Interactive Portfolio v2",
                    "A scroll-driven portfolio with pinned sections and 3D scenes.",
                    &["React", "GSAP", "Spline", "Locomotive Scroll"],
                ),
            ],
            socials: vec![
                social("GitHub", "https://github.com/your-github", IconKind::GithubLogo),
                social(
                    "LinkedIn",
                    "https://www.linkedin.com/in/your-linkedin",
                    IconKind::LinkedinLogo,
                ),
                social(
                    "Dribbble",
                    "https://dribbble.com/your-dribbble",
                    IconKind::DribbbleLogo,
                ),
            ],
            nav: vec![
                nav("Home", "#hero"),
                nav("About", "#about"),
                nav("Projects", "#projects"),
                nav("Contact", "#contact"),
            ],
        }
    }
}
