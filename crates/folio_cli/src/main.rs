//! Folio CLI
//!
//! Simulate the portfolio page headlessly, inspect its content and scaffold
//! its config.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_site::{icon_glyph, SiteConfig, SiteContent, CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod simulate;

use simulate::SimulationOptions;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Animated portfolio page runner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the page, scroll it to the bottom and report what happened
    Simulate {
        /// Config file (defaults to ./folio.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Content feed in JSON (defaults to the built-in content)
        #[arg(long)]
        content: Option<PathBuf>,

        /// Viewport width
        #[arg(long, default_value = "1440")]
        width: f32,

        /// Viewport height
        #[arg(long, default_value = "900")]
        height: f32,

        /// Wheel delta per frame
        #[arg(short, long, default_value = "40")]
        step: f32,

        /// Frame duration in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: f32,

        /// Stop after this many scrolling frames
        #[arg(long, default_value = "20000")]
        max_frames: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the page content
    Content {
        /// Content feed in JSON (defaults to the built-in content)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage folio.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a config file with every default spelled out
    Init {
        /// Where to write it
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a config file
    Check {
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            config,
            content,
            width,
            height,
            step,
            frame_ms,
            max_frames,
            json,
        } => cmd_simulate(
            config.as_deref(),
            content.as_deref(),
            SimulationOptions {
                width,
                height,
                step,
                frame_ms,
                max_frames,
            },
            json,
        ),

        Commands::Content { source, json } => cmd_content(source.as_deref(), json),

        Commands::Config { command } => match command {
            ConfigCommands::Init { path, force } => cmd_config_init(&path, force),
            ConfigCommands::Check { path } => cmd_config_check(&path),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    match path {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let default = Path::new(CONFIG_FILE);
            if default.exists() {
                SiteConfig::load(default).with_context(|| format!("Failed to load {}", CONFIG_FILE))
            } else {
                Ok(SiteConfig::default())
            }
        }
    }
}

fn load_content(path: Option<&Path>) -> Result<SiteContent> {
    match path {
        Some(path) => SiteContent::load(path)
            .with_context(|| format!("Failed to load content from {}", path.display())),
        None => Ok(SiteContent::default()),
    }
}

fn cmd_simulate(
    config: Option<&Path>,
    content: Option<&Path>,
    options: SimulationOptions,
    json: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let content = load_content(content)?;

    info!(
        "Simulating {}x{} viewport, {}px per frame",
        options.width, options.height, options.step
    );
    let report = simulate::run(config, content, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        simulate::print_report(&report);
    }

    if !report.is_clean() {
        anyhow::bail!("teardown left resources behind");
    }
    Ok(())
}

fn cmd_content(source: Option<&Path>, json: bool) -> Result<()> {
    let content = load_content(source)?;

    if json {
        println!("{}", content.to_json_pretty()?);
        return Ok(());
    }

    println!("Skills");
    println!("======");
    for skill in &content.skills {
        let glyph = icon_glyph(skill.icon);
        println!("  {} {:<12} ({})", glyph.glyph, skill.name, glyph.name);
    }
    println!();

    println!("Projects");
    println!("========");
    for project in &content.projects {
        println!("  #{} {}", project.id, project.title);
        println!("      {}", project.description);
        println!("      stack: {}", project.tech_stack.join(", "));
    }
    println!();

    println!("By technology");
    println!("=============");
    for (tech, ids) in content.projects_by_tech() {
        let ids: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
        println!("  {:<14} {}", tech, ids.join(" "));
    }
    println!();

    println!("Links");
    println!("=====");
    for link in &content.nav {
        println!("  {:<10} {}", link.name, link.href);
    }
    for social in &content.socials {
        println!("  {:<10} {}", social.name, social.url);
    }

    Ok(())
}

fn cmd_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    SiteConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_config_check(path: &Path) -> Result<()> {
    let config = SiteConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    let resolved = config.resolve()?;
    info!("{} is valid", path.display());
    println!("breakpoint:     {}px", resolved.breakpoint);
    println!("header offset:  {}px", resolved.header_offset);
    println!("settle delay:   {}ms", resolved.settle_ms);
    println!("gallery scrub:  {:?}", resolved.gallery_scrub);
    println!("navigation:     {}ms {:?}", resolved.navigation.duration_ms, resolved.navigation.easing);
    Ok(())
}
