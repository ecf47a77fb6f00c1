//! Cookie - command-line host for function-component custom elements
//!
//! Renders a markup page through the element runtime, with a headless map
//! library and a virtual or real-time event loop, and lists the CMS
//! environments of a sync config.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cookie_kit::map::StyleLayer;
use cookie_kit::prelude::*;
use cookie_sync::SyncConfig;

/// Host for function-component custom elements
#[derive(Parser, Debug)]
#[command(name = "cookie")]
#[command(about = "Render custom element pages and inspect CMS environments")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a markup page and print the resulting HTML
    Render {
        /// HTML file containing custom elements
        file: PathBuf,

        /// Event loop time to run after mounting, in seconds
        #[arg(short, long, default_value = "0")]
        seconds: f64,

        /// Sleep between timers instead of advancing virtual time
        #[arg(long)]
        realtime: bool,

        /// JSON array of style layers every map starts with
        #[arg(long)]
        style_layers: Option<PathBuf>,
    },

    /// List the environments of a sync config
    Environments {
        /// JSON sync config
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Render {
            file,
            seconds,
            realtime,
            style_layers,
        } => render(&file, seconds, realtime, style_layers.as_deref()),
        Command::Environments { config } => environments(&config),
    }
}

fn render(
    file: &std::path::Path,
    seconds: f64,
    realtime: bool,
    style_layers: Option<&std::path::Path>,
) -> Result<()> {
    let markup = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let duration = Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("invalid duration: {} seconds", seconds))?;

    let layers: Vec<StyleLayer> = match style_layers {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&json).context("failed to parse style layers")?
        }
        None => Vec::new(),
    };

    let event_loop = EventLoop::new();
    let library = Rc::new(HeadlessMapLibrary::new(event_loop.clone()).with_style_layers(layers));
    let registry = ElementRegistry::new();
    register_components(&registry, widgets::standard(&event_loop, library.clone()))?;

    let document = Document::new(registry);
    let elements = document.parse(&markup);
    log::info!("Mounted {} custom elements from {}", elements.len(), file.display());

    let ran = if realtime {
        event_loop.run_realtime(duration)
    } else {
        event_loop.advance(duration)
    };
    log::info!("Ran {} timer callbacks over {:?}", ran, duration);

    for map in library.maps() {
        let center = map.center();
        log::info!(
            "[map] #{} centered at ({:.3}, {:.3}), zoom {}",
            map.container(),
            center.lng,
            center.lat,
            map.zoom()
        );
    }

    println!("{}", document.to_html());
    Ok(())
}

fn environments(path: &std::path::Path) -> Result<()> {
    let config = SyncConfig::load(path)
        .with_context(|| format!("failed to load sync config {}", path.display()))?;

    for environment in config.environments() {
        let marker = if environment.production { " (production)" } else { "" };
        println!("{}\t{}{}", environment.name, environment.endpoint, marker);
    }
    Ok(())
}
