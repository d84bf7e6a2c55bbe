//! # Ardoise CLI
//!
//! Renders the restaurant's daily menu and weekly highlights as story images.
//!
//! ## Usage
//!
//! ```bash
//! # Today's menu, written to ./menu-du-jour.png
//! ardoise daily
//!
//! # A given day with a given template, from a local JSON export
//! ardoise --content content.json daily --date 2024-12-20 --template tpl-noel
//!
//! # Latest weekly highlights
//! ardoise weekly --out stories/
//!
//! # Templates available for the weekly tab
//! ardoise templates --for weekly
//!
//! # HTTP preview server
//! ardoise --config ardoise.toml serve --listen 0.0.0.0:8080
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ardoise::{
    ArdoiseError,
    config::Config,
    content::{ContentSource, MemorySource, MenuKind, PrismicClient},
    export::{Delivery, NoShareSheet, deliver},
    pages::{self, PageOutcome},
    render::RenderContext,
    server,
};

/// Ardoise - menu story renderer
#[derive(Parser, Debug)]
#[command(name = "ardoise")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, value_name = "FILE", default_value = "ardoise.toml")]
    config: PathBuf,

    /// Read documents from a JSON file instead of the CMS
    #[arg(long, global = true, value_name = "FILE")]
    content: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the daily menu
    Daily {
        /// Menu date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Template id (defaults to the first applicable template)
        #[arg(long)]
        template: Option<String>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Render the latest weekly highlights
    Weekly {
        /// Template id (defaults to the first applicable template)
        #[arg(long)]
        template: Option<String>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// List menu templates
    Templates {
        /// Only templates for this tab (daily or weekly)
        #[arg(long = "for", value_parser = parse_kind)]
        kind: Option<MenuKind>,
    },

    /// Start the HTTP preview server
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long)]
        listen: Option<String>,
    },
}

fn parse_kind(s: &str) -> Result<MenuKind, String> {
    match s {
        "daily" => Ok(MenuKind::Daily),
        "weekly" => Ok(MenuKind::Weekly),
        other => Err(format!("expected 'daily' or 'weekly', got '{}'", other)),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ArdoiseError> {
    let cli = Cli::parse();
    let mut config = Config::load(Some(cli.config.as_path()))?;
    if let Some(fixture) = cli.content {
        config.content.fixture = Some(fixture);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let source = content_source(&config)?;

        match cli.command {
            Commands::Daily {
                date,
                template,
                out,
            } => {
                let ctx = RenderContext::from_config(&config.render)?;
                let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
                let outcome =
                    pages::daily_page(source.as_ref(), &ctx, date, template.as_deref()).await?;
                finish(outcome, &out).await
            }
            Commands::Weekly { template, out } => {
                let ctx = RenderContext::from_config(&config.render)?;
                let outcome = pages::weekly_page(source.as_ref(), &ctx, template.as_deref()).await?;
                finish(outcome, &out).await
            }
            Commands::Templates { kind } => {
                let templates = pages::list_templates(source.as_ref(), kind).await?;
                if templates.is_empty() {
                    println!("No templates.");
                }
                for template in &templates {
                    println!("  {}  {}", template.id, template.display_name());
                }
                Ok(())
            }
            Commands::Serve { listen } => {
                if let Some(listen) = listen {
                    config.server.listen_addr = listen;
                }
                let ctx = RenderContext::for_server(&config.render)?;
                server::serve(&config.server, source, ctx).await
            }
        }
    })
}

fn content_source(config: &Config) -> Result<Arc<dyn ContentSource>, ArdoiseError> {
    if let Some(fixture) = &config.content.fixture {
        let source = MemorySource::from_json_file(fixture)?;
        log::info!("Loaded {} document(s) from {}", source.len(), fixture.display());
        return Ok(Arc::new(source));
    }

    match &config.content.endpoint {
        Some(endpoint) => Ok(Arc::new(PrismicClient::new(
            endpoint,
            config.content.access_token.clone(),
            config.render.image_timeout(),
        )?)),
        None => Err(ArdoiseError::Config(
            "no content source: set [content].endpoint or pass --content FILE".to_string(),
        )),
    }
}

async fn finish(outcome: PageOutcome, out: &Path) -> Result<(), ArdoiseError> {
    match outcome {
        PageOutcome::Rendered(page) => {
            match deliver(&page.file, &NoShareSheet, out).await? {
                Delivery::Downloaded { path, notice } => {
                    println!("{}", path.display());
                    log::debug!("{}", notice);
                }
                Delivery::SharedText { path } => println!("{}", path.display()),
                Delivery::SharedFile => println!("Shared {}", page.file.name),
            }
            Ok(())
        }
        PageOutcome::NothingPublished(message) => {
            println!("{}", message);
            Ok(())
        }
    }
}
