use folio_common::config::{EnvLoader, FileStore};
use folio_common::perf::{TimingGuard, measure};
use folio_common::telemetry::{self, TelemetryConfig};
use folio_common::{ContentClient, Post, SanityConfig, plain_text};
use folio_renderer::{
    Anchors, ImageSource, ImageUrlCache, RenderContext, RenderOptions, TocEntry, html, render_post,
};
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Folio - render blog posts and their tables of contents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Sanity project id (overrides the config file)
    #[arg(long, global = true, env = "SANITY_PROJECT_ID")]
    project_id: Option<String>,

    /// Sanity dataset (overrides the config file)
    #[arg(long, global = true, env = "SANITY_DATASET")]
    dataset: Option<String>,

    /// Path to a .toml or .json config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a post file to HTML
    Render {
        /// Post JSON: a post object, a query envelope, or a bare body array
        input: PathBuf,

        /// Write HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Put the table of contents before the body
        #[arg(long)]
        toc: bool,

        /// Requested image width in pixels
        #[arg(long, default_value_t = 1200)]
        width: u32,
    },
    /// Print the table of contents of a post file
    Toc {
        input: PathBuf,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch a post by slug and render it
    Fetch {
        slug: String,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        toc: bool,
    },
    /// Print the plain text of a post file
    Text { input: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => None,
        1 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    };
    let telemetry_config = TelemetryConfig::from_env("folio-cli");
    telemetry::init(match level {
        Some(level) => telemetry_config.with_level(level),
        None => telemetry_config,
    });

    let config = load_config(&cli).await?;

    match cli.command {
        Commands::Render {
            input,
            output,
            toc,
            width,
        } => {
            let post = read_post(&input).await?;
            let options = RenderOptions {
                image_width: width,
                ..Default::default()
            };
            let html = render_html(&post, &config, options, toc);
            write_output(output.as_deref(), &html).await?;
        }
        Commands::Toc { input, json } => {
            let post = read_post(&input).await?;
            let toc = Anchors::derive(&post.body).into_toc();
            if json {
                println!("{}", serde_json::to_string_pretty(&toc).into_diagnostic()?);
            } else {
                print!("{}", outline(&toc));
            }
        }
        Commands::Fetch { slug, output, toc } => {
            let client = ContentClient::new(config.clone());
            let post = client
                .post_by_slug(&slug)
                .await?
                .ok_or_else(|| miette::miette!("No post found with slug `{slug}`"))?;
            tracing::info!(title = %post.title, "fetched post");
            let html = render_html(&post, &config, RenderOptions::default(), toc);
            write_output(output.as_deref(), &html).await?;
        }
        Commands::Text { input } => {
            let post = read_post(&input).await?;
            println!("{}", plain_text(&post.body));
        }
    }

    Ok(())
}

/// Config file (explicit, or the default one if present) with the
/// environment layered over it, or the environment alone; command line
/// overrides go on top.
async fn load_config(cli: &Cli) -> Result<SanityConfig> {
    let file = cli
        .config
        .clone()
        .or_else(|| default_config_path().filter(|path| path.exists()));

    let mut config = match file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config file");
            SanityConfig::load(&FileStore::new(path)).await?.overlay_env()
        }
        None => SanityConfig::load(&EnvLoader).await?,
    };

    if let Some(project_id) = &cli.project_id {
        config.project_id = project_id.clone();
    }
    if let Some(dataset) = &cli.dataset {
        config.dataset = dataset.clone();
    }
    let config = config.normalized();

    if !config.is_configured() {
        tracing::debug!("no project id set, images will be skipped");
    }
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join("config.toml"))
}

async fn read_post(path: &Path) -> Result<Post> {
    let src = tokio::fs::read_to_string(path).await.into_diagnostic()?;
    Ok(Post::from_json(&path.display().to_string(), &src)?)
}

fn render_html(post: &Post, config: &SanityConfig, options: RenderOptions, toc: bool) -> String {
    let images = ImageSource::from_config(config);
    let cache = ImageUrlCache::new();
    let ctx = RenderContext::new(&images)
        .with_options(options)
        .with_cache(&cache);

    let rendered = measure("render post", || render_post(&post.body, &ctx));

    let mut out = String::new();
    if toc {
        out.push_str(&html::write_toc(&rendered.toc));
    }
    out.push_str(&html::write_document(&rendered.blocks));
    out
}

/// Indented text outline, one heading per line.
fn outline(toc: &[TocEntry]) -> String {
    let mut out = String::new();
    for entry in toc {
        let depth = usize::from(entry.level.as_u8().saturating_sub(2));
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("- {} (#{})\n", entry.text, entry.slug));
    }
    out
}

async fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    let Some(path) = output else {
        print!("{content}");
        return Ok(());
    };

    let _timing = TimingGuard::new("write output");
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent).await.into_diagnostic()?;
        }
    }
    tokio::fs::write(path, content).await.into_diagnostic()?;
    eprintln!("✓ Output: {}", path.display());
    Ok(())
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
