//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use url::Url;

use qaharvest_core::{
    BatchConfig, BatchResult, FragmentError, PageLayout, ProgressReporter, assemble_page, harvest,
};
use qaharvest_discovery::{
    ApiOptions, ListingLayout, dedup_urls, discover_from_listing, fetch_questions, question_urls,
    read_url_list, write_url_list,
};
use qaharvest_shared::{AppConfig, FetchConfig, PageRecord, init_config, load_config};
use qaharvest_source::{FileSource, HttpSource, PageSource, build_client};
use qaharvest_storage::JsonFileSink;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// qaharvest: turn Q&A pages into structured, ordered JSON records.
#[derive(Parser)]
#[command(
    name = "qaharvest",
    version,
    about = "Harvest Stack Overflow question pages into structured JSON records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Harvest every URL in a list into one JSON file.
    Run {
        /// CSV file with a `URL` column.
        #[arg(long)]
        urls: PathBuf,

        /// Output JSON file (defaults to `defaults.output` from config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Topic label for every record.
        #[arg(short, long)]
        topic: Option<String>,

        /// Read saved pages from this directory instead of fetching them.
        #[arg(long)]
        from_dir: Option<PathBuf>,

        /// Pages processed concurrently.
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Assemble one saved page and print its record as JSON.
    Extract {
        /// Saved HTML file.
        file: PathBuf,

        /// URL the page was saved from.
        #[arg(long)]
        url: String,

        /// Topic label for the record.
        #[arg(short, long)]
        topic: Option<String>,
    },

    /// Build a URL list to harvest.
    Discover {
        #[command(subcommand)]
        action: DiscoverAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Discovery subcommands.
#[derive(Subcommand)]
pub(crate) enum DiscoverAction {
    /// Page through the Stack Exchange API for a tag.
    Api {
        /// Tag to search (defaults to `discovery.tag`).
        #[arg(long)]
        tag: Option<String>,

        /// Stack Exchange site (defaults to `discovery.site`).
        #[arg(long)]
        site: Option<String>,

        /// Maximum API pages to request.
        #[arg(long)]
        max_pages: Option<u32>,

        /// Output CSV file.
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Walk a tag listing page and its "next" links.
    Listing {
        /// First listing page, e.g. https://stackoverflow.com/questions/tagged/sap-basis
        url: String,

        /// Maximum listing pages to walk.
        #[arg(long)]
        max_pages: Option<u32>,

        /// Output CSV file.
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "qaharvest=info",
        1 => "qaharvest=debug",
        _ => "qaharvest=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            urls,
            out,
            topic,
            from_dir,
            concurrency,
        } => cmd_run(&urls, out, topic, from_dir, concurrency).await,
        Command::Extract { file, url, topic } => cmd_extract(&file, &url, topic),
        Command::Discover { action } => match action {
            DiscoverAction::Api {
                tag,
                site,
                max_pages,
                out,
            } => cmd_discover_api(tag, site, max_pages, &out).await,
            DiscoverAction::Listing {
                url,
                max_pages,
                out,
            } => cmd_discover_listing(&url, max_pages, &out).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(
    urls_path: &Path,
    out: Option<PathBuf>,
    topic: Option<String>,
    from_dir: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<()> {
    let config = load_config()?;

    let listed = read_url_list(urls_path)?;
    let listed_count = listed.len();
    let urls = dedup_urls(listed);
    if urls.len() < listed_count {
        info!(dropped = listed_count - urls.len(), "duplicate URLs dropped");
    }
    if urls.is_empty() {
        return Err(eyre!("no valid URLs in '{}'", urls_path.display()));
    }

    let mut batch = BatchConfig::from(&config);
    if let Some(topic) = topic {
        batch.topic = topic;
    }
    if let Some(concurrency) = concurrency {
        batch.concurrency = concurrency;
    }

    let layout = Arc::new(PageLayout::from_config(&config.selectors)?);
    let out = out.unwrap_or_else(|| PathBuf::from(&config.defaults.output));
    let mut sink = JsonFileSink::new(&out);
    let reporter = CliProgress::new();

    info!(
        urls = urls.len(),
        topic = %batch.topic,
        out = %out.display(),
        "starting harvest"
    );

    let result = match from_dir {
        Some(dir) => {
            let source = Arc::new(FileSource::new(dir));
            harvest(&urls, source, layout, &batch, &mut sink, &reporter).await?
        }
        None => {
            let source = Arc::new(HttpSource::new(&FetchConfig::from(&config))?);
            harvest(&urls, source, layout, &batch, &mut sink, &reporter).await?
        }
    };

    println!();
    println!("  Harvest complete!");
    println!("  Records:   {}", result.records.len());
    println!("  Failed:    {}", result.failures.len());
    println!("  Skipped:   {} fragments", result.fragments_skipped);
    println!("  Output:    {}", out.display());
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    for (url, error) in &result.failures {
        println!("    ✗ {url}: {error}");
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

fn cmd_extract(file: &Path, url: &str, topic: Option<String>) -> Result<()> {
    let config = load_config()?;
    let url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;
    let html = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;

    let layout = PageLayout::from_config(&config.selectors)?;
    let topic = topic.unwrap_or_else(|| config.defaults.topic.clone());
    let page = assemble_page(&url, &html, &layout, &topic)?;

    for fragment in &page.skipped {
        warn!(error = %fragment, "fragment skipped");
    }

    println!("{}", serde_json::to_string_pretty(&page.record)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// discover
// ---------------------------------------------------------------------------

async fn cmd_discover_api(
    tag: Option<String>,
    site: Option<String>,
    max_pages: Option<u32>,
    out: &Path,
) -> Result<()> {
    let config = load_config()?;

    let mut opts = ApiOptions::from(&config.discovery);
    if let Some(tag) = tag {
        opts.tag = tag;
    }
    if let Some(site) = site {
        opts.site = site;
    }
    if let Some(max_pages) = max_pages {
        opts.max_pages = max_pages;
    }

    info!(tag = %opts.tag, site = %opts.site, max_pages = opts.max_pages, "discovering via API");

    let client = build_client(&FetchConfig::from(&config))?;
    let questions = fetch_questions(&client, &opts).await?;
    let urls = question_urls(&questions);
    write_url_list(out, &urls)?;

    println!(
        "  {} questions, {} unique URLs → {}",
        questions.len(),
        urls.len(),
        out.display()
    );
    Ok(())
}

async fn cmd_discover_listing(start: &str, max_pages: Option<u32>, out: &Path) -> Result<()> {
    let config = load_config()?;
    let start = Url::parse(start).map_err(|e| eyre!("invalid URL '{start}': {e}"))?;

    let layout = ListingLayout::from_config(&config.discovery)?;
    let source = HttpSource::new(&FetchConfig::from(&config))?;
    let max_pages = max_pages.unwrap_or(config.discovery.max_pages);

    info!(%start, max_pages, source = source.name(), "discovering via listing pages");

    let urls = discover_from_listing(&start, &source, &layout, max_pages).await?;
    write_url_list(out, &urls)?;

    println!("  {} unique URLs → {}", urls.len(), out.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn page_started(&self, url: &str, current: usize, total: usize) {
        self.spinner.set_message(format!("Queued [{current}/{total}] {url}"));
    }

    fn page_done(&self, url: &str, record: &PageRecord) {
        self.spinner
            .set_message(format!("Assembled {url} ({} answers)", record.answer_count()));
    }

    fn page_failed(&self, url: &str, error: &str) {
        self.spinner.println(format!("  ✗ {url}: {error}"));
    }

    fn fragment_skipped(&self, url: &str, fragment: &FragmentError) {
        debug!(url, error = %fragment, "fragment skipped");
    }

    fn done(&self, _result: &BatchResult) {
        self.spinner.finish_and_clear();
    }
}
