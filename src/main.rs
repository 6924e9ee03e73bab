use clap::{Parser, Subcommand};
use gatherer_archive::{config, generate, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "gatherer-archive")]
#[command(about = "Static site generator for archived card comments")]
#[command(long_about = "\
Static site generator for archived card comments

Reads archived forum comments per card printing, merges printings of the
same card, rewrites cross-card links, and writes a static site.

Inputs:

  data/                         # Comment archive (every *.json is read)
  cache/card_name_map.json      # Card name -> identifier
  cache/scryfall_data.json      # Identifier -> set, artist, oracle id
  images/<id>.webp              # Card images (webp, jpg, jpeg, png, gif)

Output:

  dist/index.html               # Alphabetical index with search
  dist/cards/<id>.html          # One page per printing
  dist/cards/combined/<oracle>.html
  dist/sitemap.xml

Run 'gatherer-archive gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (optional)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Comment archive directory
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Output directory
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Card image directory
    #[arg(long, global = true)]
    images: Option<PathBuf>,

    /// Base URL for sitemap links
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the full site
    Build,
    /// Generate the page for a single printing
    Card {
        /// Printing identifier
        id: u64,
    },
    /// Load and cross-reference the archive without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let site_config = resolve_site_config(&cli)?;
            println!("==> Building {}", site_config.output_dir.display());
            let report = generate::build_site(&site_config)?;
            output::print_run_report(&report);
        }
        Command::Card { id } => {
            let site_config = resolve_site_config(&cli)?;
            let page = generate::build_single(&site_config, id)?;
            output::print_single_output(id, &page);
        }
        Command::Check => {
            let site_config = resolve_site_config(&cli)?;
            println!("==> Checking {}", site_config.data_dir.display());
            let (catalog, _) = generate::load_catalog(&site_config)?;
            output::print_check_output(&catalog);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `config.toml` (if any), then apply command-line flags on top.
fn resolve_site_config(cli: &Cli) -> Result<config::SiteConfig, config::ConfigError> {
    let site_config = config::load_config(&cli.config)?.with_overrides(config::Overrides {
        data_dir: cli.data.clone(),
        output_dir: cli.output.clone(),
        images_dir: cli.images.clone(),
        base_url: cli.base_url.clone(),
    });
    site_config.validate()?;
    Ok(site_config)
}

/// Install the log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
