use auto_sidebar::cache::CacheManifest;
use auto_sidebar::scan::{self, Collaborators};
use auto_sidebar::timestamps::{FsTimes, GitLog};
use auto_sidebar::types::{HostSite, NavEntry};
use auto_sidebar::{config, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that resolve timestamps.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the timestamp cache and query history for every document again
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "auto-sidebar")]
#[command(about = "Generate nav and sidebar config for a documentation site")]
#[command(long_about = "\
Generate nav and sidebar config for a documentation site

Your documentation tree is the data source. Folders become sidebar groups,
markdown files become links, and each top-level entry becomes a nav item.

Source structure:

  docs/
  ├── sidebar.toml                 # Generator config (optional)
  ├── index.md                     # Home page (never in the sidebar)
  ├── guide/                       # Top-level folder → nav entry + sidebar
  │   ├── index.md                 # Becomes the \"guide\" group link
  │   ├── intro.md                 # front-matter `sort: 0` pins it first
  │   └── setup/
  │       └── install.md
  └── reference/
      └── api.md

Option resolution (first available wins):
  Front-matter <prefix>-key → front-matter key → [items] in sidebar.toml → default

Order within each folder:
  Sort weights first (as target slots), then oldest first by git history.

Run 'auto-sidebar gen-config' to generate a documented sidebar.toml.")]
#[command(version)]
struct Cli {
    /// Documentation root
    #[arg(long, default_value = "docs", global = true)]
    source: PathBuf,

    /// Output file [default: <source>/.vitepress/sidebar.json]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Timestamp cache directory [default: cache_dir from sidebar.toml]
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate nav and sidebar JSON
    Generate {
        #[command(flatten)]
        cache: CacheArgs,
        /// JSON file with the site's existing nav; suppresses nav generation
        #[arg(long)]
        nav_file: Option<PathBuf>,
    },
    /// Build the sidebar without writing output or cache
    Check,
    /// Print a stock sidebar.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Generate { cache, nav_file } => {
            let config = config::load_config(&cli.source)?;
            init_thread_pool(&config.processing);
            let mut host = host_site(&cli, &config);
            if let Some(nav_file) = nav_file {
                host.nav = read_nav(nav_file)?;
            }

            let mut manifest_cache = if cache.no_cache {
                CacheManifest::empty()
            } else {
                CacheManifest::load(&host.cache_dir)
            };
            let history = GitLog::default();
            let report = scan::scan(
                &host,
                &config,
                &mut manifest_cache,
                &Collaborators {
                    times: &FsTimes,
                    history: &history,
                    compare: None,
                },
            )?;
            manifest_cache.save(&host.cache_dir)?;

            let output_path = cli
                .output
                .clone()
                .unwrap_or_else(|| cli.source.join(".vitepress").join("sidebar.json"));
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            output::print_generate_output(&report);
            host.apply(report.manifest);
            let json = serde_json::to_string_pretty(&host.into_manifest())?;
            std::fs::write(&output_path, json)?;
            info!(path = %output_path.display(), "sidebar written");
            println!("==> Wrote {}", output_path.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            init_thread_pool(&config.processing);
            let host = host_site(&cli, &config);
            println!("==> Checking {}", cli.source.display());
            let mut manifest_cache = CacheManifest::load(&host.cache_dir);
            let history = GitLog::default();
            let report = scan::scan(
                &host,
                &config,
                &mut manifest_cache,
                &Collaborators {
                    times: &FsTimes,
                    history: &history,
                    compare: None,
                },
            )?;
            output::print_generate_output(&report);
            println!("==> Documentation tree is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn host_site(cli: &Cli, config: &config::SidebarConfig) -> HostSite {
    let cache_dir = cli
        .cache_dir
        .clone()
        .unwrap_or_else(|| cli.source.join(&config.cache_dir));
    HostSite::new(&cli.source, cache_dir)
}

fn read_nav(path: &Path) -> Result<Vec<NavEntry>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
