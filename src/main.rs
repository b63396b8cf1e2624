use clap::{Parser, Subcommand};
use spacetraveling::config::SiteConfig;
use spacetraveling::prismic::PrismicClient;
use spacetraveling::render::PageContext;
use spacetraveling::state::AppState;
use spacetraveling::store::PageStore;
use spacetraveling::{config, generate, logging, output, serve};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the build cache and rewrite every page
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let hash = env!("BUILD_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{} ({hash})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(about = "Blog front-end generated from a Prismic repository")]
#[command(long_about = "\
Blog front-end generated from a Prismic repository

Posts are fetched from the Prismic content API and rendered to HTML: a list
page with \"load more\" pagination and one page per post with an estimated
reading time.

  build   render the home page and the most recent posts into --output
  serve   render the same pages into memory and serve them; other posts are
          generated on first request and the home page is refreshed hourly

Connection settings come from config.toml in --root, overridden by the
PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN environment variables.

Run 'spacetraveling gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory for build
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the site into the output directory
    Build(CacheArgs),
    /// Serve the site, generating unknown posts on demand
    Serve {
        /// Listen address (overrides serve.bind)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Validate config and confirm the content API is reachable
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build(cache_args) => {
            let config = setup(&cli.root, cli.verbose)?;
            let client = PrismicClient::new(&config.prismic)?;
            println!("==> Fetching posts from {}", config.prismic.endpoint);
            let site = generate::build_site(&client, &config).await?;

            println!("==> Writing {}", cli.output.display());
            let stats = generate::write_site(&site, &cli.output, !cache_args.no_cache)?;
            output::print_build_output(&site, &stats);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Serve { bind } => {
            let config = setup(&cli.root, cli.verbose)?;
            let addr = match bind {
                Some(addr) => addr,
                None => config.bind_addr()?,
            };
            let client = Arc::new(PrismicClient::new(&config.prismic)?);
            println!("==> Fetching posts from {}", config.prismic.endpoint);
            let site = generate::build_site(client.as_ref(), &config).await?;
            output::print_serve_output(addr, &site, &config);

            let store = PageStore::from_site(&site);
            let state = AppState::new(client, config, store);
            serve::run(state, addr).await?;
        }
        Command::Check => {
            let config = setup(&cli.root, cli.verbose)?;
            println!("==> Checking {}", config.prismic.endpoint);
            let client = PrismicClient::new(&config.prismic)?;
            let ctx = PageContext::from_config(&config);
            let home = generate::build_home(&client, &config, &ctx, 1).await?;
            output::print_check_output(&config, &home);
            println!("==> Config is valid and content is reachable");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Start logging and load the validated config.
fn setup(root: &Path, verbose: bool) -> Result<SiteConfig, Box<dyn std::error::Error>> {
    logging::init_tracing(verbose).map_err(|e| -> Box<dyn std::error::Error> { e })?;
    Ok(config::load_config(root)?)
}
