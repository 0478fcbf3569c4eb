//! # Gap Radar CLI (`gapr`)
//!
//! The `gapr` binary runs market-gap analyses from the terminal, exports
//! HTML reports, and starts the HTTP API used by the web front end.
//!
//! ## Usage
//!
//! ```bash
//! gapr --config ./config/gapr.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gapr catalog` | List the built-in opportunity catalog |
//! | `gapr search "<query>"` | Primary search over the catalog |
//! | `gapr analyze "<query>"` | Full gap analysis |
//! | `gapr suggest "<partial>"` | Query suggestions |
//! | `gapr report "<query>" --output <file>` | Export an HTML report |
//! | `gapr serve` | Start the HTTP API |
//! | `gapr auth signin <email>` | Hosted account operations |
//! | `gapr completions <shell>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # Analyse a business idea as JSON
//! gapr analyze "construction progress tracking" --json
//!
//! # Type queries line by line and get debounced suggestions
//! gapr suggest --watch
//!
//! # Printable report with an MVP proposal for the top gap
//! gapr report "clinic scheduling" --output ./out/clinic.html --print --mvp
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gap_radar::{cli, config, server};

/// Gap Radar CLI: market-gap analysis for business ideas.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/gapr.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "gapr",
    about = "Gap Radar: find underserved markets for a business idea",
    version,
    long_about = "Gap Radar scores a query against a catalog of market opportunities, asks a \
    language model for market gaps, a revenue/competition heatmap and a competitive landscape, \
    and falls back to catalog-derived results when the model is unavailable."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/gapr.toml`. A missing file means built-in
    /// defaults.
    #[arg(long, global = true, default_value = "./config/gapr.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List every opportunity in the built-in catalog.
    Catalog,

    /// Primary search: catalog records that closely match the query.
    Search {
        /// Free-text business idea or industry.
        query: String,
    },

    /// Full analysis: market gaps, heatmap and competitive landscape.
    Analyze {
        query: String,

        /// Print the analysis as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Suggest search queries for a partially typed input.
    Suggest {
        /// Partial query. Required unless `--watch` is given.
        #[arg(required_unless_present = "watch")]
        query: Option<String>,

        /// Read queries from stdin line by line, debouncing requests.
        #[arg(long)]
        watch: bool,
    },

    /// Analyse a query and export the result as an HTML report.
    Report {
        query: String,

        /// Destination HTML file.
        #[arg(long, short)]
        output: PathBuf,

        /// Open the print dialog when the report is loaded.
        #[arg(long)]
        print: bool,

        /// Include an MVP proposal and roadmap for the top gap.
        #[arg(long)]
        mvp: bool,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,

    /// Hosted account operations.
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Print a shell completion script.
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Create an account with e-mail and password.
    Signup {
        email: String,
        #[arg(long, env = "GAPR_PASSWORD")]
        password: String,
    },

    /// Sign in with e-mail and password.
    Signin {
        email: String,
        #[arg(long, env = "GAPR_PASSWORD")]
        password: String,
    },

    /// Print the social login URL for a provider.
    ///
    /// Supported providers: google, github, discord, twitter.
    OauthUrl {
        provider: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gap_radar=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "gapr", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Catalog => {
            cli::run_catalog(&cfg)?;
        }
        Commands::Search { query } => {
            cli::run_search(&cfg, &query).await?;
        }
        Commands::Analyze { query, json } => {
            cli::run_analyze(&cfg, &query, json).await?;
        }
        Commands::Suggest { query, watch } => {
            if watch {
                cli::run_suggest_watch(&cfg).await?;
            } else {
                cli::run_suggest(&cfg, query.as_deref().unwrap_or_default()).await?;
            }
        }
        Commands::Report {
            query,
            output,
            print,
            mvp,
        } => {
            cli::run_report(&cfg, &query, &output, print, mvp).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Auth { action } => match action {
            AuthAction::Signup { email, password } => {
                cli::run_sign_up(&cfg, &email, &password).await?;
            }
            AuthAction::Signin { email, password } => {
                cli::run_sign_in(&cfg, &email, &password).await?;
            }
            AuthAction::OauthUrl { provider } => {
                cli::run_oauth_url(&cfg, &provider)?;
            }
        },
        Commands::Completions { .. } => {
            // Handled above (before config loading)
        }
    }

    Ok(())
}
