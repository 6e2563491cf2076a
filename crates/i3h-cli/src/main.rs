use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod context;

use context::CliContext;

#[derive(Parser)]
#[command(name = "i3h")]
#[command(about = "I3H Portal CLI - sign in to the Immune Health portal and inspect the session", long_about = None)]
struct Cli {
    /// Directory holding config.toml and session.json
    #[arg(long, global = true, env = "I3H_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with username and password, or store a hosted-UI token
    Login(commands::auth::LoginArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user and workspaces
    Profile {
        /// Print the session state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a URL with the access token appended for trusted API hosts
    TokenUrl { url: String },
    /// Check whether navigation to a portal path is allowed
    CheckRoute { path: String },
    /// Print the hosted UI sign-in URL
    SignInUrl {
        /// Sign in through ORCID
        #[arg(long)]
        orcid: bool,
    },
    /// Show or initialize the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (file plus environment overrides)
    Show,
    /// Write a default config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(config_dir)?,
            ConfigAction::Init { force } => commands::config::init(config_dir, force)?,
        },
        Commands::Login(args) => {
            commands::auth::login(&mut CliContext::load(config_dir)?, args).await?
        }
        Commands::Logout => commands::auth::logout(&mut CliContext::load(config_dir)?).await?,
        Commands::SignInUrl { orcid } => {
            commands::auth::sign_in_url(&CliContext::load(config_dir)?, orcid)?
        }
        Commands::Profile { json } => {
            commands::session::profile(&CliContext::load(config_dir)?, json).await?
        }
        Commands::TokenUrl { url } => {
            commands::session::token_url(&CliContext::load(config_dir)?, &url).await?
        }
        Commands::CheckRoute { path } => {
            commands::session::check_route(&mut CliContext::load(config_dir)?, &path).await?
        }
    }

    Ok(())
}
