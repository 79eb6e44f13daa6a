//! Storefront command-line shell.

mod commands;
mod config;
mod handlers;
mod output;
mod shell;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{admin, auth, cart, favorite, order, product};
use shell::{Reported, Shell};
use storefront::{navigate, Navigation};

/// Storefront CLI
#[derive(Parser)]
#[command(name = "storefront")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "plain")]
    format: output::OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API root URL, overriding the config file
    #[arg(long, global = true, env = "STOREFRONT_API_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage authentication
    Auth {
        #[command(subcommand)]
        action: auth::AuthAction,
    },

    /// Browse the catalog
    #[command(alias = "p")]
    Product {
        #[command(subcommand)]
        action: product::ProductAction,
    },

    /// Manage the cart
    #[command(alias = "c")]
    Cart {
        #[command(subcommand)]
        action: cart::CartAction,
    },

    /// Manage favorites
    #[command(alias = "fav")]
    Favorite {
        #[command(subcommand)]
        action: favorite::FavoriteAction,
    },

    /// Orders and checkout
    #[command(alias = "o")]
    Order {
        #[command(subcommand)]
        action: order::OrderAction,
    },

    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        action: admin::AdminAction,
    },

    /// Resolve a storefront path against the current session
    Open {
        /// e.g. /checkout or /product/3
        path: String,
    },

    /// Show or change configuration
    Config {
        /// Store a new API root URL
        #[arg(long)]
        set_base_url: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is::<Reported>() {
                eprintln!("{} {}", "error:".red().bold(), describe(&e));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Config { set_base_url } = &cli.command {
        return handle_config(set_base_url.as_deref(), cli.base_url.as_deref());
    }

    let client = config::build_client(cli.base_url.as_deref())?;
    let mut shell = Shell::new(client);
    let format = cli.format;

    match cli.command {
        Commands::Auth { action } => auth::handle(action, &mut shell, format).await,
        Commands::Product { action } => product::handle(action, &mut shell, format).await,
        Commands::Cart { action } => cart::handle(action, &mut shell, format).await,
        Commands::Favorite { action } => favorite::handle(action, &mut shell, format).await,
        Commands::Order { action } => order::handle(action, &mut shell, format).await,
        Commands::Admin { action } => admin::handle(action, &mut shell, format).await,
        Commands::Open { path } => {
            match navigate(&path, &shell.client().current_session()) {
                Navigation::Render(route) => println!("{} {}", "render".green(), route),
                Navigation::Redirect(route) => println!("{} {}", "redirect".yellow(), route),
            }
            Ok(())
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn handle_config(set_base_url: Option<&str>, override_url: Option<&str>) -> Result<()> {
    let mut cfg = config::load_config()?;

    if let Some(url) = set_base_url {
        cfg.api.base_url = Some(url.to_owned());
        config::save_config(&cfg)?;
        println!("{} {}", "Saved base URL".green(), url);
        return Ok(());
    }

    println!("Config file: {}", config::config_path()?.display());
    println!("Session file: {}", config::session_path()?.display());
    let base_url = override_url
        .map(str::to_owned)
        .or(cfg.api.base_url)
        .unwrap_or_else(|| storefront::client::DEFAULT_BASE_URL.to_owned());
    println!("Base URL: {base_url}");

    let client = config::build_client(override_url)?;
    match client.current_session().user() {
        Some(user) => println!("Signed in as: {}", user.username),
        None => println!("Signed in: no"),
    }
    Ok(())
}

/// The message to show for a failed command.
fn describe(error: &anyhow::Error) -> String {
    match error.downcast_ref::<storefront::Error>() {
        Some(e) => e.user_message(&format!("{error:#}")),
        None => format!("{error:#}"),
    }
}
