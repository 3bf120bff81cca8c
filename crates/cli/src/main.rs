//! `pmtrack` -- command-line client for the project tracker.
//!
//! Resolves the caller through the auth gate, then lists, creates and
//! updates projects through the same view state machine the web client
//! uses. Every write is followed by a full reload and the reloaded list is
//! printed.
//!
//! # Environment variables
//!
//! | Variable                             | Default                           |
//! |--------------------------------------|-----------------------------------|
//! | `RUST_LOG`                           | `pmtrack_cli=info,...`            |
//! | `PMTRACK_LOG_JSON`                   | unset (`1` for JSON log lines)    |
//! | `PMTRACK_PAGE_URL`                   | `http://localhost:5173/projects`  |
//! | `PMTRACK_API_BASE`                   | selected from the page host       |
//! | `PMTRACK_AUTH_API_BASE`              | identity provider default         |
//! | `PMTRACK_PORTAL_BASE`                | sign-in portal default            |
//! | `PMTRACK_SESSION_COOKIE`             | unset                             |
//! | `PMTRACK_REQUEST_TIMEOUT_SECS`       | `30`                              |
//! | `PMTRACK_DISPLAY_UTC_OFFSET_MINUTES` | `330`                             |
//! | `PMTRACK_RELOAD_ORDERING`            | `last-arrival`                    |

mod commands;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pmtrack_client::auth::{AuthFailure, AuthGate};
use pmtrack_client::config::ClientConfig;
use pmtrack_core::filter::StatusFilter;
use pmtrack_core::project::ProjectStatus;
use pmtrack_core::types::DbId;
use pmtrack_view::settings::ViewSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Outcome;
use crate::output::Printer;

const DEFAULT_LOG_FILTER: &str = "pmtrack_cli=info,pmtrack_client=info,pmtrack_view=info";

/// Exit code when the user has to sign in first.
const EXIT_SIGN_IN: u8 = 2;

#[derive(Parser)]
#[command(name = "pmtrack")]
#[command(about = "List, add and update tracked projects")]
struct Cli {
    /// Print JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show the resolved identity.
    Whoami,
    /// Check that the project API answers.
    Ping,
    /// List projects.
    List {
        /// ONGOING, COMPLETED or all.
        #[arg(long)]
        status: Option<StatusFilter>,
        /// Owner user id (admins only).
        #[arg(long = "user")]
        user_id: Option<DbId>,
    },
    /// Create a project, then list.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change a project's status, then list.
    SetStatus { id: DbId, status: ProjectStatus },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Err(e) => {
            if let Some(auth) = e.downcast_ref::<AuthFailure>() {
                if let AuthFailure::SignInRequired { redirect_to, .. } = auth {
                    eprintln!("Sign in at {redirect_to}");
                } else {
                    eprintln!("error: {auth}");
                }
                return ExitCode::from(EXIT_SIGN_IN);
            }
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("PMTRACK_LOG_JSON").is_ok_and(|v| v.trim() == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = ClientConfig::from_env()?;
    let settings = ViewSettings::from_env()?;
    let printer = Printer::new(cli.json, settings.display_offset);

    tracing::debug!(
        page = %config.page_url,
        api_base = %config.api_base,
        ordering = ?settings.ordering,
        "Configuration loaded",
    );

    let gate = AuthGate::from_config(&config)?;
    let session = gate.establish_session(&config.page_url).await?;

    commands::dispatch(cli.command, &config, &settings, session, &printer).await
}
