use bankbot_action_server::{ServerBuilder, shutdown_signal};
use bankbot_core::{ActionSet, BoxError};
use bankbot_plaid::{CheckBalanceAction, Transport};
use clap::Parser;
use std::time::Duration;
use structured_logger::{Builder, async_json::new_writer, get_env_level};
use tokio_util::sync::CancellationToken;

mod config;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

static LOG_TARGET: &str = "balance_bot";

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on, overrides the config file
    #[clap(short, long, env = "PORT")]
    port: Option<u16>,

    /// Path to the configuration file
    #[clap(long, env = "CONFIG_FILE_PATH")]
    config: Option<String>,

    #[arg(long, env = "PLAID_CLIENT_ID")]
    plaid_client_id: Option<String>,

    #[arg(long, env = "PLAID_SECRET", hide_env_values = true)]
    plaid_secret: Option<String>,

    /// How Plaid is called: "sdk" or "http"
    #[arg(long, env = "PLAID_TRANSPORT")]
    plaid_transport: Option<Transport>,
}

/// Main entry point for the balance bot action server.
///
/// The conversational runtime calls `POST /webhook` with `next_action = "action_check_balance"`
/// whenever the user asks for their balance.
///
/// # Example Usage
/// ```bash
/// PLAID_CLIENT_ID=... PLAID_SECRET=... cargo run -p balance_bot -- --port 5055
/// ```
///
/// or with a config file and a `.env` file:
/// ```bash
/// cargo run -p balance_bot -- --config agents/balance_bot/Config.toml
/// ```
#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    Builder::with_level(&get_env_level().to_string())
        .with_target_writer("*", new_writer(tokio::io::stdout()))
        .init();

    log::info!(target: LOG_TARGET, "bootstrap {}@{}", APP_NAME, APP_VERSION);
    match bootstrap(cli).await {
        Ok(_) => Ok(()),
        Err(err) => {
            log::error!(target: LOG_TARGET, "bootstrap error: {:?}", err);
            Err(err)
        }
    }
}

async fn bootstrap(cli: Cli) -> Result<(), BoxError> {
    let cfg = match &cli.config {
        Some(path) => config::Conf::from_file(path)?,
        None => config::Conf::default(),
    };
    let cfg = cfg.apply(config::Overrides {
        port: cli.port,
        plaid_client_id: cli.plaid_client_id,
        plaid_secret: cli.plaid_secret,
        plaid_transport: cli.plaid_transport,
    })?;
    log::info!(target: LOG_TARGET, "{:?}", cfg);

    let global_cancel_token = CancellationToken::new();

    let mut actions = ActionSet::new();
    actions.add(CheckBalanceAction::from_config(&cfg.plaid)?)?;
    log::info!(target: LOG_TARGET,
        "registered actions: {:?}, plaid transport: {}, endpoint: {}",
        actions.names(),
        cfg.plaid.transport,
        cfg.plaid.endpoint()
    );

    ServerBuilder::new()
        .with_app_name(APP_NAME.to_string())
        .with_app_version(APP_VERSION.to_string())
        .with_addr(cfg.addr())
        .with_actions(actions)
        .serve(shutdown_signal(global_cancel_token, Duration::from_secs(3)))
        .await?;

    Ok(())
}
