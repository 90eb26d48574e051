use anyhow::Result;
use aps_auth::ProviderClient;
use aps_config::Config;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Duration};
use tracing_subscriber::EnvFilter;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "aps-login", about = "aps-login — OAuth2 login against the APS provider")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the authorization URL without waiting for the callback.
    Url {
        /// Opaque `state` value to embed (omitted when not given).
        #[arg(long)]
        state: Option<String>,
    },
    /// Run the interactive login and print the user profile.
    Login {
        /// Print the URL instead of opening a browser.
        #[arg(long)]
        no_browser: bool,
        /// Override the local callback port.
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config =
        Config::load(cli.config.as_deref()).map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    init_tracing(&config.log.level);

    match cli.command {
        Commands::Url { state } => cmd_url(&config, state.as_deref()),
        Commands::Login { no_browser, port } => cmd_login(&config, no_browser, port).await,
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(config: &Config) -> Result<ProviderClient> {
    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
    Ok(config.provider.build_client().with_http_client(http))
}

fn cmd_url(config: &Config, state: Option<&str>) -> Result<()> {
    let client = build_client(config)?;
    let session = client.begin_login(state.unwrap_or_default())?;
    println!("{}", session.auth_url()?);
    Ok(())
}

async fn cmd_login(config: &Config, no_browser: bool, port: Option<u16>) -> Result<()> {
    config.provider.validate()?;
    let client = build_client(config)?;
    let port = port.unwrap_or(config.callback_port);
    let profile = aps_auth::flow::login(&client, port, !no_browser)
        .await
        .map_err(|e| {
            let stage = if e.is_exchange_error() {
                "code exchange"
            } else if e.is_profile_error() {
                "profile fetch"
            } else {
                "authorization"
            };
            anyhow::anyhow!("login failed during {stage}: {e}")
        })?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
