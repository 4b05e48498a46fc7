//! abfcli - admin client for the anti-bruteforce service
//!
//! Examples:
//!   abfcli blacklist add -n 33.33.33.0/24
//!   abfcli whitelist remove --network 10.0.0.0/8
//!   abfcli reset -l login -i 33.33.33.33
//!   abfcli --addr 127.0.0.1:8080 try -l login -p password -i 33.33.33.33

use anti_bruteforce::client::AdminClient;
use anti_bruteforce::config::{ClientConfig, DEFAULT_CONFIG_PATH, LoggerConfig};
use anti_bruteforce::error::ClientError;
use anti_bruteforce::models::Attempt;
use anti_bruteforce::telemetry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "abfcli")]
#[command(about = "CLI client for the anti-bruteforce service")]
struct Cli {
    /// Path to the configuration file holding the [server] section
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Service address, overrides the config file
    #[arg(long, global = true)]
    addr: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Networks in the blacklist are always refused
    Blacklist {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Networks in the whitelist are always admitted
    Whitelist {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Clear the buckets for a login and an ip
    Reset {
        #[arg(short, long)]
        login: String,

        #[arg(short, long)]
        ip: String,
    },

    /// Ask for an admission decision
    Try {
        #[arg(short, long)]
        login: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        ip: String,
    },
}

#[derive(Subcommand)]
enum ListAction {
    Add {
        #[arg(short, long)]
        network: String,
    },
    Remove {
        #[arg(short, long)]
        network: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = LoggerConfig {
        level: "warn".to_string(),
        ..LoggerConfig::default()
    };
    if let Err(err) = telemetry::init(&logger) {
        eprintln!("cannot initialize logger: {err}");
    }

    let addr = match &cli.addr {
        Some(addr) => addr.clone(),
        None => match ClientConfig::load(&cli.config) {
            Ok(cfg) => cfg.server.addr(),
            Err(err) => {
                tracing::error!(%err, "cannot read config");
                return ExitCode::FAILURE;
            }
        },
    };

    let client = AdminClient::new(&addr);
    match run(&client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, addr = client.base_url(), "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &AdminClient, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Blacklist { action } => match action {
            ListAction::Add { network } => client.add_to_blacklist(&network).await,
            ListAction::Remove { network } => client.remove_from_blacklist(&network).await,
        },
        Command::Whitelist { action } => match action {
            ListAction::Add { network } => client.add_to_whitelist(&network).await,
            ListAction::Remove { network } => client.remove_from_whitelist(&network).await,
        },
        Command::Reset { login, ip } => client.reset(&login, &ip).await,
        Command::Try { login, password, ip } => {
            let attempt = Attempt { login, password, ip };
            let allowed = client.try_auth(&attempt).await?;
            println!("{}", if allowed { "allowed" } else { "denied" });
            Ok(())
        }
    }
}
