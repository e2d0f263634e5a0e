use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use czds_client::config::ServiceConfig;
use czds_client::utils::config_loader;
use czds_client::utils::logging::{self, LogLevel};
use czds_client::{CancellationToken, CzdsClient};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CZDS_CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, env = "CZDS_EMAIL")]
    email: Option<String>,
    #[arg(long, env = "CZDS_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List TLDs and their access status
    Tlds,
    /// Download a zone file and print it as JSON keyed by domain
    Zone {
        tld: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = match &args.config {
        Some(path) => config_loader::run(path).await?,
        None => ServiceConfig::default(),
    };
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Build client
    // -------------------------------

    let email = args
        .email
        .or_else(|| service_config.email.clone())
        .ok_or_else(|| anyhow!("email is required: pass --email, set CZDS_EMAIL or `email` in config"))?;
    let password = args
        .password
        .or_else(|| service_config.password.clone())
        .ok_or_else(|| anyhow!("password is required: pass --password, set CZDS_PASSWORD or `password` in config"))?;

    let client = service_config
        .apply(CzdsClient::builder(email, password))
        .build()?;

    // -------------------------------
    // 3. Cancel in-flight work on Ctrl-C
    // -------------------------------

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling");
                cancel.cancel();
            }
        })
    };

    // -------------------------------
    // 4. Run command
    // -------------------------------

    let result = run_command(&client, &cancel, args.command).await;
    interrupt.abort();
    result
}

async fn run_command(client: &CzdsClient, cancel: &CancellationToken, command: Command) -> Result<()> {
    match command {
        Command::Tlds => {
            let tlds = client.list_tlds(cancel).await?;
            println!("{}", serde_json::to_string_pretty(&tlds)?);
        }
        Command::Zone { tld, output } => {
            let records = client.get_zone_file(cancel, &tld).await?;
            let json = serde_json::to_string_pretty(&records)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    info!(tld = %tld, path = %path.display(), domains = records.len(), "zone written");
                }
                None => println!("{}", json),
            }
        }
    }
    Ok(())
}
