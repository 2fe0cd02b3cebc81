use anyhow::Context;
use tracing::{error, info};

use analyst_portal::core::config::AppConfig;
use analyst_portal::main_module::{build_state, init_logging, parse_cli_args, run_server, Command};
use analyst_portal::security::hash_password;

const USAGE: &str = "usage: analyst-portal [serve | hash-password <secret>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match parse_cli_args(&args)? {
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::HashPassword(secret) => {
            println!("{}", hash_password(&secret)?);
            Ok(())
        }
        Command::Serve => {
            init_logging();

            let config = AppConfig::load().context("Failed to load configuration")?;
            info!(
                "Starting analyst portal v{} on {}",
                env!("CARGO_PKG_VERSION"),
                config.bind_address()
            );

            let state = build_state(config)?;
            if let Err(e) = run_server(state).await {
                error!("Server stopped with error: {}", e);
                return Err(e.into());
            }
            Ok(())
        }
    }
}
