use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use std::io::Write;
use tickftpd::constants::DEFAULT_CONFIG_PATH;
use tickftpd::core_auth::hash_password;
use tickftpd::core_cli::Cli;
use tickftpd::{server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    if let Some(password) = args.hash_password.as_deref() {
        let hash = hash_password(password).context("Failed to hash password")?;
        println!("{}", hash);
        return Ok(());
    }

    // Initialize the logger with a custom format
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Load configuration from the TOML file
    let config_path = args.config_path(DEFAULT_CONFIG_PATH);
    let mut config = Config::load_from_file(config_path)?;
    info!("Loaded configuration from {}", config_path);

    // Command-line overrides
    if let Some(root_dir) = args.root_dir {
        config.server.root_dir = root_dir;
    }
    if let Some(port) = args.ftp_port {
        config.server.listen_port = port;
    }
    if let Some(port) = args.http_port {
        config.http.listen_port = port;
    }
    if args.no_http {
        config.http.enabled = false;
    }
    config.validate()?;

    server::run(config).await?;

    Ok(())
}
