//! custline - customer data ingestion CLI
//!
//! Authenticates against the customer REST API, pages all customer
//! records into a local CSV file, and uploads the artifact to S3 under
//! a date-partitioned key.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "custline")]
#[command(about = "Customer data ingestion pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./custline.toml or ~/.config/custline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    request_timeout: Option<u64>,

    /// Maximum retry attempts per page
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all customers into a CSV file and upload it to S3
    Run(cmd::run::RunArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(custline_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    custline_core::init_logging(quiet, cli.debug, multi);

    // Load configuration
    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // Apply HTTP settings (config file defaults, CLI overrides)
    let http_config = custline_core::HttpConfig {
        request_timeout: Duration::from_secs(
            cli.request_timeout.unwrap_or(config.http.request_timeout),
        ),
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
    };
    custline_core::set_http_config(http_config);

    match cli.command {
        Command::Run(args) => cmd::run::run(args, &config, &progress),
        Command::Config => {
            use comfy_table::{
                modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "API base URL",
                if config.api.base_url.is_empty() {
                    "not set"
                } else {
                    &config.api.base_url
                },
            ]);
            table.add_row(vec![
                "API username",
                if config.api.username.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec![
                "API password",
                if config.api.password.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec!["Output directory", &config.output.dir.display().to_string()]);
            table.add_row(vec!["Output file", &config.output.file_name]);
            table.add_row(vec![
                "S3 bucket",
                config.s3.bucket.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec!["S3 prefix", &config.s3.prefix]);
            table.add_row(vec![
                "Request timeout",
                &format!("{}s", config.http.request_timeout),
            ]);
            table.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
