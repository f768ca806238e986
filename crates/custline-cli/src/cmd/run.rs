//! Run subcommand - full ingestion: fetch to CSV, then upload to S3

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use custline_core::{fmt_num, S3Uploader, SharedProgress};
use custline_customers::{Credentials, RunSummary};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Output directory for the CSV artifact
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the S3 upload, keep the local CSV only
    #[arg(long)]
    pub no_upload: bool,

    /// S3 bucket override
    #[arg(long)]
    pub bucket: Option<String>,
}

pub fn run(args: RunArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    anyhow::ensure!(
        !config.api.base_url.is_empty(),
        "API base URL not configured (set API_BASE_URL or [api].base_url)"
    );
    let username = config
        .api
        .username
        .clone()
        .context("API username not configured (set API_USERNAME or [api].username)")?;
    let password = config
        .api
        .password
        .clone()
        .context("API password not configured (set API_PASSWORD or [api].password)")?;

    let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());
    // Partition date is fixed once, before any fetching starts
    let run_date = Local::now().date_naive();

    let pipeline_config = custline_customers::Config {
        base_url: config.api.base_url.clone(),
        credentials: Credentials { username, password },
        output_dir: output_dir.clone(),
        file_name: config.output.file_name.clone(),
        max_retries: custline_core::http_config().max_retries,
    };

    log::info!("Starting customer data ingestion");
    log::info!("  API: {}", config.api.base_url);
    log::info!("  Output: {}", output_dir.display());

    let summary =
        custline_customers::run(&pipeline_config, progress).context("ingestion run aborted")?;

    let csv_path = output_dir.join(&config.output.file_name);
    let destination = if args.no_upload {
        log::info!("Upload skipped (--no-upload)");
        None
    } else {
        let bucket = args
            .bucket
            .or_else(|| config.s3.bucket.clone())
            .context("S3 bucket not configured (set AWS_BUCKET_NAME or [s3].bucket)")?;
        let key =
            custline_customers::object_key(&config.s3.prefix, run_date, &config.output.file_name);

        let pb = progress.stage_line("upload");
        pb.set_message(format!("s3://{bucket}/{key}"));
        log::info!("Uploading {} to s3://{bucket}/{key}", csv_path.display());

        let uploader = S3Uploader::new(&bucket);
        let result = uploader.upload_file(&csv_path, &key);
        pb.finish_and_clear();
        result.context("S3 upload failed")?;

        log::info!("Upload complete");
        Some(format!("s3://{bucket}/{key}"))
    };

    print_report(&summary, &csv_path, destination.as_deref(), progress);

    if summary.failed_pages > 0 {
        anyhow::bail!("{} page(s) failed to ingest", summary.failed_pages);
    }
    Ok(())
}

/// Execution report on stderr, above any still-active progress bars.
fn print_report(
    summary: &RunSummary,
    csv_path: &Path,
    destination: Option<&str>,
    progress: &SharedProgress,
) {
    let elapsed = summary.elapsed.as_secs();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Execution Report").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    table.add_row(vec!["Pages requested", &summary.pages_requested.to_string()]);
    table.add_row(vec![
        "Successful pages",
        &summary.successful_pages.to_string(),
    ]);
    table.add_row(vec!["Failed pages", &summary.failed_pages.to_string()]);
    table.add_row(vec!["Records ingested", &fmt_num(summary.records_ingested)]);
    table.add_row(vec![
        "Execution time",
        &format!("{}m {}s", elapsed / 60, elapsed % 60),
    ]);
    table.add_row(vec!["Local file", &csv_path.display().to_string()]);
    table.add_row(vec!["Format", "CSV"]);
    if let Some(dest) = destination {
        table.add_row(vec!["S3 location", dest]);
    }

    progress.println(format!("\n{table}"));
}
