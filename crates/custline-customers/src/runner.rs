//! Ingestion driver — orchestrates authentication, paging, and the sink

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use custline_core::{fmt_num, CsvSink, ProgressContext, SinkError, Sleeper, ThreadSleeper};

use crate::api::{CustomerApi, HttpApi};
use crate::auth::{authenticate, AuthError};
use crate::config::Config;
use crate::fetch::{fetch_page, FetchOutcome};
use crate::model::{Page, CSV_COLUMNS};

/// Pages between progress log lines
const LOG_EVERY_PAGES: u32 = 50;

/// Why a run aborted before completing.
///
/// Page-level failures are absorbed into the counters; only these
/// conditions end the run early.
#[derive(Debug)]
pub enum RunError {
    /// Initial authentication failed
    Auth(AuthError),
    /// Re-authentication after token expiry failed
    TokenRefresh(AuthError),
    /// Page 1 could not be fetched, so the total page count is unknown
    FirstPage(String),
    /// The CSV sink failed; rows can no longer be persisted
    Sink(SinkError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "authentication failed: {e}"),
            Self::TokenRefresh(e) => write!(f, "token refresh failed: {e}"),
            Self::FirstPage(msg) => write!(f, "initial page fetch failed: {msg}"),
            Self::Sink(e) => write!(f, "sink error: {e}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<SinkError> for RunError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

/// Aggregate counters for one ingestion run.
///
/// Mutated monotonically while the run is in flight; immutable once
/// returned. `pages_requested == successful_pages + failed_pages` holds
/// on completion.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub pages_requested: u32,
    pub successful_pages: u32,
    pub failed_pages: u32,
    pub records_ingested: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn log(&self) {
        log::info!("=== Ingestion Summary ===");
        log::info!(
            "Pages: {}/{} successful ({} failed)",
            self.successful_pages,
            self.pages_requested,
            self.failed_pages
        );
        log::info!("Records: {}", fmt_num(self.records_ingested));
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// S3 object key for a run artifact: `{prefix}/date={date}/{file_name}`.
///
/// The date partition is fixed once at run start by the caller.
pub fn object_key(prefix: &str, date: NaiveDate, file_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("date={date}/{file_name}")
    } else {
        format!("{prefix}/date={date}/{file_name}")
    }
}

/// Run the customer ingestion pipeline, producing the CSV artifact at
/// `{output_dir}/{file_name}`.
pub fn run(config: &Config, progress: &ProgressContext) -> Result<RunSummary, RunError> {
    std::fs::create_dir_all(&config.output_dir).map_err(SinkError::Io)?;
    let api = HttpApi::new(&config.base_url, config.credentials.clone());
    let csv_path = config.output_dir.join(&config.file_name);
    ingest(&api, &ThreadSleeper, &csv_path, config.max_retries, progress)
}

/// Drive the full ingestion state machine against any transport.
///
/// Separated from [`run`] so the orchestration policy is exercisable
/// with scripted transports and sleepers.
pub fn ingest<A, S>(
    api: &A,
    sleeper: &S,
    csv_path: &Path,
    max_retries: u32,
    progress: &ProgressContext,
) -> Result<RunSummary, RunError>
where
    A: CustomerApi,
    S: Sleeper,
{
    let start = Instant::now();

    // Init: no token, no run.
    let mut token = authenticate(api).map_err(RunError::Auth)?;

    // The file handle lives for the whole run; rows are handed over
    // page by page and flushed once at the end.
    let mut sink = CsvSink::create(csv_path, &CSV_COLUMNS)?;
    let mut summary = RunSummary::default();

    log::info!("fetching page 1 to determine total pages");
    summary.pages_requested += 1;
    let first = match fetch_page(api, sleeper, 1, &token, max_retries) {
        FetchOutcome::Success(page) => page,
        FetchOutcome::Fatal(msg) => return Err(RunError::FirstPage(msg)),
        outcome => return Err(RunError::FirstPage(outcome.label().to_string())),
    };

    let total_pages = first.metadata.total_pages;
    log::info!("total pages to fetch: {total_pages}");

    let pb = progress.page_bar(total_pages as u64);
    emit_page(&mut sink, &first, &mut summary)?;
    summary.successful_pages += 1;
    pb.inc(1);

    for page in 2..=total_pages {
        summary.pages_requested += 1;

        let mut outcome = fetch_page(api, sleeper, page, &token, max_retries);
        if let FetchOutcome::TokenExpired = outcome {
            log::info!("refreshing token for page {page}");
            token = authenticate(api).map_err(RunError::TokenRefresh)?;
            // One retry with the fresh token; whatever it returns stands.
            outcome = fetch_page(api, sleeper, page, &token, max_retries);
        }

        match outcome {
            FetchOutcome::Success(p) => {
                emit_page(&mut sink, &p, &mut summary)?;
                summary.successful_pages += 1;
            }
            FetchOutcome::TokenExpired => {
                log::warn!("page {page}: token expired again after refresh, skipping");
                summary.failed_pages += 1;
            }
            FetchOutcome::Exhausted | FetchOutcome::Fatal(_) => {
                log::warn!("failed to fetch page {page}, moving to next page");
                summary.failed_pages += 1;
            }
        }

        pb.inc(1);
        if page % LOG_EVERY_PAGES == 0 {
            log::info!(
                "{page}/{total_pages} pages, {} records so far",
                fmt_num(summary.records_ingested)
            );
        }
    }
    pb.finish_and_clear();

    let path = sink.finish()?;
    summary.elapsed = start.elapsed();
    log::info!("CSV written: {}", path.display());
    summary.log();
    Ok(summary)
}

/// Hand one page's records to the sink, in order, exactly once.
fn emit_page(sink: &mut CsvSink, page: &Page, summary: &mut RunSummary) -> Result<(), RunError> {
    for record in &page.data {
        sink.write_row(record.csv_row())?;
        summary.records_ingested += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_default_is_zeroed() {
        let summary = RunSummary::default();
        assert_eq!(summary.pages_requested, 0);
        assert_eq!(summary.successful_pages, 0);
        assert_eq!(summary.failed_pages, 0);
        assert_eq!(summary.records_ingested, 0);
        assert_eq!(summary.elapsed, Duration::ZERO);
    }

    #[test]
    fn summary_log_does_not_panic() {
        let summary = RunSummary {
            pages_requested: 10,
            successful_pages: 8,
            failed_pages: 2,
            records_ingested: 800,
            elapsed: Duration::from_secs(90),
        };
        summary.log();
    }

    #[test]
    fn object_key_layout() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(
            object_key("raw/customers", date, "customers_raw.csv"),
            "raw/customers/date=2026-08-07/customers_raw.csv"
        );
    }

    #[test]
    fn object_key_trims_slashes() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(
            object_key("/raw/customers/", date, "out.csv"),
            "raw/customers/date=2026-01-02/out.csv"
        );
    }

    #[test]
    fn object_key_empty_prefix() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(object_key("", date, "out.csv"), "date=2026-01-02/out.csv");
    }
}
