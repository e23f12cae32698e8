use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Result};

use crate::report::Pagination;

pub const DEFAULT_CATALOG_URL: &str =
    "https://demo.whoisrizkipratama.net/phantomjs-scrape-api-to-xlsx-api-sample";
pub const DEFAULT_INDEX_PATH: &str = "product-data-indices.txt";
pub const DEFAULT_OUT_PATH: &str = "product-report.xlsx";

/// Everything one pipeline run needs. Defaults are the constants the
/// original batch job hard-coded.
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog document URL; its first `<pre>` block carries the JSON payload.
    pub catalog_url: String,
    /// Text file listing one product ID per line.
    pub index_path: PathBuf,
    /// Where the finished workbook lands.
    pub out_path: PathBuf,
    pub pagination: Pagination,
    /// Transport timeout on the catalog request.
    pub fetch_timeout: Duration,
    /// How long a fetch failure is held back before the retry loop sees it.
    pub failure_debounce: Duration,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            out_path: PathBuf::from(DEFAULT_OUT_PATH),
            pagination: Pagination::default(),
            fetch_timeout: Duration::from_secs(600),
            failure_debounce: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Reject configurations the paginator cannot make progress with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.pagination.base_capacity >= 1,
            "sheet capacity must be at least 1"
        );
        ensure!(
            self.pagination.increment >= 1,
            "sheet increment must be at least 1"
        );
        Ok(())
    }
}

/// How the runner responds to retrieval failures.
///
/// The stock policy is the original job's: retry forever, with no delay
/// beyond the fetcher's failure debounce.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Give up after this many attempts; `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Extra sleep between attempts, on top of the failure debounce.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn allows_another(&self, attempts_so_far: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts_so_far < max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff: Duration::ZERO,
        }
    }
}
