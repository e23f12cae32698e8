use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use prodreport::config::{
    Config, RetryPolicy, DEFAULT_CATALOG_URL, DEFAULT_INDEX_PATH, DEFAULT_OUT_PATH,
};
use prodreport::fetch::CatalogFetcher;
use prodreport::pipeline::{IndexedRetriever, PipelineRunner};
use prodreport::report::{Pagination, WorkbookWriter};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(
    name = "prodreport",
    version,
    about = "Export allow-listed products from a catalog API to a paginated XLSX report"
)]
struct Cli {
    /// Catalog document URL; its first <pre> block holds the JSON payload
    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    url: String,

    /// Allow-list file, one product ID per line
    #[arg(long, default_value = DEFAULT_INDEX_PATH)]
    indices: PathBuf,

    /// Output workbook path
    #[arg(long, default_value = DEFAULT_OUT_PATH)]
    out: PathBuf,

    /// Rows per sheet
    #[arg(long, default_value_t = 100)]
    sheet_capacity: usize,

    /// Capacity step between sheets, only used with --legacy-sheet-growth
    #[arg(long, default_value_t = 100)]
    sheet_increment: usize,

    /// Reproduce the original growing-threshold pagination and sheet names
    #[arg(long)]
    legacy_sheet_growth: bool,

    /// Give up after this many retrieval attempts (default: retry forever)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Extra sleep between retrieval attempts, in seconds
    #[arg(long, default_value_t = 0)]
    retry_backoff_secs: u64,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            catalog_url: self.url,
            index_path: self.indices,
            out_path: self.out,
            pagination: Pagination {
                base_capacity: self.sheet_capacity,
                increment: self.sheet_increment,
                legacy_growth: self.legacy_sheet_growth,
            },
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                backoff: Duration::from_secs(self.retry_backoff_secs),
            },
            ..Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = Cli::parse().into_config();
    cfg.validate()?;
    let url = Url::parse(&cfg.catalog_url)
        .with_context(|| format!("parsing catalog URL {}", cfg.catalog_url))?;

    // ─── 3) assemble the pipeline ────────────────────────────────────
    let client = Client::builder()
        .timeout(cfg.fetch_timeout)
        .build()
        .context("building HTTP client")?;
    let fetcher = CatalogFetcher::new(client, url, cfg.failure_debounce);
    let retriever = IndexedRetriever::new(fetcher, &cfg.index_path);
    let writer = WorkbookWriter::new(&cfg.out_path);
    let runner = PipelineRunner::new(retriever, cfg.pagination.clone(), writer, cfg.retry.clone());

    // ─── 4) run ──────────────────────────────────────────────────────
    let summary = runner.run().await?;
    info!(
        attempts = summary.attempts,
        rows = summary.rows,
        sheets = summary.sheets,
        path = %summary.out_path.display(),
        "report complete"
    );
    Ok(())
}
