use std::fmt;
use std::path::PathBuf;

use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::CatalogEntry;
use crate::config::RetryPolicy;
use crate::error::{ExportError, FetchError, PipelineError};
use crate::fetch::CatalogSource;
use crate::index;
use crate::report::{paginate, Pagination, WorkbookWriter};

/// Where a run currently stands. Transitions are logged so a stalled run
/// shows its last completed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    RetrievingIndices,
    RetrievingCatalog,
    Paginating,
    Writing,
    Done,
}

impl Stage {
    fn advance(&mut self, next: Stage) {
        debug!(from = %self, to = %next, "stage");
        *self = next;
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::RetrievingIndices => "retrieving-indices",
            Stage::RetrievingCatalog => "retrieving-catalog",
            Stage::Paginating => "paginating",
            Stage::Writing => "writing",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Runs the index read, then the catalog fetch, in strict order.
///
/// The index file is re-read from disk on every call and the fetch never
/// starts before the read completes: a retried run must see allow-list edits
/// made while the previous attempt was failing.
pub struct IndexedRetriever<S> {
    source: S,
    index_path: PathBuf,
}

impl<S: CatalogSource> IndexedRetriever<S> {
    pub fn new(source: S, index_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            index_path: index_path.into(),
        }
    }

    #[instrument(level = "info", skip(self, stage), fields(index = %self.index_path.display()))]
    pub async fn retrieve(&self, stage: &mut Stage) -> Result<Vec<CatalogEntry>, FetchError> {
        stage.advance(Stage::RetrievingIndices);
        let read = index::read_index(&self.index_path);
        info!(indices = read.lines().len(), "loaded product index");

        stage.advance(Stage::RetrievingCatalog);
        let entries = self.source.fetch_filtered(read.lines()).await?;
        info!(products = entries.len(), "retrieved and filtered catalog");
        Ok(entries)
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub attempts: u32,
    pub rows: usize,
    pub sheets: usize,
    pub out_path: PathBuf,
}

enum AttemptError {
    Retrieve(FetchError),
    Export(ExportError),
}

/// Drives retrieve → paginate → write, restarting the whole pipeline from
/// the top whenever catalog retrieval fails.
///
/// Nothing carries over between attempts: each one re-reads the index and
/// re-fetches the catalog, and the row buffers are owned by the attempt that
/// produced them. Export failures are terminal, never retried.
pub struct PipelineRunner<S> {
    retriever: IndexedRetriever<S>,
    pagination: Pagination,
    writer: WorkbookWriter,
    retry: RetryPolicy,
}

impl<S: CatalogSource> PipelineRunner<S> {
    pub fn new(
        retriever: IndexedRetriever<S>,
        pagination: Pagination,
        writer: WorkbookWriter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            retriever,
            pagination,
            writer,
            retry,
        }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let mut stage = Stage::Idle;
            match self.run_once(&mut stage, attempts).await {
                Ok(summary) => return Ok(summary),
                Err(AttemptError::Retrieve(e)) => {
                    if !self.retry.allows_another(attempts) {
                        error!(attempts, error = %e, "retry budget exhausted");
                        return Err(PipelineError::RetriesExhausted {
                            attempts,
                            source: e,
                        });
                    }
                    stage.advance(Stage::Idle);
                    warn!(
                        attempt = attempts,
                        error = %e,
                        "catalog retrieval failed, restarting from the beginning"
                    );
                    if !self.retry.backoff.is_zero() {
                        sleep(self.retry.backoff).await;
                    }
                }
                Err(AttemptError::Export(e)) => return Err(PipelineError::Export(e)),
            }
        }
    }

    async fn run_once(&self, stage: &mut Stage, attempt: u32) -> Result<RunSummary, AttemptError> {
        info!(attempt, "starting pipeline run");
        let entries = self
            .retriever
            .retrieve(stage)
            .await
            .map_err(AttemptError::Retrieve)?;

        stage.advance(Stage::Paginating);
        let chunks = paginate(entries, &self.pagination);

        stage.advance(Stage::Writing);
        self.writer
            .write(&chunks)
            .await
            .map_err(AttemptError::Export)?;

        stage.advance(Stage::Done);
        Ok(RunSummary {
            attempts: attempt,
            rows: chunks.iter().map(|c| c.rows.len()).sum(),
            sheets: chunks.len(),
            out_path: self.writer.out_path().to_path_buf(),
        })
    }
}
