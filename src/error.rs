use std::path::PathBuf;

use thiserror::Error;

/// Failures while pulling the catalog document and decoding its payload.
/// These are the only errors that send the pipeline back to the start.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The document came back without a `<pre>` block to read JSON from.
    #[error("no <pre> payload in the document at {url}")]
    MissingPayload { url: String },

    #[error("catalog payload is not valid JSON")]
    Payload(#[from] serde_json::Error),
}

/// Failures while producing the workbook file. Terminal for the run; never
/// retried.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not serialize the workbook")]
    Serialization(#[from] rust_xlsxwriter::XlsxError),

    #[error("could not write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a whole run can die of.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("catalog retrieval failed after {attempts} attempt(s)")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Export(#[from] ExportError),
}
