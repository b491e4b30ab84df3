use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no finite observations to estimate a range from")]
    NoData,
    #[error("expected quantile in range [0, 1] but got: {q}")]
    InvalidQuantile { q: f64 },
    #[error("expected low <= high but got: low={low}, high={high}")]
    InvalidRange { low: f64, high: f64 },
    #[error("fetch failed: {path} {status}")]
    Fetch { path: String, status: u16 },
    #[error("fetch failed: {path}: {reason}")]
    Transport { path: String, reason: String },
    #[error("invalid quarter code: {code:?}")]
    InvalidPeriod { code: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
}
