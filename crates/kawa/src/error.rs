use thiserror::Error;

use crate::segment::StreamKind;

#[derive(Error, Debug)]
pub enum KawaError {
    #[error("HTTP error: {0}")]
    HttpError(reqwest::StatusCode),

    #[error("manifest request failed ({status}): {}", .title.as_deref().unwrap_or("no detail"))]
    ManifestError {
        status: reqwest::StatusCode,
        title: Option<String>,
    },

    #[error("manifest contains no {0} variants")]
    NoVariants(StreamKind),

    #[error("stream ended early: {written} of {total} segments written")]
    IncompleteStream { written: u64, total: u64 },

    #[error("invalid initialization block: {0}")]
    InitSegmentError(#[from] base64::DecodeError),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    MissingExecutable(#[from] which::Error),
}

pub type KawaResult<T> = Result<T, KawaError>;
