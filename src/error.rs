use http::StatusCode;
use thiserror::Error;

/// Boxed error returned by custom token stores.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Stage of a call, carried by errors so the failing step can be identified.
pub const STAGE_AUTHENTICATE: &str = "authenticate";
pub const STAGE_GET_ZONE_FILE: &str = "get zone file";
pub const STAGE_LIST_TLDS: &str = "list TLDs";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build HTTP client: {0}")]
    BuildClient(#[source] reqwest::Error),

    #[error("failed to create {stage} request: {source}")]
    Request {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage} request failed: {source}")]
    Transport {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage}: expected HTTP 200 response, got {status}")]
    UnexpectedStatus {
        stage: &'static str,
        status: StatusCode,
    },

    #[error("failed to decode {stage} response body: {source}")]
    Decode {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decompress zone file: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("failed to fetch JWT: {0}")]
    Authenticate(#[source] Box<Error>),

    #[error("fetched JWT is not valid")]
    InvalidToken,

    #[error("failed to store JWT: {0}")]
    PersistToken(#[source] StoreError),

    #[error("failed to scan zone file: {0}")]
    Scan(#[source] std::io::Error),

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// True when the call was aborted through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    pub(crate) fn request(stage: &'static str, source: reqwest::Error) -> Self {
        Error::Request { stage, source }
    }

    pub(crate) fn transport(stage: &'static str, source: reqwest::Error) -> Self {
        Error::Transport { stage, source }
    }

    pub(crate) fn status(stage: &'static str, status: StatusCode) -> Self {
        Error::UnexpectedStatus { stage, status }
    }

    pub(crate) fn decode(stage: &'static str, source: serde_json::Error) -> Self {
        Error::Decode { stage, source }
    }
}
