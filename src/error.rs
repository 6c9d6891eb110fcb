use thiserror::Error;

/// Failure at the platform boundary: transport error, timeout, bad status or
/// an undecodable body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Why a single introduction run ended without posting.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to fetch {what}: {source}")]
    Fetch {
        what: String,
        #[source]
        source: ApiError,
    },
    #[error("failed to post to channel {channel_id}: {source}")]
    Post {
        channel_id: String,
        #[source]
        source: ApiError,
    },
    #[error("failed to write message to local sink: {0}")]
    Sink(#[from] std::io::Error),
    #[error("no eligible channel found")]
    SelectionEmpty,
}

impl JobError {
    pub fn fetch(what: impl Into<String>, source: ApiError) -> Self {
        Self::Fetch {
            what: what.into(),
            source,
        }
    }
}
