use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("P1 meter request to {url} failed: {source}")]
    MeterRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("P1 meter response from {url} could not be decoded: {source}")]
    MeterResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upload to {url} failed: {source}")]
    Upload {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid reading timestamp {0}")]
    Timestamp(i64),
}

pub type Result<T> = std::result::Result<T, Error>;
