use reqwest::{Client, StatusCode};
use tracing::info;

use crate::error::{Error, Result};

use super::MeterReading;

const AUTH_TOKEN_HEADER: &str = "AUTH-TOKEN";

pub struct MindergasClient {
    http: Client,
    url: String,
    token: String,
}

impl MindergasClient {
    pub fn new(http: Client, url: &str, token: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
            token: token.to_string(),
        }
    }

    /// Post a reading. Only transport errors count as failure; whatever
    /// status the API answers with is handed back to the caller.
    pub async fn upload(&self, reading: &MeterReading) -> Result<StatusCode> {
        info!("Posting to mindergas.nl: date={} reading={}", reading.date, reading.reading);

        let response = self
            .http
            .post(&self.url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .json(reading)
            .send()
            .await
            .map_err(|source| Error::Upload {
                url: self.url.clone(),
                source,
            })?;

        Ok(response.status())
    }
}
