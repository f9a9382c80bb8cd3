use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

use super::{BasicInformation, Data};

/// Client for the local HTTP API of a HomeWizard P1 meter.
pub struct P1Client {
    http: Client,
    base_url: String,
}

impl P1Client {
    /// `host` is the bare IP or hostname of the meter, or a full base URL.
    pub fn new(http: Client, host: &str) -> Self {
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{host}")
        };
        Self { http, base_url }
    }

    pub async fn basic_information(&self) -> Result<BasicInformation> {
        self.get_json("/api").await
    }

    pub async fn data(&self) -> Result<Data> {
        self.get_json("/api/v1/data").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| Error::MeterRequest {
                url: url.clone(),
                source,
            })?;

        response
            .json::<T>()
            .await
            .map_err(|source| Error::MeterResponse { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn bare_host_gets_http_scheme() {
        let client = P1Client::new(Client::new(), "192.168.1.50");
        assert_eq!(client.base_url, "http://192.168.1.50");

        let client = P1Client::new(Client::new(), "http://127.0.0.1:8080/");
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn fetches_basic_information() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "product_name": "P1 meter",
                "product_type": "HWE-P1",
                "serial": "3c39e7aabbcc",
                "firmware_version": "4.19",
                "api_version": "v1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = P1Client::new(Client::new(), &server.uri());
        let info = client.basic_information().await.unwrap();
        assert_eq!(info.product_type, "HWE-P1");
        assert_eq!(info.serial, "3c39e7aabbcc");
    }

    #[tokio::test]
    async fn malformed_body_is_a_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = P1Client::new(Client::new(), &server.uri());
        let err = client.basic_information().await.unwrap_err();
        assert!(matches!(err, Error::MeterResponse { .. }));
    }

    #[tokio::test]
    async fn error_status_is_a_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/data"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = P1Client::new(Client::new(), &server.uri());
        let err = client.data().await.unwrap_err();
        assert!(matches!(err, Error::MeterRequest { .. }));
    }
}
