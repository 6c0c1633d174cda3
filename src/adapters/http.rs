use crate::domain::ports::{FetchResponse, HttpFetch, TransportError};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;

/// Single-attempt GET over `reqwest`. Status codes are returned to the
/// caller rather than turned into errors here.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(|e| EtlError::ConfigError {
            message: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client })
    }
}

impl HttpFetch for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, TransportError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        tracing::debug!("{} -> {} ({} bytes)", url, status, body.len());
        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}
