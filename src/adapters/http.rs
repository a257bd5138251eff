use crate::utils::error::{EtlError, Result};
use reqwest::Client;

/// Downloads the source document in one GET with the client's default settings.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Requesting {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EtlError::fetch_transport(url, e))?;

        let status = response.status();
        tracing::debug!("Source response status: {}", status);
        if !status.is_success() {
            return Err(EtlError::fetch_status(url, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EtlError::fetch_transport(url, e))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/precios.xlsx");
            then.status(200).body(vec![1u8, 2, 3, 4]);
        });

        let body = Fetcher::new().fetch(&server.url("/precios.xlsx")).await.unwrap();

        mock.assert();
        assert_eq!(body, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone.xlsx");
            then.status(500);
        });

        let err = Fetcher::new().fetch(&server.url("/gone.xlsx")).await.unwrap_err();
        assert!(matches!(err, EtlError::Fetch { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // nothing listens on port 9 (discard) in the test environment
        let err = Fetcher::new().fetch("http://127.0.0.1:9/x.xlsx").await.unwrap_err();
        assert!(matches!(err, EtlError::Fetch { status: None, .. }));
    }
}
