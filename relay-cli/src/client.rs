//! HTTP client for the relay.

use relay_types::{Code, SubmitRequest, TokenResponse};

/// Errors talking to the relay.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The relay could not be reached or answered with something unparseable.
    #[error("request to {url} failed: {source}")]
    Http {
        /// Full request URL.
        url: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
}

/// Thin wrapper around the relay's two JSON endpoints.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: String,
    http: reqwest::Client,
}

impl RelayClient {
    /// Create a client for the relay at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// URL for `path`, which must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a token and get back the code it was filed under.
    pub async fn submit(&self, token: &str) -> Result<TokenResponse, ClientError> {
        let url = self.url("/");
        let send = self
            .http
            .post(&url)
            .json(&SubmitRequest::new(token))
            .send()
            .await;
        Self::decode(url, send).await
    }

    /// Fetch the token filed under `code`.
    pub async fn fetch(&self, code: Code) -> Result<TokenResponse, ClientError> {
        let url = self.url(&format!("/{code}"));
        let send = self.http.get(&url).send().await;
        Self::decode(url, send).await
    }

    async fn decode(
        url: String,
        send: reqwest::Result<reqwest::Response>,
    ) -> Result<TokenResponse, ClientError> {
        // 429 still carries a TokenResponse body, so the status is not checked
        let response = match send {
            Ok(response) => response,
            Err(source) => return Err(ClientError::Http { url, source }),
        };
        response
            .json::<TokenResponse>()
            .await
            .map_err(|source| ClientError::Http { url, source })
    }
}
