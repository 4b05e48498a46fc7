use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::error::ClientError;
use crate::models::{Attempt, ErrorBody, NetworkRequest, ResetRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdminClient {
    // Accepts "host:port" or a full url
    pub fn new(addr: &str) -> Self {
        let base_url = if addr.starts_with("http") {
            addr.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", addr.trim_end_matches('/'))
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, method: Method, path: &str, body: &impl Serialize) -> Result<Response, ClientError> {
        let response = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .json(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        Ok(response)
    }

    async fn expect_success(response: Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        // error body is best effort, the status code is what matters
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_default();
        Err(ClientError::Status {
            code: status.as_u16(),
            message,
        })
    }

    async fn network(&self, method: Method, path: &str, network: &str) -> Result<(), ClientError> {
        let body = NetworkRequest {
            network: network.to_string(),
        };
        Self::expect_success(self.send(method, path, &body).await?).await
    }

    pub async fn add_to_blacklist(&self, network: &str) -> Result<(), ClientError> {
        self.network(Method::POST, "/blacklist", network).await
    }

    pub async fn remove_from_blacklist(&self, network: &str) -> Result<(), ClientError> {
        self.network(Method::DELETE, "/blacklist", network).await
    }

    pub async fn add_to_whitelist(&self, network: &str) -> Result<(), ClientError> {
        self.network(Method::POST, "/whitelist", network).await
    }

    pub async fn remove_from_whitelist(&self, network: &str) -> Result<(), ClientError> {
        self.network(Method::DELETE, "/whitelist", network).await
    }

    pub async fn reset(&self, login: &str, ip: &str) -> Result<(), ClientError> {
        let body = ResetRequest {
            login: login.to_string(),
            ip: ip.to_string(),
        };
        Self::expect_success(self.send(Method::POST, "/reset", &body).await?).await
    }

    /// `Ok(false)` means the service refused the attempt.
    pub async fn try_auth(&self, attempt: &Attempt) -> Result<bool, ClientError> {
        let response = self.send(Method::POST, "/try", attempt).await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(false);
        }
        Self::expect_success(response).await?;
        Ok(true)
    }
}
