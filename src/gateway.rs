//! Access to the remote payment processor.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::model::{PaymentRequest, PaymentStatus, Pid, UnknownStatus};

/// Failure talking to the processor or understanding its answer.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected http status {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response carries no usable pid")]
    MissingPid,

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),
}

/// The two calls the workflow makes to the processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Send a payment and return the transaction id to poll.
    async fn submit(&self, request: &PaymentRequest) -> Result<Pid, GatewayError>;

    /// Fetch the current status of a submitted payment.
    async fn check(&self, pid: &Pid) -> Result<PaymentStatus, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    result: Option<SubmitResult>,
}

#[derive(Debug, Deserialize)]
struct SubmitResult {
    pid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    status: String,
}

/// JSON-over-HTTP processor client.
///
/// Submits with `POST {base_url}/api` and checks with
/// `GET {base_url}/pay/check/{pid}`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn submit_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    fn check_url(&self, pid: &Pid) -> String {
        format!("{}/pay/check/{}", self.base_url, pid)
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn submit(&self, request: &PaymentRequest) -> Result<Pid, GatewayError> {
        let response = self
            .client
            .post(self.submit_url())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let body = response.bytes().await?;
        let parsed: SubmitResponse = serde_json::from_slice(&body)?;
        debug!(id = request.id(), "submit response received");

        parsed
            .result
            .and_then(|result| result.pid)
            .filter(|pid| !pid.trim().is_empty())
            .map(Pid::new)
            .ok_or(GatewayError::MissingPid)
    }

    async fn check(&self, pid: &Pid) -> Result<PaymentStatus, GatewayError> {
        let response = self.client.get(self.check_url(pid)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let body = response.bytes().await?;
        let parsed: CheckResponse = serde_json::from_slice(&body)?;
        Ok(parsed.status.parse()?)
    }
}
