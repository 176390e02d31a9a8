use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{
    models::clock::{ClockRecord, PostClockRequest, PostClockResponse},
    services::generator::ClockLookup,
};

/// HTTP client for the clock API, used by the `clock-id` tool and by
/// anything else that needs to read or set a clock from outside the service.
#[derive(Clone)]
pub struct HttpClockClient {
    client: Client,
    endpoint: String,
}

impl HttpClockClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current record for `clock_id`, `None` when the service answers 404.
    pub async fn get(&self, clock_id: &str) -> anyhow::Result<Option<ClockRecord>> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("clock_id", clock_id)])
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            anyhow::bail!("Server responded with status: {}", resp.status());
        }
        Ok(Some(resp.json::<ClockRecord>().await?))
    }

    pub async fn post(&self, req: &PostClockRequest) -> anyhow::Result<PostClockResponse> {
        let resp = self.client.post(&self.endpoint).json(req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let reason = resp.text().await.unwrap_or_default();
            anyhow::bail!("Server responded with status {status}: {reason}");
        }
        Ok(resp.json::<PostClockResponse>().await?)
    }
}

#[async_trait]
impl ClockLookup for HttpClockClient {
    async fn fetch(&self, clock_id: &str) -> anyhow::Result<Option<ClockRecord>> {
        self.get(clock_id).await
    }
}
