use async_trait::async_trait;
use influxdb2::Client;
use log::{debug, info};
use std::time::Duration;

use super::line_protocol::Batch;
use crate::config::InfluxSettings;
use crate::utils::error::BridgeError;

/// Delivers a whole batch in one call; success or failure covers every point.
#[async_trait]
pub trait BatchPublisher: Send + Sync {
    async fn publish(&self, batch: &Batch) -> Result<(), BridgeError>;
    fn sender_type(&self) -> &str;
    fn destination(&self) -> &str;
}

/// InfluxDB 2.x writer holding one client for the process lifetime.
pub struct InfluxSender {
    client: Client,
    endpoint: String,
    org: String,
    bucket: String,
    timeout: Duration,
}

impl InfluxSender {
    pub fn new(settings: &InfluxSettings) -> Self {
        let endpoint = settings.endpoint();
        info!(
            "🗄️  InfluxDB writer: {} (org '{}', bucket '{}')",
            endpoint, settings.org, settings.bucket
        );

        Self {
            client: Client::new(endpoint.as_str(), settings.org.as_str(), settings.token.as_str()),
            endpoint,
            org: settings.org.clone(),
            bucket: settings.bucket.clone(),
            timeout: settings.write_timeout(),
        }
    }
}

#[async_trait]
impl BatchPublisher for InfluxSender {
    async fn publish(&self, batch: &Batch) -> Result<(), BridgeError> {
        let body = batch.to_line_protocol();
        debug!(
            "📤 Writing {} points ({} bytes) to bucket {}",
            batch.len(),
            body.len(),
            self.bucket
        );

        tokio::time::timeout(
            self.timeout,
            self.client.write_line_protocol(&self.org, &self.bucket, body),
        )
        .await?
        .map_err(|e| BridgeError::PublishError(e.to_string()))
    }

    fn sender_type(&self) -> &str {
        "influxdb"
    }

    fn destination(&self) -> &str {
        &self.endpoint
    }
}
