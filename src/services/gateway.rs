//! Client for the signal-cli REST gateway.
//!
//! The gateway exposes two endpoints this relay uses: `GET /v1/receive/{number}`
//! to sync the local session (pending receipts must be drained before the
//! gateway accepts a send) and `POST /v2/send` to deliver a message.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

use crate::config::SignalConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Sync failed: gateway returned {0}")]
    SyncFailed(String),

    #[error("Send failed: gateway returned {status}: {body}")]
    SendFailed { status: String, body: String },

    #[error("Client error: {0}")]
    Client(String),
}

#[async_trait]
pub trait SignalGateway: Send + Sync {
    /// Prime the gateway session by draining pending receives.
    async fn sync_receive(&self) -> Result<(), GatewayError>;

    /// Deliver `text` to the configured group from the configured number.
    async fn send_group_message(&self, text: &str) -> Result<(), GatewayError>;
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: &'a str,
    number: &'a str,
    recipients: Vec<&'a str>,
}

pub struct HttpSignalGateway {
    config: SignalConfig,
    client: Client,
}

impl HttpSignalGateway {
    pub fn new(config: SignalConfig) -> Result<Self, GatewayError> {
        // The gateway blocks while signal-cli talks to the Signal servers;
        // a hung gateway must fail the inbound request, not pin it forever.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl SignalGateway for HttpSignalGateway {
    async fn sync_receive(&self) -> Result<(), GatewayError> {
        let url = format!(
            "http://{}/v1/receive/{}",
            self.config.host, self.config.phone_number
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            GatewayError::Connection(format!("Failed to reach Signal gateway: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(GatewayError::SyncFailed(response.status().to_string()));
        }

        tracing::debug!("Signal gateway session synced");
        Ok(())
    }

    async fn send_group_message(&self, text: &str) -> Result<(), GatewayError> {
        let url = format!("http://{}/v2/send", self.config.host);
        let request = SendRequest {
            message: text,
            number: &self.config.phone_number,
            recipients: vec![&self.config.group_id],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                GatewayError::Connection(format!("Failed to reach Signal gateway: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::SendFailed {
                status: status.to_string(),
                body,
            });
        }

        tracing::info!(
            group = %self.config.group_id,
            text_length = text.len(),
            "Message sent to Signal group"
        );
        Ok(())
    }
}

/// Mock gateway for testing: counts calls, records the last sent text, and
/// can be flipped to fail sends.
pub struct MockSignalGateway {
    sync_count: AtomicU64,
    send_count: AtomicU64,
    fail_send: AtomicBool,
    last_text: Mutex<Option<String>>,
}

impl MockSignalGateway {
    pub fn new() -> Self {
        Self {
            sync_count: AtomicU64::new(0),
            send_count: AtomicU64::new(0),
            fail_send: AtomicBool::new(false),
            last_text: Mutex::new(None),
        }
    }

    pub fn sync_count(&self) -> u64 {
        self.sync_count.load(Ordering::SeqCst)
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn fail_next_send(&self) {
        self.fail_send.store(true, Ordering::SeqCst);
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

impl Default for MockSignalGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalGateway for MockSignalGateway {
    async fn sync_receive(&self) -> Result<(), GatewayError> {
        self.sync_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_group_message(&self, text: &str) -> Result<(), GatewayError> {
        if self.fail_send.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::SendFailed {
                status: "500 Internal Server Error".to_string(),
                body: "mock failure".to_string(),
            });
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(text.to_string());

        tracing::info!(text_length = text.len(), "[MOCK] message would be sent");
        Ok(())
    }
}
