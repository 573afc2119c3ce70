//! HTTP client for the DirectAdmin API

use std::time::Duration;
use tracing::{debug, warn};

use super::types::{PanelRequest, PanelResponse};
use crate::config::DirectAdminConfig;
use crate::error::{ForwarderError, Result};

/// Transport to the control panel
///
/// Returns `Err` only for transport faults; any HTTP status, including
/// 4xx/5xx, comes back as a [`PanelResponse`] for the caller to judge.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PanelClient: Send + Sync {
    async fn send(&self, request: PanelRequest) -> Result<PanelResponse>;
}

/// reqwest-backed panel client using basic auth and form posts
pub struct HttpPanelClient {
    client: reqwest::Client,
    base: DirectAdminConfig,
}

impl HttpPanelClient {
    /// Build a client with the configured timeout and TLS policy
    pub fn new(config: &DirectAdminConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("forwarder-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForwarderError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: config.clone(),
        })
    }
}

#[async_trait::async_trait]
impl PanelClient for HttpPanelClient {
    async fn send(&self, request: PanelRequest) -> Result<PanelResponse> {
        let url = self.base.endpoint(&request.command);
        debug!(
            "POST {} action={:?}",
            url,
            request.get("action").unwrap_or("list")
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.base.user, Some(&self.base.password))
            .form(&request.fields)
            .send()
            .await
            .map_err(|e| {
                warn!("DirectAdmin request to {} failed: {}", url, e);
                ForwarderError::from(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("DirectAdmin replied {} ({} bytes)", status, body.len());

        Ok(PanelResponse { status, body })
    }
}
