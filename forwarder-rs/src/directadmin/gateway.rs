//! Forwarder operations against the DirectAdmin panel
//!
//! Each operation makes at most one outbound call. Input is validated first,
//! so a rejected request never reaches the panel.

use std::sync::Arc;
use tracing::{info, warn};

use super::client::PanelClient;
use super::parser::{is_success, parse_forwarders, suggested_destinations};
use super::types::{Forwarder, PanelRequest, PanelResponse, FORWARDERS_COMMAND};
use crate::config::DirectAdminConfig;
use crate::error::{ForwarderError, Result};

/// Outcome of an operation: `Ok` carries the payload, `Err` the failure message
pub type OperationResult<T> = Result<T>;

/// Forwarder gateway for one domain
pub struct ForwarderGateway {
    client: Arc<dyn PanelClient>,
    domain: String,
    account: String,
}

impl ForwarderGateway {
    pub fn new(config: &DirectAdminConfig, client: Arc<dyn PanelClient>) -> Self {
        Self {
            client,
            domain: config.domain.clone(),
            account: config.user.clone(),
        }
    }

    /// Domain whose forwarders this gateway manages
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// List the domain's forwarders
    pub async fn list(&self) -> OperationResult<Vec<Forwarder>> {
        let response = self.raw_list().await?;

        if !response.is_http_success() {
            warn!("Listing forwarders failed with HTTP {}", response.status);
            return Err(ForwarderError::UpstreamStatus(response.status));
        }

        Ok(parse_forwarders(&response.body))
    }

    /// The list call's reply, undecoded
    pub async fn raw_list(&self) -> OperationResult<PanelResponse> {
        let request = PanelRequest::new(FORWARDERS_COMMAND).field("domain", &self.domain);
        self.client.send(request).await
    }

    /// Create `alias@domain` forwarding to `destination`
    pub async fn create(&self, alias: &str, destination: &str) -> OperationResult<String> {
        let alias = alias.trim();
        let destination = destination.trim();

        if alias.is_empty() || destination.is_empty() {
            return Err(ForwarderError::Validation(
                "Missing alias or destination".to_string(),
            ));
        }

        let request = PanelRequest::new(FORWARDERS_COMMAND)
            .field("action", "create")
            .field("domain", &self.domain)
            .field("user", alias)
            .field("email", destination);

        let response = self.client.send(request).await?;
        self.check_applied(&response)?;

        info!("Created forwarder {}@{} -> {}", alias, self.domain, destination);
        Ok(format!(
            "Forwarder {}@{} → {} created!",
            alias, self.domain, destination
        ))
    }

    /// Delete the forwarder for `alias@domain`
    pub async fn delete(&self, alias: &str) -> OperationResult<String> {
        let alias = alias.trim();

        if alias.is_empty() {
            return Err(ForwarderError::Validation("Missing alias".to_string()));
        }

        let request = PanelRequest::new(FORWARDERS_COMMAND)
            .field("action", "delete")
            .field("domain", &self.domain)
            .field("select0", alias);

        let response = self.client.send(request).await?;
        self.check_applied(&response)?;

        info!("Deleted forwarder {}@{}", alias, self.domain);
        Ok(format!("Forwarder {}@{} deleted!", alias, self.domain))
    }

    /// Destinations already in use, minus the panel account's own mailbox
    pub async fn suggestions(&self) -> OperationResult<Vec<String>> {
        let forwarders = self.list().await?;
        Ok(suggested_destinations(&forwarders, &self.account))
    }

    fn check_applied(&self, response: &PanelResponse) -> Result<()> {
        if is_success(response.status, &response.body) {
            return Ok(());
        }

        warn!(
            "DirectAdmin rejected change (HTTP {}): {}",
            response.status, response.body
        );

        let body = response.body.trim();
        Err(ForwarderError::Rejected(if body.is_empty() {
            "Unknown error".to_string()
        } else {
            body.to_string()
        }))
    }
}
