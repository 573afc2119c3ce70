//! DirectAdmin integration
//!
//! - [`client`]: HTTP transport to the panel API
//! - [`parser`]: decoding of the panel's forwarder list format
//! - [`gateway`]: list/create/delete operations for one domain
//! - [`types`]: shared records and request/response types

pub mod client;
pub mod gateway;
pub mod parser;
pub mod types;

pub use client::{HttpPanelClient, PanelClient};
pub use gateway::{ForwarderGateway, OperationResult};
pub use parser::parse_forwarders;
pub use types::{Forwarder, PanelRequest, PanelResponse};
