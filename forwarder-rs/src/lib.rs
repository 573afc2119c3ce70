//! forwarder-rs: Web front-end for DirectAdmin email forwarders
//!
//! Lets a single operator list, create and delete the email forwarders of
//! one domain hosted on a DirectAdmin control panel, without going through
//! the panel's own UI.
//!
//! # Features
//!
//! - **Login**: one operator account, signed session cookie
//! - **Forwarders API**: list/create/delete proxied to `CMD_API_EMAIL_FORWARDERS`
//! - **Parsing**: the panel's URL-encoded reply turned into JSON records
//! - **Troubleshooting**: raw panel reply exposed next to the parsed view
//!
//! # Example
//!
//! ```no_run
//! use forwarder_rs::api::ApiServer;
//! use forwarder_rs::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let server = ApiServer::new(&config)?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`directadmin`]: Panel client, response parser and gateway
//! - [`api`]: HTTP routes, pages and session handling

pub mod api;
pub mod config;
pub mod directadmin;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use directadmin::{Forwarder, ForwarderGateway};
pub use error::{ForwarderError, Result};
