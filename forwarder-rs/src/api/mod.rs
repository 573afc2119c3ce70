//! HTTP layer for forwarder-rs
//!
//! Provides the login pages, the forwarder management page and the JSON API
//! the page calls.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod web;

pub use server::ApiServer;
