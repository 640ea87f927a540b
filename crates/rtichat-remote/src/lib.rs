//! Remote adapter for rtichat.
//!
//! This crate provides the HTTP implementation of the core's
//! `RemoteConversationClient` port, plus its endpoint configuration.

pub mod config;
pub mod http_client;

pub use config::RemoteConfig;
pub use http_client::HttpConversationClient;
