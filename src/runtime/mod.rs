//! Runtime environment for talking to remote services.
//!
//! - [`SiteConfig`] - base URL, credentials and response conventions of one service
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod config;
pub mod tracing;

pub use config::*;
pub use self::tracing::setup_tracing;
