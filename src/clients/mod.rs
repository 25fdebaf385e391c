//! Transport layer between models and remote services.
//!
//! [`ResourceClient`] pairs a [`SiteConfig`](crate::runtime::SiteConfig) with a
//! [`Connection`] and turns raw responses into decoded [`Response`]s.

pub mod connection;
pub mod http;
pub mod resource_client;

pub use connection::*;
pub use http::*;
pub use resource_client::*;
