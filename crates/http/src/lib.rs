//! Client side of the UsinaSoft upstream REST API
//!
//! [`client::ApiClient`] talks to the upstream; [`client::SessionClient`]
//! binds it to a browser session and takes care of refreshing expired access
//! tokens.

pub mod claims;
pub mod client;
pub mod types;

pub use client::{ApiClient, ApiRequest, ClientError, Resource, SessionClient, UpstreamError};
