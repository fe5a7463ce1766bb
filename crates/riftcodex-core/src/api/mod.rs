//! Remote data access for the Data Dragon and Meraki endpoints.
//!
//! This module defines the `RemoteFetcher` seam the stores fetch through,
//! the `HttpFetcher` implementation of it on top of `reqwest`, and the
//! error types shared by every fetch path.
//!
//! The endpoints are public and read-only; no authentication is involved.

pub mod client;
pub mod error;
pub mod fetcher;

pub use client::HttpFetcher;
pub use error::{FetchError, TransportError};
pub use fetcher::{fetch_ok, RawResponse, RemoteFetcher};
