//! # CZDS Client Library
//!
//! Client for the ICANN Centralized Zone Data Service. Downloads zone files
//! and maps them by domain name, and lists the TLDs an account can access.
//! Authentication is transparent: a JWT is fetched from the ICANN accounts
//! API when the stored one is missing or expired and attached to every
//! request.
//!
//! Modules:
//! - `auth` — token store, expiry check and the authenticating transport
//! - `client` — zone file and TLD operations
//! - `config` — YAML configuration for the `czds` binary
//! - `error` — error taxonomy shared by all operations

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::{InMemoryTokenStore, TokenStore};
pub use crate::client::models::Tld;
pub use crate::client::zone::ZoneRecords;
pub use crate::client::{CzdsClient, CzdsClientBuilder};
pub use crate::error::{Error, Result, StoreError};
pub use tokio_util::sync::CancellationToken;
