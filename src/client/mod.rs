//! CZDS API client: zone file download and TLD listing.

pub mod models;
pub mod zone;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use flate2::write::MultiGzDecoder;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use reqwest::{Client, Response};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::auth::{AuthenticatedTransport, Credentials, InMemoryTokenStore, TokenStore};
use crate::error::{Error, Result, STAGE_GET_ZONE_FILE, STAGE_LIST_TLDS};
use crate::helpers::cancel::cancellable;
use crate::utils::constants::{DEFAULT_ACCOUNTS_API_BASE_URL, DEFAULT_CZDS_API_BASE_URL};

use models::Tld;
use zone::{is_gzip, ZoneFileParser, ZoneRecords};

/// Client for the ICANN Centralized Zone Data Service.
///
/// Every request goes through an [`AuthenticatedTransport`], which fetches a
/// JWT from the accounts API whenever the stored one is missing or expired.
/// Cloning is cheap and clones share the token store.
#[derive(Clone)]
pub struct CzdsClient {
    transport: AuthenticatedTransport,
    czds_api_base_url: String,
}

impl CzdsClient {
    /// Client with the in-memory token store and the public ICANN endpoints.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::builder(email, password).build()
    }

    pub fn builder(email: impl Into<String>, password: impl Into<String>) -> CzdsClientBuilder {
        CzdsClientBuilder::new(Credentials::new(email, password))
    }

    /// Downloads the zone file of `tld` and maps each domain to its records.
    ///
    /// Gzip bodies (`application/x-gzip`), including concatenated members,
    /// are decompressed while streaming.
    /// Either the complete map is returned or an error, never a partial map.
    pub async fn get_zone_file(&self, cancel: &CancellationToken, tld: &str) -> Result<ZoneRecords> {
        cancellable(cancel, self.fetch_zone_file(tld)).await
    }

    /// Lists the TLDs visible to the account, in API order.
    pub async fn list_tlds(&self, cancel: &CancellationToken) -> Result<Vec<Tld>> {
        cancellable(cancel, self.fetch_tlds()).await
    }

    async fn fetch_zone_file(&self, tld: &str) -> Result<ZoneRecords> {
        let endpoint = format!("{}/downloads/{}.zone", self.czds_api_base_url, tld);
        let request = self
            .transport
            .request(Method::GET, &endpoint)
            .build()
            .map_err(|e| Error::request(STAGE_GET_ZONE_FILE, e))?;

        let mut response = self.transport.execute(STAGE_GET_ZONE_FILE, request).await?;
        if response.status() != StatusCode::OK {
            return Err(Error::status(STAGE_GET_ZONE_FILE, response.status()));
        }

        let records = if is_gzip(response.headers()) {
            debug!(tld, "zone file is gzip compressed");
            read_gzip_zone(&mut response).await?
        } else {
            read_plain_zone(&mut response).await?
        };

        info!(tld, domains = records.len(), "zone file parsed");
        Ok(records)
    }

    async fn fetch_tlds(&self) -> Result<Vec<Tld>> {
        let endpoint = format!("{}/tlds", self.czds_api_base_url);
        let request = self
            .transport
            .request(Method::GET, &endpoint)
            .header(CONTENT_TYPE, "application/json")
            .build()
            .map_err(|e| Error::request(STAGE_LIST_TLDS, e))?;

        let response = self.transport.execute(STAGE_LIST_TLDS, request).await?;
        if response.status() != StatusCode::OK {
            return Err(Error::status(STAGE_LIST_TLDS, response.status()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(STAGE_LIST_TLDS, e))?;
        let tlds: Vec<Tld> =
            serde_json::from_slice(&body).map_err(|e| Error::decode(STAGE_LIST_TLDS, e))?;

        debug!(count = tlds.len(), "TLD list received");
        Ok(tlds)
    }
}

async fn read_plain_zone(response: &mut Response) -> Result<ZoneRecords> {
    let mut parser = ZoneFileParser::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::transport(STAGE_GET_ZONE_FILE, e))?
    {
        parser.feed(&chunk)?;
    }
    parser.finish()
}

async fn read_gzip_zone(response: &mut Response) -> Result<ZoneRecords> {
    let mut parser = ZoneFileParser::new();
    let mut decoder = MultiGzDecoder::new(Vec::new());

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::transport(STAGE_GET_ZONE_FILE, e))?
    {
        decoder.write_all(&chunk).map_err(Error::Decompress)?;
        drain_decoded(&mut decoder, &mut parser)?;
    }
    decoder.try_finish().map_err(Error::Decompress)?;
    drain_decoded(&mut decoder, &mut parser)?;

    parser.finish()
}

fn drain_decoded(decoder: &mut MultiGzDecoder<Vec<u8>>, parser: &mut ZoneFileParser) -> Result<()> {
    let decoded = decoder.get_mut();
    if !decoded.is_empty() {
        parser.feed(decoded.as_slice())?;
        decoded.clear();
    }
    Ok(())
}

/// Named construction options for [`CzdsClient`].
pub struct CzdsClientBuilder {
    credentials: Credentials,
    token_store: Option<Arc<dyn TokenStore>>,
    accounts_api_base_url: Option<String>,
    czds_api_base_url: Option<String>,
    timeout: Option<Duration>,
}

impl CzdsClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token_store: None,
            accounts_api_base_url: None,
            czds_api_base_url: None,
            timeout: None,
        }
    }

    /// Replaces the default [`InMemoryTokenStore`].
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Defaults to `https://account-api.icann.org/api`.
    pub fn accounts_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_api_base_url = Some(url.into());
        self
    }

    /// Defaults to `https://czds-api.icann.org/czds`.
    pub fn czds_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.czds_api_base_url = Some(url.into());
        self
    }

    /// Total timeout applied to every HTTP request, including body download.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<CzdsClient> {
        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(Error::BuildClient)?;

        let token_store: Arc<dyn TokenStore> = match self.token_store {
            Some(store) => store,
            None => Arc::new(InMemoryTokenStore::new()),
        };
        let accounts_api_base_url =
            normalize_base_url(self.accounts_api_base_url, DEFAULT_ACCOUNTS_API_BASE_URL);
        let czds_api_base_url =
            normalize_base_url(self.czds_api_base_url, DEFAULT_CZDS_API_BASE_URL);

        Ok(CzdsClient {
            transport: AuthenticatedTransport::new(
                http,
                self.credentials,
                token_store,
                accounts_api_base_url,
            ),
            czds_api_base_url,
        })
    }
}

fn normalize_base_url(url: Option<String>, default: &str) -> String {
    url.filter(|u| !u.is_empty())
        .unwrap_or_else(|| default.to_owned())
        .trim_end_matches('/')
        .to_owned()
}
