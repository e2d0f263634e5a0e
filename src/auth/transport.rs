use std::fmt;
use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::{HeaderValue, Method, StatusCode};
use reqwest::{Client, Request, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::store::TokenStore;
use crate::auth::token::is_token_valid;
use crate::error::{Error, Result, STAGE_AUTHENTICATE};

/// Account credentials exchanged for a bearer token.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    message: String,
}

/// Sends requests with a bearer token attached, refreshing the token on demand.
///
/// The token itself lives only in the [`TokenStore`]. Two concurrent calls
/// that both observe a stale token will each authenticate; the last `save`
/// wins and both requests go out with a valid token.
#[derive(Clone)]
pub struct AuthenticatedTransport {
    http: Client,
    credentials: Arc<Credentials>,
    token_store: Arc<dyn TokenStore>,
    accounts_api_base_url: String,
}

impl AuthenticatedTransport {
    pub fn new(
        http: Client,
        credentials: Credentials,
        token_store: Arc<dyn TokenStore>,
        accounts_api_base_url: String,
    ) -> Self {
        Self {
            http,
            credentials: Arc::new(credentials),
            token_store,
            accounts_api_base_url,
        }
    }

    /// Starts a request on the underlying client. Send it with [`Self::execute`].
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Attaches `Authorization: Bearer <token>` and dispatches the request.
    ///
    /// The request is never sent if a valid token cannot be obtained and
    /// persisted first.
    pub async fn execute(&self, stage: &'static str, mut request: Request) -> Result<Response> {
        let authorization = self.authorization().await?;
        request.headers_mut().insert(AUTHORIZATION, authorization);

        self.http
            .execute(request)
            .await
            .map_err(|e| Error::transport(stage, e))
    }

    async fn authorization(&self) -> Result<HeaderValue> {
        if let Some(value) = self.token_store.get().await.as_deref().and_then(usable_bearer) {
            debug!("using stored JWT");
            return Ok(value);
        }

        info!(url = %self.accounts_api_base_url, "stored JWT missing or expired, authenticating");
        let token = self
            .fetch_jwt()
            .await
            .inspect_err(|e| warn!(error = %e, "authentication failed"))
            .map_err(|e| Error::Authenticate(Box::new(e)))?;

        let Some(value) = usable_bearer(&token) else {
            warn!("accounts API issued an expired or malformed JWT");
            return Err(Error::InvalidToken);
        };

        self.token_store
            .save(&token)
            .await
            .map_err(Error::PersistToken)?;
        info!("fetched and stored new JWT");

        Ok(value)
    }

    async fn fetch_jwt(&self) -> Result<String> {
        let url = format!("{}/authenticate", self.accounts_api_base_url);
        let request = self
            .http
            .post(&url)
            .json(&AuthRequest {
                username: &self.credentials.email,
                password: &self.credentials.password,
            })
            .build()
            .map_err(|e| Error::request(STAGE_AUTHENTICATE, e))?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Error::transport(STAGE_AUTHENTICATE, e))?;

        if response.status() != StatusCode::OK {
            return Err(Error::status(STAGE_AUTHENTICATE, response.status()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(STAGE_AUTHENTICATE, e))?;
        let auth: AuthResponse =
            serde_json::from_slice(&body).map_err(|e| Error::decode(STAGE_AUTHENTICATE, e))?;
        debug!(message = %auth.message, "authentication response received");

        Ok(auth.access_token)
    }
}

/// `Bearer <token>` header for an unexpired token, `None` when the token is
/// invalid or holds bytes not allowed in a header value.
fn usable_bearer(token: &str) -> Option<HeaderValue> {
    if !is_token_valid(token) {
        return None;
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).ok()?;
    value.set_sensitive(true);
    Some(value)
}
