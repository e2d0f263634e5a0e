use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// Storage for the bearer token used by [`crate::CzdsClient`].
///
/// The client calls `save` only after fetching a fresh token because the
/// stored one was missing, malformed or expired. Implementations must be
/// safe to call concurrently from several in-flight requests. A failing
/// `save` aborts the request that triggered the refresh.
///
/// Methods take no cancellation context. When the caller's
/// `CancellationToken` fires, the pending `get` or `save` future is dropped
/// at its current await point, so implementations must leave the store
/// consistent if they are not polled to completion.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn save(&self, token: &str) -> Result<(), StoreError>;

    /// `None` when nothing has been stored yet.
    async fn get(&self) -> Option<String>;
}

/// Default store: one token held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    jwt: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn save(&self, token: &str) -> Result<(), StoreError> {
        *self.jwt.lock().await = Some(token.to_owned());
        Ok(())
    }

    async fn get(&self) -> Option<String> {
        self.jwt.lock().await.clone()
    }
}
