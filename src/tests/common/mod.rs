// src/tests/common/mod.rs
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::auth::TokenStore;
use crate::client::CzdsClient;
use crate::error::StoreError;

pub const TEST_EMAIL: &str = "test-email";
pub const TEST_PASSWORD: &str = "test-password";

/// Minimal HS256-shaped JWT with the given `exp`; the signature is junk.
pub fn sample_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"1234567890","exp":{}}}"#, exp));
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

pub fn valid_jwt() -> String {
    sample_jwt(Utc::now().timestamp() + 3600)
}

pub fn expired_jwt() -> String {
    sample_jwt(Utc::now().timestamp() - 3600)
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Accounts API that accepts the test credentials and returns `token`.
pub async fn mock_authenticate<'a>(server: &'a MockServer, token: &str) -> Mock<'a> {
    let body = json!({ "accessToken": token, "message": "Authentication Successful" });
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/authenticate")
                .header("content-type", "application/json")
                .json_body(json!({ "username": TEST_EMAIL, "password": TEST_PASSWORD }));
            then.status(200).json_body(body.clone());
        })
        .await
}

pub fn build_client(accounts: &MockServer, czds: &MockServer, store: Arc<dyn TokenStore>) -> CzdsClient {
    CzdsClient::builder(TEST_EMAIL, TEST_PASSWORD)
        .accounts_api_base_url(accounts.base_url())
        .czds_api_base_url(czds.base_url())
        .token_store(store)
        .build()
        .expect("client")
}

/// Store that records every save and can be told to fail them.
#[derive(Debug, Default)]
pub struct RecordingTokenStore {
    pub token: Mutex<Option<String>>,
    pub saved: Mutex<Vec<String>>,
    pub fail_saves: bool,
}

impl RecordingTokenStore {
    pub fn with_token(token: String) -> Self {
        Self {
            token: Mutex::new(Some(token)),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl TokenStore for RecordingTokenStore {
    async fn save(&self, token: &str) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err("token store unavailable".into());
        }
        self.saved.lock().await.push(token.to_owned());
        *self.token.lock().await = Some(token.to_owned());
        Ok(())
    }

    async fn get(&self) -> Option<String> {
        self.token.lock().await.clone()
    }
}

/// Bare HTTP server that answers every request with `200 []` and counts
/// requests as soon as their headers arrive.
pub async fn spawn_counting_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let requests = Arc::new(AtomicUsize::new(0));

    let counter = requests.clone();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let counter = counter.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = stream
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                          Content-Length: 2\r\nConnection: close\r\n\r\n[]",
                    )
                    .await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), requests)
}

/// Store that notes how many API requests had been received when `save` ran.
#[derive(Debug)]
pub struct SaveOrderStore {
    requests: Arc<AtomicUsize>,
    token: Mutex<Option<String>>,
    pub requests_at_save: Mutex<Vec<usize>>,
}

impl SaveOrderStore {
    pub fn new(requests: Arc<AtomicUsize>) -> Self {
        Self {
            requests,
            token: Mutex::new(None),
            requests_at_save: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TokenStore for SaveOrderStore {
    async fn save(&self, token: &str) -> Result<(), StoreError> {
        self.requests_at_save
            .lock()
            .await
            .push(self.requests.load(Ordering::SeqCst));
        *self.token.lock().await = Some(token.to_owned());
        Ok(())
    }

    async fn get(&self) -> Option<String> {
        self.token.lock().await.clone()
    }
}
