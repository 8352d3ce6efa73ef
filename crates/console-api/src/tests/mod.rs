//! Endpoint tests over a canned transport.
//!
//! - `endpoints.rs` - Request shapes and response decoding per endpoint

mod endpoints;

use async_trait::async_trait;
use console_auth::{ApiClient, ApiRequest, ApiResponse, HttpTransport, TransportError};
use console_config::{Config, RawConfig};
use console_storage::{CookieStore, MemoryStorage, TokenStore};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::ConsoleApi;

/// Transport answering calls in order from a queue; an empty queue answers 200
/// with an empty body.
#[derive(Default)]
pub struct CannedTransport {
    replies: Mutex<VecDeque<Result<(u16, String), String>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl CannedTransport {
    pub fn reply(&self, status: u16, body: serde_json::Value) {
        self.replies.lock().push_back(Ok((status, body.to_string())));
    }

    pub fn reply_text(&self, status: u16, body: &str) {
        self.replies.lock().push_back(Ok((status, body.to_string())));
    }

    pub fn fail(&self, message: &str) {
        self.replies.lock().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    pub fn last(&self) -> ApiRequest {
        self.calls().pop().unwrap()
    }
}

#[async_trait]
impl HttpTransport for CannedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls.lock().push(request);
        let reply = self.replies.lock().pop_front();
        match reply {
            Some(Ok((status, body))) => Ok(ApiResponse {
                status,
                status_text: String::new(),
                body,
            }),
            Some(Err(message)) => Err(TransportError(message)),
            None => Ok(ApiResponse {
                status: 200,
                status_text: "OK".to_string(),
                body: String::new(),
            }),
        }
    }
}

pub struct Fixture {
    pub transport: Arc<CannedTransport>,
    pub tokens: TokenStore,
    pub api: ConsoleApi,
}

/// API over a canned transport with a valid access token on record.
pub fn fixture() -> Fixture {
    let config = Config::from_raw(RawConfig {
        api_url: Some("http://localhost:5000/api/v1".to_string()),
        admin_role_id: Some(1),
        default_role_id: Some(2),
        ..Default::default()
    })
    .unwrap();
    let tokens = TokenStore::new(
        Arc::new(MemoryStorage::new()),
        CookieStore::new(Arc::new(MemoryStorage::new()), false),
    );
    tokens
        .set_token(
            "access-1",
            Some(chrono::Utc::now() + chrono::Duration::hours(1)),
        )
        .unwrap();

    let transport = Arc::new(CannedTransport::default());
    let client = Arc::new(ApiClient::new(config, tokens.clone(), transport.clone()));
    Fixture {
        transport,
        tokens,
        api: ConsoleApi::new(client),
    }
}
