#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use salon_booking::config::AppConfig;
use salon_booking::db::{self, JsonStore};
use salon_booking::handlers;
use salon_booking::services::messaging::{MessagingProvider, OutgoingMessage};
use salon_booking::state::AppState;

pub const ADMIN_TOKEN: &str = "test-token";
pub const BOT_TOKEN: &str = "123456:TEST-TOKEN";
pub const DIRECT_CHAT_ID: &str = "-100500";

// ── Mock Provider ──

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: String,
    pub message: OutgoingMessage,
}

#[derive(Debug, Clone)]
pub struct SentDocument {
    pub chat_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Records every call; sends to `fail_for` fail like an unknown chat would.
#[derive(Default)]
pub struct MockMessaging {
    pub sent: Mutex<Vec<SentMessage>>,
    pub documents: Mutex<Vec<SentDocument>>,
    pub callbacks: Mutex<Vec<(String, String)>>,
    fail_for: Option<String>,
}

impl MockMessaging {
    pub fn failing_for(chat_id: &str) -> Self {
        Self {
            fail_for: Some(chat_id.to_string()),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: &str) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.chat_id == chat_id)
            .collect()
    }

    pub fn documents(&self) -> Vec<SentDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub fn callbacks(&self) -> Vec<(String, String)> {
        self.callbacks.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingProvider for MockMessaging {
    async fn send_message(&self, chat_id: &str, message: &OutgoingMessage) -> anyhow::Result<()> {
        if self.fail_for.as_deref() == Some(chat_id) {
            anyhow::bail!("Bad Request: chat not found");
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id: chat_id.to_string(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        _caption: &str,
    ) -> anyhow::Result<()> {
        self.documents.lock().unwrap().push(SentDocument {
            chat_id: chat_id.to_string(),
            file_name: file_name.to_string(),
            bytes,
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> anyhow::Result<()> {
        self.callbacks
            .lock()
            .unwrap()
            .push((callback_id.to_string(), text.to_string()));
        Ok(())
    }
}

// ── Helpers ──

pub struct TestApp {
    pub state: Arc<AppState>,
    pub messaging: Arc<MockMessaging>,
    _dir: TempDir,
}

impl TestApp {
    pub fn store(&self) -> &JsonStore {
        &self.state.store
    }

    pub fn router(&self) -> Router {
        handlers::router(Arc::clone(&self.state))
    }
}

pub fn test_config(data_dir: &TempDir) -> AppConfig {
    AppConfig {
        port: 3000,
        data_dir: data_dir.path().to_path_buf(),
        admin_ids: vec!["100".to_string(), "200".to_string()],
        admin_token: ADMIN_TOKEN.to_string(),
        bot_token: BOT_TOKEN.to_string(),
        direct_chat_id: DIRECT_CHAT_ID.to_string(),
        telegram_api_url: "http://localhost:0".to_string(),
        bot_polling: false,
        init_data_max_age_secs: 3600,
    }
}

pub async fn setup() -> TestApp {
    setup_with(MockMessaging::default(), |_| {}).await
}

pub async fn setup_with(messaging: MockMessaging, configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    configure(&mut config);

    let store = db::init_store(dir.path()).await.unwrap();
    let messaging = Arc::new(messaging);
    let provider: Arc<dyn MessagingProvider> = messaging.clone();
    let state = Arc::new(AppState::new(store, config, provider));

    TestApp {
        state,
        messaging,
        _dir: dir,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("Authorization", format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.router().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
