use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::{MessagingProvider, OutgoingMessage};

pub struct TelegramClient {
    api_url: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

// ── Incoming update types (only the fields the bot reads) ──

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub web_app_data: Option<WebAppData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebAppData {
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

impl TelegramClient {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<T> {
        let resp = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to call Telegram {method}"))?;

        let status = resp.status();
        let data: ApiResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("failed to parse Telegram {method} response"))?;

        unwrap_response(method, status, data)
    }

    /// Long-polls for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> anyhow::Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        self.call("getUpdates", &body).await
    }
}

fn unwrap_response<T>(method: &str, status: StatusCode, data: ApiResponse<T>) -> anyhow::Result<T> {
    if !data.ok {
        anyhow::bail!(
            "{}",
            data.description
                .unwrap_or_else(|| format!("Telegram API error: {status}"))
        );
    }
    data.result
        .ok_or_else(|| anyhow::anyhow!("missing result in Telegram {method} response"))
}

fn message_body(chat_id: &str, message: &OutgoingMessage) -> serde_json::Value {
    let mut body = json!({
        "chat_id": chat_id,
        "text": message.text,
    });
    if let Some(mode) = message.parse_mode {
        body["parse_mode"] = json!(mode.as_str());
    }
    if let Some(button) = &message.button {
        body["reply_markup"] = json!({
            "inline_keyboard": [[
                { "text": button.text, "callback_data": button.callback_data }
            ]]
        });
    }
    body
}

#[async_trait]
impl MessagingProvider for TelegramClient {
    async fn send_message(&self, chat_id: &str, message: &OutgoingMessage) -> anyhow::Result<()> {
        self.call::<serde_json::Value>("sendMessage", &message_body(chat_id, message))
            .await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> anyhow::Result<()> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .context("invalid document mime type")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let resp = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .context("failed to call Telegram sendDocument")?;

        let status = resp.status();
        let data: ApiResponse<serde_json::Value> = resp
            .json()
            .await
            .context("failed to parse Telegram sendDocument response")?;
        unwrap_response("sendDocument", status, data)?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> anyhow::Result<()> {
        let body = json!({ "callback_query_id": callback_id, "text": text });
        self.call::<serde_json::Value>("answerCallbackQuery", &body)
            .await?;
        Ok(())
    }
}
