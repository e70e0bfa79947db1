pub mod telegram;

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub button: Option<InlineButton>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            button: None,
        }
    }

    pub fn html(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Html);
        self
    }

    pub fn with_button(mut self, text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        self.button = Some(InlineButton {
            text: text.into(),
            callback_data: callback_data.into(),
        });
        self
    }
}

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send_message(&self, chat_id: &str, message: &OutgoingMessage) -> anyhow::Result<()>;

    async fn send_document(
        &self,
        chat_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> anyhow::Result<()>;

    async fn answer_callback(&self, callback_id: &str, text: &str) -> anyhow::Result<()>;
}
