//! Minimal Telegram Bot API client
//!
//! Covers exactly the five methods the runtime needs: `getUpdates`
//! long polling, `sendMessage`, `editMessageText`,
//! `answerCallbackQuery` and `deleteWebhook`. Every call goes through
//! one generic POST helper that unwraps the `ok`/`result` envelope.

mod types;

pub use types::*;

use crate::render::Keyboard;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Padding on top of the long-poll timeout so the HTTP client never
/// cuts off a poll the server is still holding open.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("telegram api error: {0}")]
    Api(String),
}

impl TelegramError {
    /// Editing a message with its current content fails with a
    /// distinct description; callers treat that as a no-op.
    pub fn is_not_modified(&self) -> bool {
        matches!(self, TelegramError::Api(description)
            if description.contains("message is not modified"))
    }
}

pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            base: format!("https://api.telegram.org/bot{token}"),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, TelegramError> {
        let response = self
            .http
            .post(format!("{}/{method}", self.base))
            .json(&body)
            .send()
            .await?;
        let envelope: ApiResponse<T> = response.json().await?;
        if envelope.ok {
            envelope
                .result
                .ok_or_else(|| TelegramError::Api("response without result".to_string()))
        } else {
            Err(TelegramError::Api(
                envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }

    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<Message, TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(InlineKeyboardMarkup::from(keyboard))
                .map_err(|e| TelegramError::Api(e.to_string()))?;
        }
        self.call("sendMessage", body).await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(InlineKeyboardMarkup::from(keyboard))
                .map_err(|e| TelegramError::Api(e.to_string()))?;
        }
        // The result is the edited Message (or True for inline ones);
        // nothing downstream needs it.
        self.call::<serde_json::Value>("editMessageText", body)
            .await
            .map(|_| ())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        self.call::<bool>("answerCallbackQuery", json!({ "callback_query_id": callback_query_id }))
            .await
            .map(|_| ())
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<(), TelegramError> {
        self.call::<bool>(
            "deleteWebhook",
            json!({ "drop_pending_updates": drop_pending_updates }),
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_modified_is_recognized() {
        let error = TelegramError::Api(
            "Bad Request: message is not modified: specified new message content and reply markup \
             are exactly the same"
                .to_string(),
        );
        assert!(error.is_not_modified());
        assert!(!TelegramError::Api("Bad Request: message to edit not found".to_string())
            .is_not_modified());
    }
}
