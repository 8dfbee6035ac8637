//! Bot API wire types
//!
//! Only the fields this bot reads or writes; everything else in the
//! API objects is ignored on deserialization.

use crate::render::Keyboard;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| InlineKeyboardButton {
                            text: button.text.clone(),
                            callback_data: button.callback_data.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_with_message_deserializes() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 42,
                "message": {
                    "message_id": 7,
                    "chat": {"id": 123, "type": "private"},
                    "from": {"id": 123, "is_bot": false, "first_name": "Ada"},
                    "text": "/start"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(update.update_id, 42);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 123);
        assert_eq!(message.from.unwrap().first_name, "Ada");
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn update_with_callback_deserializes() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 43,
                "callback_query": {
                    "id": "abc",
                    "from": {"id": 123, "is_bot": false, "first_name": "Ada"},
                    "message": {"message_id": 7, "chat": {"id": 123, "type": "private"}},
                    "data": "case_7"
                }
            }"#,
        )
        .unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.data.as_deref(), Some("case_7"));
        assert_eq!(query.message.unwrap().message_id, 7);
    }

    #[test]
    fn keyboard_converts_to_markup() {
        let keyboard = crate::render::KeyboardBuilder::new()
            .button("a", crate::state_machine::CallbackAction::MainMenu)
            .button("b", crate::state_machine::CallbackAction::AdminMenu)
            .adjust(&[2]);
        let markup = InlineKeyboardMarkup::from(&keyboard);
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0][1].callback_data, "admin_menu");
        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(json["inline_keyboard"][0][0]["text"], "a");
    }
}
