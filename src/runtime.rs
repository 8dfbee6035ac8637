//! Long-poll dispatch loop
//!
//! Pulls updates off `getUpdates` and fans them out to one worker task
//! per chat. Within a chat every action is handled to completion
//! before the next one starts, so a user can never interleave steps of
//! their own flow; different chats run concurrently.

use crate::render::text::{chunk_text, MESSAGE_LIMIT};
use crate::state_machine::{CallbackAction, Command, Engine, Event, Reply, UserRef};
use crate::telegram::{CallbackQuery, Message, TelegramClient, Update};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_RETRY: Duration = Duration::from_secs(1);
const WORKER_QUEUE: usize = 32;

pub struct Dispatcher {
    client: Arc<TelegramClient>,
    engine: Arc<Engine>,
    workers: HashMap<i64, mpsc::Sender<Update>>,
}

impl Dispatcher {
    pub fn new(client: TelegramClient, engine: Engine) -> Self {
        Self {
            client: Arc::new(client),
            engine: Arc::new(engine),
            workers: HashMap::new(),
        }
    }

    pub async fn run(mut self) {
        let mut offset = 0i64;
        loop {
            match self.client.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.route(update);
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "getUpdates failed, retrying");
                    tokio::time::sleep(POLL_RETRY).await;
                }
            }
        }
    }

    fn route(&mut self, update: Update) {
        let Some(chat_id) = chat_of(&update) else {
            tracing::debug!(update_id = update.update_id, "update without a chat, skipping");
            return;
        };
        let sender = self
            .workers
            .entry(chat_id)
            .or_insert_with(|| spawn_worker(chat_id, self.client.clone(), self.engine.clone()));
        if sender.is_closed() {
            *sender = spawn_worker(chat_id, self.client.clone(), self.engine.clone());
        }
        match sender.try_send(update) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(chat_id, "chat queue full, dropping update");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(chat_id, "chat worker gone, dropping update");
            }
        }
    }
}

fn chat_of(update: &Update) -> Option<i64> {
    if let Some(message) = &update.message {
        return Some(message.chat.id);
    }
    update
        .callback_query
        .as_ref()
        .map(|query| query.message.as_ref().map_or(query.from.id, |m| m.chat.id))
}

fn spawn_worker(
    chat_id: i64,
    client: Arc<TelegramClient>,
    engine: Arc<Engine>,
) -> mpsc::Sender<Update> {
    let (sender, mut receiver) = mpsc::channel(WORKER_QUEUE);
    tokio::spawn(async move {
        while let Some(update) = receiver.recv().await {
            process_update(&client, &engine, update).await;
        }
        tracing::debug!(chat_id, "chat worker exiting");
    });
    sender
}

async fn process_update(client: &TelegramClient, engine: &Engine, update: Update) {
    if let Some(message) = update.message {
        handle_message(client, engine, message).await;
    } else if let Some(query) = update.callback_query {
        handle_callback(client, engine, query).await;
    }
}

async fn handle_message(client: &TelegramClient, engine: &Engine, message: Message) {
    // Stickers, photos and the like have no text; nothing to do.
    let (Some(text), Some(from)) = (message.text, message.from) else {
        return;
    };
    let user = UserRef {
        id: from.id,
        name: from.first_name,
    };
    let event = match Command::parse(&text) {
        Some(command) => Event::Command(command),
        None => Event::Text(text),
    };
    let outcome = engine.handle(&user, event).await;
    deliver_sends(client, message.chat.id, &outcome.replies).await;
}

async fn handle_callback(client: &TelegramClient, engine: &Engine, query: CallbackQuery) {
    let user = UserRef {
        id: query.from.id,
        name: query.from.first_name,
    };
    match query.data.as_deref().and_then(CallbackAction::parse) {
        Some(action) => {
            let outcome = engine.handle(&user, Event::Callback(action)).await;
            let chat_id = query.message.as_ref().map_or(user.id, |m| m.chat.id);
            deliver_edit_then_sends(client, chat_id, query.message.as_ref(), &outcome.replies)
                .await;
        }
        // Old buttons from before a payload change, or manual junk.
        // Answer the query so the client stops its spinner, send
        // nothing.
        None => {
            tracing::warn!(user_id = user.id, data = ?query.data, "unparseable callback payload");
        }
    }
    if let Err(error) = client.answer_callback_query(&query.id).await {
        tracing::warn!(%error, "failed to answer callback query");
    }
}

/// Callback replies refresh the message the button lives on: the first
/// reply's first chunk is an edit, everything after that is a fresh
/// send. "Not modified" is a no-op; any other edit failure downgrades
/// to a send so the user still gets the reply.
async fn deliver_edit_then_sends(
    client: &TelegramClient,
    chat_id: i64,
    source: Option<&Message>,
    replies: &[Reply],
) {
    let Some((first, rest)) = replies.split_first() else {
        return;
    };
    let chunks = chunk_text(&first.text, MESSAGE_LIMIT);
    let Some((head, overflow)) = chunks.split_first() else {
        return;
    };
    let mut edited = false;
    if let Some(message) = source {
        match client
            .edit_message_text(chat_id, message.message_id, head, first.keyboard.as_ref())
            .await
        {
            Ok(()) => edited = true,
            Err(error) if error.is_not_modified() => edited = true,
            Err(error) => tracing::warn!(%error, "edit failed, falling back to a send"),
        }
    }
    if !edited {
        send_chunk(client, chat_id, head, first.keyboard.as_ref()).await;
    }
    for chunk in overflow {
        send_chunk(client, chat_id, chunk, None).await;
    }
    deliver_sends(client, chat_id, rest).await;
}

async fn deliver_sends(client: &TelegramClient, chat_id: i64, replies: &[Reply]) {
    for reply in replies {
        let mut keyboard = reply.keyboard.as_ref();
        for chunk in &chunk_text(&reply.text, MESSAGE_LIMIT) {
            send_chunk(client, chat_id, chunk, keyboard.take()).await;
        }
    }
}

async fn send_chunk(
    client: &TelegramClient,
    chat_id: i64,
    text: &str,
    keyboard: Option<&crate::render::Keyboard>,
) {
    if let Err(error) = client.send_message(chat_id, text, keyboard).await {
        tracing::warn!(%error, chat_id, "send failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::{Chat, User};

    #[test]
    fn chat_resolution() {
        let update = Update {
            update_id: 1,
            message: Some(Message {
                message_id: 1,
                chat: Chat { id: 555 },
                from: None,
                text: None,
            }),
            callback_query: None,
        };
        assert_eq!(chat_of(&update), Some(555));

        let update = Update {
            update_id: 2,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "q".to_string(),
                from: User {
                    id: 777,
                    first_name: "Ada".to_string(),
                },
                message: None,
                data: Some("main_menu".to_string()),
            }),
        };
        // No attached message: fall back to the sender's id.
        assert_eq!(chat_of(&update), Some(777));

        let update = Update {
            update_id: 3,
            message: None,
            callback_query: None,
        };
        assert_eq!(chat_of(&update), None);
    }
}
