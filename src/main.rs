//! skindex-bot: a Telegram bot for browsing and curating a CS2 item
//! catalog (cases, skins, weapons, wear variants).

mod auth;
mod config;
mod db;
mod render;
mod runtime;
mod state_machine;
mod telegram;

use auth::AdminList;
use config::Config;
use db::Database;
use runtime::Dispatcher;
use state_machine::Engine;
use telegram::TelegramClient;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skindex=info")))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env()?;
    if config.admin_ids.is_empty() {
        tracing::warn!("ADMIN_IDS is empty; catalog management is disabled");
    }

    let db = Database::open(&config.db_path).await?;
    tracing::info!(db_path = %config.db_path.display(), "catalog database ready");

    let client = TelegramClient::new(&config.bot_token)?;
    // Long polling and a webhook are mutually exclusive; also discard
    // whatever piled up while the bot was down, since the flow state
    // those updates belonged to is gone.
    client.delete_webhook(true).await?;

    let engine = Engine::new(db, AdminList::new(config.admin_ids));
    let dispatcher = Dispatcher::new(client, engine);

    tracing::info!("bot started, polling for updates");
    tokio::select! {
        () = dispatcher.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("shutdown signal received");
        }
    }
    Ok(())
}
