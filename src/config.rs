//! Process configuration
//!
//! Everything comes from the environment (a `.env` file is loaded
//! first in `main`): the bot token, the admin allow-list and the
//! database path.

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_DB_PATH: &str = "skindex.db";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("BOT_TOKEN is not set")]
    MissingToken,
    #[error("ADMIN_IDS entry '{0}' is not a Telegram user id")]
    BadAdminId(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub admin_ids: Vec<i64>,
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        let admin_ids = parse_admin_ids(&std::env::var("ADMIN_IDS").unwrap_or_default())?;
        let db_path = std::env::var("SKINDEX_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH));
        Ok(Self {
            bot_token,
            admin_ids,
            db_path,
        })
    }
}

/// Comma-separated ids; whitespace and empty entries are tolerated,
/// anything non-numeric is a startup error rather than a silently
/// empty allow-list.
fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse()
                .map_err(|_| ConfigError::BadAdminId(entry.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_ids_parse() {
        assert_eq!(parse_admin_ids("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_admin_ids(" 42 , 7 ").unwrap(), vec![42, 7]);
        assert_eq!(parse_admin_ids("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_admin_ids("1,,2").unwrap(), vec![1, 2]);
    }

    #[test]
    fn bad_admin_id_is_an_error() {
        assert!(matches!(
            parse_admin_ids("1,abc"),
            Err(ConfigError::BadAdminId(entry)) if entry == "abc"
        ));
    }
}
