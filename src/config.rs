use std::env;
use std::path::PathBuf;

pub const DEFAULT_INIT_DATA_MAX_AGE_SECS: u64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub admin_ids: Vec<String>,
    pub admin_token: String,
    pub bot_token: String,
    pub direct_chat_id: String,
    pub telegram_api_url: String,
    pub bot_polling: bool,
    /// Oldest Mini App init data accepted for admin calls, in seconds.
    pub init_data_max_age_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            admin_ids: parse_admin_ids(&env::var("ADMIN_IDS").unwrap_or_default()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_default(),
            bot_token: env::var("BOT_TOKEN").unwrap_or_default(),
            direct_chat_id: env::var("CHAT_ID").unwrap_or_default(),
            telegram_api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            bot_polling: env::var("BOT_POLLING")
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            init_data_max_age_secs: env::var("INIT_DATA_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INIT_DATA_MAX_AGE_SECS),
        }
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_ids.iter().any(|id| id == user_id.trim())
    }
}

pub fn parse_admin_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}
