use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY_SEED: &[u8] = b"WebAppData";

/// Tolerated clock drift for an `auth_date` slightly in the future.
const CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InitDataError {
    #[error("init data has no hash")]
    MissingHash,

    #[error("init data signature mismatch")]
    BadSignature,

    #[error("init data has no valid auth_date")]
    MissingAuthDate,

    #[error("init data expired ({age}s old)")]
    Expired { age: i64 },

    #[error("init data has no user")]
    MissingUser,

    #[error("init data user is malformed")]
    InvalidUser,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WebAppUser {
    pub id: i64,
    pub username: Option<String>,
}

/// Verifies the query-string init data a Mini App receives from the chat
/// client and returns the user it was issued to. Data signed more than
/// `max_age_secs` ago is rejected.
pub fn verify_init_data(
    init_data: &str,
    bot_token: &str,
    max_age_secs: u64,
) -> Result<WebAppUser, InitDataError> {
    verify_init_data_at(init_data, bot_token, max_age_secs, chrono::Utc::now().timestamp())
}

pub fn verify_init_data_at(
    init_data: &str,
    bot_token: &str,
    max_age_secs: u64,
    now: i64,
) -> Result<WebAppUser, InitDataError> {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(init_data.as_bytes())
        .into_owned()
        .collect();

    let hash = field(&pairs, "hash").ok_or(InitDataError::MissingHash)?;
    let expected = hex::decode(hash).map_err(|_| InitDataError::BadSignature)?;

    let mut mac = signing_mac(bot_token)?;
    mac.update(data_check_string(&pairs).as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| InitDataError::BadSignature)?;

    let auth_date: i64 = field(&pairs, "auth_date")
        .and_then(|v| v.parse().ok())
        .ok_or(InitDataError::MissingAuthDate)?;
    let age = now - auth_date;
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
    if age > max_age || age < -CLOCK_SKEW_SECS {
        return Err(InitDataError::Expired { age });
    }

    let user = field(&pairs, "user").ok_or(InitDataError::MissingUser)?;
    serde_json::from_str(user).map_err(|_| InitDataError::InvalidUser)
}

fn field<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn data_check_string(pairs: &[(String, String)]) -> String {
    let mut fields: Vec<String> = pairs
        .iter()
        .filter(|(k, _)| k != "hash")
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    fields.sort();
    fields.join("\n")
}

fn signing_mac(bot_token: &str) -> Result<HmacSha256, InitDataError> {
    let mut seed =
        HmacSha256::new_from_slice(SECRET_KEY_SEED).map_err(|_| InitDataError::BadSignature)?;
    seed.update(bot_token.as_bytes());
    let secret = seed.finalize().into_bytes();
    HmacSha256::new_from_slice(&secret).map_err(|_| InitDataError::BadSignature)
}
