use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default = "default_rating", deserialize_with = "rating_or_default")]
    pub rating: u8,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    pub author: Option<String>,
    pub rating: Option<i64>,
    pub text: Option<String>,
}

fn default_rating() -> u8 {
    DEFAULT_RATING
}

fn rating_or_default<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u8>::deserialize(deserializer)?.unwrap_or(DEFAULT_RATING))
}

pub fn validate_rating(rating: i64) -> Result<u8, String> {
    if (1..=5).contains(&rating) {
        Ok(rating as u8)
    } else {
        Err(format!("rating must be between 1 and 5, got {rating}"))
    }
}

impl ReviewInput {
    pub fn author(&self) -> Option<String> {
        self.author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
    }

    pub fn text(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
    }
}
