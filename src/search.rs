//! Search query parameters and the v1.1 wire types we decode.

use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_QUERY: &str =
    "cats OR dogs -#caturday filter:media -filter:retweets -filter:replies";
pub const DEFAULT_LANG: &str = "en";
pub const RESULT_CAP: u32 = 100;

/// Twitter's `created_at` layout, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ResultType {
    #[default]
    Recent,
    Popular,
    Mixed,
}

impl ResultType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultType::Recent => "recent",
            ResultType::Popular => "popular",
            ResultType::Mixed => "mixed",
        }
    }
}

/// One bounded search request. `Default` is the query this tool was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub lang: String,
    pub result_type: ResultType,
    pub count: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            lang: DEFAULT_LANG.to_string(),
            result_type: ResultType::Recent,
            count: RESULT_CAP,
        }
    }
}

impl SearchQuery {
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(anyhow!("Search query cannot be empty"));
        }
        if self.count == 0 || self.count > RESULT_CAP {
            return Err(anyhow!(
                "Result count must be between 1 and {RESULT_CAP}, got {}",
                self.count
            ));
        }
        Ok(())
    }

    /// Query parameters in request order. Extended mode is always requested so
    /// statuses carry `full_text` instead of the truncated `text`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), self.query.clone())];
        if !self.lang.trim().is_empty() {
            params.push(("lang".to_string(), self.lang.trim().to_string()));
        }
        params.push((
            "result_type".to_string(),
            self.result_type.as_str().to_string(),
        ));
        params.push(("tweet_mode".to_string(), "extended".to_string()));
        params.push(("count".to_string(), self.count.to_string()));
        params
    }
}

/// The authenticated account returned by `verify_credentials`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: u64,
    pub name: String,
    pub screen_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub statuses: Vec<Status>,
    #[serde(default)]
    pub search_metadata: Option<SearchMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMetadata {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub max_id: Option<u64>,
    #[serde(default)]
    pub completed_in: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: u64,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<FixedOffset>,
    pub user: TweetUser,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub favorite_count: Option<u64>,
    #[serde(default)]
    pub retweet_count: Option<u64>,
}

impl Status {
    /// The untruncated text, falling back to `text` for compatibility-mode payloads.
    pub fn body(&self) -> Option<&str> {
        self.full_text.as_deref().or(self.text.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetUser {
    pub name: String,
    pub screen_name: String,
}

pub fn parse_created_at(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(value.trim(), CREATED_AT_FORMAT)
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_created_at(&raw)
        .map_err(|e| serde::de::Error::custom(format!("invalid created_at '{raw}': {e}")))
}
