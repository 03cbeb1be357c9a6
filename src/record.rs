use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset, Utc};

use crate::search::Status;

/// Column order of the exported table.
pub const COLUMNS: [&str; 7] = [
    "Create_date",
    "Display_name",
    "User_name",
    "Tweet_id",
    "Favorite_count",
    "Retweet_count",
    "Full_tweet",
];

/// Rendering of `Create_date` in UTC, e.g. `2018-10-10 20:19:24`.
pub const CREATE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One matched tweet projected onto the export columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub created_at: DateTime<FixedOffset>,
    pub display_name: String,
    pub user_name: String,
    pub tweet_id: u64,
    pub favorite_count: Option<u64>,
    pub retweet_count: Option<u64>,
    pub full_text: String,
}

impl ResultRecord {
    pub fn from_status(status: &Status) -> Result<Self> {
        let full_text = status
            .body()
            .ok_or_else(|| anyhow!("Tweet {} has neither full_text nor text", status.id))?;
        Ok(Self {
            created_at: status.created_at,
            display_name: status.user.name.clone(),
            user_name: status.user.screen_name.clone(),
            tweet_id: status.id,
            favorite_count: status.favorite_count,
            retweet_count: status.retweet_count,
            full_text: full_text.to_string(),
        })
    }

    /// Cells in `COLUMNS` order. Absent counts become empty cells.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.created_at
                .with_timezone(&Utc)
                .format(CREATE_DATE_FORMAT)
                .to_string(),
            self.display_name.clone(),
            self.user_name.clone(),
            self.tweet_id.to_string(),
            render_count(self.favorite_count),
            render_count(self.retweet_count),
            self.full_text.clone(),
        ]
    }
}

fn render_count(count: Option<u64>) -> String {
    count.map(|c| c.to_string()).unwrap_or_default()
}

pub fn project(statuses: &[Status]) -> Result<Vec<ResultRecord>> {
    statuses.iter().map(ResultRecord::from_status).collect()
}
