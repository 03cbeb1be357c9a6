use std::path::PathBuf;

use clap::Parser;

use crate::search::{DEFAULT_LANG, DEFAULT_QUERY, RESULT_CAP, ResultType, SearchQuery};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Run one Twitter search and export the matched tweets to CSV",
    long_about = None
)]
pub struct Cli {
    /// YAML file holding consumer_key, consumer_secret, access_token, access_token_secret
    #[arg(short = 'c', long = "credentials")]
    pub credentials: Option<PathBuf>,
    /// Output CSV file (defaults to ~/Downloads/retrieved_tweets.csv for the current user)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Search query in Twitter's standard search syntax
    #[arg(short = 'q', long = "query", default_value = DEFAULT_QUERY)]
    pub query: String,
    /// Restrict results to this language code
    #[arg(long, default_value = DEFAULT_LANG)]
    pub lang: String,
    /// Ordering of results
    #[arg(long = "result-type", value_enum, default_value = "recent")]
    pub result_type: ResultType,
    /// Number of tweets to request (at most 100)
    #[arg(long, default_value_t = RESULT_CAP, value_parser = clap::value_parser!(u32).range(1..=RESULT_CAP as i64))]
    pub count: u32,
    /// Character encoding for the output file (defaults to utf-8 with byte-order mark)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Verify the credentials and exit without searching
    #[arg(long = "verify-only")]
    pub verify_only: bool,
}

impl Cli {
    pub fn search_query(&self) -> SearchQuery {
        SearchQuery {
            query: self.query.clone(),
            lang: self.lang.clone(),
            result_type: self.result_type,
            count: self.count,
        }
    }
}
