#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

pub const VERIFY_PATH: &str = "/1.1/account/verify_credentials.json";
pub const SEARCH_PATH: &str = "/1.1/search/tweets.json";

/// Environment variables that would otherwise leak into the binary under test.
pub const ISOLATED_ENV: &[&str] = &[
    "TWITTER_CONSUMER_KEY",
    "TWITTER_CONSUMER_SECRET",
    "TWITTER_ACCESS_TOKEN",
    "TWITTER_ACCESS_TOKEN_SECRET",
    "TWEET_HARVEST_CREDENTIALS",
    "TWEET_HARVEST_OUTPUT",
];

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a complete credential file aimed at `api_url`.
    pub fn write_credentials(&self, api_url: &str) -> PathBuf {
        self.write(
            "credentials.yaml",
            &format!(
                "consumer_key: test_consumer_key\n\
                 consumer_secret: test_consumer_secret\n\
                 access_token: test_access_token\n\
                 access_token_secret: test_access_token_secret\n\
                 api_url: {api_url}\n\
                 timeout_secs: 5\n"
            ),
        )
    }
}

/// A wiremock server driven from synchronous tests.
///
/// The server runs on its own thread; the runtime here only drives the
/// async setup calls, so the blocking client can be used freely.
pub struct MockTwitter {
    server: MockServer,
    runtime: Runtime,
}

impl MockTwitter {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("tokio runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn requests_to(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.path() == path)
            .count()
    }
}

pub fn account_json() -> Value {
    json!({
        "id": 6253282u64,
        "id_str": "6253282",
        "name": "Harvest Bot",
        "screen_name": "harvestbot"
    })
}

pub fn status_json(id: u64, screen_name: &str, text: &str) -> Value {
    json!({
        "created_at": "Wed Oct 10 20:19:24 +0000 2018",
        "id": id,
        "id_str": id.to_string(),
        "full_text": text,
        "truncated": false,
        "user": {
            "id": 1000 + id,
            "name": format!("{screen_name} display"),
            "screen_name": screen_name
        },
        "favorite_count": id * 2,
        "retweet_count": id,
        "lang": "en"
    })
}

pub fn search_json(statuses: Vec<Value>) -> Value {
    let count = statuses.len();
    json!({
        "statuses": statuses,
        "search_metadata": {
            "completed_in": 0.035,
            "max_id": 1050118621198921728u64,
            "count": count
        }
    })
}
