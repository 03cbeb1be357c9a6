//! Credential loading and output-path resolution.
//!
//! Secrets come from a YAML credential file, with each field overridable by an
//! environment variable. The output path comes from the command line, the
//! `TWEET_HARVEST_OUTPUT` variable, or a default under the current user's
//! `Downloads` directory.

use std::{
    env, fmt,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Deserialize;

pub const CREDENTIALS_ENV: &str = "TWEET_HARVEST_CREDENTIALS";
pub const OUTPUT_ENV: &str = "TWEET_HARVEST_OUTPUT";
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.yaml";
pub const DEFAULT_OUTPUT_FILE: &str = "retrieved_tweets.csv";
pub const DEFAULT_API_URL: &str = "https://api.twitter.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONSUMER_KEY_ENV: &str = "TWITTER_CONSUMER_KEY";
const CONSUMER_SECRET_ENV: &str = "TWITTER_CONSUMER_SECRET";
const ACCESS_TOKEN_ENV: &str = "TWITTER_ACCESS_TOKEN";
const ACCESS_TOKEN_SECRET_ENV: &str = "TWITTER_ACCESS_TOKEN_SECRET";

/// Checked in order when deriving the default output path.
const USER_ENV_KEYS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];

/// The four OAuth 1.0a secrets needed to sign user-context requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// Where and how to reach the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub api: ApiSettings,
}

/// On-disk layout of the credential file. Every field may be left out when the
/// matching environment variable supplies it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CredentialFile {
    #[serde(default)]
    consumer_key: Option<String>,
    #[serde(default)]
    consumer_secret: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    access_token_secret: Option<String>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Loads settings using the process environment.
pub fn load_settings(credentials_path: Option<&Path>) -> Result<Settings> {
    load_settings_with(credentials_path, |key| env::var(key).ok())
}

/// Loads settings with an injectable environment lookup.
pub fn load_settings_with<F>(credentials_path: Option<&Path>, lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let (path, explicit) = match credentials_path {
        Some(path) => (path.to_path_buf(), true),
        None => match lookup(CREDENTIALS_ENV).filter(|v| !v.trim().is_empty()) {
            Some(value) => (PathBuf::from(value), true),
            None => (PathBuf::from(DEFAULT_CREDENTIALS_FILE), false),
        },
    };

    let file = if path.exists() {
        debug!("Reading credentials from {path:?}");
        read_credential_file(&path)?
    } else if explicit {
        return Err(anyhow!("Credential file {path:?} does not exist"));
    } else {
        debug!("No credential file at {path:?}; relying on environment");
        CredentialFile::default()
    };

    merge(file, &lookup)
}

fn read_credential_file(path: &Path) -> Result<CredentialFile> {
    let mut file =
        File::open(path).with_context(|| format!("Opening credential file {path:?}"))?;
    let mut raw = String::new();
    file.read_to_string(&mut raw)
        .with_context(|| format!("Reading credential file {path:?}"))?;
    if raw.trim().is_empty() {
        return Ok(CredentialFile::default());
    }
    serde_yaml::from_str(&raw).with_context(|| format!("Parsing credential file {path:?}"))
}

fn merge<F>(file: CredentialFile, lookup: &F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |env_key: &str, from_file: Option<String>| {
        non_blank(lookup(env_key)).or_else(|| non_blank(from_file))
    };

    let consumer_key = pick(CONSUMER_KEY_ENV, file.consumer_key);
    let consumer_secret = pick(CONSUMER_SECRET_ENV, file.consumer_secret);
    let access_token = pick(ACCESS_TOKEN_ENV, file.access_token);
    let access_token_secret = pick(ACCESS_TOKEN_SECRET_ENV, file.access_token_secret);

    let missing = [
        ("consumer_key", consumer_key.is_none()),
        ("consumer_secret", consumer_secret.is_none()),
        ("access_token", access_token.is_none()),
        ("access_token_secret", access_token_secret.is_none()),
    ]
    .iter()
    .filter(|(_, absent)| *absent)
    .map(|(name, _)| *name)
    .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(anyhow!("Missing credential value(s): {}", missing.join(", ")));
    }

    let mut api = ApiSettings::default();
    if let Some(url) = file.api_url.filter(|u| !u.trim().is_empty()) {
        api.api_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(secs) = file.timeout_secs {
        if secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        api.timeout = Duration::from_secs(secs);
    }

    Ok(Settings {
        credentials: Credentials {
            consumer_key: consumer_key.unwrap_or_default(),
            consumer_secret: consumer_secret.unwrap_or_default(),
            access_token: access_token.unwrap_or_default(),
            access_token_secret: access_token_secret.unwrap_or_default(),
        },
        api,
    })
}

/// Resolves the CSV destination using the process environment.
pub fn resolve_output_path(provided: Option<&Path>) -> Result<PathBuf> {
    resolve_output_path_with(provided, |key| env::var(key).ok())
}

pub fn resolve_output_path_with<F>(provided: Option<&Path>, lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = provided {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = lookup(OUTPUT_ENV).filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let user = USER_ENV_KEYS
        .iter()
        .find_map(|&key| non_blank(lookup(key)))
        .ok_or_else(|| {
            anyhow!(
                "Cannot determine the OS user name ({} unset); pass --output",
                USER_ENV_KEYS.join("/")
            )
        })?;
    Ok(default_output_path(&user))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `<users root>/<user>/Downloads/retrieved_tweets.csv` for the current platform.
pub fn default_output_path(user: &str) -> PathBuf {
    Path::new(users_root())
        .join(user)
        .join("Downloads")
        .join(DEFAULT_OUTPUT_FILE)
}

fn users_root() -> &'static str {
    if cfg!(target_os = "macos") {
        "/Users"
    } else if cfg!(windows) {
        "C:\\Users"
    } else {
        "/home"
    }
}
