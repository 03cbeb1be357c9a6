//! Blocking Twitter v1.1 REST client signed with OAuth 1.0a.

use log::debug;
use reqwest::{
    StatusCode,
    blocking::{Client, Response},
    header::{AUTHORIZATION, HeaderMap},
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::{ApiSettings, Credentials},
    error::ApiError,
    oauth::{OAuthSigner, encode_query},
    search::{Account, SearchQuery, SearchResponse},
};

pub const VERIFY_CREDENTIALS_PATH: &str = "/1.1/account/verify_credentials.json";
pub const SEARCH_TWEETS_PATH: &str = "/1.1/search/tweets.json";

#[derive(Debug)]
pub struct TwitterClient {
    http: Client,
    base_url: String,
    signer: OAuthSigner,
}

impl TwitterClient {
    pub fn new(credentials: &Credentials, settings: &ApiSettings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(format!("tweet-harvest/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(credentials),
        })
    }

    /// Round trip that proves the credential set is accepted.
    pub fn verify_credentials(&self) -> Result<Account, ApiError> {
        let params = vec![
            ("include_entities".to_string(), "false".to_string()),
            ("skip_status".to_string(), "true".to_string()),
        ];
        self.get(VERIFY_CREDENTIALS_PATH, &params)
    }

    pub fn search_tweets(&self, query: &SearchQuery) -> Result<SearchResponse, ApiError> {
        self.get(SEARCH_TWEETS_PATH, &query.to_params())
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let auth_header = self.signer.authorization_header("GET", &url, params)?;
        let full_url = if params.is_empty() {
            url
        } else {
            format!("{url}?{}", encode_query(params))
        };

        debug!("GET {endpoint} with {} parameter(s)", params.len());
        let response = self
            .http
            .get(&full_url)
            .header(AUTHORIZATION, auth_header)
            .send()?;
        handle_response(response)
    }
}

/// Twitter's v1.1 error envelope: `{"errors":[{"code":32,"message":"..."}]}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
}

fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let reset = header_u64(response.headers(), "x-rate-limit-reset");
    if let Some(remaining) = header_u64(response.headers(), "x-rate-limit-remaining") {
        debug!("Rate limit remaining: {remaining} (reset at {reset:?})");
    }

    let bytes = response.bytes()?;

    if status.is_success() {
        return serde_json::from_slice(&bytes).map_err(ApiError::from);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::RateLimited { reset });
    }

    let (code, message) = match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
        Ok(envelope) => {
            let first = envelope.errors.into_iter().next();
            let code = first.as_ref().and_then(|d| d.code);
            let message = first
                .and_then(|d| d.message)
                .or(envelope.error)
                .unwrap_or_else(|| fallback_message(status, &bytes));
            (code, message)
        }
        Err(_) => (None, fallback_message(status, &bytes)),
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        });
    }

    Err(ApiError::Api {
        status: status.as_u16(),
        message,
        code,
    })
}

fn fallback_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        text.to_string()
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
