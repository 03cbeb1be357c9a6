//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Every v1.1 user-context request carries an `Authorization: OAuth ...`
//! header whose signature covers the method, the base URL, the protocol
//! parameters and every query parameter.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngCore;
use sha1::Sha1;

use crate::{config::Credentials, error::ApiError};

/// Everything except RFC 3986 unreserved characters: ALPHA / DIGIT / "-" / "." / "_" / "~"
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
}

impl std::fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSigner").finish_non_exhaustive()
    }
}

impl OAuthSigner {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            consumer_key: credentials.consumer_key.clone(),
            consumer_secret: credentials.consumer_secret.clone(),
            access_token: credentials.access_token.clone(),
            access_token_secret: credentials.access_token_secret.clone(),
        }
    }

    /// Builds the `Authorization` header value for a request.
    ///
    /// `url` must not contain a query string; query parameters go in `params`.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String, ApiError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ApiError::OAuth(format!("Failed to get timestamp: {e}")))?
            .as_secs()
            .to_string();
        self.header_with(method, url, params, &timestamp, &generate_nonce())
    }

    fn header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        timestamp: &str,
        nonce: &str,
    ) -> Result<String, ApiError> {
        let mut oauth_params = self.protocol_params(timestamp, nonce);
        let signature = self.signature(method, url, params, &oauth_params)?;
        oauth_params.push(("oauth_signature".to_string(), signature));

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {header}"))
    }

    fn protocol_params(&self, timestamp: &str, nonce: &str) -> Vec<(String, String)> {
        vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                "HMAC-SHA1".to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.access_token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        oauth_params: &[(String, String)],
    ) -> Result<String, ApiError> {
        // Sort on the encoded pairs, as RFC 5849 section 3.4.1.3.2 requires.
        let mut encoded = oauth_params
            .iter()
            .chain(params.iter())
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>();
        encoded.sort();

        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(url),
            percent_encode(&param_string)
        );
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.access_token_secret)
        );
        hmac_sha1(&signing_key, &base_string)
    }
}

/// Percent-encodes per RFC 3986, the only encoding OAuth 1.0a accepts.
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Renders `params` as a query string using the same encoding as the signature.
pub fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hmac_sha1(key: &str, data: &str) -> Result<String, ApiError> {
    type HmacSha1 = Hmac<Sha1>;

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| ApiError::OAuth(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
