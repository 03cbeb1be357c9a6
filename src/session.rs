use log::info;

use crate::{
    client::TwitterClient,
    config::{ApiSettings, Credentials},
    error::AuthError,
    search::Account,
};

/// A client whose credentials the API has accepted.
#[derive(Debug)]
pub struct Session {
    client: TwitterClient,
    account: Account,
}

impl Session {
    pub fn client(&self) -> &TwitterClient {
        &self.client
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

/// Builds the client and verifies the credential set with a single request.
pub fn establish(credentials: &Credentials, settings: &ApiSettings) -> Result<Session, AuthError> {
    let client = TwitterClient::new(credentials, settings).map_err(AuthError::from)?;
    let account = client.verify_credentials()?;
    info!("Authentication OK (@{})", account.screen_name);
    Ok(Session { client, account })
}
