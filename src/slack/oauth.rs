//! OAuth v2 code exchange for app installation

use crate::config::SlackConfig;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Slack client credentials are not configured")]
    NotConfigured,
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct OAuthResponse {
    ok: bool,
    error: Option<String>,
    team: Option<OAuthTeam>,
}

#[derive(Debug, Deserialize)]
struct OAuthTeam {
    name: Option<String>,
}

/// Exchanges installation codes at Slack's token endpoint
#[derive(Clone)]
pub struct OAuthClient {
    client: Client,
    config: SlackConfig,
}

impl OAuthClient {
    pub fn new(config: SlackConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Exchange `code` for an access token. Returns the installing team's name
    /// when Slack reports one.
    pub async fn exchange(&self, code: &str) -> Result<Option<String>, OAuthError> {
        let (Some(client_id), Some(client_secret)) =
            (&self.config.client_id, &self.config.client_secret)
        else {
            return Err(OAuthError::NotConfigured);
        };

        let response: OAuthResponse = self
            .client
            .post(&self.config.oauth_url)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("code", code),
            ])
            .timeout(self.config.http_timeout)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(OAuthError::Rejected(
                response.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        Ok(response.team.and_then(|team| team.name))
    }
}
