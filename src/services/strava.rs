// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Authorization URL construction
//! - Code exchange and token refresh
//! - Activity list and stream fetching
//! - Status mapping (rate limit, revoked token, missing resource)

use crate::config::Config;
use crate::error::StravaError;
use crate::models::{SessionAthlete, StreamChannel, TokenSet};
use serde::Deserialize;
use serde_json::Value;

/// Scopes requested at login: profile plus full activity history.
pub const OAUTH_SCOPES: &str = "read,activity:read_all,profile:read_all";

/// Strava caps `per_page` at 200.
pub const MAX_PER_PAGE: u32 = 200;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    oauth_base_url: String,
    api_base_url: String,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for StravaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StravaClient")
            .field("oauth_base_url", &self.oauth_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl StravaClient {
    /// Create a client with OAuth credentials, endpoints and timeout from config.
    pub fn from_config(config: &Config) -> Result<Self, StravaError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            http,
            oauth_base_url: config.strava_oauth_url.trim_end_matches('/').to_string(),
            api_base_url: config.strava_api_url.trim_end_matches('/').to_string(),
            client_id: config.strava_client_id.clone(),
            client_secret: config.strava_client_secret.clone(),
        })
    }

    /// Build the URL the browser is sent to for authorization.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/oauth/authorize?\
             client_id={}&\
             redirect_uri={}&\
             approval_prompt=auto&\
             response_type=code&\
             scope={}&\
             state={}",
            self.oauth_base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, StravaError> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.oauth_base_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        check_response_json(response).await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, StravaError> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.oauth_base_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        check_response_json(response).await
    }

    /// List one page of the athlete's activities between `after` and `before`
    /// (Unix timestamps), newest first.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, StravaError> {
        let url = format!("{}/athlete/activities", self.api_base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("before", before.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.min(MAX_PER_PAGE).to_string()),
            ])
            .send()
            .await?;

        check_response_json(response).await
    }

    /// Fetch one activity's summary record.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<Value, StravaError> {
        let url = format!("{}/activities/{}", self.api_base_url, activity_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_response_json(response).await
    }

    /// Fetch the detail-view stream channels for an activity at medium resolution.
    pub async fn get_activity_streams(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<Value, StravaError> {
        let url = format!("{}/activities/{}/streams", self.api_base_url, activity_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("keys", StreamChannel::request_keys()),
                ("key_by_type", "true".to_string()),
                ("resolution", "medium".to_string()),
            ])
            .send()
            .await?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, StravaError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        return Err(match status.as_u16() {
            429 => {
                tracing::warn!("Strava rate limit hit (429)");
                StravaError::RateLimited
            }
            401 => StravaError::Unauthorized,
            404 => StravaError::NotFound,
            code => StravaError::Http { status: code, body },
        });
    }

    response
        .json()
        .await
        .map_err(|e| StravaError::Decode(e.to_string()))
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    #[serde(flatten)]
    pub tokens: TokenSet,
    #[serde(default)]
    pub athlete: Option<StravaAthlete>,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

impl From<StravaAthlete> for SessionAthlete {
    fn from(athlete: StravaAthlete) -> Self {
        Self {
            id: athlete.id,
            firstname: athlete.firstname,
            lastname: athlete.lastname,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_parameters() {
        let client = StravaClient::from_config(&Config::default()).unwrap();
        let url = client.authorize_url("http://localhost:8050/strava-oauth", "abc-123_XYZ");

        assert!(url.starts_with("https://www.strava.com/oauth/authorize?"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8050%2Fstrava-oauth"));
        assert!(url.contains("approval_prompt=auto"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=read%2Cactivity%3Aread_all%2Cprofile%3Aread_all"));
        assert!(url.ends_with("&state=abc-123_XYZ"));
    }

    #[test]
    fn test_token_exchange_response_parses_athlete() {
        let body = serde_json::json!({
            "token_type": "Bearer",
            "expires_at": 1_700_000_000,
            "expires_in": 21600,
            "refresh_token": "r",
            "access_token": "a",
            "athlete": {"id": 42, "firstname": "Ada", "lastname": "L"}
        });

        let parsed: TokenExchangeResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.tokens.expires_at, 1_700_000_000);
        assert_eq!(parsed.athlete.map(|a| a.id), Some(42));
    }

    #[test]
    fn test_debug_hides_client_secret() {
        let client = StravaClient::from_config(&Config::default()).unwrap();
        assert!(!format!("{:?}", client).contains("test_secret"));
    }
}
