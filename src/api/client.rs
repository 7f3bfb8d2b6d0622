//! HTTP implementation of the API collaborators.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::types::{
    ActiveFriendSession, AddXpBody, DailyStatisticsBody, DailyStatisticsUpdate, EndSessionBody,
    FocusSessionRecord,
};
use super::{PresenceSource, SessionApi};
use crate::config::ApiConfig;
use crate::error::VimayaError;

/// Client for the Vimaya REST API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Build a client from API settings.
    ///
    /// # Errors
    ///
    /// Returns `VimayaError::Config` if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, VimayaError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("vimaya/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VimayaError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// The API root every request is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, VimayaError> {
        let token = self.token.as_deref().ok_or(VimayaError::NotAuthenticated)?;
        Ok(request
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, VimayaError> {
        let response = self.authorized(request)?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, body = %body, "{what} rejected");
        Err(VimayaError::Api(if body.is_empty() {
            format!("{what} failed: {status}")
        } else {
            format!("{what} failed: {status}: {body}")
        }))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, VimayaError> {
        Ok(self.send(request, what).await?.json().await?)
    }
}

#[async_trait]
impl SessionApi for HttpClient {
    async fn start_session(&self) -> Result<i64, VimayaError> {
        let request = self.http.post(self.url("/api/FocusSession/start"));
        let record: FocusSessionRecord = self.send_json(request, "Start focus session").await?;
        Ok(record.id)
    }

    async fn end_session(&self, duration_seconds: i64) -> Result<(), VimayaError> {
        let request = self
            .http
            .post(self.url("/api/FocusSession/end"))
            .json(&EndSessionBody { duration_seconds });
        self.send(request, "End focus session").await?;
        Ok(())
    }

    async fn add_xp(&self, amount: i64) -> Result<(), VimayaError> {
        let request = self
            .http
            .post(self.url("/api/User/updatexp"))
            .json(&AddXpBody { xp_to_add: amount });
        self.send(request, "Update XP").await?;
        Ok(())
    }

    async fn update_daily_statistics(
        &self,
        update: DailyStatisticsUpdate,
    ) -> Result<(), VimayaError> {
        let request = self
            .http
            .post(self.url("/api/DailyStatistics/update"))
            .json(&DailyStatisticsBody::from(&update));
        self.send(request, "Update daily statistics").await?;
        Ok(())
    }
}

#[async_trait]
impl PresenceSource for HttpClient {
    async fn list_active_friend_sessions(&self) -> Result<Vec<ActiveFriendSession>, VimayaError> {
        let request = self.http.get(self.url("/api/FocusSession/friends/active"));
        self.send_json(request, "Fetch active friend sessions").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, token: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            token: token.map(str::to_string),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let client = HttpClient::new(&config("https://example.test/", None)).unwrap();
        assert_eq!(client.base_url(), "https://example.test");
        assert_eq!(
            client.url("/api/FocusSession/start"),
            "https://example.test/api/FocusSession/start"
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        // Port 9 is never contacted: the token check happens first.
        let client = HttpClient::new(&config("http://127.0.0.1:9", None)).unwrap();

        let err = client.start_session().await.unwrap_err();
        assert!(matches!(err, VimayaError::NotAuthenticated));

        let err = client.list_active_friend_sessions().await.unwrap_err();
        assert!(matches!(err, VimayaError::NotAuthenticated));
    }
}
