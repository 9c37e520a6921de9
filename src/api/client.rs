use super::types::{LogEntry, Message, PromptRequest, Session, SessionCreate, User};
use crate::error::TransportError;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// REST client for the session backend.
///
/// Carries no retry or backoff policy: every failure propagates once and
/// leaves the caller in a re-attemptable state.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against `base_url` (trailing slash tolerated).
    ///
    /// Only a connect timeout is set: the streaming endpoint holds its
    /// response open for the lifetime of a model turn, so a total request
    /// timeout would sever it mid-answer.
    pub fn new(base_url: &str) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_users(&self) -> Result<Vec<User>, TransportError> {
        self.get_json("/api/users").await
    }

    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, TransportError> {
        self.get_json(&format!("/api/users/{user_id}/sessions")).await
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Session, TransportError> {
        self.post_json("/api/sessions", &SessionCreate { user_id, title })
            .await
    }

    pub async fn messages(&self, session_id: &str) -> Result<Vec<Message>, TransportError> {
        self.get_json(&format!("/api/sessions/{session_id}/messages"))
            .await
    }

    pub async fn logs(&self, session_id: &str) -> Result<Vec<LogEntry>, TransportError> {
        self.get_json(&format!("/api/sessions/{session_id}/logs"))
            .await
    }

    /// Open the streaming call. Returns the checked response; the caller
    /// consumes `bytes_stream()` and feeds the frame decoder.
    pub async fn stream_prompt(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> Result<Response, TransportError> {
        let url = format!("{}/api/sessions/{session_id}/messages/stream", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&PromptRequest { prompt })
            .send()
            .await?;
        check("POST", url, response).await
    }

    /// Out-of-band interrupt. The backend answers 204; the existing stream
    /// keeps trickling and is treated as advisory by the caller.
    pub async fn interrupt(&self, session_id: &str) -> Result<(), TransportError> {
        let url = format!("{}/api/sessions/{session_id}/interrupt", self.base_url);
        let response = self.http.post(&url).send().await?;
        check("POST", url, response).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        let response = check("GET", url, response).await?;
        Ok(response.json().await?)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        let response = check("POST", url, response).await?;
        Ok(response.json().await?)
    }
}

/// Map non-2xx responses to a failure carrying status and body text.
async fn check(
    method: &'static str,
    url: String,
    response: Response,
) -> Result<Response, TransportError> {
    let status = response.status();
    // 204 is a success with no payload; callers that expect a body never
    // get one here.
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%url, status = status.as_u16(), "request failed");
    Err(TransportError::Http {
        method,
        url,
        status: status.as_u16(),
        body,
    })
}
