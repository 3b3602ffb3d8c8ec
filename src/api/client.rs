//! reqwest-backed client for the tracker's notification, search and form endpoints.
//!
//! Redirects are never followed: the tracker answers an expired session with a
//! redirect to its login page, which is reported as a transport failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::response::parse_response;
use super::{FeedApi, FormApi, UserSearchApi};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{Ack, EntityId, Notification, NotificationBatch, Timestamp, UserMatch, UserSearch};

const ACCEPT: &str = "application/json, text/html";

#[derive(Clone)]
pub struct HttpFeedApi {
    base_url: Url,
    http: Client,
    session_cookie: Option<String>,
}

impl HttpFeedApi {
    pub fn new(
        base_url: Url,
        timeout: Duration,
        session_cookie: Option<String>,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("feedsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: with_trailing_slash(base_url),
            http,
            session_cookie,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, AppError> {
        Self::new(
            cfg.base_url.clone(),
            cfg.request_timeout,
            cfg.session_cookie.clone(),
        )
    }

    /// Resolve a server path (with or without a leading slash) under the base URL.
    fn url(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid path '{}': {}", path, e)))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, AppError> {
        let url = self.url(path)?;
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, ACCEPT)
            .header("x-request-id", &request_id);

        if let Some(cookie) = &self.session_cookie {
            req = req.header(header::COOKIE, cookie.as_str());
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(%method, %url, request_id = %request_id, error = %e, "request failed");
            AppError::Transport(e.to_string())
        })?;

        let status = resp.status();
        if status.is_redirection() {
            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            warn!(%method, %url, %status, location = %location, "request was redirected");
            return Err(AppError::Transport(format!(
                "redirected to '{}' (session expired?)",
                location
            )));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("failed to read response: {}", e)))?;

        debug!(%method, %url, request_id = %request_id, status = status.as_u16(), "response received");
        parse_response(status.as_u16(), &text)
    }
}

#[async_trait]
impl FeedApi for HttpFeedApi {
    async fn list_notifications(
        &self,
        since: Option<Timestamp>,
    ) -> Result<Vec<Notification>, AppError> {
        let path = match since {
            Some(ts) => format!("/notifications?since={}", ts),
            None => "/notifications".to_string(),
        };
        let batch: NotificationBatch = self.send(Method::GET, &path, None).await?;
        Ok(batch.notifications)
    }

    async fn mark_read(&self, id: &EntityId) -> Result<(), AppError> {
        let path = format!("/notifications/read?id={}", urlencoding::encode(id.as_str()));
        let _: Ack = self.send(Method::POST, &path, None).await?;
        Ok(())
    }

    async fn mark_read_before(&self, before: Timestamp) -> Result<(), AppError> {
        let path = format!("/notifications/read?before={}", before);
        let _: Ack = self.send(Method::POST, &path, None).await?;
        Ok(())
    }

    async fn delete_notification(&self, id: &EntityId) -> Result<(), AppError> {
        let path = format!("/notifications/{}/delete", urlencoding::encode(id.as_str()));
        let _: Ack = self.send(Method::POST, &path, None).await?;
        Ok(())
    }

    async fn join_project(&self, project_id: &EntityId) -> Result<(), AppError> {
        let path = format!("/projects/{}/join", urlencoding::encode(project_id.as_str()));
        let _: Ack = self.send(Method::POST, &path, None).await?;
        Ok(())
    }
}

#[async_trait]
impl UserSearchApi for HttpFeedApi {
    async fn search_users(
        &self,
        search_path: &str,
        term: &str,
    ) -> Result<Vec<UserMatch>, AppError> {
        let sep = if search_path.contains('?') { '&' } else { '?' };
        let path = format!("{}{}search={}", search_path, sep, urlencoding::encode(term));
        let found: UserSearch = self.send(Method::GET, &path, None).await?;
        Ok(found.users)
    }
}

#[async_trait]
impl FormApi for HttpFeedApi {
    async fn submit_form(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Map<String, serde_json::Value>, AppError> {
        self.send(Method::POST, url, Some(body)).await
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
