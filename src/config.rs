use std::time::Duration;

use anyhow::Context;
use url::Url;

use crate::feed::ViewKind;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the tracker, e.g. `http://127.0.0.1:5000`.
    pub base_url: Url,
    /// How often the feed is polled. Set via FEEDSYNC_POLL_INTERVAL_SECS. Default: 20.
    pub poll_interval: Duration,
    /// Quiet window before an invite search fires. Set via FEEDSYNC_DEBOUNCE_MS. Default: 250.
    pub debounce: Duration,
    pub request_timeout: Duration,
    /// Raw `Cookie` header value carrying the tracker session.
    pub session_cookie: Option<String>,
    /// Route of the page hosting the feed.
    pub view_route: String,
    pub log_json: bool,
}

impl Config {
    pub fn view(&self) -> ViewKind {
        ViewKind::from_route(&self.view_route)
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("FEEDSYNC_BASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:5000".into());
    let base_url = Url::parse(&base_url)
        .with_context(|| format!("FEEDSYNC_BASE_URL is not a valid URL: {}", base_url))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        anyhow::bail!("FEEDSYNC_BASE_URL must be http(s), got '{}'", base_url.scheme());
    }

    Ok(Config {
        base_url,
        poll_interval: Duration::from_secs(env_or("FEEDSYNC_POLL_INTERVAL_SECS", 20).max(1)),
        debounce: Duration::from_millis(env_or("FEEDSYNC_DEBOUNCE_MS", 250)),
        request_timeout: Duration::from_secs(env_or("FEEDSYNC_REQUEST_TIMEOUT_SECS", 30)),
        session_cookie: std::env::var("FEEDSYNC_SESSION_COOKIE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        view_route: std::env::var("FEEDSYNC_VIEW").unwrap_or_else(|_| "/dashboard".into()),
        log_json: std::env::var("FEEDSYNC_LOG_JSON")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false),
    })
}

fn env_or(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
