pub mod client;
pub mod response;

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{EntityId, Notification, Timestamp, UserMatch};

pub use client::HttpFeedApi;

/// Notification endpoints of the tracker.
/// Implementations: HttpFeedApi (reqwest), in-memory fakes in tests.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// `GET /notifications`, or `?since=<ts>` for items strictly newer than `ts`.
    async fn list_notifications(
        &self,
        since: Option<Timestamp>,
    ) -> Result<Vec<Notification>, AppError>;

    /// `POST /notifications/read?id=<id>`
    async fn mark_read(&self, id: &EntityId) -> Result<(), AppError>;

    /// `POST /notifications/read?before=<ts>`
    async fn mark_read_before(&self, before: Timestamp) -> Result<(), AppError>;

    /// `POST /notifications/<id>/delete`
    async fn delete_notification(&self, id: &EntityId) -> Result<(), AppError>;

    /// `POST /projects/<id>/join`
    async fn join_project(&self, project_id: &EntityId) -> Result<(), AppError>;
}

/// Invitable-user lookup used by the invite autocomplete.
#[async_trait]
pub trait UserSearchApi: Send + Sync {
    /// `GET <search_path>?search=<term>`; the path is designated by the server.
    async fn search_users(&self, search_path: &str, term: &str)
        -> Result<Vec<UserMatch>, AppError>;
}

/// Form submission: one POST of a JSON body to a server-designated URL.
#[async_trait]
pub trait FormApi: Send + Sync {
    /// Returns the side-channel data of the envelope (everything but `success`/`error`).
    async fn submit_form(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Map<String, serde_json::Value>, AppError>;
}

#[async_trait]
impl<T: FeedApi + ?Sized> FeedApi for Arc<T> {
    async fn list_notifications(
        &self,
        since: Option<Timestamp>,
    ) -> Result<Vec<Notification>, AppError> {
        (**self).list_notifications(since).await
    }

    async fn mark_read(&self, id: &EntityId) -> Result<(), AppError> {
        (**self).mark_read(id).await
    }

    async fn mark_read_before(&self, before: Timestamp) -> Result<(), AppError> {
        (**self).mark_read_before(before).await
    }

    async fn delete_notification(&self, id: &EntityId) -> Result<(), AppError> {
        (**self).delete_notification(id).await
    }

    async fn join_project(&self, project_id: &EntityId) -> Result<(), AppError> {
        (**self).join_project(project_id).await
    }
}

#[async_trait]
impl<T: UserSearchApi + ?Sized> UserSearchApi for Arc<T> {
    async fn search_users(
        &self,
        search_path: &str,
        term: &str,
    ) -> Result<Vec<UserMatch>, AppError> {
        (**self).search_users(search_path, term).await
    }
}
