//! In-memory tracker used by the synchronizer tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use feedsync::api::FeedApi;
use feedsync::errors::AppError;
use feedsync::models::{EntityId, Notification, NotificationKind, Timestamp};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Option<Timestamp>),
    MarkRead(String),
    MarkReadBefore(Timestamp),
    Delete(String),
    Join(String),
}

#[derive(Default)]
pub struct FakeTracker {
    pub notifications: Mutex<Vec<Notification>>,
    pub calls: Mutex<Vec<Call>>,
    /// Errors handed out, in order, instead of performing the next calls.
    pub failures: Mutex<VecDeque<AppError>>,
    /// When set, `list_notifications` waits for a permit before answering.
    pub gate: Option<Arc<Notify>>,
    /// When set, `mark_read` waits for a permit before answering.
    pub read_gate: Option<Arc<Notify>>,
    /// Answer every list call with the full feed, as a server ignoring `since` would.
    pub ignore_since: bool,
}

impl FakeTracker {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self {
            notifications: Mutex::new(notifications),
            ..Default::default()
        }
    }

    pub fn push(&self, n: Notification) {
        self.notifications.lock().unwrap().push(n);
    }

    pub fn fail_next(&self, err: AppError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FeedApi for FakeTracker {
    async fn list_notifications(
        &self,
        since: Option<Timestamp>,
    ) -> Result<Vec<Notification>, AppError> {
        let outcome = self.record(Call::List(since));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        outcome?;

        let mut all = self.notifications.lock().unwrap().clone();
        match since {
            Some(since) if !self.ignore_since => {
                all.retain(|n| n.timestamp > since);
                all.sort_by(|a, b| a.timestamp.partial_cmp(&b.timestamp).unwrap());
            }
            _ => all.sort_by(|a, b| b.timestamp.partial_cmp(&a.timestamp).unwrap()),
        }
        Ok(all)
    }

    async fn mark_read(&self, id: &EntityId) -> Result<(), AppError> {
        let outcome = self.record(Call::MarkRead(id.to_string()));
        if let Some(gate) = &self.read_gate {
            gate.notified().await;
        }
        outcome?;
        let mut all = self.notifications.lock().unwrap();
        match all.iter_mut().find(|n| &n.id == id) {
            Some(n) if n.is_read => Err(AppError::Application(
                "You have already marked this notification as read.".into(),
            )),
            Some(n) => {
                n.is_read = true;
                Ok(())
            }
            None => Err(AppError::Status {
                status: 404,
                message: "not found".into(),
            }),
        }
    }

    async fn mark_read_before(&self, before: Timestamp) -> Result<(), AppError> {
        self.record(Call::MarkReadBefore(before))?;
        for n in self.notifications.lock().unwrap().iter_mut() {
            if n.timestamp <= before {
                n.is_read = true;
            }
        }
        Ok(())
    }

    async fn delete_notification(&self, id: &EntityId) -> Result<(), AppError> {
        self.record(Call::Delete(id.to_string()))?;
        self.notifications.lock().unwrap().retain(|n| &n.id != id);
        Ok(())
    }

    async fn join_project(&self, project_id: &EntityId) -> Result<(), AppError> {
        self.record(Call::Join(project_id.to_string()))
    }
}

pub fn issue_event(id: &str, ts: f64) -> Notification {
    Notification {
        id: EntityId::from(id),
        kind: NotificationKind::NewIssue,
        target_id: Some(EntityId::from("100")),
        payload: json!({
            "fullname": "Margaret Hamilton",
            "avatar": "/static/avatars/mh.png",
            "issueTitle": format!("Issue {}", id),
            "projectTitle": "Apollo",
        }),
        timestamp: Timestamp(ts),
        is_read: false,
    }
}

pub fn invitation(id: &str, project: &str, ts: f64) -> Notification {
    Notification {
        id: EntityId::from(id),
        kind: NotificationKind::Invitation,
        target_id: Some(EntityId::from(project)),
        payload: json!({
            "fullname": "Katherine Johnson",
            "roleName": "Developer",
            "projectTitle": "Trajectory",
        }),
        timestamp: Timestamp(ts),
        is_read: false,
    }
}

pub fn comment(id: &str, issue: &str, project: i64, ts: f64) -> Notification {
    Notification {
        id: EntityId::from(id),
        kind: NotificationKind::NewComment,
        target_id: Some(EntityId::from(issue)),
        payload: json!({"fullname": "Dorothy Vaughan", "projectId": project}),
        timestamp: Timestamp(ts),
        is_read: false,
    }
}
