use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque server identifier. The server sends integers; strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Str(s) => Self(s),
        })
    }
}

/// Unix timestamp in (fractional) seconds. Doubles as the feed cursor value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub f64);

impl Timestamp {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis() as f64 / 1000.0)
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt((self.0 * 1000.0).round() as i64).single()
    }

    /// Relative description such as "3 minutes ago".
    pub fn time_ago(self, now: DateTime<Utc>) -> String {
        let Some(then) = self.to_datetime() else {
            return "some time ago".to_string();
        };
        let secs = (now - then).num_seconds().max(0);
        let mins = (secs as f64 / 60.0).round() as i64;
        let hours = (secs as f64 / 3600.0).round() as i64;
        let days = (secs as f64 / 86_400.0).round() as i64;

        match secs {
            s if s < 45 => "a few seconds ago".to_string(),
            s if s < 90 => "a minute ago".to_string(),
            s if s < 45 * 60 => format!("{} minutes ago", mins),
            s if s < 90 * 60 => "an hour ago".to_string(),
            s if s < 22 * 3600 => format!("{} hours ago", hours),
            s if s < 36 * 3600 => "a day ago".to_string(),
            s if s < 26 * 86_400 => format!("{} days ago", days),
            s if s < 45 * 86_400 => "a month ago".to_string(),
            s if s < 320 * 86_400 => format!("{} months ago", (days as f64 / 30.4).round() as i64),
            s if s < 548 * 86_400 => "a year ago".to_string(),
            _ => format!("{} years ago", (days as f64 / 365.25).round() as i64),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Secs(f64),
            Rfc3339(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Secs(secs) => Ok(Self(secs)),
            Raw::Rfc3339(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Event tag of a notification. Unrecognised tags are preserved, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    Invitation,
    JoinProject,
    QuitProject,
    RemoveUser,
    ChangeRole,
    DeleteProject,
    /// Emitted by the legacy tracker for the same event as `DeleteProject`.
    ProjectDeleted,
    /// Legacy tag for `RemoveUser`.
    UserRemoved,
    NewIssue,
    DeleteIssue,
    AssignIssue,
    RemoveAssignee,
    MarkOpen,
    MarkInProgress,
    MarkResolved,
    MarkClosed,
    NewComment,
    Unknown(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Invitation => "invitation",
            Self::JoinProject => "join project",
            Self::QuitProject => "quit project",
            Self::RemoveUser => "remove user",
            Self::ChangeRole => "change role",
            Self::DeleteProject => "delete project",
            Self::ProjectDeleted => "project deleted",
            Self::UserRemoved => "user removed",
            Self::NewIssue => "new issue",
            Self::DeleteIssue => "delete issue",
            Self::AssignIssue => "assign issue",
            Self::RemoveAssignee => "remove assignee",
            Self::MarkOpen => "mark open",
            Self::MarkInProgress => "mark in progress",
            Self::MarkResolved => "mark resolved",
            Self::MarkClosed => "mark closed",
            Self::NewComment => "new comment",
            Self::Unknown(name) => name,
        }
    }

    /// Kinds whose item links to the issue it refers to.
    pub fn links_to_issue(&self) -> bool {
        matches!(
            self,
            Self::AssignIssue | Self::MarkInProgress | Self::NewComment
        )
    }
}

impl From<String> for NotificationKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "invitation" => Self::Invitation,
            "join project" => Self::JoinProject,
            "quit project" => Self::QuitProject,
            "remove user" => Self::RemoveUser,
            "change role" => Self::ChangeRole,
            "delete project" => Self::DeleteProject,
            "project deleted" => Self::ProjectDeleted,
            "user removed" => Self::UserRemoved,
            "new issue" => Self::NewIssue,
            "delete issue" => Self::DeleteIssue,
            "assign issue" => Self::AssignIssue,
            "remove assignee" => Self::RemoveAssignee,
            "mark open" => Self::MarkOpen,
            "mark in progress" => Self::MarkInProgress,
            "mark resolved" => Self::MarkResolved,
            "mark closed" => Self::MarkClosed,
            "new comment" => Self::NewComment,
            _ => Self::Unknown(name),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "notificationId", alias = "id")]
    pub id: EntityId,
    #[serde(rename = "name", alias = "kind")]
    pub kind: NotificationKind,
    /// Project or issue the event is about.
    #[serde(rename = "targetId", default)]
    pub target_id: Option<EntityId>,
    #[serde(rename = "data", alias = "payload", default)]
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
    #[serde(rename = "isRead", default)]
    pub is_read: bool,
}

impl Notification {
    /// String field of the payload, if present and non-empty.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Payload field that may be sent as either a number or a string.
    pub fn payload_id(&self, key: &str) -> Option<EntityId> {
        match self.payload.get(key)? {
            serde_json::Value::Number(n) => Some(EntityId(n.to_string())),
            serde_json::Value::String(s) if !s.is_empty() => Some(EntityId(s.clone())),
            _ => None,
        }
    }
}
