//! Human-readable text for each notification kind.
//!
//! Each known kind maps to a template over its payload. A missing payload field,
//! like an unknown kind, falls back to a generic message so nothing is ever
//! dropped from the feed.

use crate::models::{EntityId, Notification, NotificationKind};

pub const FALLBACK_MESSAGE: &str = "sent you a new notification.";
const UNKNOWN_ACTOR: &str = "Someone";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub actor: String,
    pub avatar: Option<String>,
    pub text: String,
}

/// Affordance attached to a rendered item besides "mark as read".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    /// Accept / refuse buttons. `project_id` is absent when the server omitted the target.
    Invitation { project_id: Option<EntityId> },
    /// Link to the issue the event is about.
    OpenIssue {
        project_id: EntityId,
        issue_id: EntityId,
    },
    None,
}

impl ItemAction {
    pub fn for_notification(n: &Notification) -> Self {
        match &n.kind {
            NotificationKind::Invitation => ItemAction::Invitation {
                project_id: n.target_id.clone(),
            },
            kind if kind.links_to_issue() => {
                match (n.payload_id("projectId"), n.target_id.clone()) {
                    (Some(project_id), Some(issue_id)) => ItemAction::OpenIssue {
                        project_id,
                        issue_id,
                    },
                    _ => ItemAction::None,
                }
            }
            _ => ItemAction::None,
        }
    }

    pub fn issue_route(&self) -> Option<String> {
        match self {
            ItemAction::OpenIssue {
                project_id,
                issue_id,
            } => Some(format!("/projects/{}/issues/{}", project_id, issue_id)),
            _ => None,
        }
    }
}

/// Message text for a known kind, or `None` when the kind is unknown or a
/// required payload field is missing.
fn describe(n: &Notification) -> Option<String> {
    let text = match &n.kind {
        NotificationKind::Invitation => format!(
            "invited you to be a {} in {}.",
            n.payload_str("roleName")?,
            n.payload_str("projectTitle")?
        ),
        NotificationKind::JoinProject => {
            format!("joined your project {}.", n.payload_str("projectTitle")?)
        }
        NotificationKind::QuitProject => format!("left {}.", n.payload_str("projectTitle")?),
        NotificationKind::RemoveUser => {
            format!("removed you from {}.", n.payload_str("projectTitle")?)
        }
        NotificationKind::UserRemoved => {
            format!("removed you from project {}.", n.payload_str("projectTitle")?)
        }
        NotificationKind::ChangeRole => format!(
            "changed your role in {} to {}.",
            n.payload_str("projectTitle")?,
            n.payload_str("newRole")?
        ),
        NotificationKind::DeleteProject => format!("deleted {}.", n.payload_str("projectTitle")?),
        NotificationKind::ProjectDeleted => {
            format!("{} was deleted.", n.payload_str("projectTitle")?)
        }
        NotificationKind::NewIssue => format!(
            "created a new issue {} in {}.",
            n.payload_str("issueTitle")?,
            n.payload_str("projectTitle")?
        ),
        NotificationKind::DeleteIssue => format!(
            "deleted the issue {} in {}.",
            n.payload_str("issueTitle")?,
            n.payload_str("projectTitle")?
        ),
        NotificationKind::AssignIssue => "assigned you a new issue.".to_string(),
        NotificationKind::RemoveAssignee => format!(
            "assigned the issue {} to another member.",
            n.payload_str("issueTitle")?
        ),
        NotificationKind::MarkOpen => format!(
            "marked the closed issue {} as Open.",
            n.payload_str("issueTitle")?
        ),
        NotificationKind::MarkInProgress => format!(
            "marked the {} issue {} as In Progress.",
            n.payload_str("preStatus")?,
            n.payload_str("issueTitle")?
        ),
        NotificationKind::MarkResolved => format!(
            "marked the issue {} as Resolved.",
            n.payload_str("issueTitle")?
        ),
        NotificationKind::MarkClosed => format!(
            "marked the issue {} as Closed.",
            n.payload_str("issueTitle")?
        ),
        NotificationKind::NewComment => "submitted a new comment.".to_string(),
        NotificationKind::Unknown(_) => return None,
    };
    Some(text)
}

pub fn render(n: &Notification) -> Message {
    let text = match describe(n) {
        Some(text) => text,
        None => {
            tracing::debug!(kind = %n.kind, id = %n.id, "rendering notification with fallback message");
            FALLBACK_MESSAGE.to_string()
        }
    };

    let actor = n
        .payload_str("fullname")
        .or_else(|| n.payload_str("invitorName"))
        .or_else(|| n.payload_str("userName"))
        .unwrap_or(UNKNOWN_ACTOR)
        .to_string();

    Message {
        actor,
        avatar: n.payload_str("avatar").map(String::from),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timestamp;
    use serde_json::json;

    fn notification(kind: &str, target: Option<&str>, data: serde_json::Value) -> Notification {
        Notification {
            id: EntityId::from("1"),
            kind: NotificationKind::from(kind.to_string()),
            target_id: target.map(EntityId::from),
            payload: data,
            timestamp: Timestamp(100.0),
            is_read: false,
        }
    }

    #[test]
    fn test_invitation_message() {
        let n = notification(
            "invitation",
            Some("9"),
            json!({"fullname": "Grace Hopper", "avatar": "/a.png", "roleName": "Developer", "projectTitle": "Compiler"}),
        );
        let msg = render(&n);
        assert_eq!(msg.actor, "Grace Hopper");
        assert_eq!(msg.avatar.as_deref(), Some("/a.png"));
        assert_eq!(msg.text, "invited you to be a Developer in Compiler.");
        assert_eq!(
            ItemAction::for_notification(&n),
            ItemAction::Invitation {
                project_id: Some(EntityId::from("9"))
            }
        );
    }

    #[test]
    fn test_issue_transition_message() {
        let n = notification(
            "mark in progress",
            Some("33"),
            json!({"fullname": "Linus", "preStatus": "Open", "issueTitle": "Crash on start", "projectId": 2}),
        );
        assert_eq!(
            render(&n).text,
            "marked the Open issue Crash on start as In Progress."
        );
        assert_eq!(
            ItemAction::for_notification(&n).issue_route().as_deref(),
            Some("/projects/2/issues/33")
        );
    }

    #[test]
    fn test_change_role_message() {
        let n = notification(
            "change role",
            Some("5"),
            json!({"fullname": "Ken", "projectTitle": "Unix", "newRole": "Admin"}),
        );
        assert_eq!(render(&n).text, "changed your role in Unix to Admin.");
        assert_eq!(ItemAction::for_notification(&n), ItemAction::None);
    }

    #[test]
    fn test_legacy_project_deleted_uses_invitor_name() {
        let n = notification(
            "project deleted",
            None,
            json!({"invitorName": "Dennis", "projectTitle": "Plan 9"}),
        );
        let msg = render(&n);
        assert_eq!(msg.actor, "Dennis");
        assert_eq!(msg.text, "Plan 9 was deleted.");
    }

    #[test]
    fn test_legacy_membership_tags() {
        let joined = notification(
            "join project",
            Some("4"),
            json!({"userName": "Ken Thompson", "projectTitle": "Unix"}),
        );
        let msg = render(&joined);
        assert_eq!(msg.actor, "Ken Thompson");
        assert_eq!(msg.text, "joined your project Unix.");

        let removed = notification("user removed", Some("4"), json!({"projectTitle": "Unix"}));
        assert_eq!(
            NotificationKind::from("user removed".to_string()),
            NotificationKind::UserRemoved
        );
        assert_eq!(render(&removed).text, "removed you from project Unix.");
    }

    #[test]
    fn test_unknown_kind_falls_back() {
        let n = notification("archive project", Some("1"), json!({"fullname": "Barbara"}));
        let msg = render(&n);
        assert_eq!(msg.actor, "Barbara");
        assert_eq!(msg.text, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_missing_required_field_falls_back() {
        let n = notification("new issue", Some("1"), json!({"issueTitle": "No project"}));
        let msg = render(&n);
        assert_eq!(msg.actor, "Someone");
        assert_eq!(msg.text, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_issue_link_requires_project_and_target() {
        let n = notification("new comment", None, json!({"projectId": 2}));
        assert_eq!(ItemAction::for_notification(&n), ItemAction::None);
        assert_eq!(render(&n).text, "submitted a new comment.");
    }
}
