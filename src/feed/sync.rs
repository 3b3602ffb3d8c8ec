//! Notification feed synchronizer.
//!
//! Keeps the rendered list eventually consistent with the server:
//! - the first load fetches every notification (newest first) and appends them;
//! - later polls fetch only items newer than the cursor (oldest first) and
//!   prepend them, so the newest ends up on top;
//! - the cursor only ever moves forward, to the newest timestamp of a non-empty batch.
//!
//! All operations take `&self` and may overlap. State sits behind a mutex that is
//! never held across a request. A refresh issued while another is in flight is
//! skipped, and responses that arrive after `unmount()` are dropped.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::state::{FeedFilter, FeedState, Indicators};
use crate::api::FeedApi;
use crate::errors::{AppError, Recovery};
use crate::models::{EntityId, Notification, NotificationKind, Timestamp};
use crate::notification::{Edge, ItemAction, RenderTarget, RenderedItem};

/// Server message for an invitation whose project no longer exists.
pub const PROJECT_REMOVED: &str = "The project has been removed.";

/// Route of the main dashboard view.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// The page hosting the feed. Accepting an invitation on the dashboard changes
/// the project list shown next to it, so that view reloads instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    Dashboard,
    Other(String),
}

impl ViewKind {
    pub fn from_route(route: &str) -> Self {
        if route.trim_end_matches('/') == DASHBOARD_ROUTE {
            ViewKind::Dashboard
        } else {
            ViewKind::Other(route.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied {
        inserted: usize,
        cursor: Option<Timestamp>,
    },
    /// Another refresh was in flight; nothing was requested.
    Skipped,
    /// The view went away before the response arrived.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkReadOutcome {
    Marked,
    AlreadyRead,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationOutcome {
    Removed,
    /// Accepted from the dashboard; the whole view reloads.
    Reloaded,
    Discarded,
}

/// Marker placed in the state while a request is on the wire.
enum Pending {
    Refresh,
    Read(EntityId),
}

impl Pending {
    fn clear<R>(&self, state: &mut FeedState<R>) {
        match self {
            Pending::Refresh => state.in_flight = false,
            Pending::Read(id) => {
                state.pending_reads.remove(id);
            }
        }
    }
}

/// Clears a [`Pending`] marker even when the request future is dropped
/// before the response arrives (timeout, `select!`, aborted task).
struct PendingGuard<'a, R> {
    state: &'a Mutex<FeedState<R>>,
    pending: Option<Pending>,
}

impl<'a, R> PendingGuard<'a, R> {
    fn new(state: &'a Mutex<FeedState<R>>, pending: Pending) -> Self {
        Self {
            state,
            pending: Some(pending),
        }
    }

    /// Clear the marker under a lock the caller already holds.
    fn release(mut self, state: &mut FeedState<R>) {
        if let Some(pending) = self.pending.take() {
            pending.clear(state);
        }
    }
}

impl<R> Drop for PendingGuard<'_, R> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            let mut state = lock(self.state);
            pending.clear(&mut *state);
        }
    }
}

// A panic inside a render target must not wedge the feed.
fn lock<R>(state: &Mutex<FeedState<R>>) -> MutexGuard<'_, FeedState<R>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct FeedSynchronizer<A, R> {
    api: A,
    view: ViewKind,
    state: Mutex<FeedState<R>>,
}

impl<A: FeedApi, R: RenderTarget> FeedSynchronizer<A, R> {
    pub fn new(api: A, target: R, view: ViewKind) -> Self {
        Self {
            api,
            view,
            state: Mutex::new(FeedState::new(target)),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState<R>> {
        lock(&self.state)
    }

    /// Report an error to the user and hand it back to the caller.
    fn fail(state: &mut FeedState<R>, err: AppError) -> AppError {
        warn!(error = %err, "notification action failed");
        state.target.surface(&err.recovery());
        err
    }

    pub fn view(&self) -> &ViewKind {
        &self.view
    }

    pub fn cursor(&self) -> Option<Timestamp> {
        self.state().cursor
    }

    pub fn snapshot(&self) -> Vec<RenderedItem> {
        self.state().items.clone()
    }

    pub fn indicators(&self) -> Indicators {
        self.state().indicators()
    }

    pub fn filter(&self) -> FeedFilter {
        self.state().filter
    }

    pub fn is_mounted(&self) -> bool {
        self.state().mounted
    }

    /// Run `f` against the render target.
    pub fn with_target<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.state().target)
    }

    /// Fetch and render whatever is new since the cursor.
    pub async fn refresh(&self) -> Result<RefreshOutcome, AppError> {
        let (since, guard) = {
            let mut state = self.state();
            if !state.mounted {
                return Ok(RefreshOutcome::Discarded);
            }
            if state.in_flight {
                debug!("refresh already in flight, skipping");
                return Ok(RefreshOutcome::Skipped);
            }
            state.in_flight = true;
            (state.cursor, PendingGuard::new(&self.state, Pending::Refresh))
        };

        let result = self.api.list_notifications(since).await;

        let mut state = self.state();
        guard.release(&mut state);
        if !state.mounted {
            debug!("view unmounted during refresh, dropping response");
            return Ok(RefreshOutcome::Discarded);
        }

        let batch = match result {
            Ok(batch) => batch,
            Err(e) => return Err(Self::fail(&mut state, e)),
        };

        let inserted = Self::apply_batch(&mut state, &batch, since.is_some());
        state.refresh_indicators();

        if inserted > 0 {
            info!(inserted, cursor = ?state.cursor, "notifications received");
        }
        Ok(RefreshOutcome::Applied {
            inserted,
            cursor: state.cursor,
        })
    }

    fn apply_batch(state: &mut FeedState<R>, batch: &[Notification], incremental: bool) -> usize {
        let edge = if incremental { Edge::Top } else { Edge::Bottom };
        let mut inserted = 0;

        for n in batch {
            if state.find(&n.id).is_some() {
                debug!(id = %n.id, "notification already rendered, skipping");
                continue;
            }
            state.insert(RenderedItem::from_notification(n), edge);
            inserted += 1;
        }

        let boundary = batch
            .iter()
            .map(|n| n.timestamp)
            .fold(None, |newest: Option<Timestamp>, ts| match newest {
                Some(current) if current >= ts => Some(current),
                _ => Some(ts),
            });
        if let Some(boundary) = boundary {
            state.advance_cursor(boundary);
        }

        inserted
    }

    /// Mark one notification read. Calling it again on a read item, or while
    /// a request for the same item is pending, is a no-op.
    pub async fn mark_read(&self, id: &EntityId) -> Result<MarkReadOutcome, AppError> {
        let guard = {
            let mut state = self.state();
            match state.find(id) {
                None => {
                    let err = AppError::NotFound(id.to_string());
                    return Err(Self::fail(&mut state, err));
                }
                Some(item) if item.is_read => return Ok(MarkReadOutcome::AlreadyRead),
                Some(_) => {}
            }
            if !state.pending_reads.insert(id.clone()) {
                debug!(id = %id, "mark read already pending, skipping");
                return Ok(MarkReadOutcome::AlreadyRead);
            }
            PendingGuard::new(&self.state, Pending::Read(id.clone()))
        };

        let result = self.api.mark_read(id).await;

        let mut state = self.state();
        guard.release(&mut state);
        if !state.mounted {
            return Ok(MarkReadOutcome::Discarded);
        }
        if let Err(e) = result {
            return Err(Self::fail(&mut state, e));
        }

        state.mark_read(id);
        state.refresh_indicators();
        Ok(MarkReadOutcome::Marked)
    }

    /// Mark every notification at or before `before` read. Returns how many
    /// rendered items flipped.
    pub async fn mark_all_read_before(&self, before: Timestamp) -> Result<usize, AppError> {
        let result = self.api.mark_read_before(before).await;

        let mut state = self.state();
        if !state.mounted {
            return Ok(0);
        }
        if let Err(e) = result {
            return Err(Self::fail(&mut state, e));
        }

        let flipped = state.mark_read_through(before);
        state.refresh_indicators();
        info!(flipped, before = %before, "marked notifications as read");
        Ok(flipped)
    }

    /// Mark everything up to the cursor read. Nothing to do before the first load.
    pub async fn mark_all_read(&self) -> Result<usize, AppError> {
        match self.cursor() {
            Some(cursor) => self.mark_all_read_before(cursor).await,
            None => Ok(0),
        }
    }

    /// Accept (join the project) or refuse (delete the notification) an invitation.
    pub async fn resolve_invitation(
        &self,
        id: &EntityId,
        accept: bool,
    ) -> Result<InvitationOutcome, AppError> {
        let project_id = {
            let mut state = self.state();
            let action = match state.find(id) {
                Some(item) if item.kind == NotificationKind::Invitation => item.action.clone(),
                Some(_) => {
                    let err = AppError::Application(format!("Notification {} is not an invitation.", id));
                    return Err(Self::fail(&mut state, err));
                }
                None => {
                    let err = AppError::NotFound(id.to_string());
                    return Err(Self::fail(&mut state, err));
                }
            };
            match action {
                ItemAction::Invitation { project_id } => project_id,
                _ => None,
            }
        };

        if !accept {
            return self.delete(id).await.map(|removed| {
                if removed {
                    InvitationOutcome::Removed
                } else {
                    InvitationOutcome::Discarded
                }
            });
        }

        let Some(project_id) = project_id else {
            let mut state = self.state();
            let err = AppError::Malformed(format!("invitation {} has no project", id));
            return Err(Self::fail(&mut state, err));
        };

        let result = self.api.join_project(&project_id).await;

        match result {
            Ok(()) => {
                let mut state = self.state();
                if !state.mounted {
                    return Ok(InvitationOutcome::Discarded);
                }
                info!(notification = %id, project = %project_id, "invitation accepted");
                if self.view == ViewKind::Dashboard {
                    state.target.reload();
                    Ok(InvitationOutcome::Reloaded)
                } else {
                    state.remove(id);
                    state.refresh_indicators();
                    Ok(InvitationOutcome::Removed)
                }
            }
            Err(e) if e.application_message() == Some(PROJECT_REMOVED) => {
                // The invitation is stale; drop it along with showing the message.
                // A failed delete is surfaced by `delete` itself. After a redirect
                // there is no view left to show the banner on.
                if let Err(delete_err) = self.delete(id).await {
                    if matches!(delete_err.recovery(), Recovery::Redirect(_)) {
                        return Err(delete_err);
                    }
                }
                let mut state = self.state();
                if !state.mounted {
                    return Err(e);
                }
                Err(Self::fail(&mut state, e))
            }
            Err(e) => {
                let mut state = self.state();
                if !state.mounted {
                    return Err(e);
                }
                Err(Self::fail(&mut state, e))
            }
        }
    }

    /// Delete a notification. Returns `false` when the view went away meanwhile.
    pub async fn delete(&self, id: &EntityId) -> Result<bool, AppError> {
        let result = self.api.delete_notification(id).await;

        let mut state = self.state();
        if !state.mounted {
            return Ok(false);
        }
        if let Err(e) = result {
            return Err(Self::fail(&mut state, e));
        }

        state.remove(id);
        state.refresh_indicators();
        Ok(true)
    }

    /// Mark an issue-linked notification read, then navigate to the issue.
    pub async fn open_issue(&self, id: &EntityId) -> Result<String, AppError> {
        let route = {
            let mut state = self.state();
            let route = state.find(id).map(|item| item.action.issue_route());
            match route {
                Some(Some(route)) => route,
                Some(None) => {
                    let err = AppError::Application(format!("Notification {} does not link to an issue.", id));
                    return Err(Self::fail(&mut state, err));
                }
                None => {
                    let err = AppError::NotFound(id.to_string());
                    return Err(Self::fail(&mut state, err));
                }
            }
        };

        if self.mark_read(id).await? == MarkReadOutcome::Discarded {
            return Ok(route);
        }

        self.state().target.navigate(&route);
        Ok(route)
    }

    pub fn set_filter(&self, filter: FeedFilter) {
        let mut state = self.state();
        state.filter = filter;
        state.refresh_indicators();
    }

    /// The hosting view is gone: later responses are ignored and polling stops.
    pub fn unmount(&self) {
        let mut state = self.state();
        state.mounted = false;
        debug!("notification feed unmounted");
    }
}
