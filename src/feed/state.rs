use std::collections::HashSet;

use crate::models::{EntityId, Timestamp};
use crate::notification::{Edge, RenderTarget, RenderedItem};

/// Which part of the feed the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFilter {
    #[default]
    All,
    UnreadOnly,
}

/// Aggregate state shown around the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicators {
    /// Bell shows the "active" icon.
    pub bell_active: bool,
    /// "No notifications" banner is visible.
    pub no_notifications: bool,
    /// "No unread notifications" banner is visible.
    pub no_unread: bool,
}

impl Indicators {
    pub fn compute(items: &[RenderedItem], filter: FeedFilter) -> Self {
        let any_unread = items.iter().any(|i| !i.is_read);
        let (no_notifications, no_unread) = match filter {
            FeedFilter::UnreadOnly => (false, !any_unread),
            FeedFilter::All => (items.is_empty(), false),
        };
        Self {
            bell_active: any_unread,
            no_notifications,
            no_unread,
        }
    }
}

/// Everything the synchronizer mutates. Lives behind one lock; the render target
/// is only touched together with the snapshot it mirrors.
pub(crate) struct FeedState<R> {
    pub cursor: Option<Timestamp>,
    /// Rendered list, top to bottom.
    pub items: Vec<RenderedItem>,
    pub in_flight: bool,
    /// Items with a mark-read request on the wire.
    pub pending_reads: HashSet<EntityId>,
    pub mounted: bool,
    pub filter: FeedFilter,
    pub target: R,
}

impl<R: RenderTarget> FeedState<R> {
    pub fn new(target: R) -> Self {
        Self {
            cursor: None,
            items: Vec::new(),
            in_flight: false,
            pending_reads: HashSet::new(),
            mounted: true,
            filter: FeedFilter::default(),
            target,
        }
    }

    pub fn find(&self, id: &EntityId) -> Option<&RenderedItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn insert(&mut self, item: RenderedItem, edge: Edge) {
        self.target.apply_insert(&item, edge);
        match edge {
            Edge::Top => self.items.insert(0, item),
            Edge::Bottom => self.items.push(item),
        }
    }

    /// Returns `false` when the item is unknown or already read.
    pub fn mark_read(&mut self, id: &EntityId) -> bool {
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) if !item.is_read => {
                item.is_read = true;
                self.target.apply_mark_read(id);
                true
            }
            _ => false,
        }
    }

    /// Flip every unread item at or before `before`; returns how many flipped.
    pub fn mark_read_through(&mut self, before: Timestamp) -> usize {
        let ids: Vec<EntityId> = self
            .items
            .iter()
            .filter(|i| !i.is_read && i.timestamp <= before)
            .map(|i| i.id.clone())
            .collect();
        ids.iter().filter(|id| self.mark_read(id)).count()
    }

    pub fn remove(&mut self, id: &EntityId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.target.apply_remove(id);
        }
        removed
    }

    /// Move the cursor forward; a boundary at or behind the current one is ignored.
    pub fn advance_cursor(&mut self, boundary: Timestamp) {
        match self.cursor {
            Some(current) if boundary <= current => {}
            _ => self.cursor = Some(boundary),
        }
    }

    pub fn indicators(&self) -> Indicators {
        Indicators::compute(&self.items, self.filter)
    }

    pub fn refresh_indicators(&mut self) {
        let indicators = self.indicators();
        self.target.apply_indicators(&indicators);
    }
}
