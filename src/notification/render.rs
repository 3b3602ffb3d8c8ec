use crate::errors::Recovery;
use crate::feed::Indicators;
use crate::models::{EntityId, Notification, NotificationKind, Timestamp};

use super::message::{self, ItemAction, Message};

/// Which end of the list an item is inserted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// Projection of one notification as shown in the list.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedItem {
    pub id: EntityId,
    pub kind: NotificationKind,
    pub timestamp: Timestamp,
    pub is_read: bool,
    pub message: Message,
    pub action: ItemAction,
}

impl RenderedItem {
    pub fn from_notification(n: &Notification) -> Self {
        Self {
            id: n.id.clone(),
            kind: n.kind.clone(),
            timestamp: n.timestamp,
            is_read: n.is_read,
            message: message::render(n),
            action: ItemAction::for_notification(n),
        }
    }

    /// Whether the "mark as read" affordance is shown.
    pub fn can_mark_read(&self) -> bool {
        !self.is_read
    }
}

/// Whatever displays the feed: a document tree, a terminal, a test double.
///
/// The synchronizer owns the list state and only tells the target what changed.
pub trait RenderTarget: Send {
    fn apply_insert(&mut self, item: &RenderedItem, edge: Edge);

    /// Switch an item to the read state and drop its "mark as read" affordance.
    fn apply_mark_read(&mut self, id: &EntityId);

    fn apply_remove(&mut self, id: &EntityId);

    /// Bell icon and empty-state banners.
    fn apply_indicators(&mut self, indicators: &Indicators);

    fn show_banner(&mut self, message: &str);

    fn navigate(&mut self, route: &str);

    /// Full reload of the current view.
    fn reload(&mut self);

    fn surface(&mut self, recovery: &Recovery) {
        match recovery {
            Recovery::Redirect(route) => self.navigate(route),
            Recovery::Banner(message) => self.show_banner(message),
        }
    }
}

/// In-memory list mirroring what a document would show.
#[derive(Debug, Default)]
pub struct MemoryView {
    pub items: Vec<RenderedItem>,
    pub indicators: Option<Indicators>,
    pub banners: Vec<String>,
    pub navigations: Vec<String>,
    pub reloads: usize,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers top to bottom.
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.id.to_string()).collect()
    }

    pub fn get(&self, id: &EntityId) -> Option<&RenderedItem> {
        self.items.iter().find(|i| &i.id == id)
    }
}

impl RenderTarget for MemoryView {
    fn apply_insert(&mut self, item: &RenderedItem, edge: Edge) {
        match edge {
            Edge::Top => self.items.insert(0, item.clone()),
            Edge::Bottom => self.items.push(item.clone()),
        }
    }

    fn apply_mark_read(&mut self, id: &EntityId) {
        if let Some(item) = self.items.iter_mut().find(|i| &i.id == id) {
            item.is_read = true;
        }
    }

    fn apply_remove(&mut self, id: &EntityId) {
        self.items.retain(|i| &i.id != id);
    }

    fn apply_indicators(&mut self, indicators: &Indicators) {
        self.indicators = Some(*indicators);
    }

    fn show_banner(&mut self, message: &str) {
        self.banners.push(message.to_string());
    }

    fn navigate(&mut self, route: &str) {
        self.navigations.push(route.to_string());
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }
}
