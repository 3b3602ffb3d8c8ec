//! Line-oriented render target used by the `feedsync` binary.

use std::io::Write;

use chrono::Utc;

use super::message::ItemAction;
use super::render::{Edge, RenderTarget, RenderedItem};
use crate::feed::Indicators;
use crate::models::EntityId;

pub struct TerminalView<W: Write + Send> {
    out: W,
    last_indicators: Option<Indicators>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_indicators: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }
}

pub fn format_item(item: &RenderedItem) -> String {
    let marker = if item.is_read { ' ' } else { '*' };
    let mut line = format!(
        "{} [{}] {} {} ({})",
        marker,
        item.id,
        item.message.actor,
        item.message.text,
        item.timestamp.time_ago(Utc::now())
    );
    match &item.action {
        ItemAction::Invitation { .. } => line.push_str("  [accept | refuse]"),
        ItemAction::OpenIssue { .. } => {
            if let Some(route) = item.action.issue_route() {
                line.push_str(&format!("  -> {}", route));
            }
        }
        ItemAction::None => {}
    }
    line
}

impl<W: Write + Send> RenderTarget for TerminalView<W> {
    fn apply_insert(&mut self, item: &RenderedItem, edge: Edge) {
        let prefix = match edge {
            Edge::Top => "new ",
            Edge::Bottom => "",
        };
        let text = format!("{}{}", prefix, format_item(item));
        self.line(&text);
    }

    fn apply_mark_read(&mut self, id: &EntityId) {
        self.line(&format!("  [{}] marked as read", id));
    }

    fn apply_remove(&mut self, id: &EntityId) {
        self.line(&format!("  [{}] removed", id));
    }

    fn apply_indicators(&mut self, indicators: &Indicators) {
        if self.last_indicators.as_ref() == Some(indicators) {
            return;
        }
        self.last_indicators = Some(*indicators);
        if indicators.no_notifications {
            self.line("No notifications.");
        } else if indicators.no_unread {
            self.line("No unread notifications.");
        }
    }

    fn show_banner(&mut self, message: &str) {
        self.line(&format!("! {}", message));
    }

    fn navigate(&mut self, route: &str) {
        self.line(&format!("-> {}", route));
    }

    fn reload(&mut self) {
        self.line("(view reloaded)");
    }
}
