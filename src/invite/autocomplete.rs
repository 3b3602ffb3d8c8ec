//! Search-as-you-type lookup for the "invite member" dialog.
//!
//! Input is debounced: only the last keystroke of a quiet window triggers a
//! request. Input that looks like an email address offers a single "invite by
//! email" entry without asking the server. Users already in the project are
//! listed but disabled, and keyboard navigation skips them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::api::UserSearchApi;
use crate::errors::AppError;
use crate::models::UserMatch;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

static EMAIL_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionKind {
    User,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    /// Value submitted when this entry is picked (username or email).
    pub value: String,
    pub label: String,
    pub detail: String,
    pub avatar: Option<String>,
    pub disabled: bool,
}

impl Suggestion {
    pub fn from_user(user: &UserMatch) -> Self {
        Self {
            kind: SuggestionKind::User,
            value: user.username.clone(),
            label: user.fullname.clone(),
            detail: if user.joined {
                "joined".to_string()
            } else {
                user.username.clone()
            },
            avatar: user.avatar.clone(),
            disabled: user.joined,
        }
    }

    pub fn email(address: &str, project_title: &str) -> Self {
        Self {
            kind: SuggestionKind::Email,
            value: address.to_string(),
            label: address.to_string(),
            detail: format!("Invite to {}", project_title),
            avatar: None,
            disabled: false,
        }
    }
}

/// Suggestions with a keyboard focus that wraps and skips disabled entries.
#[derive(Debug, Clone, Default)]
pub struct SuggestionList {
    items: Vec<Suggestion>,
    focus: Option<usize>,
}

impl SuggestionList {
    pub fn new(items: Vec<Suggestion>) -> Self {
        Self { items, focus: None }
    }

    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn focused(&self) -> Option<&Suggestion> {
        self.focus.and_then(|i| self.items.get(i))
    }

    pub fn move_down(&mut self) -> Option<&Suggestion> {
        self.step(true)
    }

    pub fn move_up(&mut self) -> Option<&Suggestion> {
        self.step(false)
    }

    fn step(&mut self, down: bool) -> Option<&Suggestion> {
        let len = self.items.len();
        if !self.items.iter().any(|s| !s.disabled) {
            return None;
        }

        let mut idx = match (self.focus, down) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        while self.items[idx].disabled {
            idx = if down { (idx + 1) % len } else { (idx + len - 1) % len };
        }

        self.focus = Some(idx);
        self.items.get(idx)
    }

    /// The focused entry, if any (Enter key).
    pub fn confirm(&self) -> Option<Suggestion> {
        self.focused().cloned()
    }
}

/// Text shown when the search matched nobody.
pub fn no_match_message(term: &str) -> String {
    format!("Could not find an Issueless account matching {}", term)
}

/// The invite input: free text until an entry is picked, then locked.
#[derive(Debug, Clone, Default)]
pub struct InviteInput {
    text: String,
    selected: Option<Suggestion>,
}

impl InviteInput {
    /// Returns `false` (and ignores the edit) while a selection is locked in.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.selected.is_some() {
            return false;
        }
        self.text = text.to_string();
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Disabled entries cannot be picked.
    pub fn select(&mut self, suggestion: Suggestion) -> bool {
        if suggestion.disabled {
            return false;
        }
        self.text = suggestion.value.clone();
        self.selected = Some(suggestion);
        true
    }

    pub fn selected(&self) -> Option<&Suggestion> {
        self.selected.as_ref()
    }

    /// What the invite form submits as its target.
    pub fn effective_value(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.value.as_str())
    }

    /// The invite button is enabled only with a selection.
    pub fn invite_enabled(&self) -> bool {
        self.selected.is_some()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.selected = None;
    }
}

pub struct InviteSearch<A> {
    api: A,
    search_path: String,
    project_title: String,
    debounce: Duration,
    generation: AtomicU64,
}

impl<A: UserSearchApi> InviteSearch<A> {
    pub fn new(api: A, search_path: impl Into<String>, project_title: impl Into<String>) -> Self {
        Self {
            api,
            search_path: search_path.into(),
            project_title: project_title.into(),
            debounce: DEFAULT_DEBOUNCE,
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Handle an input change. Resolves to `None` when the input is empty or a
    /// later keystroke superseded this one within the debounce window.
    pub async fn on_input(&self, term: &str) -> Result<Option<SuggestionList>, AppError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if term.is_empty() {
            return Ok(None);
        }

        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(term, "input superseded, skipping search");
            return Ok(None);
        }

        if EMAIL_LIKE.is_match(term) {
            return Ok(Some(SuggestionList::new(vec![Suggestion::email(
                term,
                &self.project_title,
            )])));
        }

        let users = self.api.search_users(&self.search_path, term).await?;
        debug!(term, found = users.len(), "user search finished");
        Ok(Some(SuggestionList::new(
            users.iter().map(Suggestion::from_user).collect(),
        )))
    }
}
