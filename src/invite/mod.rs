pub mod autocomplete;

pub use autocomplete::{InviteInput, InviteSearch, Suggestion, SuggestionKind, SuggestionList};
