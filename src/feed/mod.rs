pub mod state;
pub mod sync;

pub use state::{FeedFilter, Indicators};
pub use sync::{
    FeedSynchronizer, InvitationOutcome, MarkReadOutcome, RefreshOutcome, ViewKind,
    PROJECT_REMOVED,
};
