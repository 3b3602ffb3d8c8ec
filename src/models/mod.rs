pub mod envelope;
pub mod notification;
pub mod user;

pub use envelope::{Ack, Envelope, NotificationBatch};
pub use notification::{EntityId, Notification, NotificationKind, Timestamp};
pub use user::{UserMatch, UserSearch};
