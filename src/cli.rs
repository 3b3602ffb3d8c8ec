use clap::{Parser, Subcommand};

/// feedsync: Issueless notification feed from the terminal
#[derive(Parser)]
#[command(name = "feedsync", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the feed and keep polling for new notifications (default)
    Watch {
        /// Only count unread notifications for the empty-state banner
        #[arg(long)]
        unread: bool,
    },

    /// Print the feed once
    List,

    /// Mark one notification as read
    Read { id: String },

    /// Mark every notification up to a timestamp as read (defaults to the newest)
    ReadAll {
        /// Unix timestamp in seconds
        #[arg(long)]
        before: Option<f64>,
    },

    /// Accept a project invitation
    Accept { id: String },

    /// Refuse a project invitation
    Refuse { id: String },

    /// Delete a notification
    Delete { id: String },

    /// Search users that can be invited to a project
    Search {
        /// Search endpoint, e.g. /projects/3/members/search
        #[arg(long)]
        path: String,
        /// Project title used for email invitations
        #[arg(long, default_value = "the project")]
        project: String,
        term: String,
    },
}
