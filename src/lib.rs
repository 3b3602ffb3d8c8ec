//! feedsync: notification feed synchronizer for the Issueless issue tracker.
//!
//! The library holds the synchronizer and its collaborators; the `feedsync`
//! binary drives it against a live tracker from the terminal.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod feed;
pub mod forms;
pub mod invite;
pub mod jobs;
pub mod models;
pub mod notification;
