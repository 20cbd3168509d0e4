//! Core domain types for the webmention receiver.

pub mod mention;
pub mod notification;

pub use mention::Mention;
pub use notification::{Notification, VerifiedStatus};
