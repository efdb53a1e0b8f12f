//! # domains
//!
//! The central domain logic and interface definitions for doot: models,
//! the pure rules every adapter shares, and the ports adapters implement.

pub mod error;
pub mod models;
pub mod ports;
pub mod ranking;
pub mod thread;
pub mod validation;
pub mod vote;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
pub use thread::{build_tree, CommentSort, Deletion, ThreadNode, DELETED_BODY, MAX_COMMENT_DEPTH};
pub use validation::{normalize_tags, FieldErrors};
pub use vote::{Vote, VoteChoice, VoteControl, VoteSubmission, VoteTarget};
