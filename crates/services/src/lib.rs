//! # services
//!
//! Use-cases for doot. Each service validates its input, checks ownership
//! and delegates the rest to the ports it was built with.

pub mod accounts;
pub mod boards;
pub mod comments;
pub mod posts;
pub mod sessions;
pub mod votes;

pub use accounts::{AccountService, LoginForm, RegistrationForm};
pub use boards::{BoardForm, BoardService};
pub use comments::CommentService;
pub use posts::{PostForm, PostService, PostThread};
pub use sessions::SessionService;
pub use votes::VoteService;
