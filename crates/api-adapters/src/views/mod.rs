//! # Views
//!
//! Askama templates and the small formatting helpers they share. Components
//! (vote control, post card, comment node) render to strings that pages
//! embed; the comment tree is assembled bottom-up in Rust.

mod components;
mod pages;

use chrono::{DateTime, Utc};

pub use components::{comment_thread, depth_class, post_card, CommentDraft, DraftSlot, RenderContext, VoteView};
pub use pages::{
    AuthPage, BoardFormPage, ErrorPage, Layout, ListingPage, LogoutPage, PostFormPage, PostPage,
    SearchPage, SortLink,
};

/// Coarse relative time, e.g. `3 hours ago`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    let secs = (now - then).num_seconds().max(0);
    let (n, unit) = match secs {
        s if s < MINUTE => return "just now".to_string(),
        s if s < HOUR => (s / MINUTE, "minute"),
        s if s < DAY => (s / HOUR, "hour"),
        s if s < 7 * DAY => (s / DAY, "day"),
        s if s < 30 * DAY => (s / (7 * DAY), "week"),
        s if s < 365 * DAY => (s / (30 * DAY), "month"),
        s => (s / (365 * DAY), "year"),
    };
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Tooltip form of a timestamp.
pub fn exact_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn comment_count(n: i64) -> String {
    match n {
        0 => "no comments".to_string(),
        1 => "1 comment".to_string(),
        n => format!("{n} comments"),
    }
}

/// Percent-encodes one path segment (usernames, tags).
pub fn encode_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// `/login?redirectTo=<path>`
pub fn login_href(redirect_to: &str) -> String {
    match serde_urlencoded::to_string([("redirectTo", redirect_to)]) {
        Ok(query) => format!("/login?{query}"),
        Err(_) => "/login".to_string(),
    }
}
