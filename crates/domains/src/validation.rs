//! # Form validation
//!
//! Validators return `Some(message)` on failure. Route handlers collect them
//! into a [`FieldErrors`] map and re-render the form inline; nothing here
//! touches storage.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::thread::MAX_COMMENT_DEPTH;

pub const TITLE_MAX: usize = 140;
pub const BODY_MAX: usize = 2000;
pub const TAGS_MAX: usize = 5;
pub const TAG_LEN_MAX: usize = 64;
pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 64;
pub const PASSWORD_MIN: usize = 6;
pub const BOARD_ID_MAX: usize = 64;

/// Field name → message, serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `error` under `field` when present.
    pub fn check(&mut self, field: &str, error: Option<String>) -> &mut Self {
        if let Some(message) = error {
            self.0.insert(field.to_string(), message);
        }
        self
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing failed, else the map itself.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Splits a comma-separated tag field. Tags are trimmed, empties dropped, and
/// duplicates removed case-insensitively, keeping the first spelling seen.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn validate_title(title: &str) -> Option<String> {
    let len = char_len(title);
    if len == 0 {
        Some("Please enter a title".to_string())
    } else if len > TITLE_MAX {
        Some(format!("Titles must be at most {TITLE_MAX} characters long"))
    } else {
        None
    }
}

pub fn validate_body(body: &str) -> Option<String> {
    let len = char_len(body);
    if len == 0 {
        Some("Please enter a body".to_string())
    } else if len > BODY_MAX {
        Some(format!("Posts must be at most {BODY_MAX} characters long"))
    } else {
        None
    }
}

/// Validates an already-normalized tag list.
pub fn validate_tags(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        return Some("Please enter at least one tag".to_string());
    }
    if tags.len() > TAGS_MAX {
        return Some(format!("Posts can have at most {TAGS_MAX} tags"));
    }
    tags.iter()
        .find(|tag| char_len(tag) > TAG_LEN_MAX)
        .map(|tag| format!("Tag \"{tag}\" is longer than {TAG_LEN_MAX} characters"))
}

pub fn validate_comment_body(body: &str) -> Option<String> {
    if body.is_empty() {
        Some("please enter a comment".to_string())
    } else {
        None
    }
}

/// `parent_depth` is the level of the comment being replied to.
pub fn validate_reply_depth(parent_depth: i64) -> Option<String> {
    if parent_depth >= MAX_COMMENT_DEPTH {
        Some(format!("replies cannot nest more than {MAX_COMMENT_DEPTH} levels deep"))
    } else {
        None
    }
}

pub fn validate_username(username: &str) -> Option<String> {
    let len = char_len(username);
    if len < USERNAME_MIN {
        Some(format!("Usernames must be at least {USERNAME_MIN} characters long"))
    } else if len > USERNAME_MAX {
        Some(format!("Usernames must be less than {USERNAME_MAX} characters long"))
    } else {
        None
    }
}

pub fn validate_password(password: &str) -> Option<String> {
    if char_len(password) < PASSWORD_MIN {
        Some(format!("Passwords must be at least {PASSWORD_MIN} characters long"))
    } else {
        None
    }
}

/// Email is optional; anything longer than one character must contain `@`.
pub fn validate_email(email: &str) -> Option<String> {
    if email.len() > 1 && !email.contains('@') {
        Some("Please enter a valid email address".to_string())
    } else {
        None
    }
}

pub fn validate_board_id(board_id: &str) -> Option<String> {
    let len = char_len(board_id);
    if len == 0 || len > BOARD_ID_MAX {
        return Some(format!("Board names must be 1 to {BOARD_ID_MAX} characters long"));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_';
    if !board_id.chars().all(allowed) {
        return Some("Board names may only contain a-z, 0-9, '-' and '_'".to_string());
    }
    None
}

/// Validates a post submission, returning the normalized tags on success.
pub fn validate_post(title: &str, body: &str, tags: &str) -> Result<Vec<String>, FieldErrors> {
    let tags = normalize_tags(tags);
    let mut errors = FieldErrors::new();
    errors
        .check("title", validate_title(title))
        .check("body", validate_body(body))
        .check("tags", validate_tags(&tags));
    errors.into_result().map(|()| tags)
}
