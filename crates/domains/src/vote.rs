//! # Votes
//!
//! A viewer holds at most one vote per post or comment. The per-viewer state
//! is `Option<Vote>`; the vote control below turns a click on either icon
//! into the single form submission the `/vote` route expects.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn as_str(self) -> &'static str {
        match self {
            Vote::Up => "up",
            Vote::Down => "down",
        }
    }

    /// Contribution of this vote to a score.
    pub fn weight(self) -> i64 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

impl FromStr for Vote {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Vote::Up),
            "down" => Ok(Vote::Down),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// What a vote submission asks for. `Retract` travels as `"null"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
    #[serde(rename = "null")]
    Retract,
}

impl VoteChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteChoice::Up => "up",
            VoteChoice::Down => "down",
            VoteChoice::Retract => "null",
        }
    }

    /// The vote row this choice leaves behind, if any.
    pub fn vote(self) -> Option<Vote> {
        match self {
            VoteChoice::Up => Some(Vote::Up),
            VoteChoice::Down => Some(Vote::Down),
            VoteChoice::Retract => None,
        }
    }
}

impl From<Vote> for VoteChoice {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Up => VoteChoice::Up,
            Vote::Down => VoteChoice::Down,
        }
    }
}

impl FromStr for VoteChoice {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(VoteChoice::Retract),
            other => other.parse::<Vote>().map(VoteChoice::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteTarget {
    Post,
    Comment,
}

impl VoteTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteTarget::Post => "post",
            VoteTarget::Comment => "comment",
        }
    }
}

impl FromStr for VoteTarget {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(VoteTarget::Post),
            "comment" => Ok(VoteTarget::Comment),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// A query or form value that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value {0:?}")]
pub struct UnknownValue(pub String);

/// The `{id, type, vote}` triple posted to `/vote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteSubmission {
    pub id: Uuid,
    pub target: VoteTarget,
    pub choice: VoteChoice,
}

/// Up/down widget state for one target, as last rendered by the server.
///
/// There is no optimistic local state: what is displayed is always `voted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteControl {
    pub id: Uuid,
    pub target: VoteTarget,
    pub voted: Option<Vote>,
    pub score: i64,
}

impl VoteControl {
    /// Clicking the active icon retracts; clicking the other sets or switches.
    pub fn click(&self, icon: Vote) -> VoteSubmission {
        let choice = if self.voted == Some(icon) {
            VoteChoice::Retract
        } else {
            VoteChoice::from(icon)
        };
        VoteSubmission {
            id: self.id,
            target: self.target,
            choice,
        }
    }

    pub fn is_active(&self, icon: Vote) -> bool {
        self.voted == Some(icon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(voted: Option<Vote>) -> VoteControl {
        VoteControl {
            id: Uuid::new_v4(),
            target: VoteTarget::Post,
            voted,
            score: 4,
        }
    }

    #[test]
    fn clicking_the_active_icon_retracts() {
        let c = control(Some(Vote::Up));
        let submission = c.click(Vote::Up);
        assert_eq!(submission.choice, VoteChoice::Retract);
        assert_eq!(submission.choice.as_str(), "null");
        assert_eq!(submission.id, c.id);
    }

    #[test]
    fn clicking_from_unvoted_sets_the_direction() {
        let c = control(None);
        assert_eq!(c.click(Vote::Down).choice.as_str(), "down");
        assert_eq!(c.click(Vote::Up).choice, VoteChoice::Up);
    }

    #[test]
    fn clicking_the_inactive_icon_switches() {
        let c = control(Some(Vote::Down));
        assert_eq!(c.click(Vote::Up).choice, VoteChoice::Up);
        assert_eq!(c.click(Vote::Down).choice, VoteChoice::Retract);
        assert!(c.is_active(Vote::Down));
        assert!(!c.is_active(Vote::Up));
    }

    #[test]
    fn wire_values_parse() {
        assert_eq!("null".parse::<VoteChoice>(), Ok(VoteChoice::Retract));
        assert_eq!("up".parse::<VoteChoice>(), Ok(VoteChoice::Up));
        assert_eq!("comment".parse::<VoteTarget>(), Ok(VoteTarget::Comment));
        assert!("sideways".parse::<VoteChoice>().is_err());
        assert!("thread".parse::<VoteTarget>().is_err());
        assert_eq!(VoteChoice::Retract.vote(), None);
    }

    #[test]
    fn unknown_values_name_the_rejected_input() {
        let err = "sideways".parse::<VoteChoice>().unwrap_err();
        assert_eq!(err.to_string(), r#"unknown value "sideways""#);
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
