//! # Comment threads
//!
//! Storage hands comments back flat; [`build_tree`] nests them under their
//! parents. Sibling order is a presentation concern: [`ThreadNode::arrange`]
//! copies each sibling list and sorts it by the caller's key, independently at
//! every level, so a subtree is never reordered by what happens above it.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::CommentInfo;
use crate::vote::UnknownValue;

/// Body left in place of a soft-deleted comment.
pub const DELETED_BODY: &str = "[deleted]";

/// Key used to order siblings, always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentSort {
    #[default]
    #[serde(rename = "popularity")]
    Popularity,
    #[serde(rename = "score")]
    Score,
    #[serde(rename = "createdAt")]
    CreatedAt,
}

impl CommentSort {
    pub const ALL: [CommentSort; 3] = [
        CommentSort::Popularity,
        CommentSort::Score,
        CommentSort::CreatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommentSort::Popularity => "popularity",
            CommentSort::Score => "score",
            CommentSort::CreatedAt => "createdAt",
        }
    }

    /// Descending comparison on this key.
    fn compare(self, a: &CommentInfo, b: &CommentInfo) -> Ordering {
        match self {
            CommentSort::Popularity => b.popularity.total_cmp(&a.popularity),
            CommentSort::Score => b.score.cmp(&a.score),
            CommentSort::CreatedAt => b.created_at.cmp(&a.created_at),
        }
    }

    /// Copies `comments` and sorts the copy. The sort is stable: equal keys
    /// keep the order storage returned them in.
    pub fn order<'a>(self, comments: &'a [CommentInfo]) -> Vec<&'a CommentInfo> {
        let mut ordered: Vec<&CommentInfo> = comments.iter().collect();
        ordered.sort_by(|a, b| self.compare(a, b));
        ordered
    }
}

impl fmt::Display for CommentSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentSort {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popularity" => Ok(CommentSort::Popularity),
            "score" => Ok(CommentSort::Score),
            "createdAt" => Ok(CommentSort::CreatedAt),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// Deepest level a reply may sit at; top-level comments are level 0.
pub const MAX_COMMENT_DEPTH: i64 = 24;

type Replies = HashMap<Uuid, Vec<(usize, CommentInfo)>>;

/// Nests a flat comment list. Siblings keep their relative input order.
/// A comment whose parent is not in the list becomes a root, and so does the
/// earliest comment of any parent cycle, so every input comment is returned
/// exactly once.
pub fn build_tree(flat: Vec<CommentInfo>) -> Vec<CommentInfo> {
    let known: HashSet<Uuid> = flat.iter().map(|c| c.comment_id).collect();

    let mut roots = Vec::new();
    let mut replies = Replies::new();
    for (position, mut comment) in flat.into_iter().enumerate() {
        comment.children.clear();
        match comment.parent_id {
            Some(parent) if known.contains(&parent) && parent != comment.comment_id => {
                replies.entry(parent).or_default().push((position, comment))
            }
            _ => roots.push(comment),
        }
    }

    let mut tree: Vec<CommentInfo> = roots
        .into_iter()
        .map(|root| attach(root, &mut replies))
        .collect();

    while let Some((parent, slot)) = earliest_unplaced(&replies) {
        let Some(siblings) = replies.get_mut(&parent) else {
            break;
        };
        let (_, comment) = siblings.remove(slot);
        if siblings.is_empty() {
            replies.remove(&parent);
        }
        tree.push(attach(comment, &mut replies));
    }
    tree
}

/// Comments still waiting for a parent can only hang off a cycle.
fn earliest_unplaced(replies: &Replies) -> Option<(Uuid, usize)> {
    replies
        .iter()
        .flat_map(|(parent, siblings)| {
            siblings
                .iter()
                .enumerate()
                .map(move |(slot, (position, _))| (*position, *parent, slot))
        })
        .min()
        .map(|(_, parent, slot)| (parent, slot))
}

fn attach(mut comment: CommentInfo, replies: &mut Replies) -> CommentInfo {
    if let Some(children) = replies.remove(&comment.comment_id) {
        comment.children = children
            .into_iter()
            .map(|(_, child)| attach(child, replies))
            .collect();
    }
    comment
}

/// One comment positioned for rendering: its depth and its ordered replies.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadNode<'a> {
    pub comment: &'a CommentInfo,
    pub depth: usize,
    pub children: Vec<ThreadNode<'a>>,
}

impl<'a> ThreadNode<'a> {
    /// Orders `comments` by `sort`, then recurses into each with `depth + 1`.
    pub fn arrange(comments: &'a [CommentInfo], sort: CommentSort, depth: usize) -> Vec<Self> {
        sort.order(comments)
            .into_iter()
            .map(|comment| ThreadNode {
                comment,
                depth,
                children: Self::arrange(&comment.children, sort, depth + 1),
            })
            .collect()
    }
}

/// How a comment is removed. Replies pin a comment in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deletion {
    /// Body replaced and author unlinked; position and replies kept.
    Soft,
    /// Row removed.
    Hard,
}

impl Deletion {
    pub fn for_reply_count(replies: i64) -> Self {
        if replies > 0 {
            Deletion::Soft
        } else {
            Deletion::Hard
        }
    }
}

impl CommentInfo {
    /// Applies a soft delete in place.
    pub fn soft_delete(&mut self) {
        self.body = DELETED_BODY.to_string();
        self.username = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn comment(id: u128, parent: Option<u128>, score: i64) -> CommentInfo {
        let created = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(id as i64);
        CommentInfo {
            comment_id: Uuid::from_u128(id),
            post_id: Uuid::from_u128(999),
            parent_id: parent.map(Uuid::from_u128),
            body: format!("comment {id}"),
            username: Some("ada".to_string()),
            score,
            popularity: score as f64 / 10.0,
            created_at: created,
            updated_at: created,
            current_user_voted: None,
            children: Vec::new(),
        }
    }

    fn ids(nodes: &[ThreadNode<'_>]) -> Vec<u128> {
        nodes.iter().map(|n| n.comment.comment_id.as_u128()).collect()
    }

    #[test]
    fn build_tree_nests_replies_in_input_order() {
        let tree = build_tree(vec![
            comment(1, None, 0),
            comment(2, Some(1), 0),
            comment(3, None, 0),
            comment(4, Some(2), 0),
            comment(5, Some(1), 0),
        ]);
        assert_eq!(tree.len(), 2);
        let first: Vec<u128> = tree[0].children.iter().map(|c| c.comment_id.as_u128()).collect();
        assert_eq!(first, vec![2, 5]);
        assert_eq!(tree[0].children[0].children[0].comment_id, Uuid::from_u128(4));
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn orphans_become_roots() {
        let tree = build_tree(vec![comment(7, Some(42), 0), comment(8, None, 0)]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment_id, Uuid::from_u128(7));
    }

    #[test]
    fn parent_cycles_are_broken_at_the_earliest_comment() {
        let tree = build_tree(vec![
            comment(1, None, 0),
            comment(2, Some(3), 0),
            comment(3, Some(2), 0),
            comment(4, Some(3), 0),
        ]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[1].comment_id, Uuid::from_u128(2));
        assert_eq!(tree[1].children.len(), 1);
        let nested = &tree[1].children[0];
        assert_eq!(nested.comment_id, Uuid::from_u128(3));
        let below: Vec<u128> = nested.children.iter().map(|c| c.comment_id.as_u128()).collect();
        assert_eq!(below, vec![4]);
    }

    #[test]
    fn siblings_sort_by_score_at_every_level_independently() {
        // Three siblings scored [3, 1, 2]; the middle one has children whose
        // own order must be decided by their scores, not their parent's.
        let tree = build_tree(vec![
            comment(1, None, 3),
            comment(2, None, 1),
            comment(3, None, 2),
            comment(20, Some(2), 5),
            comment(21, Some(2), 9),
            comment(22, Some(2), 7),
        ]);
        let arranged = ThreadNode::arrange(&tree, CommentSort::Score, 0);
        assert_eq!(ids(&arranged), vec![1, 3, 2]);
        let scores: Vec<i64> = arranged.iter().map(|n| n.comment.score).collect();
        assert_eq!(scores, vec![3, 2, 1]);
        assert_eq!(ids(&arranged[2].children), vec![21, 22, 20]);
        assert_eq!(arranged[2].children[0].depth, 1);
    }

    #[test]
    fn created_at_sort_is_newest_first() {
        let tree = build_tree(vec![comment(1, None, 0), comment(2, None, 0), comment(3, None, 0)]);
        let arranged = ThreadNode::arrange(&tree, CommentSort::CreatedAt, 0);
        assert_eq!(ids(&arranged), vec![3, 2, 1]);
    }

    #[test]
    fn equal_keys_keep_storage_order() {
        let tree = build_tree(vec![comment(5, None, 1), comment(2, None, 1), comment(9, None, 1)]);
        let arranged = ThreadNode::arrange(&tree, CommentSort::Score, 0);
        assert_eq!(ids(&arranged), vec![5, 2, 9]);
    }

    #[test]
    fn ordering_does_not_mutate_the_stored_order() {
        let tree = build_tree(vec![comment(1, None, 1), comment(2, None, 3)]);
        let _ = ThreadNode::arrange(&tree, CommentSort::Score, 0);
        assert_eq!(tree[0].comment_id, Uuid::from_u128(1));
    }

    #[test]
    fn empty_children_arrange_to_nothing() {
        let tree = build_tree(vec![comment(1, None, 1)]);
        let arranged = ThreadNode::arrange(&tree, CommentSort::Popularity, 0);
        assert!(arranged[0].children.is_empty());
    }

    #[test]
    fn deletion_is_soft_only_when_replies_exist() {
        assert_eq!(Deletion::for_reply_count(0), Deletion::Hard);
        assert_eq!(Deletion::for_reply_count(2), Deletion::Soft);
    }

    #[test]
    fn soft_delete_keeps_position_and_replies() {
        let mut tree = build_tree(vec![comment(1, None, 0), comment(2, Some(1), 0)]);
        tree[0].soft_delete();
        assert_eq!(tree[0].comment_id, Uuid::from_u128(1));
        assert_eq!(tree[0].body, DELETED_BODY);
        assert_eq!(tree[0].username, None);
        assert_eq!(tree[0].children.len(), 1);
    }

    #[test]
    fn sort_keys_round_trip_through_query_values() {
        for sort in CommentSort::ALL {
            assert_eq!(sort.as_str().parse::<CommentSort>(), Ok(sort));
        }
        assert!("hot".parse::<CommentSort>().is_err());
    }
}
