mod common;

use common::Harness;
use domains::{CommentSort, DomainError, ThreadNode, VoteChoice, VoteTarget, MAX_COMMENT_DEPTH};
use uuid::Uuid;

fn ids(nodes: &[ThreadNode<'_>]) -> Vec<Uuid> {
    nodes.iter().map(|n| n.comment.comment_id).collect()
}

#[tokio::test]
async fn every_level_is_ordered_by_score() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let carol = h.user("carol").await;
    let dave = h.user("dave").await;
    let post = h.post(alice, "Threads", "body", "misc").await;

    let first = h.comment(alice, post, None, "first root").await;
    let second = h.comment(bob, post, None, "second root").await;
    h.vote(carol, VoteTarget::Comment, second, VoteChoice::Up).await;
    h.vote(dave, VoteTarget::Comment, second, VoteChoice::Up).await;

    let plain = h.comment(bob, post, Some(first), "plain reply").await;
    let sunk = h.comment(carol, post, Some(first), "sunk reply").await;
    h.vote(alice, VoteTarget::Comment, sunk, VoteChoice::Down).await;
    h.vote(bob, VoteTarget::Comment, sunk, VoteChoice::Down).await;
    let liked = h.comment(dave, post, Some(first), "liked reply").await;
    h.vote(alice, VoteTarget::Comment, liked, VoteChoice::Up).await;

    let thread = h.posts.thread(post, None).await.unwrap();
    assert_eq!(thread.post.comment_count, 5);

    for sort in [CommentSort::Score, CommentSort::Popularity] {
        let roots = ThreadNode::arrange(&thread.comments, sort, 0);
        assert_eq!(ids(&roots), vec![second, first], "{sort}");

        let replies = &roots[1].children;
        assert_eq!(ids(replies), vec![liked, plain, sunk], "{sort}");
        assert!(replies.iter().all(|r| r.depth == 1));
    }
}

#[tokio::test]
async fn replies_nest_under_their_parent() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let post = h.post(alice, "Deep", "body", "misc").await;

    let root = h.comment(alice, post, None, "root").await;
    let child = h.comment(alice, post, Some(root), "child").await;
    let grandchild = h.comment(alice, post, Some(child), "grandchild").await;

    let thread = h.posts.thread(post, None).await.unwrap();
    assert_eq!(thread.comments.len(), 1);
    let nodes = ThreadNode::arrange(&thread.comments, CommentSort::default(), 0);
    let leaf = &nodes[0].children[0].children[0];
    assert_eq!(leaf.comment.comment_id, grandchild);
    assert_eq!(leaf.depth, 2);
}

#[tokio::test]
async fn a_reply_cannot_cross_posts() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let here = h.post(alice, "Here", "body", "misc").await;
    let there = h.post(alice, "There", "body", "misc").await;
    let parent = h.comment(alice, here, None, "parent").await;

    assert!(h.comments.create(alice, there, Some(parent), "stray").await.is_err());
}

#[tokio::test]
async fn reply_chains_stop_at_the_depth_limit() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let post = h.post(alice, "Chain", "body", "misc").await;

    let mut parent = h.comment(alice, post, None, "level 0").await;
    for level in 1..=MAX_COMMENT_DEPTH {
        parent = h.comment(alice, post, Some(parent), &format!("level {level}")).await;
    }

    let err = h
        .comments
        .create(alice, post, Some(parent), "one too many")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let thread = h.posts.thread(post, None).await.unwrap();
    assert_eq!(thread.post.comment_count, MAX_COMMENT_DEPTH + 1);
    let mut node = &ThreadNode::arrange(&thread.comments, CommentSort::default(), 0)[0];
    while let Some(child) = node.children.first() {
        node = child;
    }
    assert_eq!(node.depth as i64, MAX_COMMENT_DEPTH);
}
