mod common;

use common::Harness;
use domains::{Deletion, DomainError, DELETED_BODY};

#[tokio::test]
async fn a_comment_with_replies_keeps_its_place() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let post = h.post(alice, "Soft", "body", "misc").await;

    let parent = h.comment(alice, post, None, "will be deleted").await;
    let reply = h.comment(bob, post, Some(parent), "still here").await;

    let (post_id, deletion) = h.comments.delete(alice, parent).await.unwrap();
    assert_eq!(post_id, post);
    assert_eq!(deletion, Deletion::Soft);

    let thread = h.posts.thread(post, None).await.unwrap();
    let kept = &thread.comments[0];
    assert_eq!(kept.body, DELETED_BODY);
    assert_eq!(kept.username, None);
    assert_eq!(kept.children[0].comment_id, reply);
}

#[tokio::test]
async fn a_leaf_comment_is_removed() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let post = h.post(alice, "Hard", "body", "misc").await;
    let leaf = h.comment(alice, post, None, "gone soon").await;

    let (_, deletion) = h.comments.delete(alice, leaf).await.unwrap();
    assert_eq!(deletion, Deletion::Hard);
    assert!(h.posts.thread(post, None).await.unwrap().comments.is_empty());
}

#[tokio::test]
async fn soft_deleted_comments_no_longer_belong_to_anyone() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let post = h.post(alice, "Orphan", "body", "misc").await;
    let parent = h.comment(alice, post, None, "parent").await;
    h.comment(alice, post, Some(parent), "reply").await;

    h.comments.delete(alice, parent).await.unwrap();
    let again = h.comments.edit(alice, parent, "back again").await;
    assert!(matches!(again, Err(DomainError::Forbidden(_))));
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let mallory = h.user("mallory").await;
    let post = h.post(alice, "Mine", "body", "misc").await;
    let comment = h.comment(alice, post, None, "original").await;

    assert!(matches!(
        h.comments.edit(mallory, comment, "defaced").await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        h.comments.delete(mallory, comment).await,
        Err(DomainError::Forbidden(_))
    ));

    h.comments.edit(alice, comment, "edited").await.unwrap();
    let thread = h.posts.thread(post, None).await.unwrap();
    assert_eq!(thread.comments[0].body, "edited");
}

#[tokio::test]
async fn deleting_a_post_takes_its_thread_along() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let post = h.post(alice, "Short lived", "body", "misc").await;
    h.comment(alice, post, None, "comment").await;

    h.posts.delete(alice, post).await.unwrap();
    assert!(matches!(
        h.posts.thread(post, None).await,
        Err(DomainError::NotFound("post", _))
    ));
}
