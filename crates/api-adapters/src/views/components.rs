use askama::Template;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use domains::{CommentInfo, CommentSort, PostInfo, ThreadNode, Vote, VoteControl, VoteTarget};

use super::{comment_count, encode_segment, exact_time, login_href, time_ago};
use crate::markdown;

/// Which comment form a rejected submission came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DraftSlot {
    /// The top-level box under the post.
    #[default]
    NewComment,
    Reply(Uuid),
    Edit(Uuid),
}

/// A comment submission shown again in its own form, with the reason it
/// was refused.
#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub slot: DraftSlot,
    pub body: String,
    pub error: Option<String>,
}

/// Who is looking, and when. Ownership checks in templates compare usernames.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub viewer: Option<&'a str>,
    pub now: DateTime<Utc>,
    pub draft: Option<&'a CommentDraft>,
}

impl<'a> RenderContext<'a> {
    pub fn new(viewer: Option<&'a str>) -> Self {
        Self {
            viewer,
            now: Utc::now(),
            draft: None,
        }
    }

    pub fn with_draft(self, draft: &'a CommentDraft) -> Self {
        Self {
            draft: Some(draft),
            ..self
        }
    }

    fn draft_for(&self, slot: DraftSlot) -> Option<&'a CommentDraft> {
        self.draft.filter(|draft| draft.slot == slot)
    }

    fn owns(&self, author: Option<&str>) -> bool {
        matches!((self.viewer, author), (Some(v), Some(a)) if v == a)
    }

    fn stamp(&self, at: DateTime<Utc>) -> Stamp {
        Stamp {
            ago: time_ago(at, self.now),
            exact: exact_time(at),
        }
    }

    fn updated(&self, created: DateTime<Utc>, updated: DateTime<Utc>) -> Option<String> {
        (updated != created).then(|| time_ago(updated, self.now))
    }
}

pub struct Stamp {
    pub ago: String,
    pub exact: String,
}

pub struct Link {
    pub text: String,
    pub href: String,
}

fn user_link(username: Option<&str>) -> Option<Link> {
    username.map(|name| Link {
        text: name.to_string(),
        href: format!("/u/{}", encode_segment(name)),
    })
}

/// The up/down widget. Each button carries the value a click submits.
#[derive(Template)]
#[template(path = "components/vote.html")]
pub struct VoteView {
    pub id: Uuid,
    pub target: &'static str,
    pub score: i64,
    pub up_value: &'static str,
    pub down_value: &'static str,
    pub up_active: bool,
    pub down_active: bool,
}

impl From<VoteControl> for VoteView {
    fn from(control: VoteControl) -> Self {
        VoteView {
            id: control.id,
            target: control.target.as_str(),
            score: control.score,
            up_value: control.click(Vote::Up).choice.as_str(),
            down_value: control.click(Vote::Down).choice.as_str(),
            up_active: control.is_active(Vote::Up),
            down_active: control.is_active(Vote::Down),
        }
    }
}

#[derive(Template)]
#[template(path = "components/post_card.html")]
struct PostCardView {
    post_id: Uuid,
    title: String,
    author: Option<Link>,
    created: Stamp,
    updated: Option<String>,
    board: Option<Link>,
    tags: Vec<Link>,
    comments: String,
    body_html: Option<String>,
    vote_html: String,
    is_owner: bool,
}

pub fn post_card(post: &PostInfo, ctx: &RenderContext<'_>) -> askama::Result<String> {
    let vote_html = VoteView::from(VoteControl {
        id: post.post_id,
        target: VoteTarget::Post,
        voted: post.current_user_voted,
        score: post.score,
    })
    .render()?;

    PostCardView {
        post_id: post.post_id,
        title: post.title.clone(),
        author: user_link(post.username.as_deref()),
        created: ctx.stamp(post.created_at),
        updated: ctx.updated(post.created_at, post.updated_at),
        board: post.board_id.as_deref().map(|b| Link {
            text: b.to_string(),
            href: format!("/b/{}", encode_segment(b)),
        }),
        tags: post
            .tags
            .iter()
            .map(|tag| Link {
                text: tag.clone(),
                href: format!("/t/{}", encode_segment(tag)),
            })
            .collect(),
        comments: comment_count(post.comment_count),
        body_html: post.body.as_deref().map(markdown::render),
        vote_html,
        is_owner: ctx.owns(post.username.as_deref()),
    }
    .render()
}

#[derive(Template)]
#[template(path = "components/comment.html")]
struct CommentView {
    comment_id: Uuid,
    post_id: Uuid,
    depth_class: &'static str,
    created: Stamp,
    updated: Option<String>,
    author: Option<Link>,
    body_html: String,
    body_source: String,
    edit_error: Option<String>,
    reply_body: String,
    reply_error: Option<String>,
    vote_html: String,
    is_owner: bool,
    signed_in: bool,
    login_href: String,
    children_html: String,
}

/// Alternating background by nesting level; purely visual.
pub fn depth_class(depth: usize) -> &'static str {
    match depth {
        0 => "depth-0",
        d if d % 2 == 1 => "depth-odd",
        _ => "depth-even",
    }
}

/// Renders a nested comment list, ordering siblings by `sort` at every level.
pub fn comment_thread(
    comments: &[CommentInfo],
    sort: CommentSort,
    ctx: &RenderContext<'_>,
) -> askama::Result<String> {
    ThreadNode::arrange(comments, sort, 0)
        .iter()
        .map(|node| comment_node(node, ctx))
        .collect()
}

fn comment_node(node: &ThreadNode<'_>, ctx: &RenderContext<'_>) -> askama::Result<String> {
    let children_html = node
        .children
        .iter()
        .map(|child| comment_node(child, ctx))
        .collect::<askama::Result<String>>()?;

    let comment = node.comment;
    let vote_html = VoteView::from(VoteControl {
        id: comment.comment_id,
        target: VoteTarget::Comment,
        voted: comment.current_user_voted,
        score: comment.score,
    })
    .render()?;

    let edit = ctx.draft_for(DraftSlot::Edit(comment.comment_id));
    let reply = ctx.draft_for(DraftSlot::Reply(comment.comment_id));
    CommentView {
        comment_id: comment.comment_id,
        post_id: comment.post_id,
        depth_class: depth_class(node.depth),
        created: ctx.stamp(comment.created_at),
        updated: ctx.updated(comment.created_at, comment.updated_at),
        author: user_link(comment.username.as_deref()),
        body_html: markdown::render(&comment.body),
        body_source: edit.map_or_else(|| comment.body.clone(), |d| d.body.clone()),
        edit_error: edit.and_then(|d| d.error.clone()),
        reply_body: reply.map(|d| d.body.clone()).unwrap_or_default(),
        reply_error: reply.and_then(|d| d.error.clone()),
        vote_html,
        is_owner: ctx.owns(comment.username.as_deref()),
        signed_in: ctx.viewer.is_some(),
        login_href: login_href(&format!("/p/{}", comment.post_id)),
        children_html,
    }
    .render()
}
