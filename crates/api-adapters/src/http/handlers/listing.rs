//! Pages that are a list of post cards.

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use domains::{Page, PostInfo, PAGE_SIZE};

use super::render;
use crate::http::{ApiError, AppState, Viewer};
use crate::views::{encode_segment, login_href, post_card, Layout, ListingPage, RenderContext, SearchPage};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    fn number(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Everything about a listing page except its posts.
struct Listing {
    heading: String,
    description: Option<String>,
    empty: &'static str,
    base_href: String,
    new_post_href: String,
}

impl Listing {
    fn new(heading: impl Into<String>, base_href: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            description: None,
            empty: "No posts yet.",
            base_href: base_href.into(),
            new_post_href: "/create-post".to_string(),
        }
    }

    fn render(self, viewer: &Viewer, page: u32, posts: &[PostInfo]) -> Result<Html<String>, ApiError> {
        let ctx = RenderContext::new(viewer.username());
        let cards = posts
            .iter()
            .map(|post| post_card(post, &ctx))
            .collect::<askama::Result<Vec<_>>>()?;

        let page_href = |n: u32| format!("{}?page={n}", self.base_href);
        let prev_href = (page > 1).then(|| page_href(page - 1));
        let next_href = (posts.len() as i64 >= PAGE_SIZE).then(|| page_href(page + 1));

        render(ListingPage {
            layout: Layout::new(self.heading.clone(), viewer.username()),
            heading: self.heading,
            description: self.description,
            cards,
            empty: self.empty.to_string(),
            new_post_href: self.new_post_href,
            prev_href,
            next_href,
        })
    }
}

pub async fn home(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let page = query.number();
    let posts = state.posts.top(viewer.user_id(), Page::number(page)).await?;
    Listing::new("Top posts", "/").render(&viewer, page, &posts)
}

pub async fn tagged(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(tags): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let page = query.number();
    let posts = state.posts.tagged(&tags, viewer.user_id(), Page::number(page)).await?;
    let heading = format!("Tagged {}", tags.split('+').collect::<Vec<_>>().join(" + "));
    let mut listing = Listing::new(heading, format!("/t/{}", encode_segment(&tags)));
    listing.empty = "no tags found";
    listing.render(&viewer, page, &posts)
}

pub async fn user(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let page = query.number();
    let posts = state.posts.by_user(&username, viewer.user_id(), Page::number(page)).await?;
    Listing::new(format!("Posts by {username}"), format!("/u/{}", encode_segment(&username)))
        .render(&viewer, page, &posts)
}

/// `/u` is the signed-in viewer's own page.
pub async fn me(viewer: Viewer) -> Redirect {
    match viewer.username() {
        Some(name) => Redirect::to(&format!("/u/{}", encode_segment(name))),
        None => Redirect::to(&login_href("/u")),
    }
}

pub async fn board(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(board_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let board = state.boards.get(&board_id).await?;
    let page = query.number();
    let posts = state.posts.on_board(&board.board_id, viewer.user_id(), Page::number(page)).await?;

    let slug = encode_segment(&board.board_id);
    let mut listing = Listing::new(format!("b/{}", board.board_id), format!("/b/{slug}"));
    listing.description = Some(board.description).filter(|d| !d.is_empty());
    listing.new_post_href = format!("/create-post?board={slug}");
    listing.render(&viewer, page, &posts)
}

pub async fn search(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, ApiError> {
    let hits = state.posts.search(&query.q, viewer.user_id()).await?;
    let ctx = RenderContext::new(viewer.username());
    let cards = hits
        .iter()
        .map(|hit| post_card(&hit.post, &ctx))
        .collect::<askama::Result<Vec<_>>>()?;

    render(SearchPage {
        layout: Layout::new("Search", viewer.username()),
        query: query.q.trim().to_string(),
        cards,
    })
}

/// The search box posts here; answered with a bookmarkable GET.
pub async fn search_form(Form(form): Form<SearchQuery>) -> Response {
    match serde_urlencoded::to_string([("q", form.q.trim())]) {
        Ok(query) => Redirect::to(&format!("/search?{query}")).into_response(),
        Err(_) => Redirect::to("/search").into_response(),
    }
}
