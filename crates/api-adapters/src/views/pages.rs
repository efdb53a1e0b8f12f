//! Full pages. Every page extends `base.html` through its `layout`.

use askama::Template;
use uuid::Uuid;

use domains::FieldErrors;

/// Shared header state.
pub struct Layout {
    pub title: String,
    /// Username of the signed-in viewer
    pub viewer: Option<String>,
}

impl Layout {
    pub fn new(title: impl Into<String>, viewer: Option<&str>) -> Self {
        Self {
            title: title.into(),
            viewer: viewer.map(str::to_string),
        }
    }
}

/// Any list of post cards: front page, tags, users, boards.
#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingPage {
    pub layout: Layout,
    pub heading: String,
    pub description: Option<String>,
    pub cards: Vec<String>,
    pub empty: String,
    /// Pre-filled board for the "new post" link on board pages
    pub new_post_href: String,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

pub struct SortLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostPage {
    pub layout: Layout,
    pub post_id: Uuid,
    pub card: String,
    pub sort_links: Vec<SortLink>,
    pub thread_html: String,
    pub signed_in: bool,
    pub login_href: String,
    pub draft: String,
    pub comment_error: Option<String>,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormPage {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub title: String,
    pub body: String,
    pub tags: String,
    pub board_id: String,
    pub title_error: Option<String>,
    pub body_error: Option<String>,
    pub tags_error: Option<String>,
    pub form_error: Option<String>,
}

impl PostFormPage {
    pub fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.title_error = errors.get("title").map(str::to_string);
        self.body_error = errors.get("body").map(str::to_string);
        self.tags_error = errors.get("tags").map(str::to_string);
        self
    }
}

/// Login and registration share one form.
#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthPage {
    pub layout: Layout,
    pub register: bool,
    pub username: String,
    pub email: String,
    pub redirect_to: String,
    pub username_error: Option<String>,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
    pub form_error: Option<String>,
}

impl AuthPage {
    pub fn new(register: bool, viewer: Option<&str>, redirect_to: &str) -> Self {
        let title = if register { "Register" } else { "Log in" };
        Self {
            layout: Layout::new(title, viewer),
            register,
            username: String::new(),
            email: String::new(),
            redirect_to: redirect_to.to_string(),
            username_error: None,
            email_error: None,
            password_error: None,
            form_error: None,
        }
    }

    pub fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.username_error = errors.get("username").map(str::to_string);
        self.email_error = errors.get("email").map(str::to_string);
        self.password_error = errors.get("password").map(str::to_string);
        self
    }
}

#[derive(Template)]
#[template(path = "board_form.html")]
pub struct BoardFormPage {
    pub layout: Layout,
    pub board_id: String,
    pub description: String,
    pub board_id_error: Option<String>,
    pub form_error: Option<String>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchPage {
    pub layout: Layout,
    pub query: String,
    pub cards: Vec<String>,
}

#[derive(Template)]
#[template(path = "logout.html")]
pub struct LogoutPage {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub layout: Layout,
    pub status: u16,
    pub message: String,
}
