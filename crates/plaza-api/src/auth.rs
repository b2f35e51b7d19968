use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{error, info};

use plaza_store::{Collection, FileStore, UserDirectory};
use plaza_types::api::LoginForm;
use plaza_types::models::{ChatMessage, NewsItem, Poll};

use crate::middleware::{self, SESSION_COOKIE};
use crate::views;

pub type AppState = Arc<AppStateInner>;

/// Everything a request handler needs, injected instead of reached for
/// globally: the user directory, one collection per persisted resource, the
/// upload store and the session signing secret.
pub struct AppStateInner {
    pub users: UserDirectory,
    pub news: Collection<NewsItem>,
    pub messages: Collection<ChatMessage>,
    pub polls: Collection<Poll>,
    pub uploads: FileStore,
    pub session_secret: String,
}

pub async fn login_page() -> Html<String> {
    Html(views::render_login(None))
}

/// Verify the credential pair against the directory. Success mints the
/// session cookie, snapshotting the admin flag as it stands right now, and
/// lands on the feed; failure re-renders the form.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(user) = state.users.verify(&form.username, &form.password) else {
        return Ok(Html(views::render_login(Some("Invalid credentials"))).into_response());
    };

    let token = middleware::create_token(&state.session_secret, &user.username, user.is_admin)
        .map_err(|e| {
            error!("failed to mint session token: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!("login: {}", user.username);
    Ok((jar.add(middleware::session_cookie(token)), Redirect::to("/")).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login"))
}
