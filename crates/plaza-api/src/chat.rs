use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use plaza_types::api::ChatForm;
use plaza_types::models::ChatMessage;

use crate::auth::AppState;
use crate::middleware::{Claims, take_flash};
use crate::textproc;
use crate::views;

pub async fn chat_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<impl IntoResponse, StatusCode> {
    let messages = state.messages.load().map_err(internal)?;
    let (jar, notice) = take_flash(jar);
    Ok((jar, Html(views::render_chat(&claims, &messages, notice.as_deref()))))
}

/// POST `/chat`: append one message. Mentions and hashtags are rewritten at
/// write time; the stored content is already markup. Messages are
/// append-only, with no edit or delete.
pub async fn chat_submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<ChatForm>,
) -> Result<impl IntoResponse, StatusCode> {
    if !form.message.is_empty() {
        let content = textproc::process(&form.message, |name| state.users.contains(name));
        let message = ChatMessage {
            id: Uuid::new_v4(),
            content,
            author: claims.sub.clone(),
            created_at: Utc::now(),
        };
        state
            .messages
            .update(|messages| messages.push(message))
            .map_err(internal)?;
    }

    let messages = state.messages.load().map_err(internal)?;
    Ok(Html(views::render_chat(&claims, &messages, None)))
}

fn internal(e: plaza_store::StoreError) -> StatusCode {
    error!("chat store error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
