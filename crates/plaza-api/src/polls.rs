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

use plaza_types::api::PollForm;
use plaza_types::models::Poll;

use crate::auth::AppState;
use crate::middleware::{Claims, take_flash};
use crate::views;

pub async fn polls_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<impl IntoResponse, StatusCode> {
    let polls = state.polls.load().map_err(internal)?;
    let (jar, notice) = take_flash(jar);
    Ok((jar, Html(views::render_polls(&claims, &polls, notice.as_deref()))))
}

/// POST `/polls`: `create_poll` or `vote`. A vote on an unknown poll id is
/// a silent no-op; each vote transition is persisted immediately.
pub async fn polls_submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<PollForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let mut notice = None;

    match form.action.as_str() {
        "create_poll" => {
            if !form.poll_name.is_empty() {
                let poll = Poll::new(form.poll_name, claims.sub.clone(), Utc::now());
                state.polls.update(|polls| polls.push(poll)).map_err(internal)?;
                notice = Some("Poll created");
            }
        }
        "vote" => {
            if let Ok(id) = Uuid::parse_str(&form.poll_id) {
                state
                    .polls
                    .update(|polls| {
                        if let Some(poll) = polls.iter_mut().find(|p| p.id == id) {
                            poll.cast_vote(&claims.sub, &form.vote_type);
                        }
                    })
                    .map_err(internal)?;
            }
        }
        _ => {}
    }

    let polls = state.polls.load().map_err(internal)?;
    Ok(Html(views::render_polls(&claims, &polls, notice)))
}

fn internal(e: plaza_store::StoreError) -> StatusCode {
    error!("polls store error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
