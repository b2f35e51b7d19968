use axum::{
    Extension,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use plaza_store::UploadError;

use crate::auth::AppState;
use crate::middleware::{Claims, flash, take_flash};
use crate::views;

pub async fn account_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> impl IntoResponse {
    let Some(user) = state.users.get(&claims.sub) else {
        // Session outlived the account (admin deleted it).
        return Redirect::to("/login").into_response();
    };
    let (jar, notice) = take_flash(jar);
    (
        jar,
        Html(views::render_account(&claims, &user.profile, notice.as_deref())),
    )
        .into_response()
}

/// POST `/account`: multipart form with a `bio` text field and an optional
/// `avatar` file. The bio is updated unconditionally; the avatar only when a
/// file with a filename was submitted and passes validation.
pub async fn account_submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, StatusCode> {
    let mut bio = String::new();
    let mut avatar: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("bio") => {
                bio = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            }
            Some("avatar") => {
                let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
                let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                if !filename.is_empty() {
                    avatar = Some((filename, data.to_vec()));
                }
            }
            _ => {}
        }
    }

    state.users.update_bio(&claims.sub, &bio);

    let notice = match avatar {
        Some((filename, data)) => {
            match state.uploads.store(&claims.sub, &filename, &data).await {
                Ok(stored) => {
                    state.users.set_avatar(&claims.sub, &stored);
                    "Profile updated successfully".to_string()
                }
                Err(UploadError::Io(e)) => {
                    error!("avatar write failed: {}", e);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
                Err(e) => format!("Avatar not saved: {}", e),
            }
        }
        None => "Profile updated successfully".to_string(),
    };

    let Some(user) = state.users.get(&claims.sub) else {
        return Ok(Redirect::to("/login").into_response());
    };
    Ok(Html(views::render_account(&claims, &user.profile, Some(&notice))).into_response())
}

/// GET `/user/{username}`: another user's public profile. Unknown names
/// bounce back to the feed with a notice.
pub async fn user_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match state.users.get(&username) {
        Some(user) => {
            let (jar, notice) = take_flash(jar);
            (jar, Html(views::render_profile(&claims, &user, notice.as_deref()))).into_response()
        }
        None => (flash(jar, "User not found"), Redirect::to("/")).into_response(),
    }
}
