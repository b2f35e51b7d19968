use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info};

use plaza_types::api::AdminForm;

use crate::auth::AppState;
use crate::middleware::{Claims, take_flash};
use crate::views;

pub async fn admin_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> impl IntoResponse {
    let users = state.users.list();
    let (jar, notice) = take_flash(jar);
    (jar, Html(views::render_admin(&claims, &users, notice.as_deref())))
}

/// POST `/admin`: `add_user`, `delete_user` or `change_password`. All three
/// are fire-and-forget: add overwrites an existing user, there is no audit
/// log, and a miss just skips the confirmation notice.
pub async fn admin_submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
    Form(form): Form<AdminForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let mut notice = None;

    match form.action.as_str() {
        "add_user" => {
            if !form.new_username.is_empty() && !form.new_password.is_empty() {
                state
                    .users
                    .insert(&form.new_username, &form.new_password)
                    .map_err(hash_failure)?;
                info!("admin added user {}", form.new_username);
                notice = Some(format!("User {} added", form.new_username));
            }
        }
        "delete_user" => {
            if state.users.remove(&form.user_to_delete) {
                info!("admin deleted user {}", form.user_to_delete);
                notice = Some(format!("User {} deleted", form.user_to_delete));
            }
        }
        "change_password" => {
            if !form.new_password_value.is_empty()
                && state
                    .users
                    .set_password(&form.user_to_change, &form.new_password_value)
                    .map_err(hash_failure)?
            {
                info!("admin changed password for {}", form.user_to_change);
                notice = Some(format!("Password for {} changed", form.user_to_change));
            }
        }
        _ => {}
    }

    let users = state.users.list();
    let (jar, _) = take_flash(jar);
    Ok((jar, Html(views::render_admin(&claims, &users, notice.as_deref()))))
}

fn hash_failure(e: plaza_store::users::HashError) -> StatusCode {
    error!("password hashing failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
