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

use plaza_store::SUPER_ADMIN;
use plaza_types::api::NewsForm;
use plaza_types::models::NewsItem;

use crate::auth::AppState;
use crate::middleware::{Claims, take_flash};
use crate::views;

/// GET `/`: the landing page is the news feed.
pub async fn index(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<impl IntoResponse, StatusCode> {
    let news = state.news.load().map_err(internal)?;
    let (jar, notice) = take_flash(jar);
    Ok((jar, Html(views::render_index(&claims, &news, notice.as_deref()))))
}

pub async fn news_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<impl IntoResponse, StatusCode> {
    let news = state.news.load().map_err(internal)?;
    let (jar, notice) = take_flash(jar);
    Ok((jar, Html(views::render_news(&claims, &news, notice.as_deref()))))
}

/// POST `/news`: one action per request, `add_news` or `delete_news`.
pub async fn news_submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
    Form(form): Form<NewsForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let mut notice = None;

    match form.action.as_str() {
        "add_news" => {
            if !form.title.is_empty() && !form.content.is_empty() {
                let item = NewsItem {
                    id: Uuid::new_v4(),
                    title: form.title,
                    content: form.content,
                    author: claims.sub.clone(),
                    created_at: Utc::now(),
                };
                state.news.update(|items| items.push(item)).map_err(internal)?;
                notice = Some("News article added");
            }
        }
        "delete_news" => {
            // A non-matching id/author pair deletes nothing; no error is
            // surfaced either way.
            if let Ok(id) = Uuid::parse_str(&form.news_id) {
                state
                    .news
                    .update(|items| apply_delete(items, id, &claims.sub))
                    .map_err(internal)?;
            }
            notice = Some("News article deleted");
        }
        _ => {}
    }

    let news = state.news.load().map_err(internal)?;
    Ok(Html(views::render_news(&claims, &news, notice)))
}

/// The designated admin deletes any item by id; everyone else only their
/// own. The literal identity is what grants moderation, not the admin flag.
fn apply_delete(items: &mut Vec<NewsItem>, id: Uuid, requester: &str) {
    if requester == SUPER_ADMIN {
        items.retain(|item| item.id != id);
    } else {
        items.retain(|item| !(item.id == id && item.author == requester));
    }
}

fn internal(e: plaza_store::StoreError) -> StatusCode {
    error!("news store error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(author: &str) -> NewsItem {
        NewsItem {
            id: Uuid::new_v4(),
            title: "title".into(),
            content: "content".into(),
            author: author.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn author_deletes_own_item() {
        let target = item("daniello");
        let id = target.id;
        let mut items = vec![item("shalil"), target];

        apply_delete(&mut items, id, "daniello");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].author, "shalil");
    }

    #[test]
    fn non_admin_cannot_delete_another_users_item() {
        let target = item("shalil");
        let id = target.id;
        let mut items = vec![target];

        apply_delete(&mut items, id, "daniello");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn designated_admin_deletes_any_item() {
        let target = item("shalil");
        let id = target.id;
        let mut items = vec![target];

        apply_delete(&mut items, id, SUPER_ADMIN);
        assert!(items.is_empty());
    }

    #[test]
    fn unknown_id_is_a_silent_no_op() {
        let mut items = vec![item("shalil")];
        apply_delete(&mut items, Uuid::new_v4(), SUPER_ADMIN);
        assert_eq!(items.len(), 1);
    }
}
