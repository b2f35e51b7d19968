use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use plaza_store::SUPER_ADMIN;

use crate::auth::AppState;

pub const SESSION_COOKIE: &str = "plaza_session";
const FLASH_COOKIE: &str = "plaza_flash";

/// Signed session payload: the username plus the admin flag as it stood at
/// login time. The flag is not re-checked against the live directory; an
/// admin-status change takes effect at the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub admin: bool,
    pub exp: usize,
}

pub fn create_token(secret: &str, username: &str, is_admin: bool) -> anyhow::Result<String> {
    let claims = Claims {
        sub: username.to_string(),
        admin: is_admin,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Every page except the login form sits behind this guard: a missing or
/// invalid session cookie redirects to the login view, otherwise the decoded
/// claims ride along in request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|c| decode_token(&state.session_secret, c.value()));

    match claims {
        Some(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// The admin console accepts exactly one username, compared literally. The
/// per-user admin flag is deliberately not consulted here.
pub async fn require_admin(jar: CookieJar, req: Request, next: Next) -> Response {
    let is_super = req
        .extensions()
        .get::<Claims>()
        .is_some_and(|c| c.sub == SUPER_ADMIN);

    if is_super {
        next.run(req).await
    } else {
        (flash(jar, "Admin access required"), Redirect::to("/")).into_response()
    }
}

// -- Flash notices --

/// Queue a one-shot notice for the next rendered page. The value is
/// percent-encoded so messages with spaces survive the cookie header.
pub fn flash(jar: CookieJar, message: &str) -> CookieJar {
    let encoded = utf8_percent_encode(message, NON_ALPHANUMERIC).to_string();
    let cookie = Cookie::build((FLASH_COOKIE, encoded))
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Take the pending notice, if any, clearing it from the jar.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar.get(FLASH_COOKIE).map(|cookie| {
        percent_decode_str(cookie.value())
            .decode_utf8_lossy()
            .into_owned()
    });

    match message {
        Some(message) => (
            jar.remove(Cookie::build(FLASH_COOKIE).path("/")),
            Some(message),
        ),
        None => (jar, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let token = create_token("test-secret", "daniello", false).unwrap();
        let claims = decode_token("test-secret", &token).expect("valid token");
        assert_eq!(claims.sub, "daniello");
        assert!(!claims.admin);
    }

    #[test]
    fn admin_flag_is_snapshotted_in_the_token() {
        let token = create_token("test-secret", "asad", true).unwrap();
        let claims = decode_token("test-secret", &token).unwrap();
        assert!(claims.admin);
    }

    #[test]
    fn wrong_secret_or_garbage_is_rejected() {
        let token = create_token("test-secret", "daniello", false).unwrap();
        assert!(decode_token("other-secret", &token).is_none());
        assert!(decode_token("test-secret", "not-a-token").is_none());
    }

    #[test]
    fn flash_survives_cookie_encoding() {
        let jar = flash(CookieJar::new(), "News article added");
        let (_, message) = take_flash(jar);
        assert_eq!(message.as_deref(), Some("News article added"));
    }
}
