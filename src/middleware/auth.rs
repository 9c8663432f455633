use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Key, PrivateCookieJar};
use sha2::{Digest, Sha512};
use tracing::{debug, warn};

use crate::db::User;
use crate::error::ColgadosError;
use crate::middleware::cookies::{build_cookie, clear_cookie};
use crate::router::ColgadosState;

pub const SESSION_COOKIE: &str = "colgados_session";
pub const LOGIN_PATH: &str = "/login";

/// Derive the cookie encryption key from the configured secret.
///
/// An empty secret yields a random key, so sessions do not survive a restart.
pub fn session_key(secret: &str) -> Key {
    if secret.is_empty() {
        warn!("SECRET_DB is not set; using a random session key");
        return Key::generate();
    }
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Bind the session to `user_id`.
pub fn login(jar: PrivateCookieJar, user_id: i64, secure: bool) -> PrivateCookieJar {
    jar.add(build_cookie(SESSION_COOKIE, user_id.to_string(), secure))
}

pub fn logout(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie(SESSION_COOKIE))
}

pub fn session_user_id(jar: &PrivateCookieJar) -> Option<i64> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| c.value().parse::<i64>().ok())
}

/// The logged-in user, if any.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequestParts<ColgadosState> for MaybeUser {
    type Rejection = ColgadosError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ColgadosState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.key());
        let Some(user_id) = session_user_id(&jar) else {
            return Ok(Self(None));
        };
        let user = state.storage.find_user_by_id(user_id).await?;
        if user.is_none() {
            debug!(user_id, "session refers to a user that no longer exists");
        }
        Ok(Self(user))
    }
}

/// Authentication gate: extracting this sends anonymous callers to the login
/// page before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<ColgadosState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ColgadosState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await {
            Ok(MaybeUser(Some(user))) => Ok(Self(user)),
            Ok(MaybeUser(None)) => {
                debug!(path = %parts.uri.path(), "anonymous request redirected to login");
                Err(Redirect::to(LOGIN_PATH).into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    /// Replays the `Set-Cookie` headers a jar produces as a request `Cookie` header.
    fn as_request_headers(jar: PrivateCookieJar) -> HeaderMap {
        let resp = (jar, ()).into_response();
        let mut headers = HeaderMap::new();
        for set_cookie in resp.headers().get_all(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            headers.append(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        }
        headers
    }

    #[test]
    fn same_secret_gives_same_key() {
        let a = session_key("s3cr3t");
        let b = session_key("s3cr3t");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), session_key("other").master());
    }

    #[test]
    fn login_then_logout() {
        let jar = PrivateCookieJar::new(session_key("s3cr3t"));
        let jar = login(jar, 42, false);
        assert_eq!(session_user_id(&jar), Some(42));

        let jar = logout(jar);
        assert_eq!(session_user_id(&jar), None);
    }

    #[test]
    fn session_survives_the_round_trip() {
        let jar = login(PrivateCookieJar::new(session_key("s3cr3t")), 7, false);
        let headers = as_request_headers(jar);
        let jar = PrivateCookieJar::from_headers(&headers, session_key("s3cr3t"));
        assert_eq!(session_user_id(&jar), Some(7));
    }

    #[test]
    fn cookie_from_another_key_is_ignored() {
        let jar = login(PrivateCookieJar::new(session_key("one")), 7, false);
        let headers = as_request_headers(jar);
        let other = PrivateCookieJar::from_headers(&headers, session_key("two"));
        assert_eq!(session_user_id(&other), None);
    }
}
