use axum_extra::extract::cookie::PrivateCookieJar;
use rand::{Rng, distributions::Alphanumeric};
use subtle::ConstantTimeEq;
use time::Duration;

use crate::middleware::cookies::build_cookie;

pub const CSRF_COOKIE: &str = "colgados_csrf";
const TOKEN_LEN: usize = 32;
const TOKEN_TTL: Duration = Duration::hours(1);

/// Issue a fresh token; the caller embeds it in the form it renders.
pub fn issue_token(jar: PrivateCookieJar, secure: bool) -> (PrivateCookieJar, String) {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();
    let mut cookie = build_cookie(CSRF_COOKIE, token.clone(), secure);
    cookie.set_max_age(TOKEN_TTL);
    let jar = jar.add(cookie);
    (jar, token)
}

pub fn token_matches(jar: &PrivateCookieJar, submitted: &str) -> bool {
    let Some(expected) = jar.get(CSRF_COOKIE) else {
        return false;
    };
    !submitted.is_empty() && bool::from(expected.value().as_bytes().ct_eq(submitted.as_bytes()))
}
