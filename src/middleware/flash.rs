//! One-shot messages carried across a redirect in a private cookie.

use axum_extra::extract::cookie::PrivateCookieJar;

use crate::middleware::cookies::{build_cookie, clear_cookie};

pub const FLASH_COOKIE: &str = "colgados_flash";

fn pending(jar: &PrivateCookieJar) -> Vec<String> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| serde_json::from_str::<Vec<String>>(c.value()).ok())
        .unwrap_or_default()
}

/// Queue `message` for the next rendered page.
pub fn flash(jar: PrivateCookieJar, message: &str, secure: bool) -> PrivateCookieJar {
    let mut messages = pending(&jar);
    messages.push(message.to_string());
    // a Vec<String> always serializes
    let value = serde_json::to_string(&messages).unwrap_or_default();
    jar.add(build_cookie(FLASH_COOKIE, value, secure))
}

/// Drain queued messages; the cookie is cleared when there were any.
pub fn take_flashes(jar: PrivateCookieJar) -> (PrivateCookieJar, Vec<String>) {
    let messages = pending(&jar);
    if messages.is_empty() {
        return (jar, messages);
    }
    (jar.remove(clear_cookie(FLASH_COOKIE)), messages)
}
