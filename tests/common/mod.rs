#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use colgados_web::{ColgadosState, Config, colgados_router, db::ColgadosStorage};
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

/// A router backed by its own SQLite file, removed on drop.
pub struct TestApp {
    pub app: Router,
    pub storage: ColgadosStorage,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
    }
}

pub fn test_config() -> Config {
    Config {
        secret_key: "colgados-test-secret".to_string(),
        insecure_cookie: true,
        password_iterations: 1_000,
        http_timeout_secs: 5,
        plex_fixture_path: PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fixtures/plex_api2.json"
        )),
        ..Config::default()
    }
}

pub async fn spawn_app(cfg: Config) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "colgados-test-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite://{}", db_path.display());
    let storage = ColgadosStorage::connect(&database_url, 1)
        .await
        .expect("failed to open test database");
    let state = ColgadosState::new(storage.clone(), cfg).expect("failed to build state");
    TestApp {
        app: colgados_router(state),
        storage,
        db_path,
    }
}

/// Browser-like cookie store fed from `Set-Cookie` headers.
#[derive(Debug, Default, Clone)]
pub struct Cookies(BTreeMap<String, String>);

impl Cookies {
    pub fn absorb(&mut self, resp: &Response<Body>) {
        for value in resp.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let mut parts = raw.split(';');
            let Some((name, val)) = parts.next().and_then(|p| p.split_once('=')) else {
                continue;
            };
            let expired = parts.any(|attr| attr.trim().eq_ignore_ascii_case("Max-Age=0"));
            if expired || val.is_empty() {
                self.0.remove(name.trim());
            } else {
                self.0.insert(name.trim().to_string(), val.to_string());
            }
        }
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str, cookies: &mut Cookies) -> Response<Body> {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookies.header_value() {
            req = req.header(header::COOKIE, cookie);
        }
        let resp = self
            .app
            .clone()
            .oneshot(req.body(Body::empty()).expect("failed to build request"))
            .await
            .expect("request failed");
        cookies.absorb(&resp);
        resp
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookies: &mut Cookies,
    ) -> Response<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookies.header_value() {
            req = req.header(header::COOKIE, cookie);
        }
        let resp = self
            .app
            .clone()
            .oneshot(req.body(Body::from(body)).expect("failed to build request"))
            .await
            .expect("request failed");
        cookies.absorb(&resp);
        resp
    }

    /// Register a fresh account; the returned cookies carry its session.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Cookies {
        let mut cookies = Cookies::default();
        let resp = self
            .post_form(
                "/register",
                &[("email", email), ("password", password), ("name", name)],
                &mut cookies,
            )
            .await;
        assert_eq!(location(&resp), Some("/secrets"));
        cookies
    }
}

pub fn location(resp: &Response<Body>) -> Option<&str> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_text(resp: Response<Body>) -> String {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(body.to_vec()).expect("response body was not utf-8")
}

/// Value of the hidden `csrf_token` input of a rendered form.
pub fn csrf_token(html: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html.find(marker).expect("form has no csrf_token") + marker.len();
    let end = html[start..].find('"').expect("unterminated csrf_token");
    html[start..start + end].to_string()
}
