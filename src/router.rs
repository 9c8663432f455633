use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::FromRef, routing::get};
use axum_extra::extract::cookie::Key;

use crate::api::sharepoint_api::SharePointClient;
use crate::config::Config;
use crate::db::ColgadosStorage;
use crate::error::ColgadosError;
use crate::handlers::{auth, colgados, tables};
use crate::middleware::auth::session_key;
use crate::service::password::PasswordHasher;

#[derive(Clone)]
pub struct ColgadosState {
    pub storage: ColgadosStorage,
    pub config: Arc<Config>,
    pub client: reqwest::Client,
    pub sharepoint: Arc<SharePointClient>,
    pub hasher: PasswordHasher,
    key: Key,
}

impl ColgadosState {
    pub fn new(storage: ColgadosStorage, config: Config) -> Result<Self, ColgadosError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("colgados-web/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        let sharepoint = Arc::new(SharePointClient::new(&config)?);
        let hasher = PasswordHasher::new(config.password_iterations);
        let key = session_key(&config.secret_key);
        Ok(Self {
            storage,
            config: Arc::new(config),
            client,
            sharepoint,
            hasher,
            key,
        })
    }

    pub fn key(&self) -> Key {
        self.key.clone()
    }

    /// Whether cookies carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !self.config.insecure_cookie
    }
}

impl FromRef<ColgadosState> for Key {
    fn from_ref(state: &ColgadosState) -> Self {
        state.key()
    }
}

pub fn colgados_router(state: ColgadosState) -> Router {
    Router::new()
        .route("/", get(auth::home))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/secrets", get(auth::secrets))
        .route("/lista_de_colgados", get(colgados::lista_de_colgados))
        .route("/atributos_Lineas", get(colgados::atributos_lineas))
        .route("/add", get(colgados::add_page).post(colgados::add))
        .route("/edit", get(colgados::edit_page).post(colgados::edit))
        .route("/delete", get(colgados::delete))
        .route("/rates_actuales", get(tables::rates_actuales))
        .route("/test_json_plex", get(tables::test_json_plex))
        .route(
            "/test_json_plex_sharepoint",
            get(tables::test_json_plex_sharepoint),
        )
        .with_state(state)
}
