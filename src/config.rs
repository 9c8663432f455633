use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_PLEX_ENDPOINT: &str =
    "https://scanpaintmx1.on.plex.com/api/datasources/4494/execute";
pub const DEFAULT_SHAREPOINT_SITE: &str = "https://scanpaint.sharepoint.com/sites/Innovacion";
pub const DEFAULT_SHAREPOINT_STS: &str = "https://login.microsoftonline.com/extSTS.srf";
pub const DEFAULT_SHAREPOINT_FILE: &str =
    "/sites/Innovacion/Shared Documents/Test PLEX/Worcenter_Rates_json.json";

/// Environment names used by the deployed application, and the config field
/// each one feeds.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("SECRET_DB", "secret_key"),
    ("DATABASE_URL", "database_url"),
    ("AUT_PLEX", "plex_token"),
    ("SHAREPOINT_USER", "sharepoint_user"),
    ("SHAREPOINT_PASS", "sharepoint_pass"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub loglevel: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub secret_key: String,
    pub insecure_cookie: bool,
    pub password_iterations: u32,
    pub http_timeout_secs: u64,

    pub plex_endpoint: Url,
    pub plex_token: String,
    pub plex_part_key: i64,
    pub plex_part_operation_key: i64,
    pub plex_fixture_path: PathBuf,

    pub sharepoint_site_url: Url,
    pub sharepoint_sts_url: Url,
    pub sharepoint_file_path: String,
    pub sharepoint_user: String,
    pub sharepoint_pass: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            database_url: "sqlite://colgados.db".to_string(),
            db_max_connections: 5,
            secret_key: String::new(),
            insecure_cookie: false,
            password_iterations: crate::service::password::DEFAULT_ITERATIONS,
            http_timeout_secs: 30,
            plex_endpoint: Url::parse(DEFAULT_PLEX_ENDPOINT).expect("valid default PLEX url"),
            plex_token: String::new(),
            plex_part_key: 6220439,
            plex_part_operation_key: 31460695,
            plex_fixture_path: PathBuf::from("fixtures/plex_api2.json"),
            sharepoint_site_url: Url::parse(DEFAULT_SHAREPOINT_SITE)
                .expect("valid default SharePoint site"),
            sharepoint_sts_url: Url::parse(DEFAULT_SHAREPOINT_STS)
                .expect("valid default SharePoint STS url"),
            sharepoint_file_path: DEFAULT_SHAREPOINT_FILE.to_string(),
            sharepoint_user: String::new(),
            sharepoint_pass: String::new(),
        }
    }
}

impl Config {
    /// Defaults, then the legacy variables, then `COLGADOS_*` overrides.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(legacy_env())
            .merge(Env::prefixed("COLGADOS_"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Connection string understood by sqlx.
    ///
    /// SQLAlchemy spells a relative SQLite file `sqlite:///colgados.db`, which
    /// sqlx would read as an absolute path.
    pub fn sqlx_database_url(&self) -> String {
        match self.database_url.strip_prefix("sqlite:///") {
            Some(rest) if !rest.starts_with('/') => format!("sqlite://{rest}"),
            _ => self.database_url.clone(),
        }
    }
}

fn legacy_env() -> Env {
    let names: Vec<&str> = LEGACY_ENV.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, field)| field.to_string())
            .unwrap_or_else(|| key.as_str().to_string())
            .into()
    })
}
