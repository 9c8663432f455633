pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod templates;
pub mod types;

pub use config::Config;
pub use error::ColgadosError;
pub use router::{ColgadosState, colgados_router};
