pub mod auth;
pub mod colgados;
pub mod tables;
