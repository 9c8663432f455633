pub mod auth;
pub mod cookies;
pub mod csrf;
pub mod flash;

pub use auth::{AuthUser, MaybeUser};
