pub mod plex_api;
pub mod sharepoint_api;

pub use plex_api::PlexApi;
pub use sharepoint_api::SharePointClient;
