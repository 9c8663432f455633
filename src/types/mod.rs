pub mod forms;
pub mod plex;
pub mod table;
