pub mod config;
pub mod entries;
pub mod entry;
pub mod init;
pub mod log;
pub mod pause;
pub mod recover;
pub mod resume;
pub mod start;
pub mod status;
pub mod stop;
