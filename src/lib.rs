pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod ui;
