#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod config;
pub mod data;
pub mod hackernews;
pub mod layout;
pub mod logging;
pub mod render;
pub mod scroll;
pub mod shortcuts;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::{run, RunOptions};
