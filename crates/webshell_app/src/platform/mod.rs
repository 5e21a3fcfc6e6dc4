mod app;
mod config;
mod console;
mod input;
mod logging;
mod persistence;

pub use app::run_app;
