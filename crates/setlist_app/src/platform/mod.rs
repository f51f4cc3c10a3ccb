mod app;
mod cli;
mod config;
mod effects;
mod persistence;
mod render;

pub use app::run_app;
