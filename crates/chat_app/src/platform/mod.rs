//! Terminal front end: wiring between stdin, the core state machine and the pipeline.
mod app;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;
