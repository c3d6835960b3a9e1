// Library root: exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod alerts;
pub mod api;
pub mod bot;
pub mod calendar;
pub mod context;
pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod services;

// Wiring for the binary; public so integration tests can build a Config.
pub mod cli;
pub mod config;
pub mod logging;
