// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod auth;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod publisher;
pub mod runtime;
pub mod sentences;
pub mod session;
pub mod storage;
pub mod time_series;
pub mod util;
pub mod window;
