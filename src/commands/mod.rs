//! Command surface for the presentation layer.
//!
//! Every command takes its arguments followed by the shared `CoreState`,
//! opens one connection for the duration of the call, and returns
//! `Result<T, CoreError>`. `CoreError` serializes as `{kind, message}`.

pub mod analyzers;
pub mod catalog;
pub mod connection;
pub mod results;
pub mod run;
pub mod samples;

use crate::config;

/// Health check, verifies the core is loaded.
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    format!("{} {} ok", config::APP_NAME, config::APP_VERSION)
}
