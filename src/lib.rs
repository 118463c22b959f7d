#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

//! Jotter, a single-user notes service with autosave and optimistic concurrency

use anyhow::Result;
use axum::Extension;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::service::NoteService;
use crate::service::UpdatePolicy;
use crate::session::CsrfKeys;
use crate::storage::Storage;

pub mod api;
pub mod client;
pub mod config;
pub mod identifier;
pub mod notes;
pub mod service;
pub mod session;
pub mod storage;
#[cfg(test)]
mod tests;
pub mod timestamps;
pub mod utils;

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` when the storage can not be set up
pub async fn setup_app(config: Config) -> Result<Router> {
    let storage = storage::setup().await?;

    Ok(create_router(storage, config))
}

/// Create the router for Jotter on top of a storage
pub fn create_router<S: Storage>(storage: S, config: Config) -> Router {
    let csrf_keys = CsrfKeys::new(config.csrf_secret.as_bytes());
    let service = NoteService::new(storage, UpdatePolicy::from_config(&config));

    api::router::<S>()
        .layer(TraceLayer::new_for_http())
        .layer(Extension(service))
        .layer(Extension(csrf_keys))
        .layer(Extension(config))
}
