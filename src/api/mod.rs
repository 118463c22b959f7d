//! All endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

use crate::storage::Storage;

pub use notes::PAGE_SIZE;
pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use request::parse_offset;
pub use response::Error;
pub use response::Success;

mod notes;
mod request;
mod response;
mod session;

/// Get the Axum router for all endpoints
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route("/api/session", get(session::show))
        .route("/api/notes", get(notes::list::<S>))
        .route("/", get(notes::list::<S>))
        .route(
            "/note/{hash_id}",
            get(notes::single::<S>).post(notes::save::<S>),
        )
        .route("/delete", post(notes::delete::<S>))
        .route("/create", get(notes::create::<S>).post(notes::create::<S>))
}
