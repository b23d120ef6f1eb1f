//! HTTP service for todo items backed by SQLite.
//!
//! # Overview
//! Four routes under `/v1/todos`: list, get by id, create and partial update.
//! There is no delete; a todo, once created, stays.
//!
//! # Design
//! - `store` holds one capability trait per operation plus the SQLite
//!   implementation. Handlers are generic over the single trait they need.
//! - `extract` turns malformed ids into 404 and undecodable bodies into 400
//!   before a handler runs.
//! - `AppMode` is an explicit argument to [`app`], not global state.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod store;

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

pub use config::{AppMode, Config, Database};
pub use error::ApiError;
pub use model::{NewTodo, Todo, TodoPatch};
pub use store::{CreateOne, GetAll, GetOneById, SqliteStore, StoreError, UpdateOneById};

use handlers::{create_todo, get_todo, list_todos, update_todo};

/// Collection route.
pub const TODOS_PATH: &str = "/v1/todos";
/// Item route.
pub const TODO_PATH: &str = "/v1/todos/{id}";

/// Assemble the router over `store`.
///
/// Panics inside a handler are turned into a 500 rather than tearing down
/// the connection. `AppMode::Debug` traces requests at debug level with
/// headers; `AppMode::Release` traces at info level without them.
pub fn app<S>(store: S, mode: AppMode) -> Router
where
    S: GetAll + GetOneById + CreateOne + UpdateOneById + Clone,
{
    let (level, include_headers) = match mode {
        AppMode::Debug => (Level::DEBUG, true),
        AppMode::Release => (Level::INFO, false),
    };
    let trace = TraceLayer::new_for_http()
        .make_span_with(
            DefaultMakeSpan::new()
                .level(level)
                .include_headers(include_headers),
        )
        .on_request(DefaultOnRequest::new().level(level))
        .on_response(
            DefaultOnResponse::new()
                .level(level)
                .include_headers(include_headers),
        );

    Router::new()
        .route(TODOS_PATH, get(list_todos::<S>).post(create_todo::<S>))
        .route(TODO_PATH, get(get_todo::<S>).put(update_todo::<S>))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(trace)
        .with_state(store)
}

/// Serve the app on `listener` until Ctrl-C.
pub async fn run<S>(listener: TcpListener, store: S, mode: AppMode) -> Result<(), std::io::Error>
where
    S: GetAll + GetOneById + CreateOne + UpdateOneById + Clone,
{
    axum::serve(listener, app(store, mode))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    error!(panic = %detail, "handler panicked");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            error!(error = %err, "cannot listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
