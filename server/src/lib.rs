//! REST API and SQLite storage for a personal todo list.
//!
//! # Overview
//! `app` builds the axum router over a `TodoStore`; `run` serves it on an
//! already-bound listener so tests can pick a random port.
//!
//! # Design
//! - Handlers are thin: validate the payload, call one store method, map
//!   `None` to 404.
//! - Every response passes through a permissive CORS layer. The request
//!   logger sits outside it, so preflights answered by CORS are logged too.
//! - DTOs here are independent of the `todo-core` client types; the client's
//!   integration tests catch schema drift.

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod store;

use std::time::Instant;

use axum::extract::Request;
use axum::http::{header, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use config::Config;
pub use error::AppError;
pub use model::{CreateTodo, PatchTodo, Priority, ReorderTodos, Todo};
pub use store::TodoStore;

pub fn app(store: TodoStore) -> Router {
    routes::router(store)
        .layer(cors())
        .layer(middleware::from_fn(log_request))
}

pub async fn run(listener: TcpListener, store: TodoStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();
    let response = next.run(request).await;
    log::info!(
        "{method} {path} -> {} ({:?})",
        response.status().as_u16(),
        started.elapsed()
    );
    response
}
