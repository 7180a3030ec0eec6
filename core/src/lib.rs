//! Client core for the todo service.
//!
//! # Overview
//! Two halves, both free of I/O:
//! - `TodoClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values (host-does-IO pattern); the embedding application performs the
//!   round-trip.
//! - `TodoBoard` is the local view state a UI renders: the fetched list,
//!   search and filters, sort key, drag-reorder, inline edit and theme.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O boundary
//!   is explicit.
//! - DTOs are defined independently from the server crate; integration tests
//!   catch schema drift.

pub mod board;
pub mod client;
pub mod error;
pub mod filter;
pub mod http;
pub mod types;

pub use board::{Counts, Theme, TodoBoard};
pub use client::TodoClient;
pub use error::ApiError;
pub use filter::{categories, SortKey, StatusFilter, TodoFilter};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, PatchTodo, Priority, ReorderTodos, Todo};
