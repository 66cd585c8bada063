//! API access layer for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values, runs them through a `Transport`, and turns the
//! `HttpResponse` into validated data or a typed `ClientError`. `TodoService`
//! wraps those steps into the list/create/update/delete operations and owns
//! the list cache.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only the base URL.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O boundary
//!   stays explicit and the pure halves test without a network.
//! - Failed responses always normalize to an `ApiError`; malformed successful
//!   payloads surface as `ClientError::Validation`, never as API failures.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod notify;
pub mod schema;
pub mod service;
pub mod theme;
pub mod transport;
pub mod types;

pub use cache::{QueryCache, QueryPolicy};
pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ClientError, ErrorCode};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{NotificationKind, NotificationSink, TracingSink};
pub use schema::{SchemaError, Shape};
pub use service::TodoService;
pub use theme::{FileThemeStore, Theme, ThemeStore};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{CreateTodo, ListMeta, ListQuery, Todo, TodoId, TodoList, UpdateTodo};
