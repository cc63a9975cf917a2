//! Client-side state container for a user's todo list.
//!
//! # Overview
//! [`TodoStore`] loads a user's todos from a remote API once, keeps them in
//! memory, derives view state from them, and publishes every change to
//! registered listeners. Add and delete go to the server first and update
//! the local collection when the server confirms.
//!
//! # Design
//! - `TodoClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`.
//! - A [`Transport`] executes requests. `ReqwestTransport` is the network
//!   implementation; tests substitute scripted ones.
//! - API failures are logged and surfaced as short-lived messages on the
//!   published snapshot, never returned as errors.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod transport;
pub mod types;

pub use client::TodoClient;
pub use config::StoreConfig;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::{Subscription, TodoSnapshot, TodoStore, ADD_ERROR, DELETE_ERROR, LOAD_ERROR};
pub use transport::{ReqwestTransport, Transport};
pub use types::{completed_all, CompletedAll, CreateTodo, FilterParams, Todo};
