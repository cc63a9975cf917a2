//! Domain DTOs for the todo API and the view types derived from them.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Field
//! names are camelCase on the wire (`userId`).

use serde::{Deserialize, Serialize};

/// A single todo item returned by the API. `id` is assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// Optimistic row shown while a create request is in flight. The id is
    /// 0 because the server has not assigned one yet.
    pub fn placeholder(user_id: i64, title: impl Into<String>) -> Self {
        Self {
            id: 0,
            user_id,
            title: title.into(),
            completed: false,
        }
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl From<&Todo> for CreateTodo {
    fn from(todo: &Todo) -> Self {
        Self {
            user_id: todo.user_id,
            title: todo.title.clone(),
            completed: todo.completed,
        }
    }
}

/// Which todos a consumer should render. Never affects the stored collection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterParams {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterParams {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            FilterParams::All => true,
            FilterParams::Active => !todo.completed,
            FilterParams::Completed => todo.completed,
        }
    }
}

/// `Some(true)` when every todo is completed, `None` otherwise. The store
/// never derives `Some(false)`; it only appears if a consumer sets it.
pub type CompletedAll = Option<bool>;

/// Derive [`CompletedAll`] from a collection. An empty collection is `None`.
pub fn completed_all(todos: &[Todo]) -> CompletedAll {
    if !todos.is_empty() && todos.iter().all(|todo| todo.completed) {
        Some(true)
    } else {
        None
    }
}
