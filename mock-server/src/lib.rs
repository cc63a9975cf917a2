use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub user_id: Option<i64>,
}

#[derive(Default)]
pub struct TodoTable {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

impl TodoTable {
    pub fn seeded(todos: Vec<Todo>) -> Self {
        let next_id = todos.iter().map(|todo| todo.id).max().unwrap_or(0);
        Self {
            next_id,
            todos: todos.into_iter().map(|todo| (todo.id, todo)).collect(),
        }
    }
}

pub type Db = Arc<RwLock<TodoTable>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router whose table starts with `todos`; new ids continue after the largest.
pub fn app_with(todos: Vec<Todo>) -> Router {
    let db: Db = Arc::new(RwLock::new(TodoTable::seeded(todos)));
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, todos: Vec<Todo>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(todos)).await
}

async fn list_todos(State(db): State<Db>, Query(filter): Query<UserFilter>) -> Json<Vec<Todo>> {
    let table = db.read().await;
    let todos = table
        .todos
        .values()
        .filter(|todo| filter.user_id.map_or(true, |user_id| todo.user_id == user_id))
        .cloned()
        .collect();
    Json(todos)
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    if input.title.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut table = db.write().await;
    table.next_id += 1;
    let todo = Todo {
        id: table.next_id,
        user_id: input.user_id,
        title: input.title,
        completed: input.completed,
    };
    table.todos.insert(todo.id, todo.clone());
    debug!(id = todo.id, user_id = todo.user_id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, StatusCode> {
    let mut table = db.write().await;
    table
        .todos
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_user_id_in_camel_case() {
        let todo = Todo {
            id: 1,
            user_id: 50,
            title: "Test".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["userId"], 50);
        assert_eq!(json["title"], "Test");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn create_todo_defaults_completed_to_false() {
        let input: CreateTodo =
            serde_json::from_str(r#"{"userId":50,"title":"No completed field"}"#).unwrap();
        assert_eq!(input.title, "No completed field");
        assert!(!input.completed);
    }

    #[test]
    fn create_todo_rejects_missing_title() {
        let result: Result<CreateTodo, _> =
            serde_json::from_str(r#"{"userId":50,"completed":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn seeded_table_continues_ids_after_largest() {
        let table = TodoTable::seeded(vec![Todo {
            id: 7,
            user_id: 50,
            title: "seed".to_string(),
            completed: true,
        }]);
        assert_eq!(table.next_id, 7);
        assert_eq!(table.todos.len(), 1);
    }
}
