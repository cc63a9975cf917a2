//! Session-lifetime state container for a user's todos.
//!
//! # Design
//! `TodoStore` is a cheap-to-clone handle; consumers receive it explicitly
//! and either poll [`TodoStore::snapshot`] or register a listener with
//! [`TodoStore::subscribe`]. Every mutation goes through one locked update
//! that recomputes derived state, restarts the error timer when the error
//! message or mutation count changed, and then notifies listeners outside
//! the lock.
//!
//! API failures never escape as errors. They become one of the fixed
//! messages below, which clear themselves after `error_timeout`.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{completed_all, CompletedAll, CreateTodo, FilterParams, Todo};

pub const LOAD_ERROR: &str = "Unable to load todos";
pub const ADD_ERROR: &str = "Unable to add a todo";
pub const DELETE_ERROR: &str = "Unable to delete a todo";

/// Everything the store publishes to its consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoSnapshot {
    pub todos: Vec<Todo>,
    pub loading: bool,
    pub completed_all: CompletedAll,
    pub filter: FilterParams,
    pub temp_item: Option<Todo>,
    /// Empty when no error is shown.
    pub error_message: String,
    pub added: bool,
    pub disabled: bool,
    /// Intent flag for a bulk clear; consumers own the handling.
    pub press_clear_all: bool,
    pub mutation_count: u64,
}

impl TodoSnapshot {
    /// Todos selected by the active filter, in collection order.
    pub fn visible_todos(&self) -> impl Iterator<Item = &Todo> + '_ {
        let filter = self.filter;
        self.todos.iter().filter(move |todo| filter.matches(todo))
    }
}

type Listener = Arc<dyn Fn(&TodoSnapshot) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

struct StoreState {
    view: TodoSnapshot,
    /// Bumped on every timer restart so a timer that already woke up cannot
    /// clear a newer message.
    error_epoch: u64,
}

struct Shared {
    state: Mutex<StoreState>,
    listeners: Mutex<Listeners>,
    error_timer: Mutex<Option<AbortHandle>>,
    error_timeout: Duration,
    runtime: Handle,
}

impl Shared {
    fn update<R>(self: &Arc<Self>, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let (result, changed) = {
            let mut state = self.state.lock();
            let before = state.view.clone();
            let result = f(&mut *state);

            if state.view.todos != before.todos {
                state.view.completed_all = completed_all(&state.view.todos);
            }
            if state.view.error_message != before.error_message
                || state.view.mutation_count != before.mutation_count
            {
                state.error_epoch += 1;
                let active = !state.view.error_message.is_empty();
                self.restart_error_timer(state.error_epoch, active);
            }

            let changed = (state.view != before).then(|| state.view.clone());
            (result, changed)
        };

        if let Some(snapshot) = changed {
            self.notify(&snapshot);
        }
        result
    }

    /// Called with the state lock held, so restarts are ordered by epoch.
    fn restart_error_timer(self: &Arc<Self>, epoch: u64, active: bool) {
        let mut timer = self.error_timer.lock();
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        if !active {
            return;
        }

        let shared = Arc::downgrade(self);
        let timeout = self.error_timeout;
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire_error(epoch);
            }
        });
        *timer = Some(task.abort_handle());
    }

    fn expire_error(self: &Arc<Self>, epoch: u64) {
        self.update(|state| {
            if state.error_epoch == epoch {
                debug!(error = %state.view.error_message, "error message expired");
                state.view.error_message.clear();
            }
        });
    }

    fn notify(&self, snapshot: &TodoSnapshot) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(handle) = self.error_timer.get_mut().take() {
            handle.abort();
        }
    }
}

/// Listener registration returned by [`TodoStore::subscribe`]. Dropping it
/// unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared
                .listeners
                .lock()
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// Holds a user's todos and the view state derived from them.
///
/// Clones share state. The pending error timer is cancelled when the last
/// clone is dropped; in-flight requests are not. A listener that captures a
/// clone keeps the store alive until its [`Subscription`] is dropped.
#[derive(Clone)]
pub struct TodoStore {
    shared: Arc<Shared>,
    client: TodoClient,
    transport: Arc<dyn Transport>,
}

impl TodoStore {
    /// Build the store and load the user's todos once.
    ///
    /// Must be called inside a tokio runtime; the error timer is spawned on it.
    pub async fn open(config: &StoreConfig, transport: Arc<dyn Transport>) -> Self {
        let store = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState {
                    view: TodoSnapshot::default(),
                    error_epoch: 0,
                }),
                listeners: Mutex::new(Listeners::default()),
                error_timer: Mutex::new(None),
                error_timeout: config.error_timeout,
                runtime: Handle::current(),
            }),
            client: TodoClient::new(&config.base_url, config.user_id),
            transport,
        };
        store.load_todos().await;
        store
    }

    async fn load_todos(&self) {
        self.shared.update(|state| state.view.loading = true);
        debug!(user_id = self.client.user_id(), "loading todos");

        let result = self.fetch_todos().await;
        match &result {
            Ok(todos) => debug!(count = todos.len(), "todos loaded"),
            Err(err) => warn!(%err, "failed to load todos"),
        }

        self.shared.update(|state| {
            match result {
                Ok(todos) => state.view.todos = todos,
                Err(_) => state.view.error_message = LOAD_ERROR.to_string(),
            }
            state.view.loading = false;
        });
    }

    async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.transport.execute(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    async fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_todo(response)
    }

    async fn remove_todo(&self, id: i64) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }

    fn begin_mutation(&self, extra: impl FnOnce(&mut TodoSnapshot)) {
        self.shared.update(|state| {
            state.view.error_message.clear();
            state.view.loading = true;
            state.view.mutation_count += 1;
            extra(&mut state.view);
        });
    }

    /// Create a todo on the server and append the confirmed item.
    ///
    /// Returns the server's todo, or `None` after setting [`ADD_ERROR`].
    /// Either way the temp item, loading and disabled flags are cleared.
    pub async fn add_todo(&self, new_todo: CreateTodo) -> Option<Todo> {
        self.begin_mutation(|view| view.added = false);
        debug!(title = %new_todo.title, "adding todo");

        let created = match self.create_todo(&new_todo).await {
            Ok(todo) => {
                debug!(id = todo.id, "todo added");
                Some(todo)
            }
            Err(err) => {
                warn!(%err, "failed to add todo");
                None
            }
        };

        self.shared.update(|state| {
            match &created {
                Some(todo) => {
                    state.view.todos.push(todo.clone());
                    state.view.added = true;
                }
                None => state.view.error_message = ADD_ERROR.to_string(),
            }
            state.view.temp_item = None;
            state.view.loading = false;
            state.view.disabled = false;
        });
        created
    }

    /// Delete a todo on the server and drop it from the collection.
    ///
    /// Returns `false` after setting [`DELETE_ERROR`]; the local item is
    /// kept in that case.
    pub async fn delete_todo(&self, id: i64) -> bool {
        self.begin_mutation(|_| {});
        debug!(id, "deleting todo");

        let result = self.remove_todo(id).await;
        if let Err(err) = &result {
            warn!(id, %err, "failed to delete todo");
        }

        self.shared.update(|state| {
            match &result {
                Ok(()) => state.view.todos.retain(|todo| todo.id != id),
                Err(_) => state.view.error_message = DELETE_ERROR.to_string(),
            }
            state.view.loading = false;
        });
        result.is_ok()
    }

    pub fn snapshot(&self) -> TodoSnapshot {
        self.shared.state.lock().view.clone()
    }

    /// Register `listener` for every change. It runs on the task that made
    /// the change, after the store has released its lock.
    pub fn subscribe(
        &self,
        listener: impl Fn(&TodoSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let mut listeners = self.shared.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn set_todos(&self, todos: Vec<Todo>) {
        self.shared.update(|state| state.view.todos = todos);
    }

    pub fn set_completed_all(&self, completed_all: CompletedAll) {
        self.shared.update(|state| state.view.completed_all = completed_all);
    }

    pub fn set_loading(&self, loading: bool) {
        self.shared.update(|state| state.view.loading = loading);
    }

    pub fn set_filter(&self, filter: FilterParams) {
        self.shared.update(|state| state.view.filter = filter);
    }

    pub fn set_temp_item(&self, temp_item: Option<Todo>) {
        self.shared.update(|state| state.view.temp_item = temp_item);
    }

    /// An empty message dismisses the current error.
    pub fn set_error_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.shared.update(|state| state.view.error_message = message);
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.shared.update(|state| state.view.disabled = disabled);
    }

    pub fn set_press_clear_all(&self, press_clear_all: bool) {
        self.shared.update(|state| state.view.press_clear_all = press_clear_all);
    }

    /// Restart the error window without changing the message.
    pub fn bump_mutation_count(&self) {
        self.shared.update(|state| state.view.mutation_count += 1);
    }
}
