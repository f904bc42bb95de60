//! Session and todo-list state.
//!
//! # Design
//! `Store` is a plain owned value: getters borrow it, mutations take
//! `&mut self`, and nothing else can reach it. Mutations never fail and never
//! validate; they are the last step after the server has confirmed a change.
//!
//! Only the token is written through to durable storage. The user is
//! rebuilt from the next login, so a restarted process shows the guest name
//! until then even though it is still authenticated.

use std::borrow::Cow;

use tracing::debug;

use crate::storage::{TokenStorage, TOKEN_KEY};
use crate::types::{Todo, TodoId, User};

/// Display name used while no user is known.
pub const GUEST_USERNAME: &str = "Guest";

#[derive(Debug)]
pub struct Store<S> {
    user: Option<User>,
    token: Option<String>,
    todos: Vec<Todo>,
    storage: S,
}

impl<S: TokenStorage> Store<S> {
    /// Start a store from whatever token a previous run left in `storage`.
    pub fn new(storage: S) -> Self {
        let token = storage.get(TOKEN_KEY);
        debug!(restored_token = token.is_some(), "store initialised");
        Self {
            user: None,
            token,
            todos: Vec::new(),
            storage,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The signed-in user, or the guest placeholder when none is known.
    pub fn current_user(&self) -> Cow<'_, User> {
        match &self.user {
            Some(user) => Cow::Borrowed(user),
            None => Cow::Owned(User {
                username: GUEST_USERNAME.to_string(),
            }),
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn find_todo(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| &todo.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn set_token(&mut self, token: String) {
        self.storage.set(TOKEN_KEY, &token);
        self.token = Some(token);
    }

    pub fn clear_auth(&mut self) {
        self.user = None;
        self.token = None;
        self.storage.remove(TOKEN_KEY);
    }

    pub fn set_todos(&mut self, todos: Vec<Todo>) {
        self.todos = todos;
    }

    /// Append without checking for an existing entry with the same id.
    pub fn add_todo(&mut self, todo: Todo) {
        self.todos.push(todo);
    }

    /// Replace the first entry with a matching id in place. No-op if absent.
    pub fn update_todo(&mut self, todo: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
            *slot = todo;
        }
    }

    /// Drop every entry with this id.
    pub fn remove_todo(&mut self, id: &TodoId) {
        self.todos.retain(|todo| &todo.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn todo(id: u64, title: &str) -> Todo {
        Todo::new(id).with_field("title", title)
    }

    fn store_with(todos: Vec<Todo>) -> Store<MemoryStorage> {
        let mut store = Store::new(MemoryStorage::new());
        store.set_todos(todos);
        store
    }

    #[test]
    fn fresh_store_is_anonymous_guest() {
        let store = Store::new(MemoryStorage::new());
        assert!(!store.is_authenticated());
        assert_eq!(store.current_user().username, GUEST_USERNAME);
        assert!(store.todos().is_empty());
    }

    #[test]
    fn persisted_token_restores_auth_but_not_user() {
        let store = Store::new(MemoryStorage::with_token("T"));
        assert!(store.is_authenticated());
        assert_eq!(store.token(), Some("T"));
        assert_eq!(store.current_user().username, GUEST_USERNAME);
    }

    #[test]
    fn set_token_writes_through_and_clear_auth_removes_it() {
        let storage = MemoryStorage::new();
        let mut store = Store::new(storage.clone());

        store.set_token("T".to_string());
        assert!(store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("T"));

        store.set_user(User {
            username: "x".to_string(),
        });
        store.clear_auth();
        assert!(!store.is_authenticated());
        assert_eq!(store.current_user().username, GUEST_USERNAME);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn authenticated_tracks_token_across_mutations() {
        let mut store = Store::new(MemoryStorage::new());
        let steps: [(&str, fn(&mut Store<MemoryStorage>)); 5] = [
            ("set_user", |s| s.set_user(User { username: "u".to_string() })),
            ("set_token", |s| s.set_token("a".to_string())),
            ("add_todo", |s| s.add_todo(Todo::new(1u64))),
            ("clear_auth", Store::clear_auth),
            ("set_token again", |s| s.set_token("b".to_string())),
        ];
        for (name, step) in steps {
            step(&mut store);
            assert_eq!(store.is_authenticated(), store.token().is_some(), "{name}");
        }
    }

    #[test]
    fn user_is_returned_once_set() {
        let mut store = Store::new(MemoryStorage::new());
        store.set_user(User {
            username: "x".to_string(),
        });
        assert_eq!(store.current_user().username, "x");
    }

    #[test]
    fn add_todo_appends_exactly_one() {
        let mut store = store_with(vec![todo(1, "a")]);
        store.add_todo(todo(2, "b"));
        assert_eq!(store.todos().len(), 2);
        assert_eq!(store.todos()[1], todo(2, "b"));
    }

    #[test]
    fn add_todo_does_not_dedup() {
        let mut store = store_with(vec![todo(1, "a")]);
        store.add_todo(todo(1, "a"));
        assert_eq!(store.todos().len(), 2);
    }

    #[test]
    fn update_todo_replaces_in_place() {
        let mut store = store_with(vec![todo(1, "a"), todo(2, "b"), todo(3, "c")]);
        store.update_todo(todo(2, "B"));
        assert_eq!(store.todos(), &[todo(1, "a"), todo(2, "B"), todo(3, "c")]);
    }

    #[test]
    fn update_todo_with_unknown_id_is_noop() {
        let mut store = store_with(vec![todo(1, "a")]);
        store.update_todo(todo(9, "z"));
        assert_eq!(store.todos(), &[todo(1, "a")]);
    }

    #[test]
    fn remove_todo_filters_matching_ids() {
        let mut store = store_with(vec![todo(1, "a"), todo(2, "b"), todo(1, "dup")]);
        store.remove_todo(&TodoId::from(1u64));
        assert_eq!(store.todos(), &[todo(2, "b")]);

        store.remove_todo(&TodoId::from(42u64));
        assert_eq!(store.todos().len(), 1);
    }

    #[test]
    fn set_todos_replaces_wholesale() {
        let mut store = store_with(vec![todo(1, "a")]);
        store.set_todos(vec![todo(5, "e"), todo(4, "d")]);
        assert_eq!(store.todos(), &[todo(5, "e"), todo(4, "d")]);
    }

    #[test]
    fn find_todo_matches_exact_id_type() {
        let store = store_with(vec![todo(1, "a")]);
        assert!(store.find_todo(&TodoId::from(1u64)).is_some());
        assert!(store.find_todo(&TodoId::from("1")).is_none());
    }
}
