//! In-memory stand-in for the todo API gateway.
//!
//! Serves the same routes under `/api` with bearer-token auth, per-user todo
//! lists and numeric ids. Tokens are random uuids that live as long as the
//! process.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: u32,
    pub user_id: u32,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

struct Account {
    id: u32,
    password: String,
}

#[derive(Default)]
pub struct Gateway {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, u32>,
    todos: BTreeMap<u32, Todo>,
    next_user_id: u32,
    next_todo_id: u32,
}

impl Gateway {
    /// Forget every issued token, as if they had all expired.
    pub fn revoke_all_tokens(&mut self) {
        self.tokens.clear();
    }
}

pub type Db = Arc<RwLock<Gateway>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

pub fn app() -> Router {
    app_with_db(Db::default())
}

/// Router over a caller-owned database, so tests can reach into the state.
pub fn app_with_db(db: Db) -> Router {
    let api = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/change-password", post(change_password))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Db::default()).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

/// Resolve the bearer token to a user id.
fn authenticate(gateway: &Gateway, headers: &HeaderMap) -> ApiResult<u32> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "missing auth token"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "malformed auth token"))?;
    gateway
        .tokens
        .get(token)
        .copied()
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "invalid auth token"))
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterRequest>) -> ApiResult<Json<Value>> {
    if input.username.is_empty() || input.password.is_empty() || input.email.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "username, password and email are required"));
    }
    let mut gateway = db.write().await;
    if gateway.accounts.contains_key(&input.username) {
        return Err(failure(StatusCode::CONFLICT, "username already taken"));
    }
    gateway.next_user_id += 1;
    let id = gateway.next_user_id;
    gateway.accounts.insert(
        input.username.clone(),
        Account {
            id,
            password: input.password,
        },
    );
    info!(username = %input.username, id, "registered");
    Ok(Json(json!({ "message": "registered", "user_id": id })))
}

async fn login(State(db): State<Db>, Json(input): Json<LoginRequest>) -> ApiResult<Json<Value>> {
    let mut gateway = db.write().await;
    let user_id = match gateway.accounts.get(&input.username) {
        Some(account) if account.password == input.password => account.id,
        _ => return Err(failure(StatusCode::UNAUTHORIZED, "invalid username or password")),
    };
    let token = Uuid::new_v4().to_string();
    gateway.tokens.insert(token.clone(), user_id);
    Ok(Json(json!({ "token": token, "username": input.username })))
}

async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    let mut gateway = db.write().await;
    let user_id = authenticate(&gateway, &headers)?;
    let account = gateway
        .accounts
        .values_mut()
        .find(|account| account.id == user_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "user not found"))?;
    if account.password != input.old_password {
        return Err(failure(StatusCode::BAD_REQUEST, "old password is incorrect"));
    }
    account.password = input.new_password;
    Ok(Json(json!({ "message": "password changed" })))
}

async fn list_todos(State(db): State<Db>, headers: HeaderMap) -> ApiResult<Json<Vec<Todo>>> {
    let gateway = db.read().await;
    let user_id = authenticate(&gateway, &headers)?;
    let todos = gateway
        .todos
        .values()
        .filter(|todo| todo.user_id == user_id)
        .cloned()
        .collect();
    Ok(Json(todos))
}

async fn create_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateTodo>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let mut gateway = db.write().await;
    let user_id = authenticate(&gateway, &headers)?;
    gateway.next_todo_id += 1;
    let todo = Todo {
        id: gateway.next_todo_id,
        user_id,
        title: input.title,
        description: input.description,
        completed: false,
    };
    gateway.todos.insert(todo.id, todo.clone());
    Ok((StatusCode::CREATED, Json(todo)))
}

/// A todo is only visible to the user who owns it.
fn owned(gateway: &Gateway, user_id: u32, id: u32) -> ApiResult<&Todo> {
    gateway
        .todos
        .get(&id)
        .filter(|todo| todo.user_id == user_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "todo not found"))
}

fn owned_mut<'a>(gateway: &'a mut Gateway, user_id: u32, id: u32) -> ApiResult<&'a mut Todo> {
    gateway
        .todos
        .get_mut(&id)
        .filter(|todo| todo.user_id == user_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "todo not found"))
}

async fn get_todo(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u32>) -> ApiResult<Json<Todo>> {
    let gateway = db.read().await;
    let user_id = authenticate(&gateway, &headers)?;
    owned(&gateway, user_id, id).map(|todo| Json(todo.clone()))
}

async fn update_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u32>,
    Json(input): Json<UpdateTodo>,
) -> ApiResult<Json<Todo>> {
    let mut gateway = db.write().await;
    let user_id = authenticate(&gateway, &headers)?;
    let todo = owned_mut(&mut gateway, user_id, id)?;
    todo.title = input.title;
    todo.description = input.description;
    todo.completed = input.completed;
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u32>) -> ApiResult<StatusCode> {
    let mut gateway = db.write().await;
    let user_id = authenticate(&gateway, &headers)?;
    owned_mut(&mut gateway, user_id, id)?;
    gateway.todos.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}
