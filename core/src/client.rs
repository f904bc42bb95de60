//! Stateless HTTP request builder and response parser for the todo gateway.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Authorization is not added here; the request interceptor does that on
//! the way out.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    ChangePassword, CreateTodo, Credentials, LoginResponse, MessageResponse, RegisterResponse,
    Registration, Todo, TodoId, UpdateTodo,
};

/// Everything outside the RFC 3986 unreserved set is escaped in an id segment.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

fn todo_path(id: &TodoId) -> String {
    let id = id.to_string();
    format!("/todos/{}", utf8_percent_encode(&id, ID_SEGMENT))
}

/// Synchronous, stateless client for the todo gateway.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    /// `base_url` may be absolute (`https://gw.example.com/api`) or a path
    /// prefix (`/api`) that the transport resolves against its origin.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/login", credentials)
    }

    pub fn build_register(&self, registration: &Registration) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/register", registration)
    }

    pub fn build_change_password(&self, input: &ChangePassword) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/change-password", input)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.empty_request(HttpMethod::Get, "/todos")
    }

    pub fn build_get_todo(&self, id: &TodoId) -> HttpRequest {
        self.empty_request(HttpMethod::Get, &todo_path(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/todos", input)
    }

    pub fn build_update_todo(&self, id: &TodoId, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &todo_path(id), input)
    }

    pub fn build_delete_todo(&self, id: &TodoId) -> HttpRequest {
        self.empty_request(HttpMethod::Delete, &todo_path(id))
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<RegisterResponse, ApiError> {
        check_status(&response)?;
        parse_optional_json(&response.body)
    }

    pub fn parse_change_password(&self, response: HttpResponse) -> Result<MessageResponse, ApiError> {
        check_status(&response)?;
        parse_optional_json(&response.body)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn empty_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<B: Serialize>(&self, method: HttpMethod, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Error body the gateway sends with every non-2xx response.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .map(|b| b.error)
        .unwrap_or_else(|_| response.body.clone());
    match response.status {
        401 => Err(ApiError::Unauthorized { message }),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::Http { status, message }),
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Acknowledgement bodies are informational; an empty body is accepted.
fn parse_optional_json<T: DeserializeOwned + Default>(body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
