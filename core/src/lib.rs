//! Session and todo-list state for the todo gateway client.
//!
//! # Overview
//! A `Session` holds the authentication state and the todo list, and exposes
//! async actions that call the gateway and mirror each confirmed result into
//! the store. Outgoing requests carry the stored bearer token; a 401 from
//! any call made off the login route clears the session and sends the router
//! there.
//!
//! # Design
//! - `TodoClient` stays stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`.
//! - The interceptors and the `Transport` sit between those two halves, so
//!   every stage is plain data and testable without a network.
//! - `Store` mutations are infallible and only run after the server
//!   confirmed the change. Only the token is persisted.
//! - Storage, transport and navigation are traits; the session is generic
//!   over all three.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod router;
pub mod session;
pub mod storage;
pub mod store;
pub mod transport;
pub mod types;

pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use router::{MemoryRouter, Navigator, LOGIN_PATH, LOGIN_ROUTE};
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, TokenStorage, TOKEN_KEY};
pub use store::{Store, GUEST_USERNAME};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    ChangePassword, CreateTodo, Credentials, LoginResponse, MessageResponse, RegisterResponse,
    Registration, Todo, TodoId, UpdateTodo, User,
};
