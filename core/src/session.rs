//! The action layer: one explicit context object per signed-in UI.
//!
//! # Design
//! `Session` owns the store, the request builder, the transport and the
//! router. Each action sends at most one request through the pipeline
//! *attach bearer → transport → parse → intercept 401*, and on success
//! commits the confirmed server state to the store. On failure nothing is
//! committed and the error is returned as-is; retrying is the caller's job.
//!
//! Actions take `&mut self`, so two actions on the same session can never
//! interleave their mutations. Callers that want to share a session across
//! tasks put it behind a single mutex.

use tracing::{debug, info};

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::interceptor::{attach_bearer, intercept_response};
use crate::router::Navigator;
use crate::storage::{FileStorage, TokenStorage};
use crate::store::Store;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    ChangePassword, CreateTodo, Credentials, LoginResponse, MessageResponse, RegisterResponse,
    Registration, Todo, TodoId, UpdateTodo, User,
};

pub struct Session<T, S, N> {
    client: TodoClient,
    transport: T,
    store: Store<S>,
    router: N,
}

impl<N: Navigator> Session<ReqwestTransport, FileStorage, N> {
    /// Wire a session from configuration: reqwest transport, token kept on
    /// disk, and the caller's router.
    pub fn from_config(config: &ClientConfig, router: N) -> Self {
        Session::new(
            &config.base_url,
            ReqwestTransport::new(config.origin.clone()),
            config.file_storage(),
            router,
        )
    }
}

impl<T, S, N> Session<T, S, N>
where
    T: Transport,
    S: TokenStorage,
    N: Navigator,
{
    pub fn new(base_url: &str, transport: T, storage: S, router: N) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
            store: Store::new(storage),
            router,
        }
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    pub fn router(&self) -> &N {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut N {
        &mut self.router
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn todos(&self) -> &[Todo] {
        self.store.todos()
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self.client.build_login(credentials)?;
        let response = self.send(request, TodoClient::parse_login).await?;
        self.store.set_token(response.token.clone());
        self.store.set_user(User {
            username: response.username.clone(),
        });
        info!(username = %response.username, "logged in");
        Ok(response)
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<RegisterResponse, ApiError> {
        let request = self.client.build_register(registration)?;
        self.send(request, TodoClient::parse_register).await
    }

    /// Local only: the gateway keeps no server-side session to end.
    pub fn logout(&mut self) {
        self.store.clear_auth();
        info!("logged out");
    }

    pub async fn change_password(&mut self, input: &ChangePassword) -> Result<MessageResponse, ApiError> {
        let request = self.client.build_change_password(input)?;
        self.send(request, TodoClient::parse_change_password).await
    }

    pub async fn fetch_todos(&mut self) -> Result<Vec<Todo>, ApiError> {
        let request = self.client.build_list_todos();
        let todos = self.send(request, TodoClient::parse_list_todos).await?;
        self.store.set_todos(todos.clone());
        Ok(todos)
    }

    /// Refresh one todo from the server. Only entries already in the list
    /// are replaced; an unknown id is returned without being added.
    pub async fn fetch_todo(&mut self, id: &TodoId) -> Result<Todo, ApiError> {
        let request = self.client.build_get_todo(id);
        let todo = self.send(request, TodoClient::parse_get_todo).await?;
        self.store.update_todo(todo.clone());
        Ok(todo)
    }

    pub async fn create_todo(&mut self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let todo = self.send(request, TodoClient::parse_create_todo).await?;
        self.store.add_todo(todo.clone());
        Ok(todo)
    }

    /// Fails with `TodoNotFound`, without sending anything, when `id` is not
    /// in the local list.
    pub async fn update_todo(&mut self, id: &TodoId, input: &UpdateTodo) -> Result<Todo, ApiError> {
        if self.store.find_todo(id).is_none() {
            return Err(ApiError::TodoNotFound(id.clone()));
        }
        let request = self.client.build_update_todo(id, input)?;
        let todo = self.send(request, TodoClient::parse_update_todo).await?;
        self.store.update_todo(todo.clone());
        Ok(todo)
    }

    pub async fn delete_todo(&mut self, id: &TodoId) -> Result<(), ApiError> {
        let request = self.client.build_delete_todo(id);
        self.send(request, TodoClient::parse_delete_todo).await?;
        self.store.remove_todo(id);
        Ok(())
    }

    async fn send<R>(
        &mut self,
        mut request: HttpRequest,
        parse: fn(&TodoClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        attach_bearer(&mut request, self.store.storage());
        debug!(method = %request.method, path = %request.path, "dispatching");
        let result = self
            .transport
            .execute(request)
            .await
            .and_then(|response| parse(&self.client, response));
        intercept_response(result, &mut self.store, &mut self.router)
    }
}
