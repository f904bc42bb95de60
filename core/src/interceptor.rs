//! Request and response interceptors.
//!
//! Every request the session sends passes through `attach_bearer` on the way
//! out and `intercept_response` on the way back. The request side reads the
//! token from durable storage rather than from the store, so a token written
//! by another handle on the same storage is picked up on the next request.

use tracing::warn;

use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::router::{Navigator, LOGIN_PATH, LOGIN_ROUTE};
use crate::storage::{TokenStorage, TOKEN_KEY};
use crate::store::Store;

/// Add `Authorization: Bearer <token>` when storage holds a token. Requests
/// are otherwise left untouched.
pub fn attach_bearer<S: TokenStorage>(request: &mut HttpRequest, storage: &S) {
    if let Some(token) = storage.get(TOKEN_KEY) {
        request.set_header("authorization", format!("Bearer {token}"));
    }
}

/// Pass results through, ending the session on a 401.
///
/// On the login route a 401 is a plain failed attempt: the session is kept
/// and no navigation happens. The error is returned to the caller either way.
pub fn intercept_response<T, S, N>(
    result: Result<T, ApiError>,
    store: &mut Store<S>,
    router: &mut N,
) -> Result<T, ApiError>
where
    S: TokenStorage,
    N: Navigator,
{
    if let Err(err @ ApiError::Unauthorized { .. }) = &result {
        if router.current_route() == Some(LOGIN_ROUTE) {
            warn!(error = %err, "unauthorized on login route");
        } else {
            warn!(error = %err, "unauthorized, session cleared, redirecting to login");
            store.clear_auth();
            router.push(LOGIN_PATH);
        }
    }
    result
}
