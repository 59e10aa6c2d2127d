use axum::extract::Request;
use axum::http::StatusCode;
use warden_auth::roles;

use crate::middleware::auth::{authenticate, authorize};
use crate::state::AppState;
use crate::web::{HandlerResult, respond};

/// Returns the claims of the caller's bearer token.
pub async fn whoami(state: AppState, req: Request) -> HandlerResult {
    let claims = authenticate(&state.auth, req.headers())?;
    respond(&claims, StatusCode::OK)
}

/// Like [`whoami`], restricted to callers holding the `ADMIN` role.
pub async fn admin(state: AppState, req: Request) -> HandlerResult {
    let claims = authenticate(&state.auth, req.headers())?;
    authorize(&state.auth, &claims, roles::ADMIN)?;
    respond(&claims, StatusCode::OK)
}
