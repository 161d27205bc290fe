//! Session authentication middleware
//!
//! Resolves the session cookie against the session store and rejects the
//! request with the fixed unauthorized literal when there is no live session.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument};

use crate::{error::AppError, session, AppState};

/// Session owner, added to request extensions for handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub username: String,
    pub created_at: i64,
}

/// Require a live panel session
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session::token_from_headers(request.headers()).ok_or_else(|| {
        debug!("No session cookie");
        AppError::Unauthorized
    })?;

    let session = state.sessions.get(token).await?.ok_or_else(|| {
        debug!("Session cookie does not match a live session");
        AppError::Unauthorized
    })?;

    debug!(username = %session.username, "Session authenticated");

    request.extensions_mut().insert(AuthenticatedSession {
        username: session.username,
        created_at: session.created_at,
    });

    Ok(next.run(request).await)
}
