//! Panel login and logout

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    routes::metrics::record_login_attempt,
    session::{self, expired_session_cookie, session_cookie},
    AppState,
};

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn redirect(location: &str, cookie: String) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string()), (header::SET_COOKIE, cookie)],
    )
        .into_response()
}

/// `POST /login`
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if form.username != state.config.admin_username || form.password != state.config.admin_password
    {
        warn!("Rejected login");
        record_login_attempt("rejected");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.sessions.create(&form.username).await?;
    record_login_attempt("accepted");
    info!("Login accepted");

    Ok(redirect(
        "/home",
        session_cookie(&token, state.sessions.ttl_seconds()),
    ))
}

/// `GET /logout`
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = session::token_from_headers(&headers) {
        state.sessions.destroy(token).await?;
        info!("Session destroyed");
    }

    Ok(redirect("/", expired_session_cookie()))
}
