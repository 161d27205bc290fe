//! HTTP routes for Flightdesk
//!
//! This module defines all HTTP endpoints exposed by the panel backend.

pub mod auth;
pub mod health;
pub mod insights;
pub mod metrics;
pub mod records;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{middleware::auth::require_session, AppState};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes that require a panel session
    let protected_routes = Router::new()
        .route("/home/ia/resumen-vuelos", post(insights::flight_summary))
        .route("/home/ia/alertas-vuelos", post(insights::flight_alerts))
        .route("/api/ia/resumen-vuelos", post(insights::flight_summary))
        .route("/api/ia/alertas-vuelos", post(insights::flight_alerts))
        .route(
            "/api/vuelos",
            get(records::list_flights).post(records::create_flight),
        )
        .route(
            "/api/vuelos/:id",
            get(records::get_flight)
                .put(records::update_flight)
                .delete(records::delete_flight),
        )
        .route(
            "/api/aerolineas",
            get(records::list_airlines).post(records::create_airline),
        )
        .route("/api/aerolineas/:id", delete(records::delete_airline))
        .route(
            "/api/aeropuertos",
            get(records::list_airports).post(records::create_airport),
        )
        .route("/api/aeropuertos/:id", delete(records::delete_airport))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    // Public routes - no session required
    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        // The panel's home screen links here
        .route("/login/logout", get(auth::logout))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    // No compression layer: it would buffer the streamed insight bodies.
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
