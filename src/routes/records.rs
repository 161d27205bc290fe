//! Record management endpoints
//!
//! JSON listings, lookup, create and update of the active records, plus soft
//! delete. Store failures are returned as `500` with the raw store message.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    records::{Airline, AirlineDraft, Airport, AirportDraft, Flight, FlightDraft},
    routes::metrics::{record_creation, record_deactivation},
    AppState,
};

pub async fn list_flights(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Flight>>> {
    Ok(Json(state.store.active_flights().await?))
}

pub async fn list_airlines(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Airline>>> {
    Ok(Json(state.store.active_airlines().await?))
}

pub async fn list_airports(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Airport>>> {
    Ok(Json(state.store.active_airports().await?))
}

/// Reject drafts with blank required text
fn require_filled(fields: &[(&str, &str)]) -> AppResult<()> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(AppError::BadRequest(format!("{} is required", name))),
        None => Ok(()),
    }
}

fn created<T>(kind: &'static str, id: i64, record: T) -> (StatusCode, Json<T>) {
    info!(kind, id, "Record created");
    record_creation(kind);
    (StatusCode::CREATED, Json(record))
}

pub async fn get_flight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Flight>> {
    state
        .store
        .flight(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("flight {}", id)))
}

pub async fn create_flight(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<FlightDraft>,
) -> AppResult<(StatusCode, Json<Flight>)> {
    require_filled(&[("status", draft.status.as_str())])?;
    let flight = state.store.create_flight(draft).await?;
    Ok(created("flight", flight.id, flight))
}

pub async fn update_flight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(draft): Json<FlightDraft>,
) -> AppResult<Json<Flight>> {
    require_filled(&[("status", draft.status.as_str())])?;
    let flight = state
        .store
        .update_flight(id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("flight {}", id)))?;
    info!(id, status = %flight.status, "Flight updated");
    Ok(Json(flight))
}

pub async fn create_airline(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<AirlineDraft>,
) -> AppResult<(StatusCode, Json<Airline>)> {
    require_filled(&[("name", draft.name.as_str()), ("code", draft.code.as_str())])?;
    let airline = state.store.create_airline(draft).await?;
    Ok(created("airline", airline.id, airline))
}

pub async fn create_airport(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<AirportDraft>,
) -> AppResult<(StatusCode, Json<Airport>)> {
    require_filled(&[("name", draft.name.as_str()), ("iata_code", draft.iata_code.as_str())])?;
    let airport = state.store.create_airport(draft).await?;
    Ok(created("airport", airport.id, airport))
}

fn deactivated(kind: &'static str, id: i64, found: bool) -> AppResult<StatusCode> {
    if !found {
        return Err(AppError::NotFound(format!("{} {}", kind, id)));
    }
    info!(kind, id, "Record deactivated");
    record_deactivation(kind);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_flight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    deactivated("flight", id, state.store.deactivate_flight(id).await?)
}

pub async fn delete_airline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    deactivated("airline", id, state.store.deactivate_airline(id).await?)
}

pub async fn delete_airport(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    deactivated("airport", id, state.store.deactivate_airport(id).await?)
}
