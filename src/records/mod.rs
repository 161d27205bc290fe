//! Flight records
//!
//! Defines the flight/airline/airport records and the store trait used by the
//! HTTP layer. Every table uses soft delete: rows are deactivated, never removed,
//! so historical references stay resolvable.

pub mod in_memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use self::in_memory::InMemoryFlightStore;
pub use self::mysql::MySqlFlightStore;

/// A scheduled flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub code: String,
    pub airline_id: i64,
    pub origin_airport_id: i64,
    pub destination_airport_id: i64,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub arrival_time: Option<NaiveTime>,
    /// Free text such as "programado", "retrasado" or "cancelado"
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    pub id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: i64,
    pub name: String,
    pub iata_code: String,
    pub city: String,
    pub country: String,
}

/// Editable flight fields, used for both create and update
///
/// The flight code is assigned once on creation and never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDraft {
    pub airline_id: i64,
    pub origin_airport_id: i64,
    pub destination_airport_id: i64,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub arrival_time: Option<NaiveTime>,
    pub status: String,
}

impl FlightDraft {
    /// Materialize the draft as a stored flight
    pub fn into_flight(self, id: i64, code: String) -> Flight {
        Flight {
            id,
            code,
            airline_id: self.airline_id,
            origin_airport_id: self.origin_airport_id,
            destination_airport_id: self.destination_airport_id,
            departure_date: self.departure_date,
            departure_time: self.departure_time,
            arrival_date: self.arrival_date,
            arrival_time: self.arrival_time,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineDraft {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportDraft {
    pub name: String,
    pub iata_code: String,
    pub city: String,
    pub country: String,
}

/// New flight code: `VUELO-` plus three uppercase alphanumerics
pub fn generate_flight_code() -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(3)
        .collect();
    format!("VUELO-{}", suffix.to_uppercase())
}

/// Record store errors. The message is surfaced to the panel verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(String),

    #[error("Invalid seed data: {0}")]
    Seed(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Access to active flight records
///
/// All listing and lookup methods see active rows only. The `deactivate_*`
/// methods return `false` when no active row matched the id. Created rows
/// are active and get the next free id.
#[async_trait]
pub trait FlightStore: Send + Sync {
    /// Backend name for logging and health checks
    fn name(&self) -> &'static str;

    async fn active_flights(&self) -> Result<Vec<Flight>, StoreError>;

    async fn active_airlines(&self) -> Result<Vec<Airline>, StoreError>;

    async fn active_airports(&self) -> Result<Vec<Airport>, StoreError>;

    /// An active flight by id
    async fn flight(&self, id: i64) -> Result<Option<Flight>, StoreError>;

    /// Insert an active flight with a generated code
    async fn create_flight(&self, draft: FlightDraft) -> Result<Flight, StoreError>;

    /// Overwrite an active flight's editable fields. `None` when no active
    /// flight has that id.
    async fn update_flight(&self, id: i64, draft: FlightDraft) -> Result<Option<Flight>, StoreError>;

    async fn create_airline(&self, draft: AirlineDraft) -> Result<Airline, StoreError>;

    async fn create_airport(&self, draft: AirportDraft) -> Result<Airport, StoreError>;

    async fn deactivate_flight(&self, id: i64) -> Result<bool, StoreError>;

    async fn deactivate_airline(&self, id: i64) -> Result<bool, StoreError>;

    async fn deactivate_airport(&self, id: i64) -> Result<bool, StoreError>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<(), StoreError>;
}
