//! In-memory record store
//!
//! Used when no database is configured, and by the test suite. Rows keep an
//! `active` flag so soft delete behaves like the MySQL tables.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::{
    generate_flight_code, Airline, AirlineDraft, Airport, AirportDraft, Flight, FlightDraft,
    FlightStore, StoreError,
};

/// A stored row with its soft-delete flag
struct Row<T> {
    record: T,
    active: bool,
}

impl<T> Row<T> {
    fn active(record: T) -> Self {
        Self {
            record,
            active: true,
        }
    }
}

#[derive(Default)]
struct Tables {
    flights: Vec<Row<Flight>>,
    airlines: Vec<Row<Airline>>,
    airports: Vec<Row<Airport>>,
}

/// Shape of the JSON seed file
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub airlines: Vec<Airline>,
    #[serde(default)]
    pub airports: Vec<Airport>,
}

/// In-memory flight store
///
/// Rows are kept in insertion order, which is the order listings return.
pub struct InMemoryFlightStore {
    tables: RwLock<Tables>,
}

impl InMemoryFlightStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create a store holding the given records, all active
    pub fn with_records(flights: Vec<Flight>, airlines: Vec<Airline>, airports: Vec<Airport>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                flights: flights.into_iter().map(Row::active).collect(),
                airlines: airlines.into_iter().map(Row::active).collect(),
                airports: airports.into_iter().map(Row::active).collect(),
            }),
        }
    }

    /// Load records from a JSON seed file
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;
        let seed: SeedData =
            serde_json::from_str(&raw).map_err(|e| StoreError::Seed(e.to_string()))?;

        info!(
            path = %path.display(),
            flights = seed.flights.len(),
            airlines = seed.airlines.len(),
            airports = seed.airports.len(),
            "Loaded seed records"
        );

        Ok(Self::with_records(seed.flights, seed.airlines, seed.airports))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Database("record store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Database("record store lock poisoned".to_string()))
    }
}

impl Default for InMemoryFlightStore {
    fn default() -> Self {
        Self::new()
    }
}

fn active_records<T: Clone>(rows: &[Row<T>]) -> Vec<T> {
    rows.iter()
        .filter(|row| row.active)
        .map(|row| row.record.clone())
        .collect()
}

/// Next id after every row ever stored, deactivated ones included
fn next_id<T>(rows: &[Row<T>], id_of: impl Fn(&T) -> i64) -> i64 {
    rows.iter().map(|row| id_of(&row.record)).max().unwrap_or(0) + 1
}

fn deactivate<T>(rows: &mut [Row<T>], matches: impl Fn(&T) -> bool) -> bool {
    match rows.iter_mut().find(|row| row.active && matches(&row.record)) {
        Some(row) => {
            row.active = false;
            true
        }
        None => false,
    }
}

#[async_trait]
impl FlightStore for InMemoryFlightStore {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn active_flights(&self) -> Result<Vec<Flight>, StoreError> {
        Ok(active_records(&self.read()?.flights))
    }

    async fn active_airlines(&self) -> Result<Vec<Airline>, StoreError> {
        Ok(active_records(&self.read()?.airlines))
    }

    async fn active_airports(&self) -> Result<Vec<Airport>, StoreError> {
        Ok(active_records(&self.read()?.airports))
    }

    async fn flight(&self, id: i64) -> Result<Option<Flight>, StoreError> {
        Ok(self
            .read()?
            .flights
            .iter()
            .find(|row| row.active && row.record.id == id)
            .map(|row| row.record.clone()))
    }

    async fn create_flight(&self, draft: FlightDraft) -> Result<Flight, StoreError> {
        let mut tables = self.write()?;
        let id = next_id(&tables.flights, |f| f.id);
        let flight = draft.into_flight(id, generate_flight_code());
        tables.flights.push(Row::active(flight.clone()));
        Ok(flight)
    }

    async fn update_flight(&self, id: i64, draft: FlightDraft) -> Result<Option<Flight>, StoreError> {
        let mut tables = self.write()?;
        let Some(row) = tables
            .flights
            .iter_mut()
            .find(|row| row.active && row.record.id == id)
        else {
            return Ok(None);
        };
        let code = std::mem::take(&mut row.record.code);
        row.record = draft.into_flight(id, code);
        Ok(Some(row.record.clone()))
    }

    async fn create_airline(&self, draft: AirlineDraft) -> Result<Airline, StoreError> {
        let mut tables = self.write()?;
        let airline = Airline {
            id: next_id(&tables.airlines, |a| a.id),
            name: draft.name,
            code: draft.code,
        };
        tables.airlines.push(Row::active(airline.clone()));
        Ok(airline)
    }

    async fn create_airport(&self, draft: AirportDraft) -> Result<Airport, StoreError> {
        let mut tables = self.write()?;
        let airport = Airport {
            id: next_id(&tables.airports, |a| a.id),
            name: draft.name,
            iata_code: draft.iata_code,
            city: draft.city,
            country: draft.country,
        };
        tables.airports.push(Row::active(airport.clone()));
        Ok(airport)
    }

    async fn deactivate_flight(&self, id: i64) -> Result<bool, StoreError> {
        Ok(deactivate(&mut self.write()?.flights, |f| f.id == id))
    }

    async fn deactivate_airline(&self, id: i64) -> Result<bool, StoreError> {
        Ok(deactivate(&mut self.write()?.airlines, |a| a.id == id))
    }

    async fn deactivate_airport(&self, id: i64) -> Result<bool, StoreError> {
        Ok(deactivate(&mut self.write()?.airports, |a| a.id == id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}
