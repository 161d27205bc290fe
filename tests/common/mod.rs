//! Common test utilities for Flightdesk
//!
//! Builds a full application over seeded in-memory records, in-memory
//! sessions and a wiremock completion API.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{NaiveDate, NaiveTime};

use flightdesk::{
    records::{
        Airline, AirlineDraft, Airport, AirportDraft, Flight, FlightDraft, StoreError,
    },
    routes, AppState, Config, FlightStore, InMemoryFlightStore, OpenAiCompatibleClient,
    SessionStore,
};

use crate::mocks::MockCompletionApi;

/// Test configuration constants
pub mod constants {
    pub const TEST_API_KEY: &str = "test-llm-api-key";
    pub const TEST_MODEL: &str = "qwen-turbo";
    pub const TEST_USERNAME: &str = "operador";
    pub const TEST_PASSWORD: &str = "clave-segura";
    /// IATA codes present in the fixture airports
    pub const FIXTURE_IATA_CODES: [&str; 3] = ["EZE", "COR", "MDZ"];
}

/// Configuration pointing at the mock completion API
pub fn test_config(llm_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        llm_api_url: llm_url.to_string(),
        llm_api_key: constants::TEST_API_KEY.to_string(),
        llm_model: constants::TEST_MODEL.to_string(),
        llm_max_tokens: 1024,
        relay_timeout_seconds: 10,
        database_url: None,
        seed_file: None,
        redis_url: None,
        session_ttl_seconds: 300,
        admin_username: constants::TEST_USERNAME.to_string(),
        admin_password: constants::TEST_PASSWORD.to_string(),
    }
}

pub fn fixture_airlines() -> Vec<Airline> {
    vec![
        Airline {
            id: 1,
            name: "Aerolíneas Argentinas".to_string(),
            code: "AR".to_string(),
        },
        Airline {
            id: 2,
            name: "Flybondi".to_string(),
            code: "FO".to_string(),
        },
    ]
}

pub fn fixture_airports() -> Vec<Airport> {
    vec![
        Airport {
            id: 1,
            name: "Ministro Pistarini".to_string(),
            iata_code: "EZE".to_string(),
            city: "Buenos Aires".to_string(),
            country: "Argentina".to_string(),
        },
        Airport {
            id: 2,
            name: "Ingeniero Ambrosio Taravella".to_string(),
            iata_code: "COR".to_string(),
            city: "Córdoba".to_string(),
            country: "Argentina".to_string(),
        },
        Airport {
            id: 3,
            name: "El Plumerillo".to_string(),
            iata_code: "MDZ".to_string(),
            city: "Mendoza".to_string(),
            country: "Argentina".to_string(),
        },
    ]
}

fn flight(id: i64, airline_id: i64, origin: i64, destination: i64, hour: u32, status: &str) -> Flight {
    Flight {
        id,
        code: format!("AR{}", 1300 + id),
        airline_id,
        origin_airport_id: origin,
        destination_airport_id: destination,
        departure_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        departure_time: NaiveTime::from_hms_opt(hour, 15, 0).unwrap(),
        arrival_date: None,
        arrival_time: None,
        status: status.to_string(),
    }
}

pub fn fixture_flights() -> Vec<Flight> {
    vec![
        flight(1, 1, 1, 2, 7, "programado"),
        flight(2, 2, 2, 3, 11, "retrasado"),
        flight(3, 1, 3, 1, 19, "cancelado"),
    ]
}

/// Record store whose database is unreachable: every call fails with the
/// same message
pub struct FailingFlightStore {
    pub message: &'static str,
}

impl FailingFlightStore {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Database(self.message.to_string()))
    }
}

#[async_trait]
impl FlightStore for FailingFlightStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn active_flights(&self) -> Result<Vec<Flight>, StoreError> {
        self.fail()
    }

    async fn active_airlines(&self) -> Result<Vec<Airline>, StoreError> {
        self.fail()
    }

    async fn active_airports(&self) -> Result<Vec<Airport>, StoreError> {
        self.fail()
    }

    async fn flight(&self, _id: i64) -> Result<Option<Flight>, StoreError> {
        self.fail()
    }

    async fn create_flight(&self, _draft: FlightDraft) -> Result<Flight, StoreError> {
        self.fail()
    }

    async fn update_flight(&self, _id: i64, _draft: FlightDraft) -> Result<Option<Flight>, StoreError> {
        self.fail()
    }

    async fn create_airline(&self, _draft: AirlineDraft) -> Result<Airline, StoreError> {
        self.fail()
    }

    async fn create_airport(&self, _draft: AirportDraft) -> Result<Airport, StoreError> {
        self.fail()
    }

    async fn deactivate_flight(&self, _id: i64) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn deactivate_airline(&self, _id: i64) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn deactivate_airport(&self, _id: i64) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.fail()
    }
}

/// A running application with its collaborators
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub llm: MockCompletionApi,
}

impl TestApp {
    /// Start the app over the fixture records
    pub async fn start() -> Self {
        let store = InMemoryFlightStore::with_records(
            fixture_flights(),
            fixture_airlines(),
            fixture_airports(),
        );
        Self::start_with_store(store).await
    }

    pub async fn start_with_store(store: impl FlightStore + 'static) -> Self {
        let llm = MockCompletionApi::start().await;
        let config = test_config(&llm.uri());
        let upstream = Arc::new(OpenAiCompatibleClient::new(reqwest::Client::new(), &config));
        let sessions = Arc::new(SessionStore::in_memory(config.session_ttl_seconds));

        let state = Arc::new(AppState::from_parts(
            config,
            Arc::new(store),
            sessions,
            upstream,
        ));
        let server = TestServer::new(routes::create_router(state.clone()))
            .expect("Failed to create test server");

        Self { server, state, llm }
    }

    /// Cookie header value for a fresh logged-in session
    pub async fn session_cookie(&self) -> String {
        let token = self
            .state
            .sessions
            .create(constants::TEST_USERNAME)
            .await
            .expect("session created");
        format!("flightdesk_session={}", token)
    }
}
