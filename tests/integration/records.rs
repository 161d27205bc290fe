//! Record management integration tests
//!
//! - GET /api/vuelos, /api/aerolineas, /api/aeropuertos
//! - GET/PUT /api/vuelos/:id
//! - POST /api/vuelos, /api/aerolineas, /api/aeropuertos
//! - DELETE /api/{vuelos,aerolineas,aeropuertos}/:id

use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use crate::common::TestApp;

#[tokio::test]
async fn test_listings_require_session() {
    let app = TestApp::start().await;

    for path in ["/api/vuelos", "/api/aerolineas", "/api/aeropuertos"] {
        app.server.get(path).await.assert_status(StatusCode::UNAUTHORIZED);
    }
    app.server
        .delete("/api/vuelos/1")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .post("/api/aerolineas")
        .json(&json!({"name": "JetSMART", "code": "JA"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_active_records() {
    let app = TestApp::start().await;
    let cookie = app.session_cookie().await;

    let flights: Vec<Value> = app
        .server
        .get("/api/vuelos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .json();
    assert_eq!(flights.len(), 3);
    assert_eq!(flights[0]["id"], 1);
    assert_eq!(flights[0]["departure_date"], "2025-03-14");
    assert_eq!(flights[1]["status"], "retrasado");

    let airports: Vec<Value> = app
        .server
        .get("/api/aeropuertos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .json();
    let codes: Vec<&str> = airports
        .iter()
        .map(|a| a["iata_code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["EZE", "COR", "MDZ"]);

    let airlines: Vec<Value> = app
        .server
        .get("/api/aerolineas")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .json();
    assert_eq!(airlines.len(), 2);
}

#[tokio::test]
async fn test_soft_delete_flight() {
    let app = TestApp::start().await;
    let cookie = app.session_cookie().await;

    app.server
        .delete("/api/vuelos/2")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let flights: Vec<Value> = app
        .server
        .get("/api/vuelos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .json();
    let ids: Vec<i64> = flights.iter().map(|f| f["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 3]);

    app.server
        .delete("/api/vuelos/2")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deactivated_flight_leaves_prompt() {
    let app = TestApp::start().await;
    app.llm.mock_stream(&["ok"]).await;
    let cookie = app.session_cookie().await;

    app.server
        .delete("/api/vuelos/3")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .post("/home/ia/resumen-vuelos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&json!({"promptType": "resumen_general"}))
        .await
        .assert_status_ok();

    let bodies = app.llm.received_bodies().await;
    let user = bodies[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Vuelo ID: 1,"));
    assert!(!user.contains("Vuelo ID: 3,"));
}

#[tokio::test]
async fn test_deactivated_airport_shows_as_missing() {
    let app = TestApp::start().await;
    app.llm.mock_stream(&["ok"]).await;
    let cookie = app.session_cookie().await;

    app.server
        .delete("/api/aeropuertos/3")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .post("/home/ia/resumen-vuelos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&json!({"promptType": "resumen_general"}))
        .await
        .assert_status_ok();

    let bodies = app.llm.received_bodies().await;
    let user = bodies[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Vuelo ID: 2, Aerolínea: Flybondi, Origen: COR, Destino: N/A"));
    assert!(!user.contains("MDZ"));
}

#[tokio::test]
async fn test_delete_unknown_airline_is_404() {
    let app = TestApp::start().await;
    let cookie = app.session_cookie().await;

    app.server
        .delete("/api/aerolineas/99")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

fn new_flight(status: &str) -> Value {
    json!({
        "airline_id": 2,
        "origin_airport_id": 1,
        "destination_airport_id": 3,
        "departure_date": "2025-03-15",
        "departure_time": "06:40:00",
        "arrival_date": "2025-03-15",
        "arrival_time": "08:35:00",
        "status": status
    })
}

#[tokio::test]
async fn test_create_flight_joins_listing_and_prompt() {
    let app = TestApp::start().await;
    app.llm.mock_stream(&["ok"]).await;
    let cookie = app.session_cookie().await;

    let response = app
        .server
        .post("/api/vuelos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&new_flight("programado"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["id"], 4);
    assert!(created["code"].as_str().unwrap().starts_with("VUELO-"));
    assert_eq!(created["arrival_time"], "08:35:00");

    let fetched: Value = app
        .server
        .get("/api/vuelos/4")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .json();
    assert_eq!(fetched, created);

    app.server
        .post("/home/ia/resumen-vuelos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&json!({"promptType": "resumen_general"}))
        .await
        .assert_status_ok();

    let bodies = app.llm.received_bodies().await;
    let user = bodies[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Vuelo ID: 4, Aerolínea: Flybondi, Origen: EZE, Destino: MDZ"));
}

#[tokio::test]
async fn test_update_flight() {
    let app = TestApp::start().await;
    let cookie = app.session_cookie().await;

    let response = app
        .server
        .put("/api/vuelos/1")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&new_flight("retrasado"))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["code"], "AR1301");
    assert_eq!(updated["status"], "retrasado");
    assert_eq!(updated["destination_airport_id"], 3);

    let fetched: Value = app
        .server
        .get("/api/vuelos/1")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .json();
    assert_eq!(fetched["status"], "retrasado");
}

#[tokio::test]
async fn test_deactivated_flight_cannot_be_fetched_or_updated() {
    let app = TestApp::start().await;
    let cookie = app.session_cookie().await;

    app.server
        .delete("/api/vuelos/2")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get("/api/vuelos/2")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .put("/api/vuelos/2")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&new_flight("cancelado"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_airline_and_airport() {
    let app = TestApp::start().await;
    let cookie = app.session_cookie().await;

    let response = app
        .server
        .post("/api/aerolineas")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&json!({"name": "JetSMART", "code": "JA"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["id"], 3);

    let response = app
        .server
        .post("/api/aeropuertos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&json!({
            "name": "Aeroparque Jorge Newbery",
            "iata_code": "AEP",
            "city": "Buenos Aires",
            "country": "Argentina"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["id"], 4);

    let airports: Vec<Value> = app
        .server
        .get("/api/aeropuertos")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .await
        .json();
    assert_eq!(airports.len(), 4);
    assert_eq!(airports[3]["iata_code"], "AEP");
}

#[tokio::test]
async fn test_blank_airline_code_is_400() {
    let app = TestApp::start().await;
    let cookie = app.session_cookie().await;

    let response = app
        .server
        .post("/api/aerolineas")
        .add_header(header::COOKIE, cookie.parse().unwrap())
        .json(&json!({"name": "JetSMART", "code": ""}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Bad request: code is required");
}
