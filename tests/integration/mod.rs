//! Integration tests for Flightdesk
//!
//! Each test drives the full router (session middleware, record store, relay
//! and HTTP client) against a mock completion API.

mod health;
mod records;
