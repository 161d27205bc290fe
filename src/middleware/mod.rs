//! Middleware module
//!
//! Contains Tower middleware guarding the panel routes.

pub mod auth;
