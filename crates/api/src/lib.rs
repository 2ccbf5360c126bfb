//! ThekaWatch API library.
//!
//! Nearby alcohol shops from `OpenStreetMap`, crowd level and open/closed
//! status from anonymous votes, and a routing proxy. The binary in `main.rs`
//! only wires configuration, tracing and Sentry around [`routes::router`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod osrm;
pub mod overpass;
pub mod routes;
pub mod services;
pub mod state;
