//! Pass-through proxy for the FNA tumour classification service
//!
//! Forwards `GET /` and `POST /predict` to the configured backend and relays
//! the backend's JSON body and status. Any transport failure or non-JSON
//! backend body becomes a 500 with a fixed detail message, as does a
//! `POST /predict` whose own body is not JSON.

pub mod api;
pub mod config;
pub mod metrics;
