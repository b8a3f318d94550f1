//! epiglobe - epidemic dashboard data builder
//!
//! Turns per-country (and optionally per-state) case records into the
//! aggregates, trends, forecasts and globe markers an epidemic dashboard
//! renders.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod models;
pub mod report;
pub mod synthetic;
