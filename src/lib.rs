pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod network;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;
