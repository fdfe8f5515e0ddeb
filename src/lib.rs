pub mod app;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod server;
pub mod state;
pub mod types;
pub mod wizard;
