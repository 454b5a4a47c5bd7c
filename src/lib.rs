pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod meals;
pub mod session;
pub mod state;
pub mod summary;
pub mod telemetry;
