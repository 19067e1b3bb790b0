pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod realtime;
pub mod state;
pub mod store;
