//! Courtside Dashboard Library
//!
//! Retrieval and normalization layer between the hosted prediction store and
//! the dashboard UI, plus the client-side helpers the UI builds on.

pub mod config;
pub mod constants;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;

pub use config::Config;
pub use db::{open_store, DynStore, MemoryStore, Store};
pub use error::{AppError, Result};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState with the given store and configuration
    pub fn new(store: DynStore, config: Config) -> Self {
        Self { store, config }
    }
}
