// Estate Back Office - validation, forms and data layer of a real-estate admin

// Core types and primitives
pub mod core;

// Infrastructure - ID generation and query caching
pub mod infrastructure;

// Schema Framework and per-entity schema definitions
pub mod schema;
pub mod schemas;

// Entities and wire types
pub mod models;

// Form state, wizards and notifications
pub mod forms;

// Mutation/data-fetch layer
pub mod client;

// Mock REST API
pub mod api;
pub mod app_state;

// Top-level back-office shell
pub mod admin_shell;

// Common utilities
pub mod config;
pub mod error;

#[cfg(test)]
mod test_fixtures;

// Re-exports for convenience
pub use admin_shell::AdminShell;
pub use error::{AppError, AppResult};
