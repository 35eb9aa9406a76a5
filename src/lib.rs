// Social media API - profiles, follows, posts, hashtags, likes and comments over SQLite

// HTTP handlers, extractors and routing
pub mod api;

// Shared application state
pub mod app_state;

// Environment-driven configuration
pub mod config;

// Core types and primitives
pub mod core;

// Persisted rows and their direct persistence operations
pub mod entities;

// Infrastructure - database, identity, media, access control
pub mod infrastructure;

// Request payloads and response shapes
pub mod models;

// Relationship logic and annotated queries
pub mod services;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
