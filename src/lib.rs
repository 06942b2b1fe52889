// Core modules
pub mod schema;

// Outer layer
pub mod config;
pub mod monitoring;
pub mod records;
pub mod runner;

// Re-exports
pub use schema::{
    validate, Bound, Field, FieldError, MarketSnapshot, RecordValidator, Rule, ValidationError,
    ValidationMode,
};
