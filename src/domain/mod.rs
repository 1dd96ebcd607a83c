// Metrics engine (validation gate + derived metrics)
pub mod metrics;

// Port interfaces
pub mod ports;

// Core data model
pub mod types;

// Domain-specific error types
pub mod errors;
