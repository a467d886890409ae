// Analytics stages (pure computation)
pub mod analytics;

// Domain-specific error types
pub mod errors;

// Port interfaces for collaborators
pub mod ports;

// Typed time-series schema
pub mod series;
