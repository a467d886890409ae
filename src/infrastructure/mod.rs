// CSV snapshot persistence
pub mod csv_store;

// Shared HTTP client plumbing
pub mod http;

// Deterministic offline price source
pub mod synthetic;

// Text-mode chart rendering
pub mod term_render;

// Yahoo-style chart API adapter
pub mod yahoo;
