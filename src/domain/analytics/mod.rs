//! Pure computational stages of the diagnostics pipeline. Everything here is
//! synchronous and side-effect free; the application layer decides ordering
//! and wiring.

pub mod correlation;
pub mod decomposition;
pub mod descriptive;
pub mod outliers;
pub mod risk;
pub mod rolling;
pub mod stats;
