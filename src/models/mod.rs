pub mod observations;
pub mod prom;

// Re-export the public API
pub use observations::{Observations, ObservationsRequest, ReducedValue};
pub use prom::{PromEnvelope, RangeResult, RangeSeries, ResultKind};
