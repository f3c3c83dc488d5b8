//! Logging and metrics.

mod logging;
pub mod metrics;

pub use logging::{init_tracing, TracingConfig};
pub use metrics::{init_metrics, write_metrics};
