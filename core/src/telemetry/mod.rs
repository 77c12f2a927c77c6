pub mod log;
pub mod metrics;

pub use log::ActivityLog;
pub use metrics::RenderMetrics;
