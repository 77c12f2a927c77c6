pub mod object;
pub mod record;

pub use object::{DetectedObject, ObjectClass};
pub use record::{Breakdown, DetectionDetails, DetectionResult};
