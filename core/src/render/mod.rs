pub mod annotate;
pub mod codec;
pub mod heatmap;
pub mod slider;

pub use annotate::BoxAnnotator;
pub use heatmap::HeatmapCompositor;
pub use slider::{ComparisonSlider, ContainerBounds, DragState};
