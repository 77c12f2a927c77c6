use serde::{Deserialize, Serialize};

/// Object classes reported by the analysis backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Car,
    Bus,
    Truck,
    Motorcycle,
    Person,
    Other,
}

impl ObjectClass {
    /// Classes counted as parking-occupancy signals. Pedestrians and
    /// unclassified objects are excluded from the heatmap.
    pub fn is_vehicle(self) -> bool {
        matches!(self, ObjectClass::Car | ObjectClass::Bus | ObjectClass::Truck)
    }

    /// Fixed display order used by the breakdown bar.
    pub const DISPLAY_ORDER: [ObjectClass; 6] = [
        ObjectClass::Car,
        ObjectClass::Bus,
        ObjectClass::Truck,
        ObjectClass::Motorcycle,
        ObjectClass::Person,
        ObjectClass::Other,
    ];
}

/// Single detected object in source-image pixel coordinates.
///
/// `(x, y)` is the bounding-box center; `(w, h)` its width and height in
/// the same coordinate space. Coordinates refer to the original upload's
/// natural pixel dimensions, never to a scaled display surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    #[serde(rename = "class")]
    pub kind: ObjectClass,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl DetectedObject {
    pub fn new(kind: ObjectClass, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { kind, x, y, w, h }
    }

    /// Glow radius used by the heatmap compositor.
    pub fn glow_radius(&self) -> f32 {
        self.w.max(self.h) * 1.5
    }
}
