use serde::{Deserialize, Serialize};

use crate::detection::object::{DetectedObject, ObjectClass};

/// Per-class count summary of a detection's objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Breakdown {
    pub car: u32,
    pub bus: u32,
    pub truck: u32,
    pub motorcycle: u32,
    pub person: u32,
    pub other: u32,
}

impl Breakdown {
    pub fn from_objects(objects: &[DetectedObject]) -> Self {
        let mut breakdown = Breakdown::default();
        for object in objects {
            match object.kind {
                ObjectClass::Car => breakdown.car += 1,
                ObjectClass::Bus => breakdown.bus += 1,
                ObjectClass::Truck => breakdown.truck += 1,
                ObjectClass::Motorcycle => breakdown.motorcycle += 1,
                ObjectClass::Person => breakdown.person += 1,
                ObjectClass::Other => breakdown.other += 1,
            }
        }
        breakdown
    }

    pub fn count(&self, class: ObjectClass) -> u32 {
        match class {
            ObjectClass::Car => self.car,
            ObjectClass::Bus => self.bus,
            ObjectClass::Truck => self.truck,
            ObjectClass::Motorcycle => self.motorcycle,
            ObjectClass::Person => self.person,
            ObjectClass::Other => self.other,
        }
    }

    /// Non-zero classes in fixed display order (car, bus, truck,
    /// motorcycle, person, other). Zero and absent classes are omitted.
    pub fn entries(&self) -> Vec<(ObjectClass, u32)> {
        ObjectClass::DISPLAY_ORDER
            .iter()
            .filter_map(|&class| {
                let count = self.count(class);
                (count > 0).then_some((class, count))
            })
            .collect()
    }

    /// Count of parking-occupancy vehicles only.
    pub fn vehicle_total(&self) -> u32 {
        self.car + self.bus + self.truck
    }
}

/// Optional per-object geometry attached to a detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionDetails {
    pub breakdown: Breakdown,
    pub objects: Vec<DetectedObject>,
}

impl DetectionDetails {
    pub fn from_objects(objects: Vec<DetectedObject>) -> Self {
        Self {
            breakdown: Breakdown::from_objects(&objects),
            objects,
        }
    }
}

/// One completed analysis run over an uploaded image.
///
/// `details` may be absent for older or partial records; consumers must
/// degrade gracefully rather than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub id: i64,
    pub original_filename: String,
    pub car_count: u32,
    pub detected_at: String,
    pub upload_path: String,
    pub result_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DetectionDetails>,
}

impl DetectionResult {
    /// Whether per-object detail data is attached at all. An empty object
    /// list still counts: zero detections is valid input downstream (the
    /// compositor passes the source through), only a missing field is not.
    pub fn has_details(&self) -> bool {
        self.details.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_entries_keep_display_order_and_skip_zeroes() {
        let breakdown = Breakdown {
            car: 2,
            bus: 1,
            ..Default::default()
        };
        assert_eq!(
            breakdown.entries(),
            vec![(ObjectClass::Car, 2), (ObjectClass::Bus, 1)]
        );
    }

    #[test]
    fn breakdown_tallies_objects_per_class() {
        let objects = vec![
            DetectedObject::new(ObjectClass::Car, 0.0, 0.0, 1.0, 1.0),
            DetectedObject::new(ObjectClass::Car, 5.0, 5.0, 1.0, 1.0),
            DetectedObject::new(ObjectClass::Person, 9.0, 9.0, 1.0, 1.0),
        ];
        let breakdown = Breakdown::from_objects(&objects);
        assert_eq!(breakdown.car, 2);
        assert_eq!(breakdown.person, 1);
        assert_eq!(breakdown.vehicle_total(), 2);
    }

    #[test]
    fn result_without_details_reports_no_geometry() {
        let json = r#"{
            "id": 7,
            "original_filename": "lot.jpg",
            "car_count": 3,
            "detected_at": "2025-11-02T10:15:00Z",
            "upload_path": "/static/uploads/ab12_original.jpg",
            "result_path": "/static/results/ab12_result.jpg"
        }"#;
        let result: DetectionResult = serde_json::from_str(json).unwrap();
        assert!(result.details.is_none());
        assert!(!result.has_details());
    }

    #[test]
    fn empty_object_list_still_counts_as_details() {
        let result = DetectionResult {
            id: 1,
            original_filename: "lot.jpg".into(),
            car_count: 0,
            detected_at: "2025-11-02T10:15:00Z".into(),
            upload_path: "/static/uploads/ab12_original.jpg".into(),
            result_path: "/static/results/ab12_result.jpg".into(),
            details: Some(DetectionDetails::from_objects(Vec::new())),
        };
        assert!(result.has_details());
    }
}
