use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::detection::{DetectedObject, ObjectClass};
use crate::telemetry::log::ActivityLog;

/// Draws class-colored bounding boxes over the source image, producing
/// the annotated result surface shown next to the original.
pub struct BoxAnnotator {
    thickness: u32,
    logger: ActivityLog,
}

pub fn class_color(class: ObjectClass) -> Rgba<u8> {
    match class {
        ObjectClass::Car => Rgba([0, 240, 255, 255]),
        ObjectClass::Bus => Rgba([255, 200, 0, 255]),
        ObjectClass::Truck => Rgba([180, 120, 255, 255]),
        ObjectClass::Motorcycle => Rgba([120, 255, 120, 255]),
        ObjectClass::Person => Rgba([255, 120, 160, 255]),
        ObjectClass::Other => Rgba([200, 200, 200, 255]),
    }
}

impl BoxAnnotator {
    pub fn new() -> Self {
        Self {
            thickness: 2,
            logger: ActivityLog::new(),
        }
    }

    pub fn with_thickness(mut self, thickness: u32) -> Self {
        self.thickness = thickness.max(1);
        self
    }

    pub fn annotate(&self, source: &DynamicImage, objects: &[DetectedObject]) -> RgbaImage {
        let mut canvas = source.to_rgba8();

        for object in objects {
            let color = class_color(object.kind);
            let left = (object.x - object.w / 2.0).round() as i32;
            let top = (object.y - object.h / 2.0).round() as i32;
            let width = (object.w.round() as u32).max(1);
            let height = (object.h.round() as u32).max(1);

            // Inset one pixel per ring to thicken the outline.
            for ring in 0..self.thickness {
                let inset = ring as i32;
                let ring_width = width.saturating_sub(2 * ring);
                let ring_height = height.saturating_sub(2 * ring);
                if ring_width == 0 || ring_height == 0 {
                    break;
                }
                let rect =
                    Rect::at(left + inset, top + inset).of_size(ring_width, ring_height);
                draw_hollow_rect_mut(&mut canvas, rect, color);
            }
        }

        self.logger
            .record(&format!("BoxAnnotator drew {} boxes", objects.len()));

        canvas
    }
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark_source(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([10, 10, 10, 255])))
    }

    #[test]
    fn annotate_marks_box_edges() {
        let source = dark_source(40, 40);
        let objects = vec![DetectedObject::new(ObjectClass::Car, 20.0, 20.0, 10.0, 10.0)];
        let output = BoxAnnotator::new().annotate(&source, &objects);
        // Left edge of a 10x10 box centered at (20, 20).
        assert_eq!(*output.get_pixel(15, 20), class_color(ObjectClass::Car));
        // Box interior stays untouched.
        assert_eq!(*output.get_pixel(20, 20), Rgba([10, 10, 10, 255]));
    }

    #[test]
    fn annotate_without_objects_is_a_copy() {
        let source = dark_source(8, 8);
        let output = BoxAnnotator::new().annotate(&source, &[]);
        assert_eq!(output, source.to_rgba8());
    }

    #[test]
    fn tiny_boxes_do_not_panic() {
        let source = dark_source(8, 8);
        let objects = vec![DetectedObject::new(ObjectClass::Person, 2.0, 2.0, 1.0, 1.0)];
        let _ = BoxAnnotator::new().annotate(&source, &objects);
    }
}
