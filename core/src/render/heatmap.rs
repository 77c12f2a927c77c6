use image::{DynamicImage, RgbaImage};

use crate::detection::DetectedObject;
use crate::math::InterpHelper;
use crate::prelude::RenderResult;
use crate::render::codec;
use crate::telemetry::log::ActivityLog;

/// Glow gradient stops: `(normalized distance, value)`. The center is a
/// strong red-orange, fading through a softer mid stop to transparent at
/// the glow edge.
const ALPHA_STOPS: [(f32, f32); 3] = [(0.0, 0.6), (0.5, 0.3), (1.0, 0.0)];
const GREEN_STOPS: [(f32, f32); 3] = [(0.0, 0.0), (0.5, 50.0), (1.0, 0.0)];

/// Rasterizes a density-glow overlay from detected vehicle geometry.
///
/// The compositor is a pure function of `(image, object list)`: it never
/// mutates the detection record, and heatmap coordinates are interpreted
/// in the source image's natural pixel space.
pub struct HeatmapCompositor {
    logger: ActivityLog,
}

impl HeatmapCompositor {
    pub fn new() -> Self {
        Self {
            logger: ActivityLog::new(),
        }
    }

    /// Composites the vehicle glow layer over `source`.
    ///
    /// Objects outside the vehicle subset contribute nothing; an empty or
    /// vehicle-free list yields a pass-through copy of the source.
    pub fn render_heatmap(&self, source: &DynamicImage, objects: &[DetectedObject]) -> RgbaImage {
        let mut canvas = source.to_rgba8();

        let mut painted = 0usize;
        for object in objects.iter().filter(|object| object.kind.is_vehicle()) {
            paint_glow(&mut canvas, object);
            painted += 1;
        }

        self.logger.record(&format!(
            "HeatmapCompositor painted {} glows over {}x{}",
            painted,
            canvas.width(),
            canvas.height()
        ));

        canvas
    }

    /// Decodes `bytes` and composites the glow layer. Decode failure is
    /// reported as `RenderError::Decode` so callers can restore the
    /// previous image instead of waiting forever.
    pub async fn render_heatmap_from_bytes(
        &self,
        bytes: Vec<u8>,
        objects: Vec<DetectedObject>,
    ) -> RenderResult<RgbaImage> {
        let source = codec::decode_bytes_async(bytes).await?;
        Ok(self.render_heatmap(&source, &objects))
    }
}

impl Default for HeatmapCompositor {
    fn default() -> Self {
        Self::new()
    }
}

/// Paints one radial glow with a screen (lightening) blend so that
/// overlapping glows intensify rather than darken.
fn paint_glow(canvas: &mut RgbaImage, object: &DetectedObject) {
    let radius = object.glow_radius();
    if radius <= 0.0 {
        return;
    }

    let (width, height) = canvas.dimensions();
    let min_x = (object.x - radius).floor().max(0.0) as u32;
    let max_x = ((object.x + radius).ceil().max(0.0) as u32).min(width.saturating_sub(1));
    let min_y = (object.y - radius).floor().max(0.0) as u32;
    let max_y = ((object.y + radius).ceil().max(0.0) as u32).min(height.saturating_sub(1));

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - object.x;
            let dy = y as f32 - object.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance >= radius {
                continue;
            }

            let t = distance / radius;
            let alpha = InterpHelper::gradient(&ALPHA_STOPS, t);
            if alpha <= 0.0 {
                continue;
            }
            let glow = [255.0, InterpHelper::gradient(&GREEN_STOPS, t), 0.0];

            let pixel = canvas.get_pixel_mut(x, y);
            for channel in 0..3 {
                let dst = pixel[channel] as f32;
                let screened = dst + glow[channel] - dst * glow[channel] / 255.0;
                let blended = InterpHelper::lerp(dst, screened, alpha);
                pixel[channel] = InterpHelper::clamp(blended, 0.0, 255.0).round() as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ObjectClass;
    use image::Rgba;

    fn gray_source(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 255])))
    }

    #[test]
    fn empty_object_list_passes_source_through() {
        let source = gray_source(16, 16);
        let output = HeatmapCompositor::new().render_heatmap(&source, &[]);
        assert_eq!(output, source.to_rgba8());
    }

    #[test]
    fn pedestrian_only_list_is_pixel_identical_to_source() {
        let source = gray_source(24, 24);
        let objects = vec![
            DetectedObject::new(ObjectClass::Person, 12.0, 12.0, 6.0, 6.0),
            DetectedObject::new(ObjectClass::Other, 4.0, 4.0, 3.0, 3.0),
        ];
        let output = HeatmapCompositor::new().render_heatmap(&source, &objects);
        assert_eq!(output, source.to_rgba8());
    }

    #[test]
    fn vehicle_glow_brightens_pixels_near_its_center() {
        let source = gray_source(32, 32);
        let objects = vec![DetectedObject::new(ObjectClass::Car, 16.0, 16.0, 8.0, 8.0)];
        let output = HeatmapCompositor::new().render_heatmap(&source, &objects);

        let center = output.get_pixel(16, 16);
        // Screen blend never darkens; the red channel must rise.
        assert!(center[0] > 90);
        // Pixels beyond 1.5 * max(w, h) of the center stay untouched.
        assert_eq!(*output.get_pixel(0, 0), Rgba([90, 90, 90, 255]));
    }

    #[test]
    fn overlapping_glows_intensify() {
        let source = gray_source(32, 32);
        let one = vec![DetectedObject::new(ObjectClass::Car, 16.0, 16.0, 6.0, 6.0)];
        let two = vec![
            DetectedObject::new(ObjectClass::Car, 16.0, 16.0, 6.0, 6.0),
            DetectedObject::new(ObjectClass::Bus, 16.0, 16.0, 6.0, 6.0),
        ];
        let compositor = HeatmapCompositor::new();
        let single = compositor.render_heatmap(&source, &one);
        let double = compositor.render_heatmap(&source, &two);
        assert!(double.get_pixel(16, 16)[1] >= single.get_pixel(16, 16)[1]);
        assert!(double.get_pixel(18, 16)[0] >= single.get_pixel(18, 16)[0]);
    }

    #[test]
    fn glow_clipped_at_image_border_does_not_panic() {
        let source = gray_source(16, 16);
        let objects = vec![DetectedObject::new(ObjectClass::Truck, 0.0, 0.0, 20.0, 20.0)];
        let output = HeatmapCompositor::new().render_heatmap(&source, &objects);
        assert!(output.get_pixel(0, 0)[0] > 90);
    }

    #[tokio::test]
    async fn bytes_entry_rejects_undecodable_input() {
        let compositor = HeatmapCompositor::new();
        let outcome = compositor
            .render_heatmap_from_bytes(vec![0xff, 0x00], Vec::new())
            .await;
        assert!(outcome.is_err());
    }
}
