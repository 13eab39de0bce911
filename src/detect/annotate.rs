use crate::detect::detector::Detection;
use image::{DynamicImage, Rgb, RgbImage};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_BORDER: u32 = 3;

/// Draws a red rectangle around every detection. Returns a new image; the
/// original frame buffer is shared and never mutated in place.
pub fn draw_detections(image: &DynamicImage, detections: &[Detection]) -> DynamicImage {
    let mut canvas = image.to_rgb8();
    for detection in detections {
        draw_rect(&mut canvas, detection);
    }
    DynamicImage::ImageRgb8(canvas)
}

fn draw_rect(canvas: &mut RgbImage, detection: &Detection) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let bbox = detection.bbox;
    let x1 = bbox.x1.min(width - 1);
    let y1 = bbox.y1.min(height - 1);
    let x2 = bbox.x2.min(width - 1);
    let y2 = bbox.y2.min(height - 1);

    for t in 0..BOX_BORDER {
        for x in x1..=x2 {
            put(canvas, x, y1.saturating_add(t).min(height - 1));
            put(canvas, x, y2.saturating_sub(t));
        }
        for y in y1..=y2 {
            put(canvas, x1.saturating_add(t).min(width - 1), y);
            put(canvas, x2.saturating_sub(t), y);
        }
    }
}

fn put(canvas: &mut RgbImage, x: u32, y: u32) {
    canvas.put_pixel(x, y, BOX_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detector::BoundingBox;
    use image::ImageBuffer;

    fn gray(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([128, 128, 128])))
    }

    fn detection(x1: u32, y1: u32, x2: u32, y2: u32) -> Detection {
        Detection {
            bbox: BoundingBox { x1, y1, x2, y2 },
            confidence: 0.9,
        }
    }

    #[test]
    fn colors_the_border_and_leaves_the_interior() {
        let annotated = draw_detections(&gray(64, 64), &[detection(10, 10, 50, 50)]).to_rgb8();
        assert_eq!(*annotated.get_pixel(10, 10), BOX_COLOR);
        assert_eq!(*annotated.get_pixel(30, 10), BOX_COLOR);
        assert_eq!(*annotated.get_pixel(50, 30), BOX_COLOR);
        assert_eq!(*annotated.get_pixel(30, 30), Rgb([128, 128, 128]));
    }

    #[test]
    fn clamps_boxes_that_overflow_the_frame() {
        let annotated = draw_detections(&gray(32, 32), &[detection(20, 20, 500, 500)]);
        assert_eq!(annotated.to_rgb8().get_pixel(31, 31), &BOX_COLOR);
    }
}
