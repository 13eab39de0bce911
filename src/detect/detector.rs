use crate::error::DetectorError;
use image::DynamicImage;

/// Axis-aligned box in pixel coordinates of the image it was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    /// Maps a box from inference resolution back to frame resolution.
    pub fn scale(&self, from: (u32, u32), to: (u32, u32)) -> BoundingBox {
        let scale_x = to.0 as f64 / from.0 as f64;
        let scale_y = to.1 as f64 / from.1 as f64;
        BoundingBox {
            x1: (self.x1 as f64 * scale_x) as u32,
            y1: (self.y1 as f64 * scale_y) as u32,
            x2: (self.x2 as f64 * scale_x) as u32,
            y2: (self.y2 as f64 * scale_y) as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

/// Seam for the classification model. Implementations receive the full
/// frame, downscale as they see fit, and report detections in full-frame
/// coordinates.
pub trait AccidentDetector: Send {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>, DetectorError>;
    fn name(&self) -> &'static str;
}

/// At least one box above the confidence threshold puts the scene in the
/// "accident present" state for this tick.
pub fn signal_present(detections: &[Detection], threshold: f32) -> bool {
    detections.iter().any(|d| d.confidence > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(confidence: f32) -> Detection {
        Detection {
            bbox: BoundingBox {
                x1: 0,
                y1: 0,
                x2: 10,
                y2: 10,
            },
            confidence,
        }
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!signal_present(&[detection(0.3)], 0.3));
        assert!(signal_present(&[detection(0.31)], 0.3));
        assert!(!signal_present(&[], 0.3));
    }

    #[test]
    fn one_confident_box_is_enough() {
        let detections = [detection(0.1), detection(0.9), detection(0.2)];
        assert!(signal_present(&detections, 0.3));
    }

    #[test]
    fn scales_between_resolutions() {
        let bbox = BoundingBox {
            x1: 64,
            y1: 64,
            x2: 128,
            y2: 192,
        };
        let scaled = bbox.scale((256, 256), (640, 480));
        assert_eq!(
            scaled,
            BoundingBox {
                x1: 160,
                y1: 120,
                x2: 320,
                y2: 360,
            }
        );
    }
}
