use crate::detect::detector::{AccidentDetector, BoundingBox, Detection};
use crate::error::DetectorError;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};

/// Stand-in detector for deployments without a trained model: grayscale
/// frame differencing over a downscaled copy of the frame. The changed
/// region is reported as a single box whose confidence grows with the
/// fraction of the scene that changed. A model-backed detector plugs in
/// behind [`AccidentDetector`] without touching the rest of the pipeline.
pub struct FrameDiffDetector {
    previous: Option<GrayImage>,
    sample_size: u32,
    pixel_delta_threshold: u8,
}

impl FrameDiffDetector {
    pub fn new() -> Self {
        Self {
            previous: None,
            sample_size: 64,
            pixel_delta_threshold: 25,
        }
    }

    pub fn with_sample_size(mut self, sample_size: u32) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_pixel_delta_threshold(mut self, threshold: u8) -> Self {
        self.pixel_delta_threshold = threshold;
        self
    }
}

impl Default for FrameDiffDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AccidentDetector for FrameDiffDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>, DetectorError> {
        let small = image
            .resize_exact(self.sample_size, self.sample_size, FilterType::Nearest)
            .to_luma8();

        // First frame only seeds the comparison baseline.
        let Some(last) = self.previous.replace(small.clone()) else {
            return Ok(Vec::new());
        };

        let mut changed = 0u32;
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        for (x, y, pixel) in small.enumerate_pixels() {
            let delta = pixel.0[0].abs_diff(last.get_pixel(x, y).0[0]);
            if delta > self.pixel_delta_threshold {
                changed += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
        if changed == 0 {
            return Ok(Vec::new());
        }

        let coverage = changed as f32 / (self.sample_size * self.sample_size) as f32;
        let bbox = BoundingBox {
            x1: min_x,
            y1: min_y,
            x2: max_x + 1,
            y2: max_y + 1,
        }
        .scale(
            (self.sample_size, self.sample_size),
            (image.width(), image.height()),
        );

        Ok(vec![Detection {
            bbox,
            confidence: coverage.min(1.0),
        }])
    }

    fn name(&self) -> &'static str {
        "FrameDiffDetector"
    }
}
