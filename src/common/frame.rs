use chrono::{DateTime, Utc};
use image::DynamicImage;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct Frame {
    image: Arc<DynamicImage>,
    captured_at: DateTime<Utc>,
    frame_id: Uuid,
}

impl Frame {
    pub fn new(image: DynamicImage, captured_at: DateTime<Utc>) -> Self {
        Self {
            image: Arc::new(image),
            captured_at,
            frame_id: Uuid::new_v4(),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn id(&self) -> Uuid {
        self.frame_id
    }

    /// Same frame with a replacement image, e.g. after annotation.
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
            captured_at: self.captured_at,
            frame_id: self.frame_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn cloning_frame_shares_image_buffer() {
        let img: DynamicImage = DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(16, 16, Rgb([1, 2, 3])),
        );
        let f1 = Frame::new(img, Utc::now());
        let f2 = f1.clone();
        assert!(Arc::ptr_eq(&f1.image, &f2.image));
    }

    #[test]
    fn annotated_copy_keeps_identity() {
        let img: DynamicImage = DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(16, 16, Rgb([1, 2, 3])),
        );
        let frame = Frame::new(img.clone(), Utc::now());
        let annotated = frame.with_image(img);
        assert_eq!(frame.id(), annotated.id());
        assert_eq!(frame.captured_at(), annotated.captured_at());
        assert!(!Arc::ptr_eq(&frame.image, &annotated.image));
    }
}
