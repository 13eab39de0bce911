use crate::common::Frame;
use crate::error::AppError;
use chrono::Utc;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Where frames come from. Camera integrations implement this; the shipped
/// implementation replays an on-disk image sequence.
pub trait FrameSource: Send {
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, AppError>;
}

/// Replays the image files of a directory in filename order.
pub struct DirectorySource {
    pending: VecDeque<PathBuf>,
}

impl DirectorySource {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| AppError::Capture(format!("Failed to read {}: {}", dir.display(), e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("jpg") | Some("jpeg") | Some("png")
                )
            })
            .collect();
        paths.sort();

        Ok(Self {
            pending: paths.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for DirectorySource {
    fn next_frame(&mut self) -> Result<Option<Frame>, AppError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        let image = image::open(&path)
            .map_err(|e| AppError::Capture(format!("Failed to open {}: {}", path.display(), e)))?;
        Ok(Some(Frame::new(image, Utc::now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn write_frame(dir: &Path, name: &str) {
        let img: DynamicImage = DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            8,
            8,
            Rgb([0, 0, 0]),
        ));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn replays_images_in_filename_order_then_exhausts() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "frame_002.png");
        write_frame(dir.path(), "frame_001.png");
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = DirectorySource::new(dir.path()).unwrap();
        assert_eq!(source.remaining(), 2);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn missing_directory_is_a_capture_error() {
        let result = DirectorySource::new("/nonexistent/frames");
        assert!(matches!(result, Err(AppError::Capture(_))));
    }
}
