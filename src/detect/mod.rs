pub mod annotate;
pub mod detector;
pub mod frame_diff;

pub use detector::{signal_present, AccidentDetector, BoundingBox, Detection};
pub use frame_diff::FrameDiffDetector;
