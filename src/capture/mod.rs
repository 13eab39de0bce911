pub mod client;
pub mod source;

pub use client::CaptureClient;
pub use source::{DirectorySource, FrameSource};
