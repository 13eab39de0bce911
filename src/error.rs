use thiserror::Error;
use uuid::Uuid;

// Main application error type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Capture error: {0}")]
    Capture(String),
    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("Evidence error: {0}")]
    Evidence(#[from] EvidenceError),
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Coordinator error: {0}")]
    Coordinator(String),
}

// Detector error type
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Failed to prepare frame for inference: {0}")]
    Preprocess(String),
    #[error("Inference failed: {0}")]
    Inference(String),
}

#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("Evidence I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
    #[error("No open clip with id {0}")]
    UnknownClip(Uuid),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to send notification: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Notification rejected with status {0}")]
    Rejected(u16),
    #[error("Alarm playback failed: {0}")]
    Alarm(String),
}
