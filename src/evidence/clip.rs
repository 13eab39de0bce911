use crate::common::Frame;
use crate::error::EvidenceError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Opaque handle to an open clip.
pub type ClipId = Uuid;

/// Records the evidence clip for an incident. Frames are appended for as
/// long as the clip is open; closing it finalizes the recording.
pub trait ClipRecorder: Send {
    fn start_clip(&mut self, started_at: DateTime<Utc>) -> Result<ClipId, EvidenceError>;
    fn append_frame(&mut self, clip: ClipId, frame: &Frame) -> Result<(), EvidenceError>;
    fn close_clip(&mut self, clip: ClipId) -> Result<(), EvidenceError>;
}

struct OpenClip {
    dir: PathBuf,
    frames_written: u64,
}

/// Writes each clip as a numbered JPEG sequence under its own
/// `accident_<stamp>` directory.
pub struct FrameClipRecorder {
    output_dir: PathBuf,
    open_clips: HashMap<ClipId, OpenClip>,
}

impl FrameClipRecorder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            open_clips: HashMap::new(),
        }
    }
}

impl ClipRecorder for FrameClipRecorder {
    fn start_clip(&mut self, started_at: DateTime<Utc>) -> Result<ClipId, EvidenceError> {
        let dir = self
            .output_dir
            .join(format!("accident_{}", started_at.format("%Y%m%d_%H%M%S")));
        std::fs::create_dir_all(&dir)?;

        let id = Uuid::new_v4();
        tracing::info!("Recording started: {}", dir.display());
        self.open_clips.insert(
            id,
            OpenClip {
                dir,
                frames_written: 0,
            },
        );
        Ok(id)
    }

    fn append_frame(&mut self, clip: ClipId, frame: &Frame) -> Result<(), EvidenceError> {
        let open = self
            .open_clips
            .get_mut(&clip)
            .ok_or(EvidenceError::UnknownClip(clip))?;
        let path = open.dir.join(format!("frame_{:06}.jpg", open.frames_written));
        frame.image().to_rgb8().save(&path)?;
        open.frames_written += 1;
        Ok(())
    }

    fn close_clip(&mut self, clip: ClipId) -> Result<(), EvidenceError> {
        let open = self
            .open_clips
            .remove(&clip)
            .ok_or(EvidenceError::UnknownClip(clip))?;
        tracing::info!(
            "Recording closed: {} ({} frames)",
            open.dir.display(),
            open.frames_written
        );
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryClips {
    open: HashMap<ClipId, Vec<Uuid>>,
    closed: HashMap<ClipId, Vec<Uuid>>,
}

/// In-memory recorder for tests; clones share the same clip store.
#[derive(Clone, Default)]
pub struct InMemoryClipRecorder {
    clips: Arc<Mutex<InMemoryClips>>,
}

impl InMemoryClipRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.clips.lock().expect("clip lock poisoned").open.len()
    }

    pub fn closed_clips(&self) -> Vec<(ClipId, usize)> {
        self.clips
            .lock()
            .expect("clip lock poisoned")
            .closed
            .iter()
            .map(|(id, frames)| (*id, frames.len()))
            .collect()
    }
}

impl ClipRecorder for InMemoryClipRecorder {
    fn start_clip(&mut self, _started_at: DateTime<Utc>) -> Result<ClipId, EvidenceError> {
        let id = Uuid::new_v4();
        self.clips
            .lock()
            .expect("clip lock poisoned")
            .open
            .insert(id, Vec::new());
        Ok(id)
    }

    fn append_frame(&mut self, clip: ClipId, frame: &Frame) -> Result<(), EvidenceError> {
        let mut clips = self.clips.lock().expect("clip lock poisoned");
        clips
            .open
            .get_mut(&clip)
            .ok_or(EvidenceError::UnknownClip(clip))?
            .push(frame.id());
        Ok(())
    }

    fn close_clip(&mut self, clip: ClipId) -> Result<(), EvidenceError> {
        let mut clips = self.clips.lock().expect("clip lock poisoned");
        let frames = clips
            .open
            .remove(&clip)
            .ok_or(EvidenceError::UnknownClip(clip))?;
        clips.closed.insert(clip, frames);
        Ok(())
    }
}
