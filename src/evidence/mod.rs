pub mod clip;
pub mod journal;

pub use clip::{ClipId, ClipRecorder, FrameClipRecorder, InMemoryClipRecorder};
pub use journal::{CsvJournal, EventJournal, InMemoryJournal};
