use crate::capture::source::FrameSource;
use crate::common::Frame;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

/// Owns the capture thread. The source may block on disk or device I/O, so
/// it runs on a dedicated thread and feeds the async side through a bounded
/// channel.
pub struct CaptureClient {
    cancel_token: CancellationToken,
    capture_thread: Option<std::thread::JoinHandle<()>>,
}

impl CaptureClient {
    pub fn new(source: Box<dyn FrameSource>, frame_tx: Sender<Frame>, fps: u32) -> Self {
        let cancel_token = CancellationToken::new();
        let mut worker = CaptureWorker {
            source,
            frame_tx,
            frame_interval: std::time::Duration::from_secs_f64(1.0 / fps.max(1) as f64),
        };
        Self {
            cancel_token: cancel_token.clone(),
            capture_thread: Some(std::thread::spawn(move || worker.run(cancel_token))),
        }
    }

    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(thread) = self.capture_thread.take() {
            thread.join().expect("Capture thread panicked");
        }
    }
}

impl Drop for CaptureClient {
    fn drop(&mut self) {
        self.stop();
    }
}

struct CaptureWorker {
    source: Box<dyn FrameSource>,
    frame_tx: Sender<Frame>,
    frame_interval: std::time::Duration,
}

impl CaptureWorker {
    fn run(&mut self, cancel_token: CancellationToken) {
        tracing::info!("Capture started.");
        while !cancel_token.is_cancelled() {
            match self.source.next_frame() {
                Ok(Some(frame)) => {
                    if !self.send_frame(frame) {
                        break;
                    }
                }
                Ok(None) => {
                    tracing::info!("Frame source exhausted, stopping capture.");
                    break;
                }
                Err(e) => {
                    tracing::error!("Capture failed: {}", e);
                    break;
                }
            }
            std::thread::sleep(self.frame_interval);
        }
        tracing::info!("Capture stopped.");
    }

    fn send_frame(&mut self, frame: Frame) -> bool {
        match self.frame_tx.try_send(frame) {
            Ok(_) => true,
            Err(TrySendError::Full(_)) => {
                // Drop frame to keep real-time
                tracing::warn!("Dropping frame: channel full");
                true
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("Frame channel closed, stopping capture loop");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::{DynamicImage, ImageBuffer, Rgb};

    struct CountingSource {
        remaining: usize,
    }

    impl FrameSource for CountingSource {
        fn next_frame(&mut self) -> Result<Option<Frame>, crate::error::AppError> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            let img: DynamicImage = DynamicImage::ImageRgb8(
                ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(4, 4, Rgb([0, 0, 0])),
            );
            Ok(Some(Frame::new(img, Utc::now())))
        }
    }

    #[tokio::test]
    async fn drains_the_source_then_closes_the_channel() {
        let (frame_tx, mut frame_rx) = tokio::sync::mpsc::channel(16);
        let client = CaptureClient::new(Box::new(CountingSource { remaining: 3 }), frame_tx, 1000);

        let mut received = 0;
        while frame_rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 3);
        drop(client);
    }

    #[tokio::test]
    async fn stop_interrupts_an_endless_source() {
        struct EndlessSource;
        impl FrameSource for EndlessSource {
            fn next_frame(&mut self) -> Result<Option<Frame>, crate::error::AppError> {
                let img: DynamicImage = DynamicImage::ImageRgb8(
                    ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(4, 4, Rgb([0, 0, 0])),
                );
                Ok(Some(Frame::new(img, Utc::now())))
            }
        }

        let (frame_tx, mut frame_rx) = tokio::sync::mpsc::channel(4);
        let mut client = CaptureClient::new(Box::new(EndlessSource), frame_tx, 1000);
        assert!(frame_rx.recv().await.is_some());
        client.stop();
        // Sender side is gone once the thread joined; the channel drains.
        while frame_rx.recv().await.is_some() {}
    }
}
