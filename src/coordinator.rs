use crate::{
    alert::{AlertDispatcher, CommandAlarm, LogNotifier, SilentAlarm, SmsNotifier},
    capture::{CaptureClient, FrameSource},
    common::Frame,
    config::Configuration,
    detect::{annotate, signal_present, AccidentDetector, FrameDiffDetector},
    error::AppError,
    evidence::{ClipId, ClipRecorder, CsvJournal, EventJournal, FrameClipRecorder},
    monitor::{Action, IncidentMonitor, MonitorConfig},
};
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub struct Coordinator {
    monitor_task: tokio::task::JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    fn new(configuration: Configuration, source: Box<dyn FrameSource>, loop_: MonitorLoop) -> Self {
        let cancel_token = CancellationToken::new();

        Self {
            monitor_task: Self::start_tasks(configuration, source, loop_, cancel_token.clone()),
            cancel_token,
        }
    }

    fn start_tasks(
        configuration: Configuration,
        source: Box<dyn FrameSource>,
        loop_: MonitorLoop,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let (frame_tx, frame_rx) = tokio::sync::mpsc::channel(configuration.frame_buffer_size);
        let mut capture = CaptureClient::new(source, frame_tx, configuration.capture_fps);
        tokio::spawn(async move {
            loop_.run(frame_rx, cancel_token).await;
            capture.stop();
        })
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Runs until the frame source is exhausted or [`Coordinator::stop`] is
    /// called.
    pub async fn join(mut self) {
        if let Err(e) = (&mut self.monitor_task).await {
            tracing::error!("Monitor task failed: {}", e);
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The driver loop: one received frame is one tick of the incident monitor.
struct MonitorLoop {
    monitor_config: MonitorConfig,
    confidence_threshold: f32,
    alert_message: String,
    location_link: String,
    detector: Box<dyn AccidentDetector>,
    dispatcher: AlertDispatcher,
    recorder: Box<dyn ClipRecorder>,
    journal: Box<dyn EventJournal>,
}

impl MonitorLoop {
    async fn run(mut self, mut frame_rx: Receiver<Frame>, cancel_token: CancellationToken) {
        let mut monitor = IncidentMonitor::new(self.monitor_config);
        let mut active_clip: Option<ClipId> = None;

        loop {
            let frame = tokio::select! {
                _ = cancel_token.cancelled() => break,
                frame = frame_rx.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };
            if let Err(e) = self.tick(&frame, &mut monitor, &mut active_clip) {
                tracing::error!("Skipping frame {}: {}", frame.id(), e);
            }
        }

        // Every exit path closes an open recording.
        if let Some(clip) = active_clip.take() {
            if let Err(e) = self.recorder.close_clip(clip) {
                tracing::error!("Failed to close clip: {}", e);
            }
        }
        if let Err(e) = self.journal.flush() {
            tracing::error!("Failed to flush journal: {}", e);
        }
        tracing::info!("Monitor loop stopped.");
    }

    fn tick(
        &mut self,
        frame: &Frame,
        monitor: &mut IncidentMonitor,
        active_clip: &mut Option<ClipId>,
    ) -> Result<(), AppError> {
        let detections = self.detector.detect(frame.image())?;
        let present = signal_present(&detections, self.confidence_threshold);
        let now = frame.captured_at();

        match monitor.observe(present, now) {
            Action::FireAlert => {
                tracing::warn!("Accident confirmed at {}; dispatching alert.", now);
                self.dispatcher
                    .dispatch(self.alert_message.clone(), self.location_link.clone());
                if let Err(e) = self.journal.log_event(now, &self.alert_message, &self.location_link)
                {
                    tracing::error!("Failed to journal event: {}", e);
                }
                if active_clip.is_none() {
                    match self.recorder.start_clip(now) {
                        Ok(clip) => *active_clip = Some(clip),
                        Err(e) => tracing::error!("Failed to start clip: {}", e),
                    }
                }
            }
            Action::Reset => {
                tracing::info!("Incident resolved; resetting monitor.");
                if let Some(clip) = active_clip.take() {
                    if let Err(e) = self.recorder.close_clip(clip) {
                        tracing::error!("Failed to close clip: {}", e);
                    }
                }
                *monitor = IncidentMonitor::new(self.monitor_config);
            }
            Action::None => {}
        }

        if let Some(clip) = *active_clip {
            let recorded = if detections.is_empty() {
                frame.clone()
            } else {
                frame.with_image(annotate::draw_detections(frame.image(), &detections))
            };
            if let Err(e) = self.recorder.append_frame(clip, &recorded) {
                tracing::error!("Failed to append frame to clip: {}", e);
            }
        }
        Ok(())
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    source: Option<Box<dyn FrameSource>>,
    detector: Option<Box<dyn AccidentDetector>>,
    dispatcher: Option<AlertDispatcher>,
    recorder: Option<Box<dyn ClipRecorder>>,
    journal: Option<Box<dyn EventJournal>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            source: None,
            detector: None,
            dispatcher: None,
            recorder: None,
            journal: None,
        }
    }

    pub fn source(mut self, source: Box<dyn FrameSource>) -> Self {
        self.source = Some(source);
        self
    }

    // Overrides the detector, this replaces the default frame differencing.
    pub fn detector(mut self, detector: Box<dyn AccidentDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn dispatcher(mut self, dispatcher: AlertDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn recorder(mut self, recorder: Box<dyn ClipRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn journal(mut self, journal: Box<dyn EventJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        let source = self
            .source
            .ok_or(AppError::Coordinator("Frame source not set".to_string()))?;
        let configuration = self.configuration;

        let dispatcher = self.dispatcher.unwrap_or_else(|| {
            let notifier: Arc<dyn crate::alert::Notifier> = match &configuration.twilio {
                Some(twilio) => Arc::new(SmsNotifier::new(twilio)),
                None => Arc::new(LogNotifier),
            };
            let alarm: Arc<dyn crate::alert::Alarm> = match &configuration.alarm_command {
                Some(command) => Arc::new(CommandAlarm::new(command.clone())),
                None => Arc::new(SilentAlarm),
            };
            AlertDispatcher::new(notifier, alarm)
        });

        let loop_ = MonitorLoop {
            monitor_config: configuration.monitor_config(),
            confidence_threshold: configuration.confidence_threshold,
            alert_message: configuration.alert_message.clone(),
            location_link: configuration.location_link.clone(),
            detector: self
                .detector
                .unwrap_or_else(|| Box::new(FrameDiffDetector::new())),
            dispatcher,
            recorder: self
                .recorder
                .unwrap_or_else(|| Box::new(FrameClipRecorder::new(&configuration.clip_dir))),
            journal: self
                .journal
                .unwrap_or_else(|| Box::new(CsvJournal::new(&configuration.journal_path))),
        };

        Ok(Coordinator::new(configuration, source, loop_))
    }
}
