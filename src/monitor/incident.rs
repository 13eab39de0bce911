use chrono::{DateTime, Duration, Utc};

/// Outcome of a single monitor tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do this tick.
    None,
    /// Sustained presence confirmed a new incident; the caller dispatches the
    /// alert trail (notification, journal row, clip).
    FireAlert,
    /// The incident is over. The caller must discard this monitor and swap in
    /// a freshly constructed one.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// How long the condition must persist before it counts as confirmed.
    pub min_sustained_presence: Duration,
    /// Minimum spacing between two alerts.
    pub alert_cooldown: Duration,
    /// How long the scene must stay empty before the incident counts as over.
    pub clear_period: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            min_sustained_presence: Duration::seconds(5),
            alert_cooldown: Duration::minutes(5),
            clear_period: Duration::seconds(30),
        }
    }
}

/// Debounces a noisy per-tick "accident present" signal into at most one
/// alert per incident, followed by a reset once the scene has stayed clear.
///
/// Two independent timers drive the transitions: a presence timer gates when
/// an alert may fire, an absence timer gates when the incident is considered
/// over. Flicker in the underlying detector restarts the presence timer and
/// never produces alert storms.
///
/// The monitor performs no I/O. It is owned by the driver loop, stepped once
/// per tick via [`IncidentMonitor::observe`], and replaced wholesale when it
/// returns [`Action::Reset`].
pub struct IncidentMonitor {
    config: MonitorConfig,
    /// Start of the current unbroken run of "present" ticks.
    detection_start: Option<DateTime<Utc>>,
    /// Start of the current unbroken run of "absent" ticks.
    clear_start: Option<DateTime<Utc>>,
    /// Whether the scene had already been clear for a full `clear_period`
    /// when the current presence run began. Captured before `clear_start` is
    /// wiped; dies with the run.
    run_started_clear: bool,
    last_alert: Option<DateTime<Utc>>,
    alert_fired: bool,
    last_observed: Option<DateTime<Utc>>,
}

impl IncidentMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            detection_start: None,
            clear_start: None,
            run_started_clear: false,
            last_alert: None,
            alert_fired: false,
            last_observed: None,
        }
    }

    /// Advances the state machine by one tick.
    ///
    /// `now` must be non-decreasing across calls; feeding an earlier
    /// timestamp is a caller bug and panics rather than corrupting the
    /// timers. The call itself never fails and mutates state atomically.
    pub fn observe(&mut self, signal_present: bool, now: DateTime<Utc>) -> Action {
        if let Some(previous) = self.last_observed {
            assert!(
                now >= previous,
                "observe called with non-monotonic timestamp: {now} is earlier than {previous}"
            );
        }
        self.last_observed = Some(now);

        if signal_present {
            // Capture the absence run before wiping it: a fresh alert requires
            // that the scene was already clear for a full clear_period when
            // this presence run began, not at the tick the alert fires.
            let prior_clear = self.clear_start.take();
            let detection_start = match self.detection_start {
                Some(start) => start,
                None => {
                    self.run_started_clear = prior_clear
                        .map_or(false, |clear_start| {
                            now - clear_start >= self.config.clear_period
                        });
                    self.detection_start = Some(now);
                    now
                }
            };

            let sustained_for = now - detection_start;
            let cooldown_over = self
                .last_alert
                .map_or(true, |last| now - last >= self.config.alert_cooldown);
            let scene_cleared = self.last_alert.is_none() || self.run_started_clear;

            if !self.alert_fired
                && sustained_for >= self.config.min_sustained_presence
                && cooldown_over
                && scene_cleared
            {
                self.last_alert = Some(now);
                self.alert_fired = true;
                return Action::FireAlert;
            }
            Action::None
        } else {
            self.detection_start = None;
            let clear_start = *self.clear_start.get_or_insert(now);

            let cooldown_over = self
                .last_alert
                .map_or(false, |last| now - last >= self.config.alert_cooldown);
            if cooldown_over && now - clear_start >= self.config.clear_period {
                return Action::Reset;
            }
            Action::None
        }
    }
}
