pub mod incident;

pub use incident::{Action, IncidentMonitor, MonitorConfig};
