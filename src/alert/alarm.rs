use crate::error::NotifyError;
use async_trait::async_trait;

#[async_trait]
pub trait Alarm: Send + Sync {
    async fn sound(&self) -> Result<(), NotifyError>;
}

/// Plays the audible alarm by spawning a configured player command,
/// e.g. `["aplay", "alarm.wav"]`.
pub struct CommandAlarm {
    command: Vec<String>,
}

impl CommandAlarm {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Alarm for CommandAlarm {
    async fn sound(&self) -> Result<(), NotifyError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| NotifyError::Alarm("empty alarm command".to_string()))?;

        let status = tokio::process::Command::new(program)
            .args(args)
            .status()
            .await
            .map_err(|e| NotifyError::Alarm(format!("{program}: {e}")))?;

        if !status.success() {
            return Err(NotifyError::Alarm(format!(
                "{program} exited with {status}"
            )));
        }
        Ok(())
    }
}

/// Used when no alarm command is configured.
pub struct SilentAlarm;

#[async_trait]
impl Alarm for SilentAlarm {
    async fn sound(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let alarm = CommandAlarm::new(Vec::new());
        assert!(matches!(alarm.sound().await, Err(NotifyError::Alarm(_))));
    }

    #[tokio::test]
    async fn missing_program_is_a_playback_error() {
        let alarm = CommandAlarm::new(vec!["definitely-not-a-player".to_string()]);
        assert!(matches!(alarm.sound().await, Err(NotifyError::Alarm(_))));
    }
}
