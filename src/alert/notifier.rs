use crate::config::TwilioConfig;
use crate::error::NotifyError;
use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, location: &str) -> Result<(), NotifyError>;
    fn name(&self) -> &'static str;
}

/// Sends the alert as an SMS through the Twilio REST API.
pub struct SmsNotifier {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    to_number: String,
}

impl SmsNotifier {
    pub fn new(config: &TwilioConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            to_number: config.to_number.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        )
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    async fn notify(&self, message: &str, location: &str) -> Result<(), NotifyError> {
        let body = format!("{message}\nLocation: {location}");
        let response = self
            .http
            .post(self.endpoint())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("From", self.from_number.as_str()),
                ("To", self.to_number.as_str()),
                ("Body", body.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SmsNotifier"
    }
}

/// Fallback when no transport credentials are configured: the alert only
/// lands in the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, location: &str) -> Result<(), NotifyError> {
        tracing::warn!("ALERT: {} Location: {}", message, location);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogNotifier"
    }
}
