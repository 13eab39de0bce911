pub mod alarm;
pub mod dispatch;
pub mod notifier;

pub use alarm::{Alarm, CommandAlarm, SilentAlarm};
pub use dispatch::AlertDispatcher;
pub use notifier::{LogNotifier, Notifier, SmsNotifier};
