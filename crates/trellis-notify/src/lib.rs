pub mod executor;
pub mod manager;
pub mod message;
pub mod notifier;
pub mod providers;

pub use executor::NotificationExecutor;
pub use manager::NotifyManager;
pub use message::{NotifyChannel, NotifyLevel, NotifyMessage};
pub use notifier::{Notifier, NotifyResult};
pub use providers::{LogNotifier, WebhookConfig, WebhookNotifier};
