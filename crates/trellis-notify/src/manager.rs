use crate::message::{NotifyChannel, NotifyLevel, NotifyMessage};
use crate::notifier::Notifier;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// 通知管理器
///
/// 渠道 → 通知器的注册表，附带最低级别门槛。
pub struct NotifyManager {
    /// 通知器列表
    notifiers: Arc<RwLock<HashMap<NotifyChannel, Box<dyn Notifier>>>>,

    /// 最小通知级别
    min_level: NotifyLevel,
}

impl NotifyManager {
    pub fn new(min_level: NotifyLevel) -> Self {
        Self {
            notifiers: Arc::new(RwLock::new(HashMap::new())),
            min_level,
        }
    }

    /// 注册通知器
    pub async fn register(&self, channel: NotifyChannel, notifier: Box<dyn Notifier>) {
        let mut notifiers = self.notifiers.write().await;
        info!("Registered notifier: {}", notifier.name());
        notifiers.insert(channel, notifier);
    }

    /// 发送通知到指定渠道
    pub async fn send(&self, channel: &NotifyChannel, message: &NotifyMessage) -> Result<()> {
        if !self.should_notify(&message.level) {
            return Ok(());
        }

        let notifiers = self.notifiers.read().await;

        let notifier = notifiers
            .get(channel)
            .ok_or_else(|| anyhow::anyhow!("no notifier registered for channel {:?}", channel))?;

        if !notifier.is_enabled() {
            return Ok(());
        }

        let result = notifier.send(message).await?;
        if result.success {
            info!("Notification sent via {}: {}", notifier.name(), message.title);
            Ok(())
        } else {
            error!("Notification failed via {}: {}", notifier.name(), result.message);
            Err(anyhow::anyhow!(result.message))
        }
    }

    /// 发送通知到所有渠道
    pub async fn broadcast(&self, message: &NotifyMessage) -> Result<()> {
        if !self.should_notify(&message.level) {
            return Ok(());
        }

        let notifiers = self.notifiers.read().await;

        for notifier in notifiers.values() {
            if !notifier.is_enabled() {
                continue;
            }
            match notifier.send(message).await {
                Ok(result) => {
                    if result.success {
                        info!("Notification sent via {}: {}", notifier.name(), message.title);
                    } else {
                        error!("Notification failed via {}: {}", notifier.name(), result.message);
                    }
                }
                Err(e) => {
                    error!("Notification error via {}: {}", notifier.name(), e);
                }
            }
        }

        Ok(())
    }

    /// 检查是否应该发送通知
    fn should_notify(&self, level: &NotifyLevel) -> bool {
        let level_value = match level {
            NotifyLevel::Info => 0,
            NotifyLevel::Warning => 1,
            NotifyLevel::Error => 2,
            NotifyLevel::Critical => 3,
        };

        let min_value = match self.min_level {
            NotifyLevel::Info => 0,
            NotifyLevel::Warning => 1,
            NotifyLevel::Error => 2,
            NotifyLevel::Critical => 3,
        };

        level_value >= min_value
    }
}

impl Default for NotifyManager {
    fn default() -> Self {
        Self::new(NotifyLevel::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LogNotifier;

    #[tokio::test]
    async fn test_send_to_registered_channel() {
        let manager = NotifyManager::default();
        manager
            .register(NotifyChannel::Log, Box::new(LogNotifier::new()))
            .await;

        let message = NotifyMessage::new("done", "work order 7 completed", NotifyLevel::Info);
        assert!(manager.send(&NotifyChannel::Log, &message).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_to_unknown_channel_fails() {
        let manager = NotifyManager::default();
        let message = NotifyMessage::new("done", "body", NotifyLevel::Info);
        assert!(manager.send(&NotifyChannel::Slack, &message).await.is_err());
    }

    #[tokio::test]
    async fn test_level_gate_drops_quiet_messages() {
        let manager = NotifyManager::new(NotifyLevel::Error);
        // 未注册任何通知器也不报错：级别门槛先把消息拦下
        let message = NotifyMessage::new("info", "body", NotifyLevel::Info);
        assert!(manager.send(&NotifyChannel::Log, &message).await.is_ok());
    }
}
