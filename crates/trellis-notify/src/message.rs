use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// 信息
    Info,
    /// 警告
    Warning,
    /// 错误
    Error,
    /// 严重
    Critical,
}

/// 通知渠道
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotifyChannel {
    /// Webhook
    Webhook,
    /// Slack
    Slack,
    /// 日志（测试与本地部署）
    Log,
}

impl FromStr for NotifyChannel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "webhook" => Ok(NotifyChannel::Webhook),
            "slack" => Ok(NotifyChannel::Slack),
            "log" => Ok(NotifyChannel::Log),
            other => Err(anyhow::anyhow!("unknown notify channel: {}", other)),
        }
    }
}

/// 通知消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyMessage {
    /// 标题
    pub title: String,

    /// 内容
    pub content: String,

    /// 级别
    pub level: NotifyLevel,

    /// 时间
    pub timestamp: DateTime<Utc>,

    /// 额外数据
    pub metadata: Option<serde_json::Value>,
}

impl NotifyMessage {
    pub fn new(title: impl Into<String>, content: impl Into<String>, level: NotifyLevel) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            level,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!("log".parse::<NotifyChannel>().unwrap(), NotifyChannel::Log);
        assert!("pigeon".parse::<NotifyChannel>().is_err());
    }

    #[test]
    fn test_message_serialization() {
        let message = NotifyMessage::new("title", "body", NotifyLevel::Warning)
            .with_metadata(serde_json::json!({"work_order_id": "7"}));
        let json = serde_json::to_string(&message).unwrap();
        let back: NotifyMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title, "title");
        assert_eq!(back.level, NotifyLevel::Warning);
    }
}
