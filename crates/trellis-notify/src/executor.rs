use crate::manager::NotifyManager;
use crate::message::{NotifyChannel, NotifyLevel, NotifyMessage};
use async_trait::async_trait;
use std::sync::Arc;
use trellis_rule::{ActionExecutor, ExecutionContext, RuleAction};

/// 通知动作执行器
///
/// 把规则的 `send_notification` 动作桥接到通知能力：
/// 模板 ID 和事件载荷渲染成消息，投递到动作指定的渠道。
/// 在进程启动时注册进执行器注册表。
pub struct NotificationExecutor {
    manager: Arc<NotifyManager>,
}

impl NotificationExecutor {
    pub fn new(manager: Arc<NotifyManager>) -> Self {
        Self { manager }
    }

    fn render(template_id: &str, ctx: &ExecutionContext) -> NotifyMessage {
        let fields = serde_json::to_value(&ctx.event.fields).unwrap_or_default();
        NotifyMessage::new(
            format!("[{}] {}", template_id, ctx.rule_name),
            format!(
                "Rule '{}' fired on trigger '{}'",
                ctx.rule_name, ctx.event.trigger_id
            ),
            NotifyLevel::Info,
        )
        .with_metadata(serde_json::json!({
            "template_id": template_id,
            "rule_id": ctx.rule_id,
            "trigger_id": ctx.event.trigger_id,
            "fields": fields,
        }))
    }
}

#[async_trait]
impl ActionExecutor for NotificationExecutor {
    fn kind(&self) -> &str {
        "send_notification"
    }

    async fn execute(&self, action: &RuleAction, ctx: &ExecutionContext) -> anyhow::Result<()> {
        let (template_id, channel) = match action {
            RuleAction::SendNotification {
                template_id,
                channel,
            } => (template_id, channel),
            other => anyhow::bail!("unsupported action for notification executor: {}", other.kind()),
        };

        let channel: NotifyChannel = channel.parse()?;
        let message = Self::render(template_id, ctx);
        self.manager.send(&channel, &message).await
    }
}
