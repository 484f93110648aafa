use crate::model::RuleAction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use trellis_types::Event;

/// 动作执行上下文
///
/// 执行器拿到触发事件和命中规则的标识，用于构造
/// 副作用载荷和审计日志。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// 触发事件
    pub event: Event,

    /// 命中规则 ID
    pub rule_id: String,

    /// 命中规则名称
    pub rule_name: String,

    /// 规则命中时间
    pub fired_at: DateTime<Utc>,
}

impl ExecutionContext {
    pub fn new(event: Event, rule_id: impl Into<String>, rule_name: impl Into<String>) -> Self {
        Self {
            event,
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            fired_at: Utc::now(),
        }
    }
}

/// 动作执行器
///
/// 由各业务子系统作为能力提供（指派工单、发通知、建任务等），
/// 在进程启动时注册。执行失败由执行器自行决定重试策略，
/// 协调器只记录结果。
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// 能处理的动作类别
    fn kind(&self) -> &str;

    /// 执行动作
    async fn execute(&self, action: &RuleAction, ctx: &ExecutionContext) -> anyhow::Result<()>;
}

/// 动作执行器注册表
///
/// 类别 → 执行器的能力查表，不做任何执行逻辑。
/// 未注册的类别是数据问题，调度时按动作级错误上报。
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn ActionExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册执行器（重复注册以后者为准）
    pub fn register(&mut self, executor: Arc<dyn ActionExecutor>) {
        info!(action_kind = %executor.kind(), "Action executor registered");
        self.executors.insert(executor.kind().to_string(), executor);
    }

    /// 解析动作类别对应的执行器
    pub fn resolve(&self, action_kind: &str) -> Option<Arc<dyn ActionExecutor>> {
        self.executors.get(action_kind).cloned()
    }
}
