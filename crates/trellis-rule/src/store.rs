use crate::model::ActionsRule;
use crate::registry::TriggerRegistry;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use trellis_core::{Result, TrellisError};

/// 规则存储（外部协作方）
///
/// 持久化由生成的 CRUD 层负责，引擎侧只需要
/// "列出触发器 T 的全部规则"这一个读操作。
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn list_by_trigger(&self, trigger_id: &str) -> Result<Vec<ActionsRule>>;
}

/// 内存规则存储
///
/// 测试与单进程部署用；保存路径执行与生成层同样的校验。
pub struct MemoryRuleStore {
    rules: Arc<RwLock<HashMap<String, ActionsRule>>>,
    triggers: Arc<TriggerRegistry>,
}

impl MemoryRuleStore {
    pub fn new(triggers: Arc<TriggerRegistry>) -> Self {
        Self {
            rules: Arc::new(RwLock::new(HashMap::new())),
            triggers,
        }
    }

    /// 保存规则（按 ID upsert），先过校验
    pub async fn save(&self, mut rule: ActionsRule) -> Result<String> {
        rule.validate(&self.triggers)?;

        if rule.id.is_empty() {
            rule.id = uuid::Uuid::new_v4().to_string();
        }
        rule.metadata.updated_at = Utc::now();

        let id = rule.id.clone();
        let mut rules = self.rules.write().await;
        rules.insert(id.clone(), rule);
        Ok(id)
    }

    pub async fn get(&self, rule_id: &str) -> Result<ActionsRule> {
        let rules = self.rules.read().await;
        rules
            .get(rule_id)
            .cloned()
            .ok_or_else(|| TrellisError::NotFound(format!("rule {}", rule_id)))
    }

    pub async fn delete(&self, rule_id: &str) -> Result<()> {
        let mut rules = self.rules.write().await;
        rules.remove(rule_id);
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<ActionsRule>> {
        let rules = self.rules.read().await;
        Ok(rules.values().cloned().collect())
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn list_by_trigger(&self, trigger_id: &str) -> Result<Vec<ActionsRule>> {
        let rules = self.rules.read().await;
        Ok(rules
            .values()
            .filter(|r| r.trigger_id == trigger_id)
            .cloned()
            .collect())
    }
}
