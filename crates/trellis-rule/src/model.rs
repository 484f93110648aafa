use crate::registry::TriggerRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trellis_core::{Result, TrellisError};
use trellis_types::FieldKind;

/// 自动化规则
///
/// 管理员声明"事件 X 发生且数据满足条件集 Y 时执行动作 Z"。
/// 规则由生成的 CRUD 层持久化，引擎侧只读。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsRule {
    /// 规则 ID
    pub id: String,

    /// 规则名称（人类可读，不要求唯一）
    pub name: String,

    /// 触发器 ID（触发器注册表的键）
    pub trigger_id: String,

    /// 过滤器（有序，可为空 = 恒匹配）
    pub filters: Vec<RuleFilter>,

    /// 动作（有序，保存时要求非空）
    pub actions: Vec<RuleAction>,

    /// 是否启用
    pub enabled: bool,

    /// 元数据
    pub metadata: RuleMetadata,
}

impl Default for ActionsRule {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            trigger_id: String::new(),
            filters: Vec::new(),
            actions: Vec::new(),
            enabled: true,
            metadata: RuleMetadata::default(),
        }
    }
}

/// 规则元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 更新时间
    pub updated_at: DateTime<Utc>,

    /// 创建者
    pub created_by: String,
}

impl Default for RuleMetadata {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: "system".to_string(),
        }
    }
}

/// 规则过滤器
///
/// 按字段值类型封闭建模，操作数结构在反序列化时即校验，
/// 求值阶段只需防御性复查。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleFilter {
    /// 字符串字段
    String {
        field: String,
        #[serde(flatten)]
        predicate: StringPredicate,
    },

    /// 数值字段
    Number {
        field: String,
        #[serde(flatten)]
        predicate: NumberPredicate,
    },

    /// 布尔字段
    Bool {
        field: String,
        #[serde(flatten)]
        predicate: BoolPredicate,
    },

    /// 枚举 ID 字段
    Enum {
        field: String,
        #[serde(flatten)]
        predicate: EnumPredicate,
    },

    /// ID 集合字段
    IdSet {
        field: String,
        #[serde(flatten)]
        predicate: IdSetPredicate,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "operand", rename_all = "snake_case")]
pub enum StringPredicate {
    Is(String),
    IsNot(String),
    Contains(String),
    IsOneOf(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "operand", rename_all = "snake_case")]
pub enum NumberPredicate {
    Is(f64),
    IsNot(f64),
    GreaterThan(f64),
    LessThan(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "operand", rename_all = "snake_case")]
pub enum BoolPredicate {
    Is(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "operand", rename_all = "snake_case")]
pub enum EnumPredicate {
    Is(String),
    IsNot(String),
    IsOneOf(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "operand", rename_all = "snake_case")]
pub enum IdSetPredicate {
    Contains(String),
    ContainsAnyOf(Vec<String>),
}

impl RuleFilter {
    /// 过滤器引用的载荷字段名
    pub fn field(&self) -> &str {
        match self {
            RuleFilter::String { field, .. }
            | RuleFilter::Number { field, .. }
            | RuleFilter::Bool { field, .. }
            | RuleFilter::Enum { field, .. }
            | RuleFilter::IdSet { field, .. } => field,
        }
    }

    /// 过滤器期望的字段类型
    pub fn expected_kind(&self) -> FieldKind {
        match self {
            RuleFilter::String { .. } => FieldKind::String,
            RuleFilter::Number { .. } => FieldKind::Number,
            RuleFilter::Bool { .. } => FieldKind::Bool,
            RuleFilter::Enum { .. } => FieldKind::Enum,
            RuleFilter::IdSet { .. } => FieldKind::IdSet,
        }
    }
}

/// 规则动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleAction {
    /// 指派工单
    AssignWorkOrder { assignee_id: String },

    /// 设置优先级
    SetPriority { priority: String },

    /// 发送通知
    SendNotification {
        template_id: String,
        channel: String,
    },

    /// 创建后续任务
    CreateFollowUpTask {
        name: String,
        description: Option<String>,
    },
}

impl RuleAction {
    /// 动作类别标识（执行器注册表的键）
    pub fn kind(&self) -> &'static str {
        match self {
            RuleAction::AssignWorkOrder { .. } => "assign_work_order",
            RuleAction::SetPriority { .. } => "set_priority",
            RuleAction::SendNotification { .. } => "send_notification",
            RuleAction::CreateFollowUpTask { .. } => "create_follow_up_task",
        }
    }
}

impl ActionsRule {
    /// 保存路径的校验（创建/更新时由存储层显式调用）
    ///
    /// 枚举建模已经保证操作数形状合法，这里校验跨引用：
    /// 触发器已注册、动作非空、每个过滤器字段存在且类型相符。
    pub fn validate(&self, registry: &TriggerRegistry) -> Result<()> {
        let schema = registry.schema(&self.trigger_id).ok_or_else(|| {
            TrellisError::InvalidInput(format!("unknown trigger: {}", self.trigger_id))
        })?;

        if self.actions.is_empty() {
            return Err(TrellisError::InvalidInput(format!(
                "rule '{}' has no actions",
                self.name
            )));
        }

        for filter in &self.filters {
            let field = filter.field();
            let declared = schema.field(field).ok_or_else(|| {
                TrellisError::InvalidInput(format!(
                    "filter references field '{}' not present in trigger '{}'",
                    field, self.trigger_id
                ))
            })?;

            let expected = filter.expected_kind();
            // 枚举 ID 以字符串承载，两者互相兼容
            let compatible = declared == expected
                || (declared == FieldKind::Enum && expected == FieldKind::String)
                || (declared == FieldKind::String && expected == FieldKind::Enum);
            if !compatible {
                return Err(TrellisError::InvalidInput(format!(
                    "filter on field '{}' expects {} but trigger '{}' declares {}",
                    field, expected, self.trigger_id, declared
                )));
            }
        }

        Ok(())
    }
}
