use serde::{Deserialize, Serialize};

/// 单个动作的执行结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// 动作类别
    pub action_kind: String,

    /// 是否成功
    pub ok: bool,

    /// 失败原因
    pub error: Option<String>,
}

impl ActionOutcome {
    pub fn ok(action_kind: impl Into<String>) -> Self {
        Self {
            action_kind: action_kind.into(),
            ok: true,
            error: None,
        }
    }

    pub fn failed(action_kind: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            action_kind: action_kind.into(),
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// 单条规则在一次事件处理中的结果
///
/// 引擎不持久化结果，由外部审计/日志协作方消费。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// 规则 ID
    pub rule_id: String,

    /// 规则名称
    pub rule_name: String,

    /// 过滤器是否全部命中
    pub matched: bool,

    /// 求值诊断（过滤器出错时的说明）
    pub diagnostic: Option<String>,

    /// 各动作结果（未命中时为空）
    pub actions: Vec<ActionOutcome>,
}

impl RuleOutcome {
    /// 未命中
    pub fn not_matched(rule_id: impl Into<String>, rule_name: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            matched: false,
            diagnostic: None,
            actions: Vec::new(),
        }
    }

    /// 求值出错，按未命中处理并附带诊断
    pub fn not_matched_with_diagnostic(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            matched: false,
            diagnostic: Some(diagnostic.into()),
            actions: Vec::new(),
        }
    }

    /// 命中，附带各动作结果
    pub fn matched(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        actions: Vec<ActionOutcome>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            matched: true,
            diagnostic: None,
            actions,
        }
    }
}
