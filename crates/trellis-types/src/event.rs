use crate::value::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 业务事件
///
/// 实体变更成功后由所属模块构造并交给规则引擎，
/// 生命周期只在一次触发处理内，本子系统不做持久化。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// 触发器 ID（事件类别）
    pub trigger_id: String,

    /// 载荷字段
    pub fields: HashMap<String, FieldValue>,

    /// 事件产生时间
    pub emitted_at: DateTime<Utc>,
}

impl Event {
    pub fn new(trigger_id: impl Into<String>) -> Self {
        Self {
            trigger_id: trigger_id.into(),
            fields: HashMap::new(),
            emitted_at: Utc::now(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// 按名称读取载荷字段
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = Event::new("work_order.status_changed")
            .with_field("new_status", "DONE")
            .with_field("work_order_id", FieldValue::Id("7".to_string()));

        assert_eq!(event.trigger_id, "work_order.status_changed");
        assert_eq!(event.field("new_status"), Some(&FieldValue::from("DONE")));
        assert!(event.field("missing").is_none());
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new("equipment.state_changed").with_field("state", "FAULT");
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back.trigger_id, event.trigger_id);
        assert_eq!(back.field("state"), event.field("state"));
    }
}
