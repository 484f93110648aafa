use std::collections::HashMap;
use trellis_types::FieldKind;

/// 触发器载荷 Schema
///
/// 声明某一事件类别携带的字段集合，供规则保存时校验
/// 过滤器引用的字段确实存在。
#[derive(Debug, Clone)]
pub struct TriggerSchema {
    pub trigger_id: String,
    fields: HashMap<String, FieldKind>,
}

impl TriggerSchema {
    pub fn new(trigger_id: impl Into<String>) -> Self {
        Self {
            trigger_id: trigger_id.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    /// 字段声明类型
    pub fn field(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// 触发器注册表
///
/// 各业务模块在进程启动时注册自己的事件 Schema，
/// 运行期只读，共享放在 Arc 后面即可。
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    schemas: HashMap<String, TriggerSchema>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个触发器 Schema（重复注册以后者为准）
    pub fn register(&mut self, schema: TriggerSchema) {
        self.schemas.insert(schema.trigger_id.clone(), schema);
    }

    /// 查询触发器 Schema
    pub fn schema(&self, trigger_id: &str) -> Option<&TriggerSchema> {
        self.schemas.get(trigger_id)
    }

    /// 平台内置的业务事件 Schema
    pub fn with_builtin_schemas() -> Self {
        let mut registry = Self::new();

        registry.register(
            TriggerSchema::new("work_order.status_changed")
                .with_field("work_order_id", FieldKind::Id)
                .with_field("old_status", FieldKind::String)
                .with_field("new_status", FieldKind::String)
                .with_field("priority", FieldKind::Number)
                .with_field("assignee_ids", FieldKind::IdSet),
        );

        registry.register(
            TriggerSchema::new("work_order.created")
                .with_field("work_order_id", FieldKind::Id)
                .with_field("project_id", FieldKind::Id)
                .with_field("priority", FieldKind::Number)
                .with_field("work_order_type", FieldKind::Enum),
        );

        registry.register(
            TriggerSchema::new("equipment.state_changed")
                .with_field("equipment_id", FieldKind::Id)
                .with_field("location_id", FieldKind::Id)
                .with_field("old_state", FieldKind::String)
                .with_field("new_state", FieldKind::String)
                .with_field("under_maintenance", FieldKind::Bool),
        );

        registry
    }
}
