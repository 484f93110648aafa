use serde::{Deserialize, Serialize};
use std::fmt;

/// 事件载荷字段值
///
/// 业务变更产生的每个字段都以强类型值传递，
/// 避免在求值阶段解析无类型 JSON。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// 字符串（枚举 ID 也以字符串承载）
    String(String),

    /// 整数
    Int(i64),

    /// 浮点数
    Float(f64),

    /// 布尔值
    Bool(bool),

    /// 实体 ID
    Id(String),

    /// 实体 ID 集合
    IdSet(Vec<String>),
}

/// 字段声明类型
///
/// 触发器 Schema 用它声明载荷字段的类型；
/// `Int` 和 `Float` 统一归为 `Number` 参与数值比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Bool,
    Id,
    IdSet,
    Enum,
}

impl FieldValue {
    /// 值对应的声明类型
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Int(_) | FieldValue::Float(_) => FieldKind::Number,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Id(_) => FieldKind::Id,
            FieldValue::IdSet(_) => FieldKind::IdSet,
        }
    }

    /// 数值视图（Int 与 Float 统一比较）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// 字符串视图（String 与 Id 均可按文本比较）
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) | FieldValue::Id(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Bool => "bool",
            FieldKind::Id => "id",
            FieldKind::IdSet => "id_set",
            FieldKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Float(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}
