use crate::model::{
    ActionsRule, BoolPredicate, EnumPredicate, IdSetPredicate, NumberPredicate, RuleFilter,
    StringPredicate,
};
use thiserror::Error;
use trellis_types::{Event, FieldKind, FieldValue};

/// 过滤器求值错误
///
/// 对规则作者不致命：出错的过滤器按不匹配处理（fail closed），
/// 诊断信息随结果上报。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("field '{field}' missing from event payload")]
    FieldMissing { field: String },

    #[error("field '{field}' expects {expected} but payload carries {actual}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },
}

/// 对单个过滤器求值
///
/// 持久化的规则可能早于 Schema 变更，这里不信任保存时的校验：
/// 字段缺失或类型不符一律返回错误，由上层按不匹配处理。
pub fn evaluate(filter: &RuleFilter, event: &Event) -> Result<bool, FilterError> {
    let field = filter.field();
    let value = event.field(field).ok_or_else(|| FilterError::FieldMissing {
        field: field.to_string(),
    })?;

    let mismatch = || FilterError::TypeMismatch {
        field: field.to_string(),
        expected: filter.expected_kind(),
        actual: value.kind(),
    };

    let matched = match filter {
        RuleFilter::String { predicate, .. } => {
            let actual = value.as_text().ok_or_else(mismatch)?;
            match predicate {
                StringPredicate::Is(want) => actual == want,
                StringPredicate::IsNot(want) => actual != want,
                StringPredicate::Contains(needle) => actual.contains(needle.as_str()),
                StringPredicate::IsOneOf(set) => set.iter().any(|want| want == actual),
            }
        }
        RuleFilter::Number { predicate, .. } => {
            let actual = value.as_number().ok_or_else(mismatch)?;
            match predicate {
                NumberPredicate::Is(want) => actual == *want,
                NumberPredicate::IsNot(want) => actual != *want,
                NumberPredicate::GreaterThan(want) => actual > *want,
                NumberPredicate::LessThan(want) => actual < *want,
            }
        }
        RuleFilter::Bool { predicate, .. } => match (value, predicate) {
            (FieldValue::Bool(actual), BoolPredicate::Is(want)) => actual == want,
            _ => return Err(mismatch()),
        },
        RuleFilter::Enum { predicate, .. } => {
            let actual = value.as_text().ok_or_else(mismatch)?;
            match predicate {
                EnumPredicate::Is(want) => actual == want,
                EnumPredicate::IsNot(want) => actual != want,
                EnumPredicate::IsOneOf(set) => set.iter().any(|want| want == actual),
            }
        }
        RuleFilter::IdSet { predicate, .. } => match value {
            FieldValue::IdSet(ids) => match predicate {
                IdSetPredicate::Contains(id) => ids.contains(id),
                IdSetPredicate::ContainsAnyOf(wanted) => {
                    wanted.iter().any(|id| ids.contains(id))
                }
            },
            _ => return Err(mismatch()),
        },
    };

    Ok(matched)
}

/// 规则整体匹配：全部过滤器按存储顺序求值取 AND
///
/// 空过滤器列表恒匹配；首个不匹配即短路，结果与全量求值等价。
pub fn rule_matches(rule: &ActionsRule, event: &Event) -> Result<bool, FilterError> {
    for filter in &rule.filters {
        if !evaluate(filter, event)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleAction, StringPredicate};

    fn status_event(new_status: &str) -> Event {
        Event::new("work_order.status_changed")
            .with_field("work_order_id", FieldValue::Id("7".to_string()))
            .with_field("old_status", "PENDING")
            .with_field("new_status", new_status)
            .with_field("priority", 3i64)
            .with_field(
                "assignee_ids",
                FieldValue::IdSet(vec!["u1".to_string(), "u2".to_string()]),
            )
    }

    fn string_is(field: &str, want: &str) -> RuleFilter {
        RuleFilter::String {
            field: field.to_string(),
            predicate: StringPredicate::Is(want.to_string()),
        }
    }

    #[test]
    fn test_string_operators() {
        let event = status_event("DONE");
        assert!(evaluate(&string_is("new_status", "DONE"), &event).unwrap());
        assert!(!evaluate(&string_is("new_status", "CANCELLED"), &event).unwrap());

        let contains = RuleFilter::String {
            field: "new_status".to_string(),
            predicate: StringPredicate::Contains("ON".to_string()),
        };
        assert!(evaluate(&contains, &event).unwrap());

        let one_of = RuleFilter::String {
            field: "new_status".to_string(),
            predicate: StringPredicate::IsOneOf(vec!["DONE".to_string(), "CLOSED".to_string()]),
        };
        assert!(evaluate(&one_of, &event).unwrap());
    }

    #[test]
    fn test_number_operators() {
        let event = status_event("DONE");
        let gt = RuleFilter::Number {
            field: "priority".to_string(),
            predicate: NumberPredicate::GreaterThan(2.0),
        };
        assert!(evaluate(&gt, &event).unwrap());

        let lt = RuleFilter::Number {
            field: "priority".to_string(),
            predicate: NumberPredicate::LessThan(2.0),
        };
        assert!(!evaluate(&lt, &event).unwrap());
    }

    #[test]
    fn test_id_set_membership() {
        let event = status_event("DONE");
        let contains = RuleFilter::IdSet {
            field: "assignee_ids".to_string(),
            predicate: IdSetPredicate::Contains("u2".to_string()),
        };
        assert!(evaluate(&contains, &event).unwrap());

        let any_of = RuleFilter::IdSet {
            field: "assignee_ids".to_string(),
            predicate: IdSetPredicate::ContainsAnyOf(vec!["u9".to_string(), "u1".to_string()]),
        };
        assert!(evaluate(&any_of, &event).unwrap());

        let none = RuleFilter::IdSet {
            field: "assignee_ids".to_string(),
            predicate: IdSetPredicate::Contains("u9".to_string()),
        };
        assert!(!evaluate(&none, &event).unwrap());
    }

    #[test]
    fn test_field_missing_fails_closed() {
        let event = status_event("DONE");
        let err = evaluate(&string_is("no_such_field", "x"), &event).unwrap_err();
        assert_eq!(
            err,
            FilterError::FieldMissing {
                field: "no_such_field".to_string()
            }
        );
    }

    #[test]
    fn test_type_mismatch_fails_closed() {
        let event = status_event("DONE");
        let numeric_on_string = RuleFilter::Number {
            field: "new_status".to_string(),
            predicate: NumberPredicate::GreaterThan(1.0),
        };
        let err = evaluate(&numeric_on_string, &event).unwrap_err();
        assert!(matches!(err, FilterError::TypeMismatch { .. }));
    }

    #[test]
    fn test_empty_filters_vacuously_match() {
        let rule = ActionsRule {
            trigger_id: "work_order.status_changed".to_string(),
            actions: vec![RuleAction::SetPriority {
                priority: "HIGH".to_string(),
            }],
            ..Default::default()
        };
        assert!(rule_matches(&rule, &status_event("ANYTHING")).unwrap());
    }

    #[test]
    fn test_and_semantics_order_independent() {
        let f1 = string_is("new_status", "DONE");
        let f2 = RuleFilter::Number {
            field: "priority".to_string(),
            predicate: NumberPredicate::GreaterThan(2.0),
        };
        let event = status_event("DONE");

        let mut rule = ActionsRule {
            trigger_id: "work_order.status_changed".to_string(),
            filters: vec![f1.clone(), f2.clone()],
            actions: vec![RuleAction::SetPriority {
                priority: "HIGH".to_string(),
            }],
            ..Default::default()
        };
        let forward = rule_matches(&rule, &event).unwrap();

        rule.filters = vec![f2, f1];
        let reversed = rule_matches(&rule, &event).unwrap();

        assert!(forward);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_short_circuit_equivalent_to_full_and() {
        // 第一个过滤器不匹配时短路，第二个引用缺失字段也不会报错
        let rule = ActionsRule {
            trigger_id: "work_order.status_changed".to_string(),
            filters: vec![
                string_is("new_status", "CANCELLED"),
                string_is("no_such_field", "x"),
            ],
            actions: vec![RuleAction::SetPriority {
                priority: "HIGH".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(rule_matches(&rule, &status_event("DONE")), Ok(false));
    }
}
