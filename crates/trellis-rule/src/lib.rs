pub mod engine;
pub mod evaluate;
pub mod executor;
pub mod model;
pub mod outcome;
pub mod registry;
pub mod store;

pub use engine::{spawn_bus_worker, RuleEngine};
pub use evaluate::{evaluate, rule_matches, FilterError};
pub use executor::{ActionExecutor, ExecutionContext, ExecutorRegistry};
pub use model::{
    ActionsRule, BoolPredicate, EnumPredicate, IdSetPredicate, NumberPredicate, RuleAction,
    RuleFilter, RuleMetadata, StringPredicate,
};
pub use outcome::{ActionOutcome, RuleOutcome};
pub use registry::{TriggerRegistry, TriggerSchema};
pub use store::{MemoryRuleStore, RuleStore};
