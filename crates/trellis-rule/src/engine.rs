use crate::evaluate;
use crate::executor::{ExecutionContext, ExecutorRegistry};
use crate::model::ActionsRule;
use crate::outcome::{ActionOutcome, RuleOutcome};
use crate::registry::TriggerRegistry;
use crate::store::RuleStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use trellis_core::{Result, SharedEventBus};
use trellis_types::Event;

const DEFAULT_RULE_CONCURRENCY: usize = 8;
const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// 规则引擎协调器
///
/// 无状态的扇出反应器：每次 `handle_event` 都是对当前规则集
/// 的一次性求值，调用之间不积累任何引擎状态，规则可随时增删改。
pub struct RuleEngine {
    /// 规则存储（外部协作方，只读）
    store: Arc<dyn RuleStore>,

    /// 触发器注册表
    triggers: Arc<TriggerRegistry>,

    /// 动作执行器注册表
    executors: Arc<ExecutorRegistry>,

    /// 并发求值的规则数上限
    rule_concurrency: usize,

    /// 单个动作的执行超时
    action_timeout: Duration,
}

impl RuleEngine {
    pub fn new(
        store: Arc<dyn RuleStore>,
        triggers: Arc<TriggerRegistry>,
        executors: Arc<ExecutorRegistry>,
    ) -> Self {
        Self {
            store,
            triggers,
            executors,
            rule_concurrency: DEFAULT_RULE_CONCURRENCY,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }

    pub fn with_rule_concurrency(mut self, limit: usize) -> Self {
        self.rule_concurrency = limit.max(1);
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// 处理一个业务事件
    ///
    /// 只有规则存储不可用会让整个调用失败；规则级、动作级的
    /// 错误全部收进结果，单条坏规则不影响其余规则。
    pub async fn handle_event(&self, event: Event) -> Result<Vec<RuleOutcome>> {
        self.handle_event_inner(event, None).await
    }

    /// 带截止时间的事件处理
    ///
    /// 截止时间一到便不再启动新的动作执行，已启动的在剩余预算
    /// 内完成或报超时；被跳过的动作逐个上报，不静默丢弃。
    pub async fn handle_event_with_deadline(
        &self,
        event: Event,
        deadline: Instant,
    ) -> Result<Vec<RuleOutcome>> {
        self.handle_event_inner(event, Some(deadline)).await
    }

    async fn handle_event_inner(
        &self,
        event: Event,
        deadline: Option<Instant>,
    ) -> Result<Vec<RuleOutcome>> {
        if self.triggers.schema(&event.trigger_id).is_none() {
            warn!(trigger_id = %event.trigger_id, "Event for unregistered trigger");
        }

        // 存储不可用是唯一致命错误，由调用方决定丢弃还是重放
        let rules = self.store.list_by_trigger(&event.trigger_id).await?;

        debug!(
            trigger_id = %event.trigger_id,
            candidates = rules.len(),
            "Evaluating rules for event"
        );

        if rules.is_empty() {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.rule_concurrency));
        let mut handles = Vec::new();

        for rule in rules {
            if !rule.enabled {
                debug!(rule_id = %rule.id, "Rule disabled, skipped");
                continue;
            }

            let semaphore = semaphore.clone();
            let executors = self.executors.clone();
            let event = event.clone();
            let action_timeout = self.action_timeout;

            handles.push(tokio::spawn(async move {
                // 注册表在引擎存续期间不关闭，acquire 不会失败
                let _permit = semaphore.acquire().await;
                process_rule(rule, event, executors, action_timeout, deadline).await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    // 规则任务本身不该 panic，真发生了也不拖垮兄弟规则
                    error!(error = %e, "Rule evaluation task failed");
                }
            }
        }

        Ok(outcomes)
    }
}

/// 对单条规则求值并调度其动作
async fn process_rule(
    rule: ActionsRule,
    event: Event,
    executors: Arc<ExecutorRegistry>,
    action_timeout: Duration,
    deadline: Option<Instant>,
) -> RuleOutcome {
    match evaluate::rule_matches(&rule, &event) {
        Ok(true) => {}
        Ok(false) => {
            debug!(rule_id = %rule.id, rule_name = %rule.name, "Rule not matched");
            return RuleOutcome::not_matched(rule.id, rule.name);
        }
        Err(e) => {
            // 过滤器缺字段/类型不符：fail closed，按未命中上报诊断
            warn!(
                rule_id = %rule.id,
                rule_name = %rule.name,
                error = %e,
                "Filter evaluation failed, treating rule as non-matching"
            );
            return RuleOutcome::not_matched_with_diagnostic(rule.id, rule.name, e.to_string());
        }
    }

    info!(
        rule_id = %rule.id,
        rule_name = %rule.name,
        trigger_id = %event.trigger_id,
        "Rule matched, dispatching actions"
    );

    let ctx = ExecutionContext::new(event, rule.id.clone(), rule.name.clone());
    let mut action_outcomes = Vec::with_capacity(rule.actions.len());

    // 动作按存储顺序执行；动作之间相互独立，一个失败不阻止后续
    for action in &rule.actions {
        let kind = action.kind();

        let budget = match remaining_budget(action_timeout, deadline) {
            Some(budget) => budget,
            None => {
                warn!(rule_id = %rule.id, action_kind = %kind, "Deadline exceeded, action not launched");
                action_outcomes.push(ActionOutcome::failed(
                    kind,
                    "deadline exceeded before action was launched",
                ));
                continue;
            }
        };

        let executor = match executors.resolve(kind) {
            Some(executor) => executor,
            None => {
                warn!(rule_id = %rule.id, action_kind = %kind, "Unknown action kind, skipped");
                action_outcomes.push(ActionOutcome::failed(kind, "unknown action kind"));
                continue;
            }
        };

        // 每个动作放进独立任务，执行器 panic 只影响它自己
        let action = action.clone();
        let ctx = ctx.clone();
        let handle = tokio::spawn(async move { executor.execute(&action, &ctx).await });
        let abort = handle.abort_handle();

        let outcome = match tokio::time::timeout(budget, handle).await {
            Ok(Ok(Ok(()))) => {
                debug!(rule_id = %rule.id, action_kind = %kind, "Action executed");
                ActionOutcome::ok(kind)
            }
            Ok(Ok(Err(e))) => {
                error!(rule_id = %rule.id, action_kind = %kind, error = %e, "Action execution failed");
                ActionOutcome::failed(kind, e.to_string())
            }
            Ok(Err(join_err)) => {
                let reason = if join_err.is_panic() {
                    "executor panicked"
                } else {
                    "executor task cancelled"
                };
                error!(rule_id = %rule.id, action_kind = %kind, "{}", reason);
                ActionOutcome::failed(kind, reason)
            }
            Err(_) => {
                abort.abort();
                warn!(rule_id = %rule.id, action_kind = %kind, "Action execution timeout");
                ActionOutcome::failed(kind, "execution timed out")
            }
        };

        action_outcomes.push(outcome);
    }

    RuleOutcome::matched(rule.id, rule.name, action_outcomes)
}

/// 动作可用的时间预算：默认超时钳到截止时间的剩余量
///
/// 返回 `None` 表示截止已过，不应再启动新动作。
fn remaining_budget(action_timeout: Duration, deadline: Option<Instant>) -> Option<Duration> {
    match deadline {
        None => Some(action_timeout),
        Some(deadline) => {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            if remaining.is_zero() {
                None
            } else {
                Some(action_timeout.min(remaining))
            }
        }
    }
}

/// 订阅事件总线并驱动引擎（异步消费路径）
pub fn spawn_bus_worker(engine: Arc<RuleEngine>, bus: SharedEventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        info!("Rule engine bus worker started");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let trigger_id = event.trigger_id.clone();
                    match engine.handle_event(event).await {
                        Ok(outcomes) => {
                            let matched = outcomes.iter().filter(|o| o.matched).count();
                            info!(
                                trigger_id = %trigger_id,
                                rules = outcomes.len(),
                                matched = matched,
                                "Event processed from bus"
                            );
                        }
                        Err(e) => {
                            error!(trigger_id = %trigger_id, error = %e, "Failed to process event from bus");
                        }
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Bus worker lagged, events dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    info!("Event bus closed, bus worker exiting");
                    break;
                }
            }
        }
    })
}
