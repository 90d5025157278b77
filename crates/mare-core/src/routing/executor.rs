//! Plan dispatch: hand each routed task to a role runner.
//!
//! Role groups may run concurrently; tasks inside one group run in plan
//! order. The runner is injected so tests can supply deterministic stubs and
//! hosts can wire in a real agent runtime.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{warn, Instrument};
use uuid::Uuid;

use crate::error::RunnerError;
use crate::obs;
use crate::routing::plan::ExecutionPlan;
use crate::routing::roles::{RoleCatalog, RoleDefinition, RoleName};
use crate::routing::task::{Task, TaskResult};

/// Performs a role's work on a task.
#[async_trait]
pub trait RoleRunner: Send + Sync {
    /// `definition` is `None` when the catalog does not define `role`.
    async fn run(
        &self,
        role: &RoleName,
        definition: Option<&RoleDefinition>,
        task: &Task,
    ) -> std::result::Result<serde_json::Value, RunnerError>;
}

/// Placeholder runner: echoes the task's required output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunner;

#[async_trait]
impl RoleRunner for NoopRunner {
    async fn run(
        &self,
        _role: &RoleName,
        _definition: Option<&RoleDefinition>,
        task: &Task,
    ) -> std::result::Result<serde_json::Value, RunnerError> {
        Ok(serde_json::json!({ "output": task.required_output }))
    }
}

/// Configuration for a dispatch batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum number of role groups running at once.
    pub max_concurrent: usize,
    /// Skip work not yet started once any task fails.
    pub fail_fast: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            fail_fast: false,
        }
    }
}

/// Run one task and convert the outcome into a [`TaskResult`].
pub async fn run_task(
    runner: &dyn RoleRunner,
    role: &RoleName,
    definition: Option<&RoleDefinition>,
    task: &Task,
) -> TaskResult {
    let started = Instant::now();
    let outcome = runner.run(role, definition, task).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(output) => {
            obs::emit_task_dispatched(&task.id, role.as_str(), elapsed_ms);
            TaskResult::completed(task.id.clone(), role.clone(), output, elapsed_ms)
        }
        Err(e) => {
            obs::emit_task_failed(&task.id, role.as_str(), &e);
            TaskResult::failed(task.id.clone(), role.clone(), e, elapsed_ms)
        }
    }
}

/// Run one task on its own tokio task so a panicking runner is reported as a
/// failed result for that task instead of taking down its role group.
async fn run_task_isolated(
    runner: Arc<dyn RoleRunner>,
    catalog: Arc<RoleCatalog>,
    role: RoleName,
    task: Task,
) -> TaskResult {
    let started = Instant::now();
    let task_id = task.id.clone();
    let run_role = role.clone();
    let handle = tokio::spawn(
        async move {
            let definition = catalog.get(run_role.as_str());
            run_task(runner.as_ref(), &run_role, definition, &task).await
        }
        .in_current_span(),
    );

    match handle.await {
        Ok(result) => result,
        Err(e) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            obs::emit_task_failed(&task_id, role.as_str(), &e);
            TaskResult::failed(task_id, role, format!("runner panicked: {e}"), elapsed_ms)
        }
    }
}

/// Dispatch every task in `plan` through `runner`.
///
/// Results come back in plan order (role groups first-seen, then task order)
/// whatever order they complete in. A runner error or panic yields a failed
/// result and never aborts the batch; with `fail_fast`, work not yet started
/// after a failure is skipped and absent from the results.
pub async fn execute_plan(
    plan: &ExecutionPlan,
    catalog: Arc<RoleCatalog>,
    runner: Arc<dyn RoleRunner>,
    config: DispatchConfig,
) -> Vec<TaskResult> {
    let dispatch_id = Uuid::new_v4();
    let span = obs::dispatch_span(&dispatch_id);
    let (fail_tx, _fail_rx) = tokio::sync::watch::channel(false);
    let fail_flag = Arc::new(fail_tx);

    // Semaphore enforces max_concurrent
    let sem = Arc::new(tokio::sync::Semaphore::new(config.max_concurrent.max(1)));

    let mut handles = Vec::with_capacity(plan.len());

    for (role, tasks) in plan.iter() {
        let task_ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
        let group_role = role.clone();
        let tasks = tasks.to_vec();
        let catalog = Arc::clone(&catalog);
        let runner = Arc::clone(&runner);
        let fail_flag = Arc::clone(&fail_flag);
        let fail_rx = fail_flag.subscribe();
        let sem = Arc::clone(&sem);
        let fail_fast = config.fail_fast;

        let group = async move {
            let _permit = sem.acquire_owned().await.ok();
            let mut results = Vec::with_capacity(tasks.len());

            for task in tasks {
                // Abort early if fail_fast was triggered by a sibling.
                if fail_fast && *fail_rx.borrow() {
                    break;
                }
                let result = run_task_isolated(
                    Arc::clone(&runner),
                    Arc::clone(&catalog),
                    group_role.clone(),
                    task,
                )
                .await;
                if fail_fast && !result.is_success() {
                    fail_flag.send_replace(true);
                }
                results.push(result);
            }
            results
        };

        let handle = tokio::spawn(group.instrument(span.clone()));
        handles.push((role.clone(), task_ids, handle));
    }

    let mut results = Vec::with_capacity(plan.task_count());
    for (role, task_ids, handle) in handles {
        match handle.await {
            Ok(group_results) => results.extend(group_results),
            Err(e) => {
                warn!(dispatch_id = %dispatch_id, role = %role, error = %e, "role group aborted");
                results.extend(
                    task_ids
                        .into_iter()
                        .map(|id| TaskResult::failed(id, role.clone(), &e, 0)),
                );
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::classifier::Classifier;
    use crate::routing::plan::build_plan;
    use crate::routing::task::TaskStatus;

    struct FailOn(&'static str);

    #[async_trait]
    impl RoleRunner for FailOn {
        async fn run(
            &self,
            role: &RoleName,
            _definition: Option<&RoleDefinition>,
            task: &Task,
        ) -> std::result::Result<serde_json::Value, RunnerError> {
            if task.id == self.0 {
                return Err(RunnerError::Failed {
                    role: role.to_string(),
                    task_id: task.id.clone(),
                    reason: "stub failure".to_string(),
                });
            }
            Ok(serde_json::json!({ "done": task.id }))
        }
    }

    fn routed(id: &str, role: &str) -> Task {
        let mut task = Task::new(id, "", "", format!("output of {id}"));
        task.assigned_role = Some(RoleName::from(role));
        task
    }

    fn plan() -> ExecutionPlan {
        build_plan(
            &Classifier::default(),
            vec![
                routed("a1", "A_REP"),
                routed("b1", "B_REP"),
                routed("a2", "A_REP"),
                routed("c1", "C_REP"),
            ],
        )
    }

    #[tokio::test]
    async fn test_noop_runner_echoes_required_output() {
        let results = execute_plan(
            &plan(),
            Arc::new(RoleCatalog::default()),
            Arc::new(NoopRunner),
            DispatchConfig::default(),
        )
        .await;

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(TaskResult::is_success));
        assert_eq!(
            results[0].output,
            Some(serde_json::json!({ "output": "output of a1" }))
        );
    }

    #[tokio::test]
    async fn test_results_follow_plan_order() {
        let results = execute_plan(
            &plan(),
            Arc::new(RoleCatalog::default()),
            Arc::new(NoopRunner),
            DispatchConfig {
                max_concurrent: 3,
                fail_fast: false,
            },
        )
        .await;

        let ids: Vec<&str> = results.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1", "c1"]);
        assert_eq!(results[2].role_used, "B_REP");
    }

    #[tokio::test]
    async fn test_runner_failure_does_not_abort_batch() {
        let results = execute_plan(
            &plan(),
            Arc::new(RoleCatalog::default()),
            Arc::new(FailOn("a1")),
            DispatchConfig::default(),
        )
        .await;

        assert_eq!(results.len(), 4);
        let failed: Vec<&TaskResult> = results.iter().filter(|r| !r.is_success()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].task_id, "a1");
        assert_eq!(failed[0].status, TaskStatus::Failed);
        assert!(failed[0].error.as_deref().unwrap().contains("stub failure"));
    }

    #[tokio::test]
    async fn test_fail_fast_skips_remaining_work_in_group() {
        // One slot: groups run one after another, so everything after a1 is skipped.
        let results = execute_plan(
            &plan(),
            Arc::new(RoleCatalog::default()),
            Arc::new(FailOn("a1")),
            DispatchConfig {
                max_concurrent: 1,
                fail_fast: true,
            },
        )
        .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].task_id, "a1");
        assert!(!results[0].is_success());
    }

    struct PanicOn(&'static str);

    #[async_trait]
    impl RoleRunner for PanicOn {
        async fn run(
            &self,
            _role: &RoleName,
            _definition: Option<&RoleDefinition>,
            task: &Task,
        ) -> std::result::Result<serde_json::Value, RunnerError> {
            if task.id == self.0 {
                panic!("runner blew up on {}", task.id);
            }
            Ok(serde_json::json!({ "done": task.id }))
        }
    }

    #[tokio::test]
    async fn test_panicking_runner_yields_failed_result() {
        let plan = plan();
        let results = execute_plan(
            &plan,
            Arc::new(RoleCatalog::default()),
            Arc::new(PanicOn("a1")),
            DispatchConfig::default(),
        )
        .await;

        assert_eq!(results.len(), plan.task_count());
        let ids: Vec<&str> = results.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1", "c1"]);

        assert_eq!(results[0].status, TaskStatus::Failed);
        assert_eq!(results[0].role_used, "A_REP");
        assert!(results[0].error.as_deref().unwrap().contains("panicked"));
        // The rest of the A_REP group still runs after the panic.
        assert!(results[1..].iter().all(TaskResult::is_success));
    }

    #[tokio::test]
    async fn test_empty_plan_dispatches_nothing() {
        let results = execute_plan(
            &ExecutionPlan::default(),
            Arc::new(RoleCatalog::default()),
            Arc::new(NoopRunner),
            DispatchConfig::default(),
        )
        .await;
        assert!(results.is_empty());
    }
}
