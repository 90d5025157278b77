//! `MareSystem`: catalog, classifier and runner wired together.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::MareConfig;
use crate::error::Result;
use crate::routing::classifier::Classifier;
use crate::routing::executor::{execute_plan, run_task, NoopRunner, RoleRunner};
use crate::routing::plan::{build_plan, ExecutionPlan};
use crate::routing::roles::RoleCatalog;
use crate::routing::task::{Task, TaskResult};

/// Entry point for hosts that route and dispatch tasks.
///
/// Catalog and classifier are immutable once built; the system can be shared
/// across threads behind an `Arc`.
pub struct MareSystem {
    config: MareConfig,
    catalog: Arc<RoleCatalog>,
    classifier: Classifier,
    runner: Arc<dyn RoleRunner>,
    task_counter: AtomicU64,
}

impl MareSystem {
    /// Load the catalog and rule table named by `config`. Configuration
    /// errors surface here, before any task is routed.
    pub fn new(config: MareConfig) -> Result<Self> {
        let catalog =
            RoleCatalog::load_with_suffix(&config.rep_directory, &config.rep_file_suffix)?;
        let classifier = Classifier::new(config.rule_table()?);
        Ok(Self::from_parts(config, catalog, classifier))
    }

    pub fn from_parts(config: MareConfig, catalog: RoleCatalog, classifier: Classifier) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
            classifier,
            runner: Arc::new(NoopRunner),
            task_counter: AtomicU64::new(0),
        }
    }

    /// Replace the default no-op runner.
    pub fn with_runner(mut self, runner: Arc<dyn RoleRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Route an ad-hoc task and run it. Ids are `task-1`, `task-2`, ...
    pub async fn execute_task(&self, description: &str, required_output: &str) -> TaskResult {
        let n = self.task_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let mut task = Task::new(format!("task-{n}"), description, "", required_output);
        let role = self.classifier.route_task(&mut task);
        let definition = self.catalog.get(role.as_str());
        run_task(self.runner.as_ref(), &role, definition, &task).await
    }

    /// Decompose and route a project into an execution plan.
    pub fn plan_project(&self, project_description: &str) -> ExecutionPlan {
        build_plan(
            &self.classifier,
            self.classifier.decompose_and_route(project_description),
        )
    }

    /// Dispatch every task of `plan` with the configured runner.
    pub async fn execute_plan(&self, plan: &ExecutionPlan) -> Vec<TaskResult> {
        execute_plan(
            plan,
            Arc::clone(&self.catalog),
            Arc::clone(&self.runner),
            self.config.dispatch.clone(),
        )
        .await
    }

    /// Role names mapped to the file each was loaded from.
    pub fn list_available_reps(&self) -> BTreeMap<String, PathBuf> {
        self.catalog
            .iter()
            .map(|def| {
                (
                    def.name.to_string(),
                    def.source.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Ad-hoc tasks executed so far.
    pub fn tasks_executed(&self) -> u64 {
        self.task_counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::roles::{RoleDefinition, TEST_ENGINEER_REP};
    use crate::routing::task::TaskStatus;

    fn system() -> MareSystem {
        let catalog = RoleCatalog::from_definitions(vec![RoleDefinition::new(
            TEST_ENGINEER_REP,
            "Skeptic",
            vec![],
        )]);
        MareSystem::from_parts(MareConfig::default(), catalog, Classifier::default())
    }

    #[tokio::test]
    async fn test_execute_task_assigns_sequential_ids() {
        let sys = system();
        let first = sys.execute_task("write tests", "a test plan").await;
        let second = sys.execute_task("plant a tree", "").await;

        assert_eq!(first.task_id, "task-1");
        assert_eq!(second.task_id, "task-2");
        assert_eq!(first.role_used, TEST_ENGINEER_REP);
        assert_eq!(first.status, TaskStatus::Completed);
        assert_eq!(first.confidence, 1.0);
        assert_eq!(sys.tasks_executed(), 2);
    }

    #[tokio::test]
    async fn test_execute_task_echoes_required_output() {
        let result = system().execute_task("deploy", "a running service").await;
        assert_eq!(
            result.output,
            Some(serde_json::json!({ "output": "a running service" }))
        );
    }

    #[test]
    fn test_plan_project_covers_all_subtasks() {
        let plan = system().plan_project("Build MARE MVP");
        assert_eq!(plan.task_count(), 5);
    }

    #[test]
    fn test_list_available_reps_uses_catalog() {
        let reps = system().list_available_reps();
        assert_eq!(reps.len(), 1);
        assert!(reps.contains_key(TEST_ENGINEER_REP));
    }

    #[test]
    fn test_new_with_missing_rep_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = MareConfig {
            rep_directory: dir.path().join("absent"),
            ..MareConfig::default()
        };
        let sys = MareSystem::new(config).unwrap();
        assert!(sys.catalog().is_empty());
        assert_eq!(sys.tasks_executed(), 0);
    }
}
