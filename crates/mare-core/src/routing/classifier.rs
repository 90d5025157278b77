//! First-match classification over a [`RuleTable`].

use crate::obs;
use crate::routing::decompose::decompose;
use crate::routing::roles::RoleName;
use crate::routing::rules::RuleTable;
use crate::routing::task::Task;

/// Maps task text to a role. Read-only after construction; share it freely.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: RuleTable,
}

impl Classifier {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Return the role of the first rule matching the lower-cased `text`,
    /// or the table's default role. Never fails.
    pub fn classify(&self, text: &str) -> RoleName {
        let normalized = text.to_lowercase();
        self.table
            .first_match(&normalized)
            .map(|rule| rule.role().clone())
            .unwrap_or_else(|| self.table.default_role().clone())
    }

    /// Classify a task's text and record the role on it.
    ///
    /// A task is routed at most once: if it already carries a role, that role
    /// is returned and the task is left untouched.
    pub fn route_task(&self, task: &mut Task) -> RoleName {
        if task.is_routed() {
            if let Some(role) = &task.assigned_role {
                return role.clone();
            }
        }
        let normalized = task_text(task);
        let (role, matched) = match self.table.first_match(&normalized) {
            Some(rule) => (rule.role().clone(), true),
            None => (self.table.default_role().clone(), false),
        };
        obs::emit_task_routed(&task.id, role.as_str(), matched);
        task.assigned_role = Some(role.clone());
        role
    }

    /// Decompose `project_description` and route every subtask.
    pub fn decompose_and_route(&self, project_description: &str) -> Vec<Task> {
        let mut tasks = decompose(project_description);
        for task in &mut tasks {
            self.route_task(task);
        }
        tasks
    }
}

/// The text a task is classified on: description and required output,
/// lower-cased.
pub fn task_text(task: &Task) -> String {
    format!("{} {}", task.description, task.required_output).to_lowercase()
}
