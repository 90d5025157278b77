//! Task records and execution outcomes.

use serde::{Deserialize, Serialize};

use crate::routing::roles::RoleName;

/// A unit of work routed to exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique within one decomposition run; reporting joins on it.
    pub id: String,
    pub description: String,
    /// What the task receives, usually the previous subtask's output.
    pub input_context: String,
    pub required_output: String,
    /// Set once by routing, never changed afterwards.
    pub assigned_role: Option<RoleName>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        input_context: impl Into<String>,
        required_output: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input_context: input_context.into(),
            required_output: required_output.into(),
            assigned_role: None,
        }
    }

    /// A blank role counts as unrouted.
    pub fn is_routed(&self) -> bool {
        self.assigned_role
            .as_ref()
            .is_some_and(|role| !role.as_str().is_empty())
    }
}

/// Lifecycle of a dispatched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Outcome of running one task through a role runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub role_used: RoleName,
    /// 1.0 for rule-routed completions, 0.0 on failure.
    pub confidence: f64,
    pub execution_time_ms: u64,
    /// Runner output (available after completion).
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl TaskResult {
    pub fn completed(
        task_id: impl Into<String>,
        role_used: RoleName,
        output: serde_json::Value,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Completed,
            role_used,
            confidence: 1.0,
            execution_time_ms,
            output: Some(output),
            error: None,
        }
    }

    pub fn failed(
        task_id: impl Into<String>,
        role_used: RoleName,
        error: impl std::fmt::Display,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Failed,
            role_used,
            confidence: 0.0,
            execution_time_ms,
            output: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_unrouted() {
        let task = Task::new("t1", "write docs", "", "a README");
        assert!(!task.is_routed());
        assert!(task.assigned_role.is_none());
    }

    #[test]
    fn test_blank_role_is_unrouted() {
        let mut task = Task::new("t1", "write docs", "", "a README");
        task.assigned_role = Some(RoleName::from(""));
        assert!(!task.is_routed());
        task.assigned_role = Some(RoleName::from("DOCS_REP"));
        assert!(task.is_routed());
    }

    #[test]
    fn test_task_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let back: TaskStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(back, TaskStatus::Failed);
        assert_eq!(TaskStatus::Running.to_string(), "running");
    }

    #[test]
    fn test_failed_result_has_zero_confidence_and_no_output() {
        let result = TaskResult::failed("t1", RoleName::from("X_REP"), "boom", 3);
        assert!(!result.is_success());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert!(result.output.is_none());
    }

    #[test]
    fn test_completed_result_serializes_role_as_string() {
        let result = TaskResult::completed(
            "t2",
            RoleName::from("TEST_ENGINEER_REP"),
            serde_json::json!({"output": "ok"}),
            0,
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["role_used"], "TEST_ENGINEER_REP");
        assert_eq!(value["status"], "completed");
    }
}
