//! Grouping routed tasks into a per-role execution plan.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::obs;
use crate::routing::classifier::Classifier;
use crate::routing::roles::RoleName;
use crate::routing::task::Task;

/// Role groups in first-seen order; tasks within a group in input order.
///
/// Every task held by a plan has `assigned_role` set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionPlan {
    groups: IndexMap<RoleName, Vec<Task>>,
}

impl ExecutionPlan {
    /// Role names in first-seen order.
    pub fn roles(&self) -> impl Iterator<Item = &RoleName> {
        self.groups.keys()
    }

    pub fn get(&self, role: &str) -> Option<&[Task]> {
        self.groups.get(role).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoleName, &[Task])> {
        self.groups.iter().map(|(role, tasks)| (role, tasks.as_slice()))
    }

    /// Number of role groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total tasks across all groups.
    pub fn task_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Group `tasks` by assigned role, routing any that are not yet routed.
///
/// Nothing is dropped, deduplicated or reordered within a role.
pub fn build_plan(classifier: &Classifier, tasks: impl IntoIterator<Item = Task>) -> ExecutionPlan {
    let mut groups: IndexMap<RoleName, Vec<Task>> = IndexMap::new();

    for mut task in tasks {
        let role = classifier.route_task(&mut task);
        groups.entry(role).or_default().push(task);
    }

    let plan = ExecutionPlan { groups };
    obs::emit_plan_built(plan.task_count(), plan.len());
    plan
}
