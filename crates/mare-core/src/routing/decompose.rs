//! Project decomposition into the fixed subtask template.
//!
//! The project description does not influence the template today; every
//! project expands into the same five subtasks in the same order.

use crate::routing::task::Task;

/// A template entry: `(id, description, input_context, required_output)`.
type SubtaskTemplate = (&'static str, &'static str, &'static str, &'static str);

const PROJECT_TEMPLATE: [SubtaskTemplate; 5] = [
    (
        "arch_design",
        "Design MARE system architecture with component specifications",
        "MARE RFC specification + MVP requirements",
        "Complete system architecture, component specs, data flow diagrams",
    ),
    (
        "core_implementation",
        "Implement and build MARE core components: router, REP injector, runner agent",
        "Architecture specifications + REP schema definitions",
        "Working Python implementation with MCP integrations",
    ),
    (
        "protocol_validation",
        "Validate protocol compliance with MARE RFC specification",
        "MARE RFC + implemented system code",
        "Compliance checklist, gap analysis, recommendations",
    ),
    (
        "test_scenarios",
        "Create demo scenarios and validation tests for token efficiency",
        "Working MARE system + performance requirements",
        "Test scenarios, validation scripts, metrics dashboard",
    ),
    (
        "deployment_setup",
        "Deploy and setup system with live demo capability",
        "Tested MARE implementation + demo requirements",
        "Running system, demo script, performance metrics",
    ),
];

/// Ids of the template subtasks, in order.
pub const SUBTASK_IDS: [&str; 5] = [
    PROJECT_TEMPLATE[0].0,
    PROJECT_TEMPLATE[1].0,
    PROJECT_TEMPLATE[2].0,
    PROJECT_TEMPLATE[3].0,
    PROJECT_TEMPLATE[4].0,
];

/// Expand a project into its ordered, unrouted subtasks.
pub fn decompose(_project_description: &str) -> Vec<Task> {
    PROJECT_TEMPLATE
        .iter()
        .map(|(id, description, input_context, required_output)| {
            Task::new(*id, *description, *input_context, *required_output)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_always_five_subtasks_in_order() {
        for input in ["", "Build X", "something else entirely"] {
            let tasks = decompose(input);
            let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids, SUBTASK_IDS);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let tasks = decompose("Build MARE MVP");
        let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), tasks.len());
    }

    #[test]
    fn test_subtasks_start_unrouted_with_populated_fields() {
        for task in decompose("anything") {
            assert!(task.assigned_role.is_none());
            assert!(!task.description.is_empty());
            assert!(!task.input_context.is_empty());
            assert!(!task.required_output.is_empty());
        }
    }

    #[test]
    fn test_description_does_not_change_template() {
        assert_eq!(decompose("a"), decompose("b"));
    }
}
