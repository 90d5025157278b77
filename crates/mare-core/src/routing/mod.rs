//! Task routing: classification and execution planning.
//!
//! Turns free-text task descriptions into role assignments and groups a
//! project's subtasks into a per-role execution plan.
//!
//! # Module layout
//!
//! - [`roles`]: `RoleName`, `RoleDefinition`, `RoleCatalog`
//! - [`rules`]: `Rule`, `RuleTable` (ordered, compiled at construction)
//! - [`classifier`]: `Classifier::classify`, `Classifier::route_task`
//! - [`decompose`]: `decompose`, the fixed five-subtask template
//! - [`plan`]: `build_plan`, `ExecutionPlan`
//! - [`task`]: `Task`, `TaskStatus`, `TaskResult`
//! - [`executor`]: `RoleRunner`, `execute_plan`, `DispatchConfig`

pub mod classifier;
pub mod decompose;
pub mod executor;
pub mod plan;
pub mod roles;
pub mod rules;
pub mod task;
