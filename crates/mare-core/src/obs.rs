//! Structured observability hooks for routing and dispatch events.
//!
//! This module provides:
//! - A dispatch-scoped tracing span for plan execution
//! - Emission functions for key events: catalog load, routing, plan build,
//!   task dispatch
//!
//! Routing decisions are emitted at `debug!`, lifecycle events at `info!`
//! and anomalies at `warn!` (filter via `RUST_LOG`).

use std::path::Path;

use tracing::{debug, info, warn};
use uuid::Uuid;

/// Span tagged with a dispatch id; attach it to dispatch futures with
/// [`tracing::Instrument`].
pub fn dispatch_span(dispatch_id: &Uuid) -> tracing::Span {
    tracing::info_span!("mare.dispatch", dispatch_id = %dispatch_id)
}

/// Emit event: role catalog loaded from a directory.
pub fn emit_catalog_loaded(dir: &Path, roles: usize) {
    info!(event = "catalog.loaded", dir = %dir.display(), roles = roles);
}

/// Emit event: a role definition replaced an earlier one with the same name.
pub fn emit_duplicate_role(name: &str, previous_source: Option<&Path>) {
    warn!(
        event = "catalog.duplicate_role",
        role = %name,
        previous = ?previous_source,
        "later role definition replaces earlier one",
    );
}

/// Emit event: a task was routed. `matched` is false when the default role
/// was used.
///
/// # Example
///
/// ```ignore
/// emit_task_routed("arch_design", "SOFTWARE_ARCHITECT_REP", true);
/// // logs: event=task.routed task_id=arch_design role=SOFTWARE_ARCHITECT_REP matched=true
/// ```
pub fn emit_task_routed(task_id: &str, role: &str, matched: bool) {
    debug!(event = "task.routed", task_id = %task_id, role = %role, matched = matched);
}

/// Emit event: execution plan built.
pub fn emit_plan_built(tasks: usize, roles: usize) {
    info!(event = "plan.built", tasks = tasks, roles = roles);
}

/// Emit event: a task completed in its runner.
pub fn emit_task_dispatched(task_id: &str, role: &str, duration_ms: u64) {
    info!(
        event = "task.dispatched",
        task_id = %task_id,
        role = %role,
        duration_ms = duration_ms,
    );
}

/// Emit event: a runner reported failure (warning level).
pub fn emit_task_failed(task_id: &str, role: &str, error: &dyn std::fmt::Display) {
    warn!(event = "task.failed", task_id = %task_id, role = %role, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_functions_do_not_panic_without_subscriber() {
        emit_catalog_loaded(Path::new("reps"), 5);
        emit_duplicate_role("DEVOPS_ENGINEER_REP", None);
        emit_task_routed("t1", "TEST_ENGINEER_REP", false);
        emit_plan_built(5, 2);
        emit_task_dispatched("t1", "TEST_ENGINEER_REP", 12);
        emit_task_failed("t1", "TEST_ENGINEER_REP", &"boom");
    }

    #[test]
    fn test_dispatch_span_create() {
        let id = Uuid::new_v4();
        let _entered = dispatch_span(&id).entered();
    }
}
