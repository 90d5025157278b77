//! MARE Router Core Library
//!
//! Rule-based classification of tasks into roles (REPs), fixed project
//! decomposition, and per-role execution planning.

pub mod config;
pub mod error;
pub mod obs;
pub mod routing;
pub mod system;
pub mod telemetry;

pub use config::{MareConfig, DEFAULT_CONFIG_FILE};
pub use error::{ConfigurationError, Result, RunnerError};

pub use routing::classifier::{task_text, Classifier};
pub use routing::decompose::{decompose, SUBTASK_IDS};
pub use routing::executor::{execute_plan, run_task, DispatchConfig, NoopRunner, RoleRunner};
pub use routing::plan::{build_plan, ExecutionPlan};
pub use routing::roles::{
    RoleCatalog, RoleDefinition, RoleName, BACKEND_DEVELOPER_REP, DEFAULT_REP_FILE_SUFFIX,
    DEVOPS_ENGINEER_REP, PROTOCOL_DESIGNER_REP, SOFTWARE_ARCHITECT_REP, TEST_ENGINEER_REP,
};
pub use routing::rules::{Rule, RuleSpec, RuleTable, RuleTableSpec};
pub use routing::task::{Task, TaskResult, TaskStatus};

pub use obs::{
    dispatch_span, emit_catalog_loaded, emit_duplicate_role, emit_plan_built,
    emit_task_dispatched, emit_task_failed, emit_task_routed,
};
pub use system::MareSystem;
pub use telemetry::init_tracing;

/// MARE router version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
