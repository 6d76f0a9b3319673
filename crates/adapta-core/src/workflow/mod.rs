//! Workflow engine — classify a query, plan tool steps, execute them.
//!
//! # Architecture
//!
//! ```text
//! query ──► Classifier ──► TaskType ──► WorkflowCatalog (base plan)
//!                                            │
//!                                         Planner ──► WorkflowPlan
//!                                            │
//!                                      WorkflowRunner
//!                                            │  (one step at a time)
//!                                       StepExecutor ──► ToolRegistry
//! ```

pub mod catalog;
pub mod classifier;
pub mod executor;
pub mod planner;
pub mod runner;
pub mod schema;

pub use catalog::base_plan;
pub use classifier::{Classifier, ClassifierRules, RuleSet};
pub use executor::{ContextRole, ExecutionContext, StepExecutor};
pub use planner::{PlannedWorkflow, Planner};
pub use runner::{RunResult, WorkflowRunner};
pub use schema::{TaskType, WorkflowPlan, WorkflowStep};
