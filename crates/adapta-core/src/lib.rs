//! Adapta Core — the orchestration engine behind the Adapta assistant.
//!
//! Given a natural-language query, the engine classifies it, builds a
//! step-by-step plan over a small set of tools, executes the plan while
//! threading context between steps, synthesizes an answer, scores it and
//! retries with feedback when the score is too low.
//!
//! ```text
//! query ──► Classifier ──► Planner ──► WorkflowRunner ──► Synthesizer
//!                             ▲                               │
//!                             │                          QualityGate
//!                        RetryController ◄── fail ───────────┤
//!                                                      pass / give up
//!                                                             │
//!                                                      OutputFormatter
//! ```
//!
//! The concrete tools live outside this crate; they are reached through the
//! [`tools::Tool`] trait and a shared [`tools::ToolRegistry`].

pub mod config;
pub mod error;
pub mod orchestration;
pub mod state;
pub mod tools;
pub mod workflow;

// Convenience re-exports
pub use config::AgentConfig;
pub use error::{ConfigError, ToolError};
pub use orchestration::Orchestrator;
pub use state::RunState;
pub use tools::{Tool, ToolRegistry};
pub use workflow::TaskType;
