//! Core data model for the Session Execution Core.
//!
//! This crate has no behavior of its own — no parsing, no evaluation,
//! no I/O. It defines the shapes `simcore-mdl`, `simcore-tools`,
//! `simcore-engine`, and `simcore-runtime` build on top of, so that a
//! module document, a session transcript, and a `RunResult` mean the
//! same thing in every crate that touches them.

pub mod error;
pub mod evaluation;
pub mod event;
pub mod message;
pub mod module;
pub mod run_result;

pub use error::{Error, Result};
pub use evaluation::{
    CheckKind, CheckResult, CheckTarget, EvaluationCheck, EvaluationResult, ScoringConfig,
};
pub use event::{EventKind, SessionEvent, SessionState};
pub use message::{Message, Role, ToolCall};
pub use module::{
    AgentConfig, Environment, Module, Step, StepAction, ToolRef, Variable, VariableKind,
    VariableOption,
};
pub use run_result::RunResult;
