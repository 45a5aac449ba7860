//! Entry lifecycle workflows.
//!
//! This module owns everything that moves an entry between statuses:
//! - The lifecycle state machine (one explicit transition table)
//! - The workflow service (submit/approve/post/cancel/reverse/reset)
//! - The reversal engine for posted entries
//! - Bulk orchestration with validate-all-first and force semantics

pub mod bulk;
pub mod lifecycle;
pub mod reversal;
pub mod service;

#[cfg(test)]
mod reversal_props;

pub use bulk::{
    BulkFailure, BulkOperation, BulkOptions, BulkOrchestrator, BulkReport, CheckIssue,
    OperationCheck,
};
pub use lifecycle::{forced_reset_allowed, transition, LifecycleEvent};
pub use reversal::{build_reversal, reversal_number};
pub use service::WorkflowService;
