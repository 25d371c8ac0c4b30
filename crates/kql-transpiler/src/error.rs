//! Structured diagnostics (spec §7): each error kind carries the cursor
//! byte offset at which it was raised and nothing else — no stderr/stdout
//! surface at this layer, no localisation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranspileError {
    #[error("unknown pipeline operator {operator:?} at byte {offset}")]
    UnknownOperator { operator: String, offset: usize },

    #[error("unknown KQL function {name:?} at byte {offset}")]
    UnknownFunction { name: String, offset: usize },

    #[error("malformed pipeline at byte {offset}: {reason}")]
    MalformedPipeline { offset: usize, reason: String },

    #[error("malformed arguments for {stage:?} at byte {offset}: {reason}")]
    MalformedArguments {
        stage: String,
        offset: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, TranspileError>;
