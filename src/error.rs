//! Error types for call-site specialization
//!
//! A declined specialization is not an error: it is reported as
//! [`InliningStatus::NotInlined`](crate::inline::InliningStatus) and leaves the
//! graph untouched. The variants below are fatal for the enclosing compilation.

use crate::call::CallSiteId;
use crate::mir::NodeId;
use crate::stubs::StubKind;
use std::fmt;
use thiserror::Error;

/// Phase of the graph builder in which an invariant was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphPhase {
    /// Emitting instructions for a committed call
    Emission,
    /// Setting up operands before specialization
    Setup,
}

impl fmt::Display for GraphPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphPhase::Emission => write!(f, "emission"),
            GraphPhase::Setup => write!(f, "setup"),
        }
    }
}

/// Fatal specialization errors
#[derive(Error, Debug)]
pub enum Error {
    /// An effectful instruction was emitted without a resume point
    #[error("effectful instruction {node} has no resume point")]
    MissingResumePoint { node: NodeId },

    /// A second resume point was attached to the same instruction
    #[error("instruction {node} already carries resume point {existing}")]
    ResumePointAlreadyAttached { node: NodeId, existing: u32 },

    /// The call site was committed twice
    #[error("call site {0} was already marked dead")]
    CallAlreadyDead(CallSiteId),

    /// A node id does not belong to the graph
    #[error("unknown node {node} during {phase}")]
    UnknownNode { node: NodeId, phase: GraphPhase },

    /// The operand stack did not grow by exactly one result
    #[error("call site {site} left the stack at depth {found}, expected {expected}")]
    StackDepth {
        site: CallSiteId,
        expected: usize,
        found: usize,
    },

    /// A type barrier was requested for a value that is not on top of the stack
    #[error("type barrier for {node} expected it on top of the stack, found {found:?}")]
    StackMismatch { node: NodeId, found: Option<NodeId> },

    /// A shared helper stub could not be created
    #[error("shared {kind} stub unavailable: {reason}")]
    StubUnavailable { kind: StubKind, reason: String },

    /// Malformed configuration
    #[error("ConfigError: {0}")]
    Config(String),

    /// Malformed call-site scenario
    #[error("ScenarioError: {0}")]
    Scenario(String),

    /// JSON decoding failure
    #[error("JsonError: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Whether the error was raised by a graph invariant check rather than
    /// by input decoding
    pub fn is_graph_invariant(&self) -> bool {
        matches!(
            self,
            Error::MissingResumePoint { .. }
                | Error::ResumePointAlreadyAttached { .. }
                | Error::CallAlreadyDead(_)
                | Error::UnknownNode { .. }
                | Error::StackDepth { .. }
                | Error::StackMismatch { .. }
        )
    }
}

/// Result type for specialization operations
pub type Result<T> = std::result::Result<T, Error>;
