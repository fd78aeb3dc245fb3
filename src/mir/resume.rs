//! Resume points: interpreter state to rebuild when compiled code bails out

use super::NodeId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResumePointId(pub u32);

impl fmt::Display for ResumePointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rp{}", self.0)
    }
}

/// Snapshot taken after an effectful instruction. A bailout past it resumes
/// the interpreter after the call with exactly this operand stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumePoint {
    pub id: ResumePointId,
    pub instruction: NodeId,
    pub pc: u32,
    pub stack: Vec<NodeId>,
    pub locals: Vec<NodeId>,
}

impl fmt::Display for ResumePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |ids: &[NodeId]| {
            ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(
            f,
            "{} after {} pc={} stack=[{}] locals=[{}]",
            self.id,
            self.instruction,
            self.pc,
            list(&self.stack),
            list(&self.locals)
        )
    }
}
