//! Mid-level IR: the instruction graph specializations are emitted into

mod builder;
mod graph;
mod node;
mod resume;

pub use builder::{Emitter, MirBuilder};
pub use graph::{Block, Graph};
pub use node::{
    AtomicBinop, BlockId, MathFunction, MemoryOrdering, MirOp, Node, NodeId, PopShiftMode,
    TruncateKind,
};
pub use resume::{ResumePoint, ResumePointId};
