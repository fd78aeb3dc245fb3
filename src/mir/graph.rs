//! Instruction graph storage

use super::node::{BlockId, MirOp, Node, NodeId};
use super::resume::{ResumePoint, ResumePointId};
use crate::types::{Dependencies, MirType, TypeSet};
use std::fmt;
use std::sync::Arc;

/// A straight-line sequence of nodes
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub nodes: Vec<NodeId>,
}

/// Nodes, blocks, resume points and the type facts compiled code relies on
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    blocks: Vec<Block>,
    resume_points: Vec<ResumePoint>,
    dependencies: Dependencies,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Empty graph with a single entry block
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            blocks: vec![Block {
                id: BlockId(0),
                nodes: Vec::new(),
            }],
            resume_points: Vec::new(),
            dependencies: Dependencies::new(),
        }
    }

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub(crate) fn add_node(
        &mut self,
        block: BlockId,
        op: MirOp,
        inputs: &[NodeId],
        ty: MirType,
        type_set: Option<Arc<TypeSet>>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            op,
            inputs: inputs.to_vec(),
            ty,
            type_set,
            block,
            resume_point: None,
            implicitly_used: false,
        });
        self.blocks[block.0 as usize].nodes.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of nodes whose operation satisfies `pred`
    pub fn count_ops(&self, pred: impl Fn(&MirOp) -> bool) -> usize {
        self.nodes.iter().filter(|n| pred(&n.op)).count()
    }

    pub(crate) fn push_resume_point(&mut self, mut rp: ResumePoint) -> ResumePointId {
        let id = ResumePointId(self.resume_points.len() as u32);
        rp.id = id;
        self.resume_points.push(rp);
        id
    }

    pub fn resume_point(&self, id: ResumePointId) -> Option<&ResumePoint> {
        self.resume_points.get(id.0 as usize)
    }

    pub fn resume_points(&self) -> &[ResumePoint] {
        &self.resume_points
    }

    pub(crate) fn commit_dependencies(&mut self, deps: Dependencies) {
        self.dependencies.extend(deps.iter().copied());
    }

    /// Type facts committed by successful specializations
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(f, "{}:", block.id)?;
            for id in &block.nodes {
                let node = &self.nodes[id.index()];
                write!(f, "  {} = {}", node.id, node.op)?;
                let inputs: Vec<String> = node.inputs.iter().map(|i| i.to_string()).collect();
                if !inputs.is_empty() {
                    write!(f, " {}", inputs.join(", "))?;
                }
                write!(f, " : {}", node.ty)?;
                if let Some(types) = &node.type_set {
                    write!(f, " {}", types)?;
                }
                if let Some(rp) = node.resume_point {
                    write!(f, " [{}]", rp)?;
                }
                writeln!(f)?;
            }
        }
        for rp in &self.resume_points {
            writeln!(f, "{}", rp)?;
        }
        for dep in self.dependencies.iter() {
            writeln!(f, "depends on {}", dep)?;
        }
        Ok(())
    }
}
