//! Graph builder and the emission guard handed out on commit
//!
//! The builder is owned by one compilation and passed explicitly to every
//! specializer. Reading operand facts needs only `&MirBuilder`; adding nodes
//! for a call site goes through the [`Emitter`] returned by
//! [`MirBuilder::commit`], so nothing can be emitted for a call that has not
//! been marked dead.

use super::graph::Graph;
use super::node::{BlockId, MirOp, Node, NodeId};
use super::resume::{ResumePoint, ResumePointId};
use crate::call::{CallInfo, CallSiteId};
use crate::error::{Error, GraphPhase, Result};
use crate::inline::InliningStatus;
use crate::types::{BarrierKind, Dependencies, MirType, TypeSet};
use crate::value::{ConstValue, JsFunction};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Builds the MIR graph of one compilation
#[derive(Debug, Default)]
pub struct MirBuilder {
    graph: Graph,
    current: Option<BlockId>,
    stack: Vec<NodeId>,
    locals: Vec<NodeId>,
    pc: u32,
    dead_calls: FxHashSet<CallSiteId>,
    fork_join_context: Option<NodeId>,
}

impl MirBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    fn current_block(&self) -> BlockId {
        self.current.unwrap_or_else(|| self.graph.entry())
    }

    // ==================== Operand facts ====================

    /// Node behind a handle. Handles come from this builder; call operands
    /// are checked by [`MirBuilder::check_operands`] before use.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.graph.nodes()[id.index()]
    }

    pub fn ty(&self, id: NodeId) -> MirType {
        self.node(id).ty
    }

    pub fn type_set(&self, id: NodeId) -> Option<&Arc<TypeSet>> {
        self.node(id).type_set.as_ref()
    }

    pub fn constant(&self, id: NodeId) -> Option<&ConstValue> {
        self.node(id).constant()
    }

    /// Whether the value may be of type `ty` at runtime
    pub fn might_be(&self, id: NodeId, ty: MirType) -> bool {
        let node = self.node(id);
        if node.ty == MirType::Value {
            return node
                .type_set
                .as_ref()
                .map_or(true, |types| types.might_be(ty));
        }
        node.ty == ty
    }

    /// Whether storing this value into a tenured object needs a post barrier
    pub fn needs_post_barrier(&self, value: NodeId) -> bool {
        self.might_be(value, MirType::Object)
    }

    pub fn check_operands(&self, call: &CallInfo) -> Result<()> {
        for id in call.operands() {
            if self.graph.node(id).is_none() {
                return Err(Error::UnknownNode {
                    node: id,
                    phase: GraphPhase::Setup,
                });
            }
        }
        Ok(())
    }

    pub fn is_call_dead(&self, site: CallSiteId) -> bool {
        self.dead_calls.contains(&site)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    // ==================== Interpreter state ====================

    pub fn stack(&self) -> &[NodeId] {
        &self.stack
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn peek(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub fn push(&mut self, id: NodeId) {
        self.stack.push(id);
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    pub fn define_local(&mut self, id: NodeId) {
        self.locals.push(id);
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    // ==================== Operand setup ====================

    /// Add an incoming value of static type `ty`
    pub fn add_parameter(&mut self, index: u16, ty: MirType, types: Option<TypeSet>) -> NodeId {
        let block = self.current_block();
        self.graph
            .add_node(block, MirOp::Parameter(index), &[], ty, types.map(Arc::new))
    }

    pub fn add_constant(&mut self, value: ConstValue) -> NodeId {
        let block = self.current_block();
        let ty = value.mir_type();
        self.graph.add_node(block, MirOp::Constant(value), &[], ty, None)
    }

    // ==================== Commit ====================

    /// Mark the call dead and commit the type facts the specialization
    /// relies on. Everything the specialization emits goes through the
    /// returned emitter.
    pub fn commit(&mut self, call: &CallInfo, deps: Dependencies) -> Result<Emitter<'_>> {
        if !self.dead_calls.insert(call.site) {
            return Err(Error::CallAlreadyDead(call.site));
        }
        for id in call.operands() {
            match self.graph.node_mut(id) {
                Some(node) => node.implicitly_used = true,
                None => {
                    return Err(Error::UnknownNode {
                        node: id,
                        phase: GraphPhase::Emission,
                    })
                }
            }
        }
        self.graph.commit_dependencies(deps);

        let base_depth = self.stack.len();
        let first_node = self.graph.node_count();
        Ok(Emitter {
            builder: self,
            site: call.site,
            base_depth,
            first_node,
        })
    }
}

/// Emission handle for one committed call site
#[derive(Debug)]
pub struct Emitter<'b> {
    builder: &'b mut MirBuilder,
    site: CallSiteId,
    base_depth: usize,
    first_node: usize,
}

impl Emitter<'_> {
    /// Read access to operand facts during emission
    pub fn builder(&self) -> &MirBuilder {
        self.builder
    }

    pub fn add(&mut self, op: MirOp, inputs: &[NodeId], ty: MirType) -> NodeId {
        let block = self.builder.current_block();
        self.builder.graph.add_node(block, op, inputs, ty, None)
    }

    pub fn add_with_types(
        &mut self,
        op: MirOp,
        inputs: &[NodeId],
        ty: MirType,
        types: Arc<TypeSet>,
    ) -> NodeId {
        let block = self.builder.current_block();
        self.builder.graph.add_node(block, op, inputs, ty, Some(types))
    }

    pub fn constant(&mut self, value: ConstValue) -> NodeId {
        let ty = value.mir_type();
        self.add(MirOp::Constant(value), &[], ty)
    }

    pub fn push(&mut self, id: NodeId) {
        self.builder.stack.push(id);
    }

    pub fn push_constant(&mut self, value: ConstValue) -> NodeId {
        let id = self.constant(value);
        self.push(id);
        id
    }

    /// Attach a resume point capturing the current stack and locals
    pub fn resume_after(&mut self, id: NodeId) -> Result<ResumePointId> {
        let existing = match self.builder.graph.node(id) {
            Some(node) => node.resume_point,
            None => {
                return Err(Error::UnknownNode {
                    node: id,
                    phase: GraphPhase::Emission,
                })
            }
        };
        if let Some(existing) = existing {
            return Err(Error::ResumePointAlreadyAttached {
                node: id,
                existing: existing.0,
            });
        }

        let rp = ResumePoint {
            id: ResumePointId(0),
            instruction: id,
            pc: self.builder.pc,
            stack: self.builder.stack.clone(),
            locals: self.builder.locals.clone(),
        };
        let rp_id = self.builder.graph.push_resume_point(rp);
        if let Some(node) = self.builder.graph.node_mut(id) {
            node.resume_point = Some(rp_id);
        }
        Ok(rp_id)
    }

    /// Guard the value on top of the stack against the observed result
    /// types, replacing it with the guarded value
    pub fn push_type_barrier(
        &mut self,
        id: NodeId,
        observed: &Arc<TypeSet>,
        kind: BarrierKind,
    ) -> Result<()> {
        let top = self.builder.peek();
        if top != Some(id) {
            return Err(Error::StackMismatch { node: id, found: top });
        }
        if kind == BarrierKind::NoBarrier {
            return Ok(());
        }
        let barrier = self.add_with_types(
            MirOp::TypeBarrier { kind },
            &[id],
            observed.known_mir_type(),
            Arc::clone(observed),
        );
        self.builder.stack.pop();
        self.builder.stack.push(barrier);
        Ok(())
    }

    /// Guard `index < length`; the result is the checked index
    pub fn bounds_check(&mut self, index: NodeId, length: NodeId) -> NodeId {
        self.add(MirOp::BoundsCheck, &[index, length], MirType::Int32)
    }

    /// Per-compilation fork-join context, created on first use
    pub fn fork_join_context(&mut self) -> NodeId {
        if let Some(cx) = self.builder.fork_join_context {
            return cx;
        }
        let cx = self.add(MirOp::ForkJoinContext, &[], MirType::Object);
        self.builder.fork_join_context = Some(cx);
        cx
    }

    /// Emit a generic call with a known target and push its result
    pub fn make_call(&mut self, target: &JsFunction, call: &CallInfo) -> Result<NodeId> {
        let inputs: Vec<NodeId> = call.operands().collect();
        let ins = self.add_with_types(
            MirOp::Call {
                target: target.object.id,
                argc: call.argc() as u32,
                constructing: call.constructing,
            },
            &inputs,
            call.inline_return_type(),
            Arc::clone(&call.result_types),
        );
        self.push(ins);
        self.resume_after(ins)?;
        Ok(ins)
    }

    /// Validate the emission: every effectful node carries a resume point
    /// and the call left exactly one result on the stack
    pub fn finish(self) -> Result<InliningStatus> {
        for node in &self.builder.graph.nodes()[self.first_node..] {
            if node.op.is_effectful() && node.resume_point.is_none() {
                return Err(Error::MissingResumePoint { node: node.id });
            }
        }
        let depth = self.builder.stack.len();
        if depth != self.base_depth + 1 {
            return Err(Error::StackDepth {
                site: self.site,
                expected: self.base_depth + 1,
                found: depth,
            });
        }
        Ok(InliningStatus::Inlined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_with(builder: &mut MirBuilder, args: usize) -> CallInfo {
        let fun = builder.add_parameter(0, MirType::Object, None);
        let this = builder.add_constant(ConstValue::Undefined);
        let args = (0..args)
            .map(|i| builder.add_parameter(i as u16 + 1, MirType::Int32, None))
            .collect();
        CallInfo::new(CallSiteId(10), fun, this, args)
    }

    #[test]
    fn test_commit_marks_call_dead_once() {
        let mut builder = MirBuilder::new();
        let call = call_with(&mut builder, 1);
        {
            let mut emit = builder.commit(&call, Dependencies::new()).unwrap();
            emit.push_constant(ConstValue::Undefined);
            assert_eq!(emit.finish().unwrap(), InliningStatus::Inlined);
        }
        assert!(builder.is_call_dead(call.site));
        assert!(builder.node(call.args[0]).implicitly_used);
        assert!(matches!(
            builder.commit(&call, Dependencies::new()),
            Err(Error::CallAlreadyDead(_))
        ));
    }

    #[test]
    fn test_finish_requires_resume_points() {
        let mut builder = MirBuilder::new();
        let call = call_with(&mut builder, 1);
        let mut emit = builder.commit(&call, Dependencies::new()).unwrap();
        let push = emit.add(MirOp::ArrayPush, &[call.this, call.args[0]], MirType::Int32);
        emit.push(push);
        assert!(matches!(
            emit.finish(),
            Err(Error::MissingResumePoint { node }) if node == push
        ));
    }

    #[test]
    fn test_finish_requires_one_result() {
        let mut builder = MirBuilder::new();
        let call = call_with(&mut builder, 0);
        let emit = builder.commit(&call, Dependencies::new()).unwrap();
        assert!(matches!(emit.finish(), Err(Error::StackDepth { found: 0, .. })));
    }

    #[test]
    fn test_resume_point_captures_stack() {
        let mut builder = MirBuilder::new();
        let call = call_with(&mut builder, 1);
        builder.set_pc(42);
        let mut emit = builder.commit(&call, Dependencies::new()).unwrap();
        let push = emit.add(MirOp::ArrayPush, &[call.this, call.args[0]], MirType::Int32);
        emit.push(push);
        let rp = emit.resume_after(push).unwrap();
        assert!(matches!(
            emit.resume_after(push),
            Err(Error::ResumePointAlreadyAttached { .. })
        ));
        emit.finish().unwrap();

        let rp = builder.graph().resume_point(rp).unwrap();
        assert_eq!(rp.pc, 42);
        assert_eq!(rp.stack, vec![push]);
    }

    #[test]
    fn test_type_barrier_replaces_top() {
        let mut builder = MirBuilder::new();
        let call = call_with(&mut builder, 0);
        let observed = Arc::new(TypeSet::of(MirType::Int32));
        let mut emit = builder.commit(&call, Dependencies::new()).unwrap();
        let load = emit.add(MirOp::LoadFixedSlot { slot: 0 }, &[call.this], MirType::Value);
        assert!(emit
            .push_type_barrier(load, &observed, BarrierKind::TypeSet)
            .is_err());
        emit.push(load);
        emit.push_type_barrier(load, &observed, BarrierKind::TypeSet).unwrap();
        emit.finish().unwrap();

        let top = builder.peek().unwrap();
        assert_ne!(top, load);
        assert_eq!(builder.ty(top), MirType::Int32);
    }

    #[test]
    fn test_might_be_uses_type_set() {
        let mut builder = MirBuilder::new();
        let boxed = builder.add_parameter(0, MirType::Value, Some(TypeSet::of(MirType::String)));
        let unknown = builder.add_parameter(1, MirType::Value, None);
        let int = builder.add_parameter(2, MirType::Int32, None);
        assert!(!builder.might_be(boxed, MirType::Object));
        assert!(builder.might_be(boxed, MirType::String));
        assert!(builder.might_be(unknown, MirType::Object));
        assert!(!builder.needs_post_barrier(int));
    }
}
