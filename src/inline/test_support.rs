//! Fixture for specializer unit tests

use super::{InliningStatus, Inliner};
use crate::call::{CallInfo, CallSiteId};
use crate::config::InlineConfig;
use crate::env::StaticEnv;
use crate::error::Result;
use crate::mir::{MirBuilder, MirOp, NodeId};
use crate::natives::NativeId;
use crate::stubs::SharedStubs;
use crate::types::{MirType, TypeSet};
use crate::value::{Callee, ConstValue, JsFunction};

pub(crate) const SITE: CallSiteId = CallSiteId(7);

pub(crate) struct Harness {
    pub builder: MirBuilder,
    pub config: InlineConfig,
    pub env: StaticEnv,
    pub stubs: SharedStubs,
    next_param: u16,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            builder: MirBuilder::new(),
            config: InlineConfig::default(),
            env: StaticEnv::new(),
            stubs: SharedStubs::new(),
            next_param: 0,
        }
    }

    pub fn param(&mut self, ty: MirType) -> NodeId {
        let index = self.next_param;
        self.next_param += 1;
        self.builder.add_parameter(index, ty, None)
    }

    pub fn param_with_types(&mut self, ty: MirType, types: TypeSet) -> NodeId {
        let index = self.next_param;
        self.next_param += 1;
        self.builder.add_parameter(index, ty, Some(types))
    }

    pub fn constant(&mut self, value: ConstValue) -> NodeId {
        self.builder.add_constant(value)
    }

    /// Call with an undefined receiver
    pub fn call(&mut self, args: Vec<NodeId>, result: TypeSet) -> CallInfo {
        let this = self.constant(ConstValue::Undefined);
        self.method_call(this, args, result)
    }

    pub fn method_call(&mut self, this: NodeId, args: Vec<NodeId>, result: TypeSet) -> CallInfo {
        let fun = self.param(MirType::Object);
        CallInfo::new(SITE, fun, this, args).with_result_types(result)
    }

    pub fn run(&mut self, native: NativeId, call: &CallInfo) -> Result<InliningStatus> {
        self.run_callee(&Callee::Function(JsFunction::native(1, native)), call)
    }

    pub fn run_callee(&mut self, callee: &Callee, call: &CallInfo) -> Result<InliningStatus> {
        let inliner = Inliner::new(&self.config, &self.env, &self.stubs);
        inliner.try_specialize(&mut self.builder, call, callee)
    }

    pub fn count(&self, pred: impl Fn(&MirOp) -> bool) -> usize {
        self.builder.graph().count_ops(pred)
    }

    /// Node left on top of the stack
    pub fn result(&self) -> NodeId {
        self.builder.peek().expect("no result pushed")
    }

    pub fn result_op(&self) -> &MirOp {
        &self.builder.node(self.result()).op
    }

    pub fn result_type(&self) -> MirType {
        self.builder.ty(self.result())
    }

    /// Every effectful node has a resume point
    pub fn assert_effects_resumable(&self) {
        for node in self.builder.graph().nodes() {
            if node.op.is_effectful() {
                assert!(node.resume_point.is_some(), "{} has no resume point", node.id);
            }
        }
    }
}
