//! Shared test helpers for integration tests

use callopt::call::{CallInfo, CallSiteId};
use callopt::mir::{MirBuilder, MirOp, NodeId};
use callopt::natives::NativeId;
use callopt::types::{ClassId, MirType, ObjectKey, TypeSet};
use callopt::value::{Callee, ConstValue, JsFunction};
use callopt::{InlineConfig, Inliner, InliningStatus, SharedStubs, StaticEnv};
use std::sync::Arc;

pub const SITE: CallSiteId = CallSiteId(1);

/// A builder with one call site under construction
pub struct Site {
    pub builder: MirBuilder,
    pub config: InlineConfig,
    pub env: StaticEnv,
    pub stubs: SharedStubs,
    next_param: u16,
}

#[allow(dead_code)]
impl Site {
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
        self.param_with(ty, None)
    }

    pub fn param_with(&mut self, ty: MirType, types: Option<TypeSet>) -> NodeId {
        let index = self.next_param;
        self.next_param += 1;
        self.builder.add_parameter(index, ty, types)
    }

    pub fn object(&mut self, key: ObjectKey) -> NodeId {
        self.param_with(MirType::Object, Some(object_types(key)))
    }

    pub fn constant(&mut self, value: ConstValue) -> NodeId {
        self.builder.add_constant(value)
    }

    pub fn call(&mut self, args: Vec<NodeId>, result: TypeSet) -> CallInfo {
        let this = self.constant(ConstValue::Undefined);
        self.method_call(this, args, result)
    }

    pub fn method_call(&mut self, this: NodeId, args: Vec<NodeId>, result: TypeSet) -> CallInfo {
        let fun = self.param(MirType::Object);
        CallInfo::new(SITE, fun, this, args).with_result_types(result)
    }

    pub fn specialize(&mut self, native: NativeId, call: &CallInfo) -> callopt::Result<InliningStatus> {
        self.specialize_callee(&Callee::Function(JsFunction::native(100, native)), call)
    }

    pub fn specialize_callee(&mut self, callee: &Callee, call: &CallInfo) -> callopt::Result<InliningStatus> {
        Inliner::new(&self.config, &self.env, &self.stubs).try_specialize(&mut self.builder, call, callee)
    }

    pub fn top(&self) -> NodeId {
        self.builder.peek().expect("nothing on the stack")
    }

    pub fn top_op(&self) -> &MirOp {
        &self.builder.node(self.top()).op
    }

    pub fn count(&self, pred: impl Fn(&MirOp) -> bool) -> usize {
        self.builder.graph().count_ops(pred)
    }

    /// Number of resume points attached to `id`'s instruction
    pub fn resume_points_of(&self, id: NodeId) -> usize {
        self.builder
            .graph()
            .resume_points()
            .iter()
            .filter(|rp| rp.instruction == id)
            .count()
    }
}

pub fn object_types(key: ObjectKey) -> TypeSet {
    TypeSet::empty().with_object(Arc::new(key))
}

#[allow(dead_code)]
pub fn array_key(id: u32, elements: TypeSet) -> ObjectKey {
    ObjectKey::new(id, ClassId::Array).with_element_types(elements)
}
