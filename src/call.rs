//! Call-site description handed to the specializer

use crate::mir::NodeId;
use crate::types::{MirType, TypeSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Bytecode offset of a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallSiteId(pub u32);

impl fmt::Display for CallSiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pc{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    #[default]
    Call,
    /// Implicit call of a property getter
    Getter,
}

/// How the bytecode following the call consumes its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultUse {
    /// Discarded immediately
    Popped,
    /// Only tested for truthiness
    Condition,
    #[default]
    Escapes,
}

/// Operands and observed facts of one call site
#[derive(Debug, Clone)]
pub struct CallInfo {
    pub site: CallSiteId,
    pub fun: NodeId,
    pub this: NodeId,
    pub args: Vec<NodeId>,
    pub constructing: bool,
    pub kind: CallKind,
    /// Types the baseline tier observed for the call's result
    pub result_types: Arc<TypeSet>,
    pub result_use: ResultUse,
}

impl CallInfo {
    pub fn new(site: CallSiteId, fun: NodeId, this: NodeId, args: Vec<NodeId>) -> Self {
        Self {
            site,
            fun,
            this,
            args,
            constructing: false,
            kind: CallKind::Call,
            result_types: Arc::new(TypeSet::unknown()),
            result_use: ResultUse::Escapes,
        }
    }

    pub fn constructing(mut self, constructing: bool) -> Self {
        self.constructing = constructing;
        self
    }

    pub fn with_kind(mut self, kind: CallKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_result_types(mut self, types: TypeSet) -> Self {
        self.result_types = Arc::new(types);
        self
    }

    pub fn with_result_use(mut self, result_use: ResultUse) -> Self {
        self.result_use = result_use;
        self
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> NodeId {
        self.args[index]
    }

    /// Static type the observed result types imply
    pub fn inline_return_type(&self) -> MirType {
        self.result_types.known_mir_type()
    }

    pub fn result_popped(&self) -> bool {
        self.result_use == ResultUse::Popped
    }

    pub fn result_escapes(&self) -> bool {
        self.result_use == ResultUse::Escapes
    }

    /// Callee, receiver and arguments in stack order
    pub fn operands(&self) -> impl Iterator<Item = NodeId> + '_ {
        [self.fun, self.this]
            .into_iter()
            .chain(self.args.iter().copied())
    }
}
