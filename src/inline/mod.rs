//! Call-site specialization of natives
//!
//! [`Inliner::try_specialize`] looks at a call whose callee is statically
//! known and, when the operand types allow it, replaces the generic call with
//! a type-specialized instruction sequence. Every specializer follows the same
//! shape: check preconditions and gather the type facts it relies on, then
//! commit (which marks the call dead), emit, and attach resume points.
//!
//! **Status:** 🧪 Experimental

use crate::call::{CallInfo, CallKind};
use crate::config::InlineConfig;
use crate::env::InlineEnv;
use crate::error::Result;
use crate::mir::MirBuilder;
use crate::stubs::SharedStubs;
use crate::value::{Callee, JsFunction};
use serde::{Deserialize, Serialize};

/// Unwrap a classifier result or decline the call
macro_rules! check {
    ($e:expr) => {
        match $e {
            Ok(value) => value,
            Err(reason) => return $crate::inline::decline(reason),
        }
    };
}

/// Decline the call with `reason` unless `cond` holds
macro_rules! require {
    ($cond:expr, $reason:expr) => {
        if !$cond {
            return $crate::inline::decline($crate::inline::Reject::Shape($reason));
        }
    };
}

mod array;
mod atomics;
mod bound;
mod classify;
mod dispatch;
mod elements;
mod intrinsics;
mod math;
mod parallel;
mod regexp;
mod string;
mod typed_object;

#[cfg(test)]
mod test_support;

pub use classify::{classify, Arity, Constructing, Operand, Reject, Returns, Signature};
pub use dispatch::{DispatchTable, Specializer};

/// Outcome of a specialization attempt that did not fail fatally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InliningStatus {
    /// The call was replaced; exactly one result value was pushed
    Inlined,
    /// The call stays generic; the graph is untouched
    NotInlined,
}

pub(crate) fn decline(reason: Reject) -> Result<InliningStatus> {
    tracing::trace!(%reason, "not inlined");
    Ok(InliningStatus::NotInlined)
}

/// Scripted frame the call being specialized sits in, when that frame was
/// itself inlined into its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFrame {
    pub depth: u32,
    pub constructing: bool,
}

/// Per-compilation front end of the specializers
pub struct Inliner<'a> {
    config: &'a InlineConfig,
    env: &'a dyn InlineEnv,
    stubs: &'a SharedStubs,
    table: &'static DispatchTable,
    frame: Option<InlineFrame>,
}

impl<'a> Inliner<'a> {
    pub fn new(config: &'a InlineConfig, env: &'a dyn InlineEnv, stubs: &'a SharedStubs) -> Self {
        Self {
            config,
            env,
            stubs,
            table: DispatchTable::global(),
            frame: None,
        }
    }

    pub fn in_frame(mut self, frame: InlineFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn config(&self) -> &InlineConfig {
        self.config
    }

    pub fn env(&self) -> &dyn InlineEnv {
        self.env
    }

    pub fn stubs(&self) -> &SharedStubs {
        self.stubs
    }

    pub fn frame(&self) -> Option<InlineFrame> {
        self.frame
    }

    /// Try to replace `call` with a specialized instruction sequence
    pub fn try_specialize(
        &self,
        builder: &mut MirBuilder,
        call: &CallInfo,
        callee: &Callee,
    ) -> Result<InliningStatus> {
        let _span = tracing::trace_span!("specialize", site = %call.site).entered();

        if builder.is_call_dead(call.site) {
            return decline(Reject::CallDead);
        }
        builder.check_operands(call)?;
        if !self.config.inline_natives {
            return decline(Reject::Disabled);
        }
        if call.argc() > self.config.max_call_args {
            return decline(Reject::TooManyArgs {
                limit: self.config.max_call_args,
                found: call.argc(),
            });
        }

        let result = match callee {
            Callee::Function(fun) => self.inline_function_call(builder, call, fun),
            Callee::TypeDescr(descr) => {
                typed_object::inline_non_function_call(self, builder, call, descr)
            }
        };

        match &result {
            Ok(InliningStatus::Inlined) => {
                tracing::debug!(site = %call.site, nodes = builder.node_count(), "inlined call")
            }
            Ok(InliningStatus::NotInlined) => {}
            Err(err) => tracing::warn!(site = %call.site, error = %err, "specialization failed"),
        }
        result
    }

    fn inline_function_call(
        &self,
        builder: &mut MirBuilder,
        call: &CallInfo,
        fun: &JsFunction,
    ) -> Result<InliningStatus> {
        let Some(native) = fun.native_id() else {
            return decline(Reject::NotNative);
        };
        let specializer = match call.kind {
            CallKind::Call => self.table.lookup(native),
            CallKind::Getter => self.table.lookup_getter(native),
        };
        match specializer {
            Some(specializer) => {
                tracing::trace!(%native, ?specializer, "dispatch");
                specializer.run(self, builder, call, fun)
            }
            None => decline(Reject::NoSpecializer(native)),
        }
    }
}
