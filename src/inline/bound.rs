//! Calls through bound functions
//!
//! A call of `f.bind(t, a, b)` becomes a direct call of `f` with the bound
//! receiver and arguments baked in as constants, provided none of them can
//! move.

use super::classify::{classify, Arity, Constructing, Signature};
use super::{decline, InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::MirBuilder;
use crate::types::Dependencies;
use crate::value::{BoundTarget, ConstValue, FunctionKind, JsFunction};
use std::sync::Arc;

pub(super) fn inline_bound_function(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
    callee: &JsFunction,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::AtLeast(0)).constructing(Constructing::Either)
    ));

    let FunctionKind::Bound(bound) = &callee.kind else {
        return decline(Reject::Shape("callee is not a bound function"));
    };
    let BoundTarget::Function(target) = &bound.target else {
        return decline(Reject::Shape("bound target is not a function"));
    };
    if call.constructing {
        require!(target.is_constructor(), "bound target is not a constructor");
    }

    let env = inliner.env();
    let is_short_lived = |value: &ConstValue| value.as_object().is_some_and(|obj| env.is_short_lived(obj));
    require!(!env.is_short_lived(&target.object), "bound target may move");
    require!(!is_short_lived(&bound.bound_this), "bound receiver may move");
    require!(
        !bound.bound_args.iter().any(is_short_lived),
        "bound argument may move"
    );

    let argc = bound.bound_args.len() + call.argc();
    if argc > inliner.config().max_call_args {
        return decline(Reject::Shape("too many arguments"));
    }

    let mut emit = builder.commit(call, Dependencies::new())?;
    let fun = emit.constant(ConstValue::Object(target.object.clone()));
    let this = emit.constant(bound.bound_this.clone());
    let mut args = Vec::with_capacity(argc);
    for value in &bound.bound_args {
        args.push(emit.constant(value.clone()));
    }
    args.extend_from_slice(&call.args);

    let mut forwarded = CallInfo::new(call.site, fun, this, args).constructing(call.constructing);
    forwarded.result_types = Arc::clone(&call.result_types);
    forwarded.result_use = call.result_use;
    emit.make_call(target, &forwarded)?;
    emit.finish()
}
