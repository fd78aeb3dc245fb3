//! RegExp natives

use super::classify::{classify, Arity, Constructing, Operand, Returns, Signature};
use super::{decline, InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::{MirBuilder, MirOp, NodeId};
use crate::stubs::StubKind;
use crate::types::{BarrierKind, ClassId, Dependencies, MirType};

const REGEXP_CALL: Signature = Signature {
    arity: Arity::Exact(1),
    constructing: Constructing::Never,
    this: Operand::Object,
    args: &[Operand::NotObject],
    returns: Returns::Any,
};

fn is_regexp(builder: &MirBuilder, id: NodeId) -> bool {
    builder
        .type_set(id)
        .is_some_and(|types| types.known_class() == Some(ClassId::RegExp))
}

pub(super) fn inline_regexp_exec(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    // Only the match/no-match outcome is observed
    if !call.result_escapes() {
        return inline_regexp_test(inliner, builder, call);
    }

    check!(classify(builder, call, &REGEXP_CALL));
    require!(is_regexp(builder, call.this), "receiver is not known to be a regexp");
    inliner.stubs().ensure(StubKind::RegExpExec, inliner.env())?;

    let mut emit = builder.commit(call, Dependencies::new())?;
    let exec = emit.add(MirOp::RegExpExec, &[call.this, call.arg(0)], MirType::Value);
    emit.push(exec);
    emit.resume_after(exec)?;
    emit.push_type_barrier(exec, &call.result_types, BarrierKind::TypeSet)?;
    emit.finish()
}

pub(super) fn inline_regexp_test(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(builder, call, &REGEXP_CALL));
    // Eagerly compiled scripts may not have observed any result yet
    let return_type = call.inline_return_type();
    if call.result_escapes() && return_type != MirType::Boolean {
        return decline(Reject::ReturnType(return_type));
    }
    require!(is_regexp(builder, call.this), "receiver is not known to be a regexp");
    inliner.stubs().ensure(StubKind::RegExpTest, inliner.env())?;

    let mut emit = builder.commit(call, Dependencies::new())?;
    let test = emit.add(MirOp::RegExpTest, &[call.this, call.arg(0)], MirType::Boolean);
    emit.push(test);
    emit.resume_after(test)?;
    emit.finish()
}
