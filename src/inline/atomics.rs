//! Atomics on shared integer typed arrays

use super::classify::{classify, Arity, Operand, Signature};
use super::{InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::{AtomicBinop, Emitter, MemoryOrdering, MirBuilder, MirOp, NodeId};
use crate::types::{Dependencies, MirType, ScalarType};
use crate::value::ConstValue;

/// Element type of the shared array argument, provided an atomic access on
/// it produces the type the call site observed
fn atomic_target(builder: &MirBuilder, call: &CallInfo) -> std::result::Result<ScalarType, Reject> {
    let scalar = builder
        .type_set(call.arg(0))
        .and_then(|types| types.shared_typed_array_type())
        .ok_or(Reject::Shape("not a shared typed array"))?;
    let return_type = call.inline_return_type();
    if scalar.atomic_result_type() != Some(return_type) {
        return Err(Reject::ReturnType(return_type));
    }
    Ok(scalar)
}

/// Bounds-checked index and the elements of the array argument
fn checked_access(emit: &mut Emitter<'_>, array: NodeId, index: NodeId) -> (NodeId, NodeId) {
    let length = emit.add(MirOp::TypedArrayLength, &[array], MirType::Int32);
    let index = emit.bounds_check(index, length);
    let elements = emit.add(MirOp::TypedArrayElements, &[array], MirType::Elements);
    (elements, index)
}

fn to_int32(emit: &mut Emitter<'_>, value: NodeId) -> NodeId {
    if emit.builder().ty(value) == MirType::Double {
        emit.add(MirOp::TruncateToInt32, &[value], MirType::Int32)
    } else {
        value
    }
}

pub(super) fn inline_atomics_compare_exchange(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(4)).args(&[
            Operand::Object,
            Operand::Int32,
            Operand::IntOrDouble,
            Operand::IntOrDouble,
        ])
    ));
    let scalar = check!(atomic_target(builder, call));
    let return_type = call.inline_return_type();

    let mut emit = builder.commit(call, Dependencies::new())?;
    let (elements, index) = checked_access(&mut emit, call.arg(0), call.arg(1));
    let old = to_int32(&mut emit, call.arg(2));
    let new = to_int32(&mut emit, call.arg(3));
    let cas = emit.add(
        MirOp::CompareExchangeTypedArrayElement { scalar },
        &[elements, index, old, new],
        return_type,
    );
    emit.push(cas);
    emit.resume_after(cas)?;
    emit.finish()
}

pub(super) fn inline_atomics_load(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2)).args(&[Operand::Object, Operand::Int32])
    ));
    let scalar = check!(atomic_target(builder, call));
    let return_type = call.inline_return_type();

    let mut emit = builder.commit(call, Dependencies::new())?;
    let (elements, index) = checked_access(&mut emit, call.arg(0), call.arg(1));
    let load = emit.add(
        MirOp::LoadTypedArrayElement {
            scalar,
            ordering: MemoryOrdering::SeqCst,
        },
        &[elements, index],
        return_type,
    );
    emit.push(load);
    emit.resume_after(load)?;
    emit.finish()
}

/// `Atomics.store` evaluates to the value as passed, before truncation
pub(super) fn inline_atomics_store(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(3)).args(&[
            Operand::Object,
            Operand::Int32,
            Operand::IntOrDouble,
        ])
    ));
    let scalar = check!(atomic_target(builder, call));

    let value = call.arg(2);
    let mut emit = builder.commit(call, Dependencies::new())?;
    let (elements, index) = checked_access(&mut emit, call.arg(0), call.arg(1));
    let to_write = to_int32(&mut emit, value);
    let store = emit.add(
        MirOp::StoreTypedArrayElement {
            scalar,
            ordering: MemoryOrdering::SeqCst,
        },
        &[elements, index, to_write],
        MirType::None,
    );
    emit.push(value);
    emit.resume_after(store)?;
    emit.finish()
}

pub(super) fn inline_atomics_fence(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(builder, call, &Signature::call(Arity::Exact(0))));

    let mut emit = builder.commit(call, Dependencies::new())?;
    let fence = emit.add(MirOp::MemoryBarrier, &[], MirType::None);
    emit.push_constant(ConstValue::Undefined);
    emit.resume_after(fence)?;
    emit.finish()
}

/// Read-modify-write: `add`, `sub`, `and`, `or`, `xor`. The result is the
/// element's old value.
pub(super) fn inline_atomics_binop(
    builder: &mut MirBuilder,
    call: &CallInfo,
    op: AtomicBinop,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(3)).args(&[
            Operand::Object,
            Operand::Int32,
            Operand::IntOrDouble,
        ])
    ));
    let scalar = check!(atomic_target(builder, call));
    let return_type = call.inline_return_type();

    let mut emit = builder.commit(call, Dependencies::new())?;
    let (elements, index) = checked_access(&mut emit, call.arg(0), call.arg(1));
    let operand = to_int32(&mut emit, call.arg(2));
    let rmw = emit.add(
        MirOp::AtomicTypedArrayElementBinop { op, scalar },
        &[elements, index, operand],
        return_type,
    );
    emit.push(rmw);
    emit.resume_after(rmw)?;
    emit.finish()
}
