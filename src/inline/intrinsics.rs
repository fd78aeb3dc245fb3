//! Self-hosting intrinsics and testing functions

use super::classify::{classify, Arity, Operand, Returns, Signature};
use super::elements::{classify_element_write, emit_element_write};
use super::{decline, InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::{MirBuilder, MirOp};
use crate::types::{BarrierKind, Dependencies, MirType, PrimitiveTypes};
use crate::value::ConstValue;

/// Bulk `(object, index, value)` stores from self-hosted code. Every group is
/// validated before the first store is emitted.
pub(super) fn inline_unsafe_put_elements(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(builder, call, &Signature::call(Arity::Grouped(3))));

    let mut deps = Dependencies::new();
    let mut writes = Vec::with_capacity(call.argc() / 3);
    for group in call.args.chunks_exact(3) {
        let (obj, index, value) = (group[0], group[1], group[2]);
        match classify_element_write(builder, obj, index, value, &mut deps) {
            Some(write) => writes.push((write, obj, index, value)),
            None => return decline(Reject::Shape("element write cannot be inlined")),
        }
    }

    let mut emit = builder.commit(call, deps)?;
    // Result goes first so the stack is complete at every store's resume point
    emit.push_constant(ConstValue::Undefined);
    for (write, obj, index, value) in writes {
        emit_element_write(&mut emit, write, obj, index, value)?;
    }
    emit.finish()
}

/// Constant non-negative slot number of argument `index`
fn constant_slot(builder: &MirBuilder, call: &CallInfo, index: usize) -> Option<u32> {
    let slot = builder.constant(call.arg(index))?.as_int32()?;
    u32::try_from(slot).ok()
}

pub(super) fn inline_unsafe_set_reserved_slot(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(3))
            .args(&[Operand::Object, Operand::Int32])
            .returns(Returns::Exactly(MirType::Undefined))
    ));
    let Some(slot) = constant_slot(builder, call, 1) else {
        return decline(Reject::Shape("slot is not a constant"));
    };

    let (obj, value) = (call.arg(0), call.arg(2));
    let mut emit = builder.commit(call, Dependencies::new())?;
    if emit.builder().needs_post_barrier(value) {
        emit.add(MirOp::PostWriteBarrier, &[obj, value], MirType::None);
    }
    let store = emit.add(MirOp::StoreFixedSlot { slot }, &[obj, value], MirType::None);
    emit.push_constant(ConstValue::Undefined);
    emit.resume_after(store)?;
    emit.finish()
}

pub(super) fn inline_unsafe_get_reserved_slot(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2)).args(&[Operand::Object, Operand::Int32])
    ));
    let Some(slot) = constant_slot(builder, call, 1) else {
        return decline(Reject::Shape("slot is not a constant"));
    };

    let mut emit = builder.commit(call, Dependencies::new())?;
    let load = emit.add(MirOp::LoadFixedSlot { slot }, &[call.arg(0)], MirType::Value);
    emit.push(load);
    // Slot contents are not tracked by type inference
    emit.push_type_barrier(load, &call.result_types, BarrierKind::TypeSet)?;
    emit.finish()
}

pub(super) fn inline_is_callable(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Object])
            .returns(Returns::Exactly(MirType::Boolean))
    ));

    let known = builder
        .type_set(call.arg(0))
        .and_then(|types| types.known_class())
        .filter(|class| !class.is_proxy())
        .map(|class| class.is_non_proxy_callable());

    let mut emit = builder.commit(call, Dependencies::new())?;
    match known {
        Some(callable) => {
            emit.push_constant(ConstValue::Boolean(callable));
        }
        None => {
            let ins = emit.add(MirOp::IsCallable, &[call.arg(0)], MirType::Boolean);
            emit.push(ins);
        }
    }
    emit.finish()
}

pub(super) fn inline_have_same_class(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2)).args(&[Operand::Object, Operand::Object])
    ));

    let class_of = |index: usize| {
        builder
            .type_set(call.arg(index))
            .and_then(|types| types.known_class())
    };
    let known = match (class_of(0), class_of(1)) {
        (Some(lhs), Some(rhs)) => Some(lhs == rhs),
        _ => None,
    };

    let mut emit = builder.commit(call, Dependencies::new())?;
    match known {
        Some(same) => {
            emit.push_constant(ConstValue::Boolean(same));
        }
        None => {
            let ins = emit.add(MirOp::HaveSameClass, &[call.arg(0), call.arg(1)], MirType::Boolean);
            emit.push(ins);
        }
    }
    emit.finish()
}

/// `ToObject(x)` on a known object is the identity
pub(super) fn inline_to_object(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Object])
            .returns(Returns::Exactly(MirType::Object))
    ));

    let mut emit = builder.commit(call, Dependencies::new())?;
    emit.push(call.arg(0));
    emit.finish()
}

pub(super) fn inline_is_object(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1)).returns(Returns::Exactly(MirType::Boolean))
    ));

    let mut emit = builder.commit(call, Dependencies::new())?;
    let ins = emit.add(MirOp::IsObject, &[call.arg(0)], MirType::Boolean);
    emit.push(ins);
    emit.finish()
}

pub(super) fn inline_to_integer(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(builder, call, &Signature::call(Arity::Exact(1))));

    // Only numbers, null and booleans convert without calling out
    let input = call.arg(0);
    let convertible = ![
        MirType::Object,
        MirType::String,
        MirType::Symbol,
        MirType::Undefined,
    ]
    .iter()
    .any(|&ty| builder.might_be(input, ty));
    let maybe_magic = builder.ty(input) == MirType::Value
        && builder
            .type_set(input)
            .map_or(true, |types| types.has_primitive(PrimitiveTypes::MAGIC));
    require!(convertible && !maybe_magic, "input may need a generic conversion");

    let return_type = call.inline_return_type();
    if return_type != MirType::Int32 {
        return decline(Reject::ReturnType(return_type));
    }

    let mut emit = builder.commit(call, Dependencies::new())?;
    let ins = emit.add(MirOp::ToInt32, &[input], MirType::Int32);
    emit.push(ins);
    emit.finish()
}

pub(super) fn inline_to_string(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1)).returns(Returns::Exactly(MirType::String))
    ));

    let mut emit = builder.commit(call, Dependencies::new())?;
    let ins = emit.add(MirOp::ToString, &[call.arg(0)], MirType::String);
    emit.push(ins);
    emit.finish()
}

/// Whether the current frame was entered by a construct. Known statically
/// once the frame itself has been inlined.
pub(super) fn inline_is_constructing(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(0)).returns(Returns::Exactly(MirType::Boolean))
    ));

    let frame = inliner.frame().filter(|frame| frame.depth > 0);
    let mut emit = builder.commit(call, Dependencies::new())?;
    match frame {
        Some(frame) => {
            emit.push_constant(ConstValue::Boolean(frame.constructing));
        }
        None => {
            let ins = emit.add(MirOp::IsConstructing, &[], MirType::Boolean);
            emit.push(ins);
        }
    }
    emit.finish()
}

pub(super) fn inline_bailout(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    let mut emit = builder.commit(call, Dependencies::new())?;
    emit.add(MirOp::Bail, &[], MirType::None);
    emit.push_constant(ConstValue::Undefined);
    emit.finish()
}

pub(super) fn inline_assert_float32(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(builder, call, &Signature::call(Arity::Exact(2))));
    let Some(must_be) = builder.constant(call.arg(1)).and_then(ConstValue::as_bool) else {
        return decline(Reject::Shape("expectation is not a constant boolean"));
    };

    let mut emit = builder.commit(call, Dependencies::new())?;
    emit.add(MirOp::AssertFloat32 { must_be }, &[call.arg(0)], MirType::None);
    emit.push_constant(ConstValue::Undefined);
    emit.finish()
}
