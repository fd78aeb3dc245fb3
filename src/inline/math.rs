//! Math natives

use super::classify::{classify, Arity, Operand, Returns, Signature};
use super::{decline, InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::{MathFunction, MirBuilder, MirOp, NodeId, TruncateKind};
use crate::types::{Dependencies, MirType};
use crate::value::ConstValue;

/// Which rounding native is being specialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
    Round,
}

impl Rounding {
    fn to_int32_op(self) -> MirOp {
        match self {
            Rounding::Floor => MirOp::Floor,
            Rounding::Ceil => MirOp::Ceil,
            Rounding::Round => MirOp::Round,
        }
    }

    fn math_function(self) -> MathFunction {
        match self {
            Rounding::Floor => MathFunction::Floor,
            Rounding::Ceil => MathFunction::Ceil,
            Rounding::Round => MathFunction::Round,
        }
    }
}

/// Emit a single node over the call's arguments and push it
fn emit_unary(
    builder: &mut MirBuilder,
    call: &CallInfo,
    op: MirOp,
    inputs: &[NodeId],
    ty: MirType,
) -> Result<InliningStatus> {
    let mut emit = builder.commit(call, Dependencies::new())?;
    let ins = emit.add(op, inputs, ty);
    emit.push(ins);
    emit.finish()
}

pub(super) fn inline_math_function(
    builder: &mut MirBuilder,
    call: &CallInfo,
    function: MathFunction,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Number])
            .returns(Returns::Number)
    ));
    emit_unary(builder, call, MirOp::MathFunction(function), &[call.arg(0)], MirType::Double)
}

pub(super) fn inline_math_abs(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1)).args(&[Operand::Number])
    ));

    let return_type = call.inline_return_type();
    let arg_type = builder.ty(call.arg(0));
    // Same type, float to int32, or float32 widened to double
    if arg_type != return_type
        && !(arg_type.is_floating_point() && return_type == MirType::Int32)
        && !(arg_type == MirType::Float32 && return_type == MirType::Double)
    {
        return decline(Reject::ReturnType(return_type));
    }

    let abs_type = if arg_type == MirType::Float32 {
        MirType::Double
    } else {
        arg_type
    };
    emit_unary(builder, call, MirOp::Abs, &[call.arg(0)], abs_type)
}

pub(super) fn inline_math_rounding(
    builder: &mut MirBuilder,
    call: &CallInfo,
    rounding: Rounding,
) -> Result<InliningStatus> {
    check!(classify(builder, call, &Signature::call(Arity::Exact(1))));

    let arg = call.arg(0);
    let arg_type = builder.ty(arg);
    let return_type = call.inline_return_type();

    if arg_type == MirType::Int32 && return_type == MirType::Int32 {
        // Identity on int32, but the operand's own overflow checks must
        // survive truncation of the result
        return emit_unary(
            builder,
            call,
            MirOp::LimitedTruncate(TruncateKind::IndirectTruncate),
            &[arg],
            MirType::Int32,
        );
    }
    if arg_type.is_floating_point() && return_type == MirType::Int32 {
        return emit_unary(builder, call, rounding.to_int32_op(), &[arg], MirType::Int32);
    }
    if arg_type.is_floating_point() && return_type == MirType::Double {
        return emit_unary(
            builder,
            call,
            MirOp::MathFunction(rounding.math_function()),
            &[arg],
            MirType::Double,
        );
    }
    decline(Reject::ArgType {
        index: 0,
        found: arg_type,
    })
}

pub(super) fn inline_math_clz32(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Number])
            .returns(Returns::Exactly(MirType::Int32))
    ));
    emit_unary(builder, call, MirOp::Clz32, &[call.arg(0)], MirType::Int32)
}

pub(super) fn inline_math_sqrt(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Number])
            .returns(Returns::Exactly(MirType::Double))
    ));
    emit_unary(builder, call, MirOp::Sqrt, &[call.arg(0)], MirType::Double)
}

pub(super) fn inline_math_atan2(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2))
            .args(&[Operand::Number, Operand::Number])
            .returns(Returns::Exactly(MirType::Double))
    ));
    emit_unary(builder, call, MirOp::Atan2, &[call.arg(0), call.arg(1)], MirType::Double)
}

pub(super) fn inline_math_hypot(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2))
            .args(&[Operand::Number, Operand::Number])
            .returns(Returns::Exactly(MirType::Double))
    ));
    emit_unary(builder, call, MirOp::Hypot, &[call.arg(0), call.arg(1)], MirType::Double)
}

pub(super) fn inline_math_pow(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2))
            .args(&[Operand::Number, Operand::Number])
            .returns(Returns::IntOrDouble)
    ));

    let output_type = call.inline_return_type();
    let base = call.arg(0);
    let power = call.arg(1);
    let constant_power = builder.constant(power).and_then(ConstValue::as_number);

    let mut emit = builder.commit(call, Dependencies::new())?;
    let special = match constant_power {
        // Square root with the edge cases pow requires
        Some(p) if p == 0.5 => Some(emit.add(MirOp::PowHalf, &[base], MirType::Double)),
        Some(p) if p == -0.5 => {
            let half = emit.add(MirOp::PowHalf, &[base], MirType::Double);
            let one = emit.constant(ConstValue::Double(1.0));
            Some(emit.add(MirOp::Div, &[one, half], MirType::Double))
        }
        Some(p) if p == 1.0 => Some(base),
        Some(p) if p == 2.0 => Some(emit.add(MirOp::Mul, &[base, base], output_type)),
        Some(p) if p == 3.0 => {
            let square = emit.add(MirOp::Mul, &[base, base], output_type);
            Some(emit.add(MirOp::Mul, &[base, square], output_type))
        }
        Some(p) if p == 4.0 => {
            let square = emit.add(MirOp::Mul, &[base, base], output_type);
            Some(emit.add(MirOp::Mul, &[square, square], output_type))
        }
        _ => None,
    };
    let mut output = match special {
        Some(output) => output,
        None => emit.add(MirOp::Pow, &[base, power], MirType::Double),
    };

    let produced = emit.builder().ty(output);
    if output_type == MirType::Int32 && produced != MirType::Int32 {
        output = emit.add(MirOp::ToInt32, &[output], MirType::Int32);
    } else if output_type == MirType::Double && produced != MirType::Double {
        output = emit.add(MirOp::ToDouble, &[output], MirType::Double);
    }
    emit.push(output);
    emit.finish()
}

pub(super) fn inline_math_random(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::AtLeast(0)).returns(Returns::Exactly(MirType::Double))
    ));
    emit_unary(builder, call, MirOp::Random, &[], MirType::Double)
}

pub(super) fn inline_math_imul(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2))
            .args(&[Operand::Number, Operand::Number])
            .returns(Returns::Exactly(MirType::Int32))
    ));

    let mut emit = builder.commit(call, Dependencies::new())?;
    let lhs = emit.add(MirOp::TruncateToInt32, &[call.arg(0)], MirType::Int32);
    let rhs = emit.add(MirOp::TruncateToInt32, &[call.arg(1)], MirType::Int32);
    let mul = emit.add(MirOp::Mul, &[lhs, rhs], MirType::Int32);
    emit.push(mul);
    emit.finish()
}

pub(super) fn inline_math_fround(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    // Nothing observed yet: the only possible result is a double
    let returns = if call.result_types.is_empty() {
        Returns::Any
    } else {
        Returns::Number
    };
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Number])
            .returns(returns)
    ));
    emit_unary(builder, call, MirOp::ToFloat32, &[call.arg(0)], MirType::Float32)
}

pub(super) fn inline_math_min_max(
    builder: &mut MirBuilder,
    call: &CallInfo,
    is_max: bool,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::AtLeast(1)).returns(Returns::Number)
    ));

    let mut return_type = call.inline_return_type();
    let mut int32_cases = Vec::with_capacity(call.argc());
    for (index, &arg) in call.args.iter().enumerate() {
        match builder.ty(arg) {
            MirType::Int32 => int32_cases.push(arg),
            MirType::Double | MirType::Float32 => {
                // An int32 result never reaches a bound this large, so the
                // operand cannot decide the result
                let dominated = builder
                    .constant(arg)
                    .and_then(ConstValue::as_number)
                    .is_some_and(|cte| {
                        if is_max {
                            cte <= f64::from(i32::MIN)
                        } else {
                            cte >= f64::from(i32::MAX)
                        }
                    });
                if !dominated {
                    return_type = MirType::Double;
                }
            }
            found => return decline(Reject::ArgType { index, found }),
        }
    }
    if int32_cases.is_empty() {
        return_type = MirType::Double;
    }

    let cases: Vec<NodeId> = if return_type == MirType::Int32 {
        int32_cases
    } else {
        call.args.clone()
    };

    let mut emit = builder.commit(call, Dependencies::new())?;
    let result = if let [single] = cases[..] {
        emit.add(
            MirOp::LimitedTruncate(TruncateKind::NoTruncate),
            &[single],
            return_type,
        )
    } else {
        let mut last = cases[0];
        for &case in &cases[1..] {
            last = emit.add(MirOp::MinMax { is_max }, &[last, case], return_type);
        }
        last
    };
    emit.push(result);
    emit.finish()
}
