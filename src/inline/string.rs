//! String natives

use super::classify::{classify, Arity, Constructing, Operand, Returns, Signature};
use super::{decline, InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::{MirBuilder, MirOp, NodeId};
use crate::natives::NativeId;
use crate::types::{ClassId, Dependencies, Dependency, MirType, PrimitiveTypes, TypeSet};
use crate::value::ConstValue;
use std::sync::Arc;

/// `new String(x)` allocated from the site's template
pub(super) fn inline_string_object(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    // The inline conversion cannot call into valueOf/toString of objects
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .constructing(Constructing::Required)
            .args(&[Operand::NotObject])
    ));
    let Some(template) = inliner
        .env()
        .template_object_for(call.site, NativeId::StringConstructor)
    else {
        return decline(Reject::Shape("no template object"));
    };
    let template_value = ConstValue::Object(template.object.clone());

    let mut emit = builder.commit(call, Dependencies::new())?;
    let template_const = emit.constant(template_value);
    let ins = emit.add(
        MirOp::NewStringObject,
        &[call.arg(0), template_const],
        MirType::Object,
    );
    emit.push(ins);
    emit.resume_after(ins)?;
    emit.finish()
}

pub(super) fn inline_string_split(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .this(Operand::String)
            .args(&[Operand::String])
    ));
    let Some(template) = inliner
        .env()
        .template_object_for(call.site, NativeId::StringSplit)
    else {
        return decline(Reject::Shape("no template object"));
    };

    let key = &template.type_object;
    require!(!key.unknown_properties, "template properties are untracked");
    let holds_strings = key
        .element_types
        .as_ref()
        .is_some_and(|types| types.has_primitive(PrimitiveTypes::STRING));
    require!(holds_strings, "template elements never held strings");

    let mut deps = Dependencies::new();
    deps.push(Dependency::ElementTypes { object: key.id });
    let template_value = ConstValue::Object(template.object.clone());
    let result_types = Arc::new(TypeSet::empty().with_object(Arc::clone(key)));

    let mut emit = builder.commit(call, deps)?;
    let template_const = emit.constant(template_value);
    let ins = emit.add_with_types(
        MirOp::StringSplit,
        &[call.this, call.arg(0), template_const],
        MirType::Object,
        result_types,
    );
    emit.push(ins);
    emit.finish()
}

/// UTF-16 code unit of a constant string at a constant index
fn constant_code_unit(builder: &MirBuilder, string: NodeId, index: NodeId) -> Option<u16> {
    let string = builder.constant(string)?.as_str()?;
    let index = builder.constant(index)?.as_int32()?;
    let index = usize::try_from(index).ok()?;
    string.encode_utf16().nth(index)
}

fn is_surrogate(unit: u16) -> bool {
    (0xD800..=0xDFFF).contains(&unit)
}

pub(super) fn inline_str_char_code_at(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .this(Operand::StringOrValue)
            .args(&[Operand::IntOrDouble])
            .returns(Returns::Exactly(MirType::Int32))
    ));

    if let Some(unit) = constant_code_unit(builder, call.this, call.arg(0)) {
        let mut emit = builder.commit(call, Dependencies::new())?;
        emit.push_constant(ConstValue::Int32(i32::from(unit)));
        return emit.finish();
    }

    let mut emit = builder.commit(call, Dependencies::new())?;
    let index = emit.add(MirOp::ToInt32, &[call.arg(0)], MirType::Int32);
    let length = emit.add(MirOp::StringLength, &[call.this], MirType::Int32);
    let index = emit.bounds_check(index, length);
    let code = emit.add(MirOp::CharCodeAt, &[call.this, index], MirType::Int32);
    emit.push(code);
    emit.finish()
}

pub(super) fn inline_str_from_char_code(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Int32])
            .returns(Returns::Exactly(MirType::String))
    ));

    let mut emit = builder.commit(call, Dependencies::new())?;
    let code = emit.add(MirOp::ToInt32, &[call.arg(0)], MirType::Int32);
    let string = emit.add(MirOp::FromCharCode, &[code], MirType::String);
    emit.push(string);
    emit.finish()
}

pub(super) fn inline_str_char_at(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .this(Operand::String)
            .args(&[Operand::IntOrDouble])
            .returns(Returns::Exactly(MirType::String))
    ));

    // A lone surrogate has no single-char string form to fold into
    let folded = constant_code_unit(builder, call.this, call.arg(0))
        .filter(|unit| !is_surrogate(*unit))
        .and_then(|unit| char::from_u32(u32::from(unit)));
    if let Some(ch) = folded {
        let mut emit = builder.commit(call, Dependencies::new())?;
        emit.push_constant(ConstValue::string(ch.encode_utf8(&mut [0; 4])));
        return emit.finish();
    }

    let mut emit = builder.commit(call, Dependencies::new())?;
    let index = emit.add(MirOp::ToInt32, &[call.arg(0)], MirType::Int32);
    let length = emit.add(MirOp::StringLength, &[call.this], MirType::Int32);
    let index = emit.bounds_check(index, length);
    let code = emit.add(MirOp::CharCodeAt, &[call.this, index], MirType::Int32);
    let string = emit.add(MirOp::FromCharCode, &[code], MirType::String);
    emit.push(string);
    emit.finish()
}

pub(super) fn inline_str_replace(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2))
            .this(Operand::String)
            .args(&[Operand::Any, Operand::String])
            .returns(Returns::Exactly(MirType::String))
    ));

    let pattern = call.arg(0);
    let string_pattern = builder.ty(pattern) == MirType::String;
    let regexp_pattern = builder
        .type_set(pattern)
        .is_some_and(|types| types.known_class() == Some(ClassId::RegExp));
    require!(
        string_pattern || regexp_pattern,
        "pattern is neither a string nor a regexp"
    );

    let mut emit = builder.commit(call, Dependencies::new())?;
    let inputs = [call.this, pattern, call.arg(1)];
    if string_pattern {
        let ins = emit.add(MirOp::StringReplace, &inputs, MirType::String);
        emit.push(ins);
    } else {
        // Updates lastIndex on the regexp
        let ins = emit.add(MirOp::RegExpReplace, &inputs, MirType::String);
        emit.push(ins);
        emit.resume_after(ins)?;
    }
    emit.finish()
}
