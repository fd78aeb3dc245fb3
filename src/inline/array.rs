//! Array natives

use super::classify::{classify, Arity, Constructing, Operand, Returns, Signature};
use super::elements::{check_array_prototype, dense_array_types, SPARSE_OR_OVERFLOWED};
use super::{decline, InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::{MirBuilder, MirOp, PopShiftMode};
use crate::natives::NativeId;
use crate::types::{
    BarrierKind, Dependencies, Dependency, DoubleConversion, InitialHeap, MirType, ObjectFlags,
    PrimitiveTypes, TypeSet,
};
use crate::value::ConstValue;
use std::sync::Arc;

/// `Array(...)` and `new Array(...)` allocated from the site's template
pub(super) fn inline_array(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::AtLeast(0)).constructing(Constructing::Either)
    ));
    let Some(template) = inliner
        .env()
        .template_object_for(call.site, NativeId::ArrayConstructor)
    else {
        return decline(Reject::Shape("no template object"));
    };

    let config = inliner.config();
    let mut deps = Dependencies::new();
    let mut init_length = 0u32;
    let mut allocating = false;

    // Several arguments are the initial elements
    if call.argc() >= 2 {
        init_length = call.argc() as u32;
        allocating = true;
        let key = &template.type_object;
        if !key.unknown_properties {
            for &value in &call.args {
                let fits = key.element_types.as_ref().is_some_and(|types| {
                    types.includes(builder.ty(value), builder.type_set(value).map(|t| &**t))
                });
                require!(fits, "template element types do not include an initial element");
            }
            deps.push(Dependency::ElementTypes { object: key.id });
        }
    }

    // A single argument is the initial length
    if call.argc() == 1 {
        let length = builder.constant(call.arg(0)).and_then(ConstValue::as_int32);
        let Some(length) = length else {
            return decline(Reject::Shape("length is not a constant int32"));
        };
        require!(length >= 0, "negative length");
        let length = length as u32;
        require!(length < config.max_dense_elements, "length above the dense limit");
        require!(length == template.length, "length differs from the template");
        require!(
            length <= config.eager_allocation_max_length,
            "allocation too large to inline"
        );
        init_length = length;
        allocating = true;
    }

    let conversion = call.result_types.convert_double_elements().record(&mut deps);
    let convert_doubles = conversion == DoubleConversion::AlwaysConvertToDoubles;
    let heap = template.type_object.initial_heap;
    let template_value = ConstValue::Object(template.object.clone());
    let array_types = Arc::new(TypeSet::empty().with_object(Arc::clone(&template.type_object)));

    let mut emit = builder.commit(call, deps)?;
    let template_const = emit.constant(template_value);
    let array = emit.add_with_types(
        MirOp::NewArray {
            length: init_length,
            allocating,
            heap,
            convert_doubles,
        },
        &[template_const],
        MirType::Object,
        array_types,
    );
    emit.push(array);

    if call.argc() >= 2 {
        let elements = emit.add(MirOp::Elements, &[array], MirType::Elements);
        let mut last_index = None;
        for (i, &value) in call.args.iter().enumerate() {
            let index = emit.constant(ConstValue::Int32(i as i32));
            let value = if convert_doubles {
                emit.add(MirOp::ToDouble, &[value], MirType::Double)
            } else {
                value
            };
            // Nursery allocations never need one
            if heap == InitialHeap::Tenured {
                emit.add(MirOp::PostWriteBarrier, &[array, value], MirType::None);
            }
            emit.add(MirOp::InitializeElement, &[elements, index, value], MirType::None);
            last_index = Some(index);
        }
        if let Some(index) = last_index {
            let length = emit.add(MirOp::SetInitializedLength, &[elements, index], MirType::None);
            emit.resume_after(length)?;
        }
    }
    emit.finish()
}

pub(super) fn inline_array_pop_shift(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
    mode: PopShiftMode,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::AtLeast(0))
            .this(Operand::Object)
            .returns(Returns::NotNullish)
    ));

    // Removing elements does not suppress them in active iterators
    let mut deps = Dependencies::new();
    let this_types = check!(dense_array_types(
        builder,
        call.this,
        SPARSE_OR_OVERFLOWED | ObjectFlags::ITERATED,
        &mut deps
    ));
    check!(check_array_prototype(inliner.env(), &mut deps));

    let needs_hole_check = this_types
        .has_object_flags(ObjectFlags::NON_PACKED)
        .record(&mut deps);
    let maybe_undefined = call.result_types.has_primitive(PrimitiveTypes::UNDEFINED);
    let barrier = this_types
        .element_read_barrier(&call.result_types)
        .record(&mut deps);
    let result_type = match barrier {
        BarrierKind::NoBarrier => call.inline_return_type(),
        BarrierKind::TypeSet => MirType::Value,
    };

    let mut emit = builder.commit(call, deps)?;
    let obj = emit.add(MirOp::MaybeCopyElementsForWrite, &[call.this], MirType::Object);
    let ins = emit.add(
        MirOp::ArrayPopShift {
            mode,
            needs_hole_check,
            maybe_undefined,
        },
        &[obj],
        result_type,
    );
    emit.push(ins);
    emit.resume_after(ins)?;
    emit.push_type_barrier(ins, &call.result_types, barrier)?;
    emit.finish()
}

/// `arr.splice(start, deleteCount)` whose result array is never used
pub(super) fn inline_array_splice(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2))
            .this(Operand::Object)
            .args(&[Operand::Int32, Operand::Int32])
            .returns(Returns::Exactly(MirType::Object))
    ));
    require!(call.result_popped(), "splice result is used");

    let mut deps = Dependencies::new();
    check!(dense_array_types(
        builder,
        call.this,
        SPARSE_OR_OVERFLOWED | ObjectFlags::ITERATED,
        &mut deps
    ));
    check!(check_array_prototype(inliner.env(), &mut deps));

    let mut emit = builder.commit(call, deps)?;
    let splice = emit.add(
        MirOp::ArraySplice,
        &[call.this, call.arg(0), call.arg(1)],
        MirType::None,
    );
    emit.push_constant(ConstValue::Undefined);
    emit.resume_after(splice)?;
    emit.finish()
}

pub(super) fn inline_array_join(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .this(Operand::Object)
            .args(&[Operand::String])
            .returns(Returns::Exactly(MirType::String))
    ));

    let mut deps = Dependencies::new();
    check!(dense_array_types(builder, call.this, SPARSE_OR_OVERFLOWED, &mut deps));

    let mut emit = builder.commit(call, deps)?;
    let join = emit.add(MirOp::ArrayJoin, &[call.this, call.arg(0)], MirType::String);
    emit.push(join);
    emit.resume_after(join)?;
    emit.finish()
}

pub(super) fn inline_array_push(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .this(Operand::Object)
            .returns(Returns::Exactly(MirType::Int32))
    ));

    let mut deps = Dependencies::new();
    let this_types = check!(dense_array_types(builder, call.this, SPARSE_OR_OVERFLOWED, &mut deps));
    let value = call.arg(0);
    let needs_barrier = this_types
        .element_write_needs_barrier(builder.ty(value), builder.type_set(value).map(|t| &**t))
        .record(&mut deps);
    require!(!needs_barrier, "element types do not include the pushed value");
    check!(check_array_prototype(inliner.env(), &mut deps));

    let conversion = this_types.convert_double_elements().record(&mut deps);
    require!(
        conversion != DoubleConversion::AmbiguousDoubleConversion,
        "ambiguous double conversion"
    );

    let mut emit = builder.commit(call, deps)?;
    let value = match conversion {
        DoubleConversion::AlwaysConvertToDoubles | DoubleConversion::MaybeConvertToDoubles => {
            emit.add(MirOp::ToDouble, &[value], MirType::Double)
        }
        _ => value,
    };
    let obj = emit.add(MirOp::MaybeCopyElementsForWrite, &[call.this], MirType::Object);
    if emit.builder().needs_post_barrier(value) {
        emit.add(MirOp::PostWriteBarrier, &[obj, value], MirType::None);
    }
    let push = emit.add(MirOp::ArrayPush, &[obj, value], MirType::Int32);
    emit.push(push);
    emit.resume_after(push)?;
    emit.finish()
}

pub(super) fn inline_array_concat(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .this(Operand::Object)
            .args(&[Operand::Object])
            .returns(Returns::Exactly(MirType::Object))
    ));

    let mut deps = Dependencies::new();
    let this_types = check!(dense_array_types(builder, call.this, SPARSE_OR_OVERFLOWED, &mut deps));
    let arg_types = check!(dense_array_types(builder, call.arg(0), SPARSE_OR_OVERFLOWED, &mut deps));
    check!(check_array_prototype(inliner.env(), &mut deps));

    // The result reuses the receiver's type object
    let Some(this_key) = this_types.single_object() else {
        return decline(Reject::Shape("receiver has more than one type object"));
    };
    require!(!this_key.unknown_properties, "receiver properties are untracked");

    let this_packed = !this_types
        .has_object_flags(ObjectFlags::NON_PACKED)
        .record(&mut deps);
    let arg_packed = !arg_types
        .has_object_flags(ObjectFlags::NON_PACKED)
        .record(&mut deps);
    require!(!this_packed || arg_packed, "packed receiver with a non-packed argument");

    // Nothing will revisit this site, so existing type facts must already
    // account for the concatenation
    require!(
        call.result_types.has_object(this_key.id),
        "result types miss the receiver's type object"
    );
    let Some(this_elements) = this_key.element_types.as_ref() else {
        return decline(Reject::Shape("receiver element types untracked"));
    };
    for arg_key in arg_types.objects() {
        require!(!arg_key.unknown_properties, "argument properties are untracked");
        let subset = arg_key
            .element_types
            .as_ref()
            .is_some_and(|types| types.is_subset_of(this_elements));
        require!(subset, "argument element types are not a subset of the receiver's");
        deps.push(Dependency::ElementTypes { object: arg_key.id });
    }
    deps.push(Dependency::ElementTypes { object: this_key.id });

    let Some(template) = inliner
        .env()
        .template_object_for(call.site, NativeId::ArrayConcat)
    else {
        return decline(Reject::Shape("no template object"));
    };
    require!(
        template.type_object.id == this_key.id,
        "template type object differs from the receiver's"
    );
    let heap = template.type_object.initial_heap;
    let template_value = ConstValue::Object(template.object.clone());

    let mut emit = builder.commit(call, deps)?;
    let template_const = emit.constant(template_value);
    let concat = emit.add_with_types(
        MirOp::ArrayConcat { heap },
        &[call.this, call.arg(0), template_const],
        MirType::Object,
        Arc::clone(&call.result_types),
    );
    emit.push(concat);
    emit.resume_after(concat)?;
    emit.finish()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Harness, SITE};
    use super::*;
    use crate::call::ResultUse;
    use crate::env::StaticEnv;
    use crate::types::{ClassId, ObjectKey};
    use crate::value::{ObjectRef, TemplateObject};

    fn array_key(id: u32, elements: TypeSet) -> ObjectKey {
        ObjectKey::new(id, ClassId::Array).with_element_types(elements)
    }

    fn array_param(h: &mut Harness, key: ObjectKey) -> crate::mir::NodeId {
        h.param_with_types(MirType::Object, TypeSet::empty().with_object(Arc::new(key)))
    }

    fn int_or_string() -> TypeSet {
        TypeSet::empty().with_primitives(PrimitiveTypes::INT32 | PrimitiveTypes::STRING)
    }

    #[test]
    fn test_push_dense_int_array() {
        let mut h = Harness::new();
        let arr = array_param(&mut h, array_key(1, TypeSet::of(MirType::Int32)));
        let value = h.param(MirType::Int32);
        let call = h.method_call(arr, vec![value], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ArrayPush, &call).unwrap(), InliningStatus::Inlined);
        assert_eq!(h.result_op(), &MirOp::ArrayPush);
        assert_eq!(h.count(|op| matches!(op, MirOp::PostWriteBarrier)), 0);
        h.assert_effects_resumable();
        assert!(h
            .builder
            .graph()
            .dependencies()
            .contains(&Dependency::NoIndexedPrototypeProperties));
    }

    #[test]
    fn test_push_rejects_untracked_value_type() {
        let mut h = Harness::new();
        let arr = array_param(&mut h, array_key(1, TypeSet::of(MirType::Int32)));
        let value = h.param(MirType::String);
        let call = h.method_call(arr, vec![value], TypeSet::of(MirType::Int32));
        let before = h.builder.node_count();
        assert_eq!(h.run(NativeId::ArrayPush, &call).unwrap(), InliningStatus::NotInlined);
        assert_eq!(h.builder.node_count(), before);
        assert!(h.builder.graph().dependencies().is_empty());
    }

    #[test]
    fn test_push_rejects_sparse_arrays() {
        let mut h = Harness::new();
        let key = array_key(1, TypeSet::of(MirType::Int32)).with_flags(ObjectFlags::SPARSE_INDEXES);
        let arr = array_param(&mut h, key);
        let value = h.param(MirType::Int32);
        let call = h.method_call(arr, vec![value], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ArrayPush, &call).unwrap(), InliningStatus::NotInlined);
    }

    #[test]
    fn test_pop_and_shift() {
        let mut h = Harness::new();
        let arr = array_param(&mut h, array_key(1, TypeSet::of(MirType::Int32)));
        let call = h.method_call(arr, vec![], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ArrayPop, &call).unwrap(), InliningStatus::Inlined);
        assert!(matches!(
            h.result_op(),
            MirOp::ArrayPopShift {
                mode: PopShiftMode::Pop,
                needs_hole_check: false,
                ..
            }
        ));
        h.assert_effects_resumable();

        let mut h = Harness::new();
        let key = array_key(1, TypeSet::of(MirType::Int32)).with_flags(ObjectFlags::ITERATED);
        let arr = array_param(&mut h, key);
        let call = h.method_call(arr, vec![], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ArrayShift, &call).unwrap(), InliningStatus::NotInlined);
    }

    #[test]
    fn test_pop_adds_barrier_for_unobserved_elements() {
        let mut h = Harness::new();
        let arr = array_param(&mut h, array_key(1, int_or_string()));
        let call = h.method_call(arr, vec![], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ArrayPop, &call).unwrap(), InliningStatus::Inlined);
        assert!(matches!(h.result_op(), MirOp::TypeBarrier { .. }));
        assert_eq!(h.result_type(), MirType::Int32);
    }

    #[test]
    fn test_pop_rejects_indexed_prototype() {
        let mut h = Harness::new();
        h.env = StaticEnv::new().with_indexed_array_prototype();
        let arr = array_param(&mut h, array_key(1, TypeSet::of(MirType::Int32)));
        let call = h.method_call(arr, vec![], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ArrayPop, &call).unwrap(), InliningStatus::NotInlined);
    }

    fn concat_setup(this_elements: TypeSet, arg_elements: TypeSet) -> (Harness, CallInfo) {
        let mut h = Harness::new();
        let this_key = Arc::new(array_key(1, this_elements));
        let template = TemplateObject::new(ObjectRef::new(50, ClassId::Array), Arc::clone(&this_key));
        h.env = StaticEnv::new().with_template(SITE, NativeId::ArrayConcat, template);
        let this = h.param_with_types(
            MirType::Object,
            TypeSet::empty().with_object(Arc::clone(&this_key)),
        );
        let arg = array_param(&mut h, array_key(2, arg_elements));
        let result = TypeSet::empty().with_object(this_key);
        let call = h.method_call(this, vec![arg], result);
        (h, call)
    }

    #[test]
    fn test_concat_subset_rule() {
        let (mut h, call) = concat_setup(int_or_string(), TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ArrayConcat, &call).unwrap(), InliningStatus::Inlined);
        assert!(matches!(h.result_op(), MirOp::ArrayConcat { .. }));
        h.assert_effects_resumable();

        let (mut h, call) = concat_setup(TypeSet::of(MirType::Int32), int_or_string());
        let before = h.builder.node_count();
        assert_eq!(h.run(NativeId::ArrayConcat, &call).unwrap(), InliningStatus::NotInlined);
        assert_eq!(h.builder.node_count(), before);
    }

    #[test]
    fn test_concat_requires_template() {
        let (mut h, call) = concat_setup(int_or_string(), TypeSet::of(MirType::Int32));
        h.env = StaticEnv::new();
        assert_eq!(h.run(NativeId::ArrayConcat, &call).unwrap(), InliningStatus::NotInlined);
    }

    #[test]
    fn test_splice_only_when_popped() {
        let mut h = Harness::new();
        let arr = array_param(&mut h, array_key(1, TypeSet::of(MirType::Int32)));
        let start = h.param(MirType::Int32);
        let count = h.param(MirType::Int32);
        let call = h.method_call(arr, vec![start, count], TypeSet::of(MirType::Object));
        assert_eq!(h.run(NativeId::ArraySplice, &call).unwrap(), InliningStatus::NotInlined);

        let call = call.with_result_use(ResultUse::Popped);
        assert_eq!(h.run(NativeId::ArraySplice, &call).unwrap(), InliningStatus::Inlined);
        assert_eq!(h.builder.constant(h.result()), Some(&ConstValue::Undefined));
        assert_eq!(h.count(|op| matches!(op, MirOp::ArraySplice)), 1);
        h.assert_effects_resumable();
    }

    #[test]
    fn test_join_declines_on_wrong_types() {
        let mut h = Harness::new();
        let arr = array_param(&mut h, array_key(1, TypeSet::of(MirType::Int32)));
        let sep = h.param(MirType::Int32);
        let call = h.method_call(arr, vec![sep], TypeSet::of(MirType::String));
        assert_eq!(h.run(NativeId::ArrayJoin, &call).unwrap(), InliningStatus::NotInlined);

        let sep = h.param(MirType::String);
        let call = h.method_call(arr, vec![sep], TypeSet::of(MirType::String));
        assert_eq!(h.run(NativeId::ArrayJoin, &call).unwrap(), InliningStatus::Inlined);
        h.assert_effects_resumable();
    }

    fn array_template(length: u32, elements: TypeSet) -> TemplateObject {
        TemplateObject::new(
            ObjectRef::new(60, ClassId::Array),
            Arc::new(array_key(9, elements)),
        )
        .with_length(length)
    }

    #[test]
    fn test_array_literal_initializes_elements() {
        let mut h = Harness::new();
        h.env = StaticEnv::new().with_template(
            SITE,
            NativeId::ArrayConstructor,
            array_template(3, TypeSet::of(MirType::Int32)),
        );
        let args: Vec<_> = (0..3).map(|i| h.constant(ConstValue::Int32(i))).collect();
        let call = h.call(args, TypeSet::of(MirType::Object));
        assert_eq!(h.run(NativeId::ArrayConstructor, &call).unwrap(), InliningStatus::Inlined);
        assert!(matches!(
            h.result_op(),
            MirOp::NewArray {
                length: 3,
                allocating: true,
                ..
            }
        ));
        assert_eq!(h.count(|op| matches!(op, MirOp::InitializeElement)), 3);
        assert_eq!(h.count(|op| matches!(op, MirOp::SetInitializedLength)), 1);
        h.assert_effects_resumable();
    }

    #[test]
    fn test_array_length_must_match_template() {
        let mut h = Harness::new();
        h.env = StaticEnv::new().with_template(
            SITE,
            NativeId::ArrayConstructor,
            array_template(4, TypeSet::empty()),
        );
        let four = h.constant(ConstValue::Int32(4));
        let call = h.call(vec![four], TypeSet::of(MirType::Object)).constructing(true);
        assert_eq!(h.run(NativeId::ArrayConstructor, &call).unwrap(), InliningStatus::Inlined);

        let mut h2 = Harness::new();
        h2.env = h.env.clone();
        let five = h2.constant(ConstValue::Int32(5));
        let call = h2.call(vec![five], TypeSet::of(MirType::Object));
        assert_eq!(h2.run(NativeId::ArrayConstructor, &call).unwrap(), InliningStatus::NotInlined);

        let n = h2.param(MirType::Int32);
        let call = h2.call(vec![n], TypeSet::of(MirType::Object));
        assert_eq!(h2.run(NativeId::ArrayConstructor, &call).unwrap(), InliningStatus::NotInlined);
    }
}
