//! Typed objects, type descriptors and typed array lengths

use super::classify::{classify, Arity, Constructing, Operand, Returns, Signature};
use super::{decline, InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::{MirBuilder, MirOp};
use crate::types::{ClassId, Dependencies, ForAllResult, MirType, ScalarType, TypeSet, TypedDescr};
use crate::value::{ConstValue, TypeDescrObject};
use std::sync::Arc;

const CLASS_PREDICATE: Signature = Signature {
    arity: Arity::Exact(1),
    constructing: Constructing::Never,
    this: Operand::Any,
    args: &[Operand::Object],
    returns: Returns::Exactly(MirType::Boolean),
};

/// Whether the argument's class is one of `classes`; folded when the class
/// is known statically
pub(super) fn inline_has_class(
    builder: &mut MirBuilder,
    call: &CallInfo,
    classes: &'static [ClassId],
) -> Result<InliningStatus> {
    check!(classify(builder, call, &CLASS_PREDICATE));

    let known = builder
        .type_set(call.arg(0))
        .and_then(|types| types.known_class());

    let mut emit = builder.commit(call, Dependencies::new())?;
    match known {
        Some(class) => {
            emit.push_constant(ConstValue::Boolean(classes.contains(&class)));
        }
        None => {
            let ins = emit.add(MirOp::HasClass { classes }, &[call.arg(0)], MirType::Boolean);
            emit.push(ins);
        }
    }
    emit.finish()
}

pub(super) fn inline_object_is_type_descr(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(builder, call, &CLASS_PREDICATE));

    let Some(types) = builder.type_set(call.arg(0)) else {
        return decline(Reject::Shape("no observed types for the object"));
    };
    let answer = match types.for_all_classes(ClassId::is_type_descr) {
        ForAllResult::AllTrue => true,
        ForAllResult::AllFalse | ForAllResult::Empty => false,
        ForAllResult::Mixed => return decline(Reject::Shape("object may or may not be a descriptor")),
    };

    let mut emit = builder.commit(call, Dependencies::new())?;
    emit.push_constant(ConstValue::Boolean(answer));
    emit.finish()
}

/// Re-point a derived typed object at a new byte offset of its owner
pub(super) fn inline_set_typed_object_offset(
    _inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(2))
            .args(&[Operand::Object, Operand::Int32])
            .returns(Returns::Exactly(MirType::Undefined))
    ));
    let all_typed_objects = builder
        .type_set(call.arg(0))
        .is_some_and(|types| types.for_all_classes(ClassId::is_typed_object) == ForAllResult::AllTrue);
    require!(all_typed_objects, "object is not known to be a typed object");

    let mut emit = builder.commit(call, Dependencies::new())?;
    let ins = emit.add(MirOp::SetTypedObjectOffset, &[call.arg(0), call.arg(1)], MirType::None);
    emit.push_constant(ConstValue::Undefined);
    emit.resume_after(ins)?;
    emit.finish()
}

/// `length` getter of a typed array. The unshared getter lives on the common
/// prototype and serves every element type; shared ones are per type.
pub(super) fn inline_typed_array_length(
    builder: &mut MirBuilder,
    call: &CallInfo,
    shared: bool,
    scalar: ScalarType,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(0)).this(Operand::Object)
    ));

    let observed = builder.type_set(call.this).and_then(|types| {
        if shared {
            types.shared_typed_array_type()
        } else {
            types.typed_array_type()
        }
    });
    let matches = match observed {
        Some(found) => !shared || found == scalar,
        None => false,
    };
    require!(matches, "receiver is not known to be a matching typed array");

    let mut emit = builder.commit(call, Dependencies::new())?;
    let length = emit.add(MirOp::TypedArrayLength, &[call.this], MirType::Int32);
    emit.push(length);
    emit.finish()
}

/// Largest inline-allocated size of `descr`, `None` for unsized layouts
fn sized_layout(descr: &TypeDescrObject) -> Option<u32> {
    match descr.descr {
        TypedDescr::Struct { .. } | TypedDescr::SizedArray { .. } | TypedDescr::Scalar(_) => {
            descr.size
        }
        TypedDescr::Reference | TypedDescr::UnsizedArray { .. } => None,
    }
}

/// `new Descr()` for a sized type descriptor, allocated from the template
/// the construct hook sampled at this site
pub(super) fn inline_non_function_call(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
    descr: &TypeDescrObject,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(0)).constructing(Constructing::Required)
    ));
    let Some(size) = sized_layout(descr) else {
        return decline(Reject::Shape("descriptor is not sized"));
    };
    if size > inliner.config().inline_typed_object_max_size {
        return decline(Reject::Shape("typed object too large to allocate inline"));
    }

    let Some(template) = inliner
        .env()
        .template_object_for_class_hook(call.site, descr.object.class)
    else {
        return decline(Reject::Shape("no template object"));
    };
    require!(
        matches!(
            template.object.class,
            ClassId::InlineOpaqueTypedObject | ClassId::InlineTransparentTypedObject
        ),
        "template is not an inline typed object"
    );
    require!(
        template.type_descr == Some(descr.object.id),
        "template was created for another descriptor"
    );

    let heap = template.type_object.initial_heap;
    let template_value = ConstValue::Object(template.object.clone());
    let result_types = Arc::new(TypeSet::empty().with_object(Arc::clone(&template.type_object)));

    let mut emit = builder.commit(call, Dependencies::new())?;
    let template = emit.constant(template_value);
    let object = emit.add_with_types(
        MirOp::NewTypedObject { heap },
        &[template],
        MirType::Object,
        result_types,
    );
    emit.push(object);
    emit.finish()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Harness, SITE};
    use super::*;
    use crate::call::CallKind;
    use crate::env::StaticEnv;
    use crate::natives::NativeId;
    use crate::types::{InitialHeap, ObjectKey};
    use crate::value::{Callee, ObjectRef, TemplateObject};

    fn object_with(h: &mut Harness, keys: &[ObjectKey]) -> crate::mir::NodeId {
        let types = keys
            .iter()
            .cloned()
            .fold(TypeSet::empty(), |set, key| set.with_object(Arc::new(key)));
        h.param_with_types(MirType::Object, types)
    }

    #[test]
    fn test_has_class_folds_known_class() {
        let mut h = Harness::new();
        let obj = object_with(&mut h, &[ObjectKey::new(1, ClassId::OutlineTransparentTypedObject)]);
        let call = h.call(vec![obj], TypeSet::of(MirType::Boolean));
        h.run(NativeId::ObjectIsTransparentTypedObject, &call).unwrap();
        assert_eq!(h.builder.constant(h.result()), Some(&ConstValue::Boolean(true)));

        let mut h = Harness::new();
        let obj = object_with(&mut h, &[ObjectKey::new(1, ClassId::OutlineTransparentTypedObject)]);
        let call = h.call(vec![obj], TypeSet::of(MirType::Boolean));
        h.run(NativeId::ObjectIsOpaqueTypedObject, &call).unwrap();
        assert_eq!(h.builder.constant(h.result()), Some(&ConstValue::Boolean(false)));
    }

    #[test]
    fn test_has_class_emits_test_for_unknown_class() {
        let mut h = Harness::new();
        let obj = h.param(MirType::Object);
        let call = h.call(vec![obj], TypeSet::of(MirType::Boolean));
        h.run(NativeId::TypeDescrIsArrayType, &call).unwrap();
        match h.result_op() {
            MirOp::HasClass { classes } => assert_eq!(classes.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(h.result_type(), MirType::Boolean);
    }

    #[test]
    fn test_object_is_type_descr() {
        let mut h = Harness::new();
        let obj = object_with(
            &mut h,
            &[
                ObjectKey::new(1, ClassId::StructTypeDescr),
                ObjectKey::new(2, ClassId::ScalarTypeDescr),
            ],
        );
        let call = h.call(vec![obj], TypeSet::of(MirType::Boolean));
        h.run(NativeId::ObjectIsTypeDescr, &call).unwrap();
        assert_eq!(h.builder.constant(h.result()), Some(&ConstValue::Boolean(true)));

        let mut h = Harness::new();
        let obj = object_with(
            &mut h,
            &[
                ObjectKey::new(1, ClassId::StructTypeDescr),
                ObjectKey::new(2, ClassId::PlainObject),
            ],
        );
        let call = h.call(vec![obj], TypeSet::of(MirType::Boolean));
        assert_eq!(h.run(NativeId::ObjectIsTypeDescr, &call).unwrap(), InliningStatus::NotInlined);

        let mut h = Harness::new();
        let obj = h.param(MirType::Object);
        let call = h.call(vec![obj], TypeSet::of(MirType::Boolean));
        assert_eq!(h.run(NativeId::ObjectIsTypeDescr, &call).unwrap(), InliningStatus::NotInlined);
    }

    #[test]
    fn test_set_typed_object_offset() {
        let mut h = Harness::new();
        let obj = object_with(&mut h, &[ObjectKey::new(1, ClassId::OutlineOpaqueTypedObject)]);
        let offset = h.param(MirType::Int32);
        let call = h.call(vec![obj, offset], TypeSet::of(MirType::Undefined));
        assert_eq!(h.run(NativeId::SetTypedObjectOffset, &call).unwrap(), InliningStatus::Inlined);
        assert_eq!(h.count(|op| matches!(op, MirOp::SetTypedObjectOffset)), 1);
        h.assert_effects_resumable();

        let mut h = Harness::new();
        let obj = object_with(&mut h, &[ObjectKey::new(1, ClassId::Array)]);
        let offset = h.param(MirType::Int32);
        let call = h.call(vec![obj, offset], TypeSet::of(MirType::Undefined));
        assert_eq!(h.run(NativeId::SetTypedObjectOffset, &call).unwrap(), InliningStatus::NotInlined);
    }

    fn length_getter(h: &mut Harness, class: ClassId, native: NativeId) -> InliningStatus {
        let arr = object_with(h, &[ObjectKey::new(1, class)]);
        let call = h
            .method_call(arr, vec![], TypeSet::of(MirType::Int32))
            .with_kind(CallKind::Getter);
        h.run(native, &call).unwrap()
    }

    #[test]
    fn test_typed_array_length_getter() {
        let mut h = Harness::new();
        let status = length_getter(
            &mut h,
            ClassId::TypedArray(ScalarType::Float64),
            NativeId::TypedArrayLengthGetter(ScalarType::Int8),
        );
        assert_eq!(status, InliningStatus::Inlined);
        assert_eq!(h.result_op(), &MirOp::TypedArrayLength);

        let mut h = Harness::new();
        let status = length_getter(
            &mut h,
            ClassId::SharedTypedArray(ScalarType::Int16),
            NativeId::SharedTypedArrayLengthGetter(ScalarType::Int32),
        );
        assert_eq!(status, InliningStatus::NotInlined);

        let mut h = Harness::new();
        let status = length_getter(
            &mut h,
            ClassId::Array,
            NativeId::TypedArrayLengthGetter(ScalarType::Int8),
        );
        assert_eq!(status, InliningStatus::NotInlined);
    }

    fn point_descr() -> TypeDescrObject {
        TypeDescrObject {
            object: ObjectRef::new(50, ClassId::StructTypeDescr),
            descr: TypedDescr::Struct { size: 16 },
            size: Some(16),
        }
    }

    fn point_env(descr: &TypeDescrObject, class: ClassId) -> StaticEnv {
        let key = ObjectKey::new(51, class).with_initial_heap(InitialHeap::Tenured);
        let template = TemplateObject::new(ObjectRef::new(52, class), Arc::new(key))
            .with_type_descr(descr.object.id);
        StaticEnv::new().with_class_hook_template(SITE, ClassId::StructTypeDescr, template)
    }

    #[test]
    fn test_construct_typed_object_from_template() {
        let descr = point_descr();
        let mut h = Harness::new();
        h.env = point_env(&descr, ClassId::InlineTransparentTypedObject);
        let call = h.call(vec![], TypeSet::of(MirType::Object)).constructing(true);
        let status = h.run_callee(&Callee::TypeDescr(descr), &call).unwrap();
        assert_eq!(status, InliningStatus::Inlined);
        assert_eq!(
            h.result_op(),
            &MirOp::NewTypedObject {
                heap: InitialHeap::Tenured
            }
        );
    }

    #[test]
    fn test_construct_typed_object_declines() {
        // Plain call
        let descr = point_descr();
        let mut h = Harness::new();
        h.env = point_env(&descr, ClassId::InlineTransparentTypedObject);
        let call = h.call(vec![], TypeSet::of(MirType::Object));
        let callee = Callee::TypeDescr(descr.clone());
        assert_eq!(h.run_callee(&callee, &call).unwrap(), InliningStatus::NotInlined);

        // Too large
        h.config.inline_typed_object_max_size = 8;
        let call = call.constructing(true);
        assert_eq!(h.run_callee(&callee, &call).unwrap(), InliningStatus::NotInlined);

        // Template allocated out of line
        let mut h = Harness::new();
        h.env = point_env(&descr, ClassId::OutlineOpaqueTypedObject);
        let call = h.call(vec![], TypeSet::of(MirType::Object)).constructing(true);
        assert_eq!(h.run_callee(&callee, &call).unwrap(), InliningStatus::NotInlined);

        // Unsized layout
        let unsized_descr = TypeDescrObject {
            object: ObjectRef::new(60, ClassId::UnsizedArrayTypeDescr),
            descr: TypedDescr::UnsizedArray {
                element: Box::new(TypedDescr::Scalar(ScalarType::Int32)),
            },
            size: None,
        };
        let mut h = Harness::new();
        let call = h.call(vec![], TypeSet::of(MirType::Object)).constructing(true);
        assert_eq!(
            h.run_callee(&Callee::TypeDescr(unsized_descr), &call).unwrap(),
            InliningStatus::NotInlined
        );
    }
}
