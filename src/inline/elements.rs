//! Element access helpers shared by the array and intrinsic specializers

use super::Reject;
use crate::env::InlineEnv;
use crate::error::Result;
use crate::mir::{Emitter, MemoryOrdering, MirBuilder, MirOp, NodeId};
use crate::types::{
    ClassId, Dependencies, Dependency, DoubleConversion, MirType, ObjectFlags, ScalarType, TypeSet,
};
use std::sync::Arc;

/// Flags under which no array specializer applies
pub(super) const SPARSE_OR_OVERFLOWED: ObjectFlags =
    ObjectFlags::SPARSE_INDEXES.union(ObjectFlags::LENGTH_OVERFLOW);

/// Type set of `id` when every object in it is an array with none of `flags`
pub(super) fn dense_array_types(
    builder: &MirBuilder,
    id: NodeId,
    flags: ObjectFlags,
    deps: &mut Dependencies,
) -> std::result::Result<Arc<TypeSet>, Reject> {
    let types = builder
        .type_set(id)
        .ok_or(Reject::Shape("no observed types for the array"))?;
    if types.known_class() != Some(ClassId::Array) {
        return Err(Reject::Shape("not known to be an array"));
    }
    if types.has_object_flags(flags).record(deps) {
        return Err(Reject::Shape("array may be sparse, overflowed or iterated"));
    }
    Ok(Arc::clone(types))
}

/// Fail when holes could be filled from the prototype chain
pub(super) fn check_array_prototype(
    env: &dyn InlineEnv,
    deps: &mut Dependencies,
) -> std::result::Result<(), Reject> {
    if env.array_prototype_has_indexed_property() {
        return Err(Reject::Shape("array prototype has indexed properties"));
    }
    deps.push(Dependency::NoIndexedPrototypeProperties);
    Ok(())
}

/// Target of one element write, decided before anything is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ElementWrite {
    Dense(DoubleConversion),
    TypedArray(ScalarType),
    TypedObjectArray(ScalarType),
}

fn is_index(builder: &MirBuilder, id: NodeId) -> bool {
    builder.ty(id).is_int_or_double()
}

/// Decide how `obj[index] = value` can be stored without a generic path
pub(super) fn classify_element_write(
    builder: &MirBuilder,
    obj: NodeId,
    index: NodeId,
    value: NodeId,
    deps: &mut Dependencies,
) -> Option<ElementWrite> {
    if builder.ty(obj) != MirType::Object || !is_index(builder, index) {
        return None;
    }
    let types = builder.type_set(obj)?;
    let class = types.known_class()?;

    if class.is_native() {
        // Collected separately so a rejected dense write leaves nothing behind
        let mut dense_deps = Dependencies::new();
        let needs_barrier = types
            .element_write_needs_barrier(builder.ty(value), builder.type_set(value).map(|t| &**t))
            .record(&mut dense_deps);
        if !needs_barrier {
            let conversion = types.convert_double_elements().record(&mut dense_deps);
            deps.extend(dense_deps.iter().copied());
            return Some(ElementWrite::Dense(conversion));
        }
    }
    if let Some(scalar) = types
        .typed_array_type()
        .or_else(|| types.shared_typed_array_type())
    {
        return Some(ElementWrite::TypedArray(scalar));
    }
    types
        .typed_object_descr()
        .and_then(|descr| descr.scalar_array_element())
        .map(ElementWrite::TypedObjectArray)
}

fn int32_index(emit: &mut Emitter<'_>, index: NodeId) -> NodeId {
    if emit.builder().ty(index) == MirType::Int32 {
        index
    } else {
        emit.add(MirOp::ToInt32, &[index], MirType::Int32)
    }
}

/// Convert `value` to what a scalar element of type `scalar` holds
fn scalar_value(emit: &mut Emitter<'_>, scalar: ScalarType, value: NodeId) -> NodeId {
    let ty = emit.builder().ty(value);
    if scalar == ScalarType::Uint8Clamped {
        return emit.add(MirOp::ClampToUint8, &[value], MirType::Int32);
    }
    if !scalar.is_floating_point() && ty != MirType::Int32 {
        return emit.add(MirOp::TruncateToInt32, &[value], MirType::Int32);
    }
    value
}

/// Emit a previously classified write; each store gets its own resume point.
/// Index bounds are the caller's contract and are not checked here.
pub(super) fn emit_element_write(
    emit: &mut Emitter<'_>,
    write: ElementWrite,
    obj: NodeId,
    index: NodeId,
    value: NodeId,
) -> Result<NodeId> {
    let index = int32_index(emit, index);
    let store = match write {
        ElementWrite::Dense(conversion) => {
            let value = match conversion {
                DoubleConversion::AlwaysConvertToDoubles
                | DoubleConversion::MaybeConvertToDoubles => {
                    emit.add(MirOp::ToDouble, &[value], MirType::Double)
                }
                _ => value,
            };
            let elements = emit.add(MirOp::Elements, &[obj], MirType::Elements);
            if emit.builder().needs_post_barrier(value) {
                emit.add(MirOp::PostWriteBarrier, &[obj, value], MirType::None);
            }
            emit.add(
                MirOp::StoreElement {
                    needs_hole_check: false,
                },
                &[elements, index, value],
                MirType::None,
            )
        }
        ElementWrite::TypedArray(scalar) => {
            let value = scalar_value(emit, scalar, value);
            let elements = emit.add(MirOp::TypedArrayElements, &[obj], MirType::Elements);
            emit.add(
                MirOp::StoreTypedArrayElement {
                    scalar,
                    ordering: MemoryOrdering::Unordered,
                },
                &[elements, index, value],
                MirType::None,
            )
        }
        ElementWrite::TypedObjectArray(scalar) => {
            let value = scalar_value(emit, scalar, value);
            emit.add(
                MirOp::StoreTypedObjectElement { scalar },
                &[obj, index, value],
                MirType::None,
            )
        }
    };
    emit.resume_after(store)?;
    Ok(store)
}
