//! Type Feasibility Oracle
//!
//! Static MIR types, object classes, observed type sets and the frozen
//! answers specializers build their decisions on.

mod class;
mod frozen;
mod mir_type;
mod type_set;

pub use class::{
    ClassId, ARRAY_TYPE_DESCR_CLASSES, OPAQUE_TYPED_OBJECT_CLASSES, SIMPLE_TYPE_DESCR_CLASSES,
    SIZED_ARRAY_TYPE_DESCR_CLASSES, TRANSPARENT_TYPED_OBJECT_CLASSES, TYPED_OBJECT_CLASSES,
    UNSIZED_ARRAY_TYPE_DESCR_CLASSES,
};
pub use frozen::{Dependencies, Dependency, Frozen};
pub use mir_type::{MirType, ScalarType};
pub use type_set::{
    BarrierKind, DoubleConversion, ForAllResult, InitialHeap, ObjectFlags, ObjectKey,
    PrimitiveTypes, TypeObjectId, TypeSet, TypedDescr,
};
