//! Object classes as seen by the optimizer

use super::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of an object, the runtime layout/behavior tag shared by all objects
/// created the same way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassId {
    PlainObject,
    Array,
    Arguments,
    RegExp,
    StringObject,
    Function,
    Proxy,
    TypedArray(ScalarType),
    SharedTypedArray(ScalarType),
    OutlineTransparentTypedObject,
    OutlineOpaqueTypedObject,
    InlineTransparentTypedObject,
    InlineOpaqueTypedObject,
    ScalarTypeDescr,
    ReferenceTypeDescr,
    SizedArrayTypeDescr,
    UnsizedArrayTypeDescr,
    StructTypeDescr,
    /// Host or embedder class the optimizer knows nothing about
    Other(u32),
}

/// All typed-object classes
pub const TYPED_OBJECT_CLASSES: &[ClassId] = &[
    ClassId::OutlineTransparentTypedObject,
    ClassId::OutlineOpaqueTypedObject,
    ClassId::InlineTransparentTypedObject,
    ClassId::InlineOpaqueTypedObject,
];

pub const TRANSPARENT_TYPED_OBJECT_CLASSES: &[ClassId] = &[
    ClassId::OutlineTransparentTypedObject,
    ClassId::InlineTransparentTypedObject,
];

pub const OPAQUE_TYPED_OBJECT_CLASSES: &[ClassId] = &[
    ClassId::OutlineOpaqueTypedObject,
    ClassId::InlineOpaqueTypedObject,
];

/// Descriptors of simple (non-aggregate) types
pub const SIMPLE_TYPE_DESCR_CLASSES: &[ClassId] =
    &[ClassId::ScalarTypeDescr, ClassId::ReferenceTypeDescr];

pub const ARRAY_TYPE_DESCR_CLASSES: &[ClassId] = &[
    ClassId::SizedArrayTypeDescr,
    ClassId::UnsizedArrayTypeDescr,
];

pub const SIZED_ARRAY_TYPE_DESCR_CLASSES: &[ClassId] = &[ClassId::SizedArrayTypeDescr];

pub const UNSIZED_ARRAY_TYPE_DESCR_CLASSES: &[ClassId] = &[ClassId::UnsizedArrayTypeDescr];

impl ClassId {
    pub fn is_proxy(self) -> bool {
        matches!(self, ClassId::Proxy)
    }

    /// Callable without going through a proxy trap
    pub fn is_non_proxy_callable(self) -> bool {
        matches!(self, ClassId::Function)
    }

    /// Objects of this class store their elements in a dense native vector
    pub fn is_native(self) -> bool {
        matches!(
            self,
            ClassId::PlainObject
                | ClassId::Array
                | ClassId::Arguments
                | ClassId::RegExp
                | ClassId::StringObject
                | ClassId::Function
        )
    }

    pub fn is_typed_array(self) -> bool {
        matches!(self, ClassId::TypedArray(_))
    }

    pub fn is_shared_typed_array(self) -> bool {
        matches!(self, ClassId::SharedTypedArray(_))
    }

    pub fn is_typed_object(self) -> bool {
        TYPED_OBJECT_CLASSES.contains(&self)
    }

    pub fn is_type_descr(self) -> bool {
        matches!(
            self,
            ClassId::ScalarTypeDescr
                | ClassId::ReferenceTypeDescr
                | ClassId::SizedArrayTypeDescr
                | ClassId::UnsizedArrayTypeDescr
                | ClassId::StructTypeDescr
        )
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassId::TypedArray(t) => write!(f, "TypedArray<{}>", t),
            ClassId::SharedTypedArray(t) => write!(f, "SharedTypedArray<{}>", t),
            ClassId::Other(n) => write!(f, "Class#{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}
