//! Compile-time values: constants, object references, functions and templates

use crate::natives::NativeId;
use crate::types::{ClassId, MirType, ObjectKey, TypeObjectId, TypedDescr};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a heap object known at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a specific heap object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub class: ClassId,
    #[serde(default)]
    pub type_object: Option<TypeObjectId>,
}

impl ObjectRef {
    pub fn new(id: u64, class: ClassId) -> Self {
        Self {
            id: ObjectId(id),
            class,
            type_object: None,
        }
    }

    pub fn with_type_object(mut self, type_object: TypeObjectId) -> Self {
        self.type_object = Some(type_object);
        self
    }
}

/// A value known at compile time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Undefined,
    Null,
    Boolean(bool),
    Int32(i32),
    Double(f64),
    String(Arc<str>),
    Object(ObjectRef),
}

impl ConstValue {
    pub fn string(s: &str) -> Self {
        ConstValue::String(Arc::from(s))
    }

    pub fn mir_type(&self) -> MirType {
        match self {
            ConstValue::Undefined => MirType::Undefined,
            ConstValue::Null => MirType::Null,
            ConstValue::Boolean(_) => MirType::Boolean,
            ConstValue::Int32(_) => MirType::Int32,
            ConstValue::Double(_) => MirType::Double,
            ConstValue::String(_) => MirType::String,
            ConstValue::Object(_) => MirType::Object,
        }
    }

    /// Numeric value of an Int32 or Double constant
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConstValue::Int32(n) => Some(f64::from(*n)),
            ConstValue::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_int32(&self) -> Option<i32> {
        match self {
            ConstValue::Int32(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            ConstValue::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Undefined => write!(f, "undefined"),
            ConstValue::Null => write!(f, "null"),
            ConstValue::Boolean(b) => write!(f, "{}", b),
            ConstValue::Int32(n) => write!(f, "{}", n),
            ConstValue::Double(n) => write!(f, "{:?}", n),
            ConstValue::String(s) => write!(f, "{:?}", s),
            ConstValue::Object(obj) => write!(f, "{}{}", obj.class, obj.id),
        }
    }
}

/// A function object known at compile time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsFunction {
    pub object: ObjectRef,
    pub kind: FunctionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Native {
        native: NativeId,
        #[serde(default)]
        constructor: bool,
    },
    Interpreted {
        #[serde(default)]
        constructor: bool,
    },
    Bound(BoundFunction),
}

/// Result of `Function.prototype.bind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundFunction {
    pub target: BoundTarget,
    pub bound_this: ConstValue,
    #[serde(default)]
    pub bound_args: Vec<ConstValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundTarget {
    Function(Box<JsFunction>),
    /// A callable that is not a plain function, such as a proxy
    Object(ObjectRef),
}

impl JsFunction {
    pub fn native(id: u64, native: NativeId) -> Self {
        Self {
            object: ObjectRef::new(id, ClassId::Function),
            kind: FunctionKind::Native {
                native,
                constructor: false,
            },
        }
    }

    pub fn interpreted(id: u64, constructor: bool) -> Self {
        Self {
            object: ObjectRef::new(id, ClassId::Function),
            kind: FunctionKind::Interpreted { constructor },
        }
    }

    pub fn bound(id: u64, bound: BoundFunction) -> Self {
        Self {
            object: ObjectRef::new(id, ClassId::Function),
            kind: FunctionKind::Bound(bound),
        }
    }

    pub fn as_constructor(mut self) -> Self {
        match &mut self.kind {
            FunctionKind::Native { constructor, .. } | FunctionKind::Interpreted { constructor } => {
                *constructor = true
            }
            FunctionKind::Bound(_) => {}
        }
        self
    }

    /// Native identity used for dispatch; bound functions share one
    pub fn native_id(&self) -> Option<NativeId> {
        match &self.kind {
            FunctionKind::Native { native, .. } => Some(*native),
            FunctionKind::Bound(_) => Some(NativeId::CallOrConstructBoundFunction),
            FunctionKind::Interpreted { .. } => None,
        }
    }

    pub fn is_constructor(&self) -> bool {
        match &self.kind {
            FunctionKind::Native { constructor, .. } | FunctionKind::Interpreted { constructor } => {
                *constructor
            }
            FunctionKind::Bound(bound) => match &bound.target {
                BoundTarget::Function(target) => target.is_constructor(),
                BoundTarget::Object(_) => false,
            },
        }
    }

    pub fn is_interpreted(&self) -> bool {
        matches!(self.kind, FunctionKind::Interpreted { .. })
    }
}

/// A type descriptor object, callable as a constructor of typed objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescrObject {
    pub object: ObjectRef,
    pub descr: TypedDescr,
    /// Byte size of instances, absent for unsized descriptors
    #[serde(default)]
    pub size: Option<u32>,
}

/// Statically known callee of a call site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    Function(JsFunction),
    TypeDescr(TypeDescrObject),
}

/// An object sampled by the baseline tier at a call site, used as the
/// shape of objects a specialized allocation creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateObject {
    pub object: ObjectRef,
    pub type_object: Arc<ObjectKey>,
    /// Array length or string length, where meaningful
    #[serde(default)]
    pub length: u32,
    /// Descriptor of a typed-object template
    #[serde(default)]
    pub type_descr: Option<ObjectId>,
}

impl TemplateObject {
    pub fn new(object: ObjectRef, type_object: Arc<ObjectKey>) -> Self {
        Self {
            object,
            type_object,
            length: 0,
            type_descr: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn with_type_descr(mut self, descr: ObjectId) -> Self {
        self.type_descr = Some(descr);
        self
    }
}
