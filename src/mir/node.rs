//! MIR nodes and their operations

use super::resume::ResumePointId;
use crate::types::{BarrierKind, ClassId, InitialHeap, MirType, ScalarType, TypeSet};
use crate::value::{ConstValue, ObjectId};
use std::fmt;
use std::sync::Arc;

/// Handle to a node in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block{}", self.0)
    }
}

/// Out-of-line math routines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathFunction {
    Sin,
    Tan,
    Cos,
    Exp,
    Log,
    Atan,
    Asin,
    Acos,
    Log10,
    Log2,
    Log1p,
    Expm1,
    Cosh,
    Sinh,
    Tanh,
    Acosh,
    Asinh,
    Atanh,
    Sign,
    Trunc,
    Cbrt,
    Floor,
    Ceil,
    Round,
}

impl MathFunction {
    pub fn name(self) -> &'static str {
        match self {
            MathFunction::Sin => "sin",
            MathFunction::Tan => "tan",
            MathFunction::Cos => "cos",
            MathFunction::Exp => "exp",
            MathFunction::Log => "log",
            MathFunction::Atan => "atan",
            MathFunction::Asin => "asin",
            MathFunction::Acos => "acos",
            MathFunction::Log10 => "log10",
            MathFunction::Log2 => "log2",
            MathFunction::Log1p => "log1p",
            MathFunction::Expm1 => "expm1",
            MathFunction::Cosh => "cosh",
            MathFunction::Sinh => "sinh",
            MathFunction::Tanh => "tanh",
            MathFunction::Acosh => "acosh",
            MathFunction::Asinh => "asinh",
            MathFunction::Atanh => "atanh",
            MathFunction::Sign => "sign",
            MathFunction::Trunc => "trunc",
            MathFunction::Cbrt => "cbrt",
            MathFunction::Floor => "floor",
            MathFunction::Ceil => "ceil",
            MathFunction::Round => "round",
        }
    }
}

/// Range-analysis hint carried by an identity truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncateKind {
    NoTruncate,
    /// The operand may be truncated if its consumers allow it
    IndirectTruncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopShiftMode {
    Pop,
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicBinop {
    Add,
    Sub,
    And,
    Or,
    Xor,
}

/// Ordering requirement on a typed-array access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOrdering {
    Unordered,
    /// Full barrier before and after the access
    SeqCst,
}

/// Operation performed by a node
#[derive(Debug, Clone, PartialEq)]
pub enum MirOp {
    // ==================== Values ====================
    Parameter(u16),
    Constant(ConstValue),

    // ==================== Math ====================
    Abs,
    Floor,
    Ceil,
    Round,
    MathFunction(MathFunction),
    LimitedTruncate(TruncateKind),
    Clz32,
    Sqrt,
    Atan2,
    Hypot,
    Pow,
    PowHalf,
    Random,
    Mul,
    Div,
    MinMax { is_max: bool },

    // ==================== Conversions ====================
    ToInt32,
    TruncateToInt32,
    ToDouble,
    ToFloat32,
    ToString,
    ClampToUint8,

    // ==================== Arrays and elements ====================
    NewArray {
        length: u32,
        allocating: bool,
        heap: InitialHeap,
        convert_doubles: bool,
    },
    Elements,
    /// Store into a freshly allocated, not yet visible object
    InitializeElement,
    SetInitializedLength,
    StoreElement { needs_hole_check: bool },
    MaybeCopyElementsForWrite,
    PostWriteBarrier,
    ArrayPopShift {
        mode: PopShiftMode,
        needs_hole_check: bool,
        maybe_undefined: bool,
    },
    ArrayPush,
    ArrayConcat { heap: InitialHeap },
    ArraySplice,
    ArrayJoin,
    NewDenseArrayPar,
    ForkJoinContext,
    ForkJoinGetSlice,

    // ==================== Strings and regexps ====================
    NewStringObject,
    StringSplit,
    StringLength,
    CharCodeAt,
    FromCharCode,
    StringReplace,
    RegExpReplace,
    RegExpExec,
    RegExpTest,

    // ==================== Guards ====================
    BoundsCheck,
    TypeBarrier { kind: BarrierKind },
    Bail,
    AssertFloat32 { must_be: bool },

    // ==================== Objects ====================
    StoreFixedSlot { slot: u32 },
    LoadFixedSlot { slot: u32 },
    HaveSameClass,
    IsCallable,
    IsObject,
    /// Whether the operand's class is one of `classes`
    HasClass { classes: &'static [ClassId] },
    IsConstructing,

    // ==================== Typed arrays and typed objects ====================
    TypedArrayLength,
    TypedArrayElements,
    LoadTypedArrayElement {
        scalar: ScalarType,
        ordering: MemoryOrdering,
    },
    StoreTypedArrayElement {
        scalar: ScalarType,
        ordering: MemoryOrdering,
    },
    CompareExchangeTypedArrayElement { scalar: ScalarType },
    AtomicTypedArrayElementBinop { op: AtomicBinop, scalar: ScalarType },
    MemoryBarrier,
    StoreTypedObjectElement { scalar: ScalarType },
    SetTypedObjectOffset,
    NewTypedObject { heap: InitialHeap },

    // ==================== Calls ====================
    Call {
        target: ObjectId,
        argc: u32,
        constructing: bool,
    },
}

impl MirOp {
    /// Whether the operation has effects observable by the interpreter,
    /// so that a bailout after it must resume past the call
    pub fn is_effectful(&self) -> bool {
        matches!(
            self,
            MirOp::SetInitializedLength
                | MirOp::StoreElement { .. }
                | MirOp::ArrayPopShift { .. }
                | MirOp::ArrayPush
                | MirOp::ArrayConcat { .. }
                | MirOp::ArraySplice
                | MirOp::ArrayJoin
                | MirOp::NewDenseArrayPar
                | MirOp::RegExpReplace
                | MirOp::RegExpExec
                | MirOp::RegExpTest
                | MirOp::StoreFixedSlot { .. }
                | MirOp::LoadTypedArrayElement {
                    ordering: MemoryOrdering::SeqCst,
                    ..
                }
                | MirOp::StoreTypedArrayElement { .. }
                | MirOp::CompareExchangeTypedArrayElement { .. }
                | MirOp::AtomicTypedArrayElementBinop { .. }
                | MirOp::MemoryBarrier
                | MirOp::StoreTypedObjectElement { .. }
                | MirOp::SetTypedObjectOffset
                | MirOp::Call { .. }
        )
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            MirOp::Parameter(_) => "parameter",
            MirOp::Constant(_) => "constant",
            MirOp::Abs => "abs",
            MirOp::Floor => "floor",
            MirOp::Ceil => "ceil",
            MirOp::Round => "round",
            MirOp::MathFunction(_) => "mathfunction",
            MirOp::LimitedTruncate(_) => "limitedtruncate",
            MirOp::Clz32 => "clz",
            MirOp::Sqrt => "sqrt",
            MirOp::Atan2 => "atan2",
            MirOp::Hypot => "hypot",
            MirOp::Pow => "pow",
            MirOp::PowHalf => "powhalf",
            MirOp::Random => "random",
            MirOp::Mul => "mul",
            MirOp::Div => "div",
            MirOp::MinMax { is_max: true } => "max",
            MirOp::MinMax { is_max: false } => "min",
            MirOp::ToInt32 => "toint32",
            MirOp::TruncateToInt32 => "truncatetoint32",
            MirOp::ToDouble => "todouble",
            MirOp::ToFloat32 => "tofloat32",
            MirOp::ToString => "tostring",
            MirOp::ClampToUint8 => "clamptouint8",
            MirOp::NewArray { .. } => "newarray",
            MirOp::Elements => "elements",
            MirOp::InitializeElement => "initializeelement",
            MirOp::SetInitializedLength => "setinitializedlength",
            MirOp::StoreElement { .. } => "storeelement",
            MirOp::MaybeCopyElementsForWrite => "maybecopyelementsforwrite",
            MirOp::PostWriteBarrier => "postwritebarrier",
            MirOp::ArrayPopShift {
                mode: PopShiftMode::Pop,
                ..
            } => "arraypop",
            MirOp::ArrayPopShift {
                mode: PopShiftMode::Shift,
                ..
            } => "arrayshift",
            MirOp::ArrayPush => "arraypush",
            MirOp::ArrayConcat { .. } => "arrayconcat",
            MirOp::ArraySplice => "arraysplice",
            MirOp::ArrayJoin => "arrayjoin",
            MirOp::NewDenseArrayPar => "newdensearraypar",
            MirOp::ForkJoinContext => "forkjoincontext",
            MirOp::ForkJoinGetSlice => "forkjoingetslice",
            MirOp::NewStringObject => "newstringobject",
            MirOp::StringSplit => "stringsplit",
            MirOp::StringLength => "stringlength",
            MirOp::CharCodeAt => "charcodeat",
            MirOp::FromCharCode => "fromcharcode",
            MirOp::StringReplace => "stringreplace",
            MirOp::RegExpReplace => "regexpreplace",
            MirOp::RegExpExec => "regexpexec",
            MirOp::RegExpTest => "regexptest",
            MirOp::BoundsCheck => "boundscheck",
            MirOp::TypeBarrier { .. } => "typebarrier",
            MirOp::Bail => "bail",
            MirOp::AssertFloat32 { .. } => "assertfloat32",
            MirOp::StoreFixedSlot { .. } => "storefixedslot",
            MirOp::LoadFixedSlot { .. } => "loadfixedslot",
            MirOp::HaveSameClass => "havesameclass",
            MirOp::IsCallable => "iscallable",
            MirOp::IsObject => "isobject",
            MirOp::HasClass { .. } => "hasclass",
            MirOp::IsConstructing => "isconstructing",
            MirOp::TypedArrayLength => "typedarraylength",
            MirOp::TypedArrayElements => "typedarrayelements",
            MirOp::LoadTypedArrayElement { .. } => "loadtypedarrayelement",
            MirOp::StoreTypedArrayElement { .. } => "storetypedarrayelement",
            MirOp::CompareExchangeTypedArrayElement { .. } => "compareexchangetypedarrayelement",
            MirOp::AtomicTypedArrayElementBinop { .. } => "atomictypedarrayelementbinop",
            MirOp::MemoryBarrier => "memorybarrier",
            MirOp::StoreTypedObjectElement { .. } => "storetypedobjectelement",
            MirOp::SetTypedObjectOffset => "settypedobjectoffset",
            MirOp::NewTypedObject { .. } => "newtypedobject",
            MirOp::Call { .. } => "call",
        }
    }
}

impl fmt::Display for MirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirOp::Parameter(index) => write!(f, "parameter {}", index),
            MirOp::Constant(value) => write!(f, "constant {}", value),
            MirOp::MathFunction(func) => write!(f, "mathfunction {}", func.name()),
            MirOp::StoreFixedSlot { slot } | MirOp::LoadFixedSlot { slot } => {
                write!(f, "{}[{}]", self.mnemonic(), slot)
            }
            MirOp::HasClass { classes } => {
                let names: Vec<String> = classes.iter().map(|c| c.to_string()).collect();
                write!(f, "hasclass [{}]", names.join(", "))
            }
            MirOp::LoadTypedArrayElement { scalar, .. }
            | MirOp::StoreTypedArrayElement { scalar, .. }
            | MirOp::CompareExchangeTypedArrayElement { scalar }
            | MirOp::StoreTypedObjectElement { scalar } => {
                write!(f, "{}<{}>", self.mnemonic(), scalar)
            }
            MirOp::AtomicTypedArrayElementBinop { op, scalar } => {
                write!(f, "atomic{:?}<{}>", op, scalar)
            }
            MirOp::Call { target, argc, .. } => write!(f, "call {} argc={}", target, argc),
            other => f.write_str(other.mnemonic()),
        }
    }
}

/// A node of the instruction graph
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub op: MirOp,
    pub inputs: Vec<NodeId>,
    pub ty: MirType,
    /// Observed types refining `ty`
    pub type_set: Option<Arc<TypeSet>>,
    pub block: BlockId,
    pub resume_point: Option<ResumePointId>,
    /// Kept alive for a resume point even without consumers
    pub implicitly_used: bool,
}

impl Node {
    pub fn constant(&self) -> Option<&ConstValue> {
        match &self.op {
            MirOp::Constant(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effectful_classification() {
        assert!(MirOp::ArrayPush.is_effectful());
        assert!(MirOp::StoreElement { needs_hole_check: false }.is_effectful());
        assert!(!MirOp::InitializeElement.is_effectful());
        assert!(!MirOp::CharCodeAt.is_effectful());
        assert!(MirOp::LoadTypedArrayElement {
            scalar: ScalarType::Int32,
            ordering: MemoryOrdering::SeqCst
        }
        .is_effectful());
        assert!(!MirOp::LoadTypedArrayElement {
            scalar: ScalarType::Int32,
            ordering: MemoryOrdering::Unordered
        }
        .is_effectful());
    }

    #[test]
    fn test_display() {
        assert_eq!(MirOp::Constant(ConstValue::Int32(66)).to_string(), "constant 66");
        assert_eq!(MirOp::MinMax { is_max: true }.to_string(), "max");
        assert_eq!(
            MirOp::MathFunction(MathFunction::Cbrt).to_string(),
            "mathfunction cbrt"
        );
        assert_eq!(MirOp::StoreFixedSlot { slot: 2 }.to_string(), "storefixedslot[2]");
    }
}
