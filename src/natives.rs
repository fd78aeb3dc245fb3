//! Identity tokens for engine-provided functions
//!
//! Specialization keys on *which* function object the call targets, never on
//! its name: a user-defined `floor` is an interpreted function and carries no
//! [`NativeId`].

use crate::types::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a native function known to the optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeId {
    // ==================== Atomics ====================
    AtomicsCompareExchange,
    AtomicsLoad,
    AtomicsStore,
    AtomicsFence,
    AtomicsAdd,
    AtomicsSub,
    AtomicsAnd,
    AtomicsOr,
    AtomicsXor,

    // ==================== Array ====================
    ArrayConstructor,
    ArrayPop,
    ArrayShift,
    ArrayPush,
    ArrayConcat,
    ArrayJoin,
    ArraySplice,

    // ==================== Math ====================
    MathAbs,
    MathFloor,
    MathCeil,
    MathRound,
    MathClz32,
    MathSqrt,
    MathAtan2,
    MathHypot,
    MathMax,
    MathMin,
    MathPow,
    MathRandom,
    MathImul,
    MathFround,
    MathSin,
    MathTan,
    MathCos,
    MathExp,
    MathLog,
    MathAtan,
    MathAsin,
    MathAcos,
    MathLog10,
    MathLog2,
    MathLog1p,
    MathExpm1,
    MathCosh,
    MathSinh,
    MathTanh,
    MathAcosh,
    MathAsinh,
    MathAtanh,
    MathSign,
    MathTrunc,
    MathCbrt,

    // ==================== String / RegExp ====================
    StringConstructor,
    StringSplit,
    StringCharCodeAt,
    StringFromCharCode,
    StringCharAt,
    StringReplace,
    RegExpExec,
    RegExpTest,

    // ==================== Self-hosting intrinsics ====================
    UnsafePutElements,
    NewDenseArray,
    UnsafeSetReservedSlot,
    UnsafeGetReservedSlot,
    ShouldForceSequential,
    InParallelSection,
    ForkJoinGetSlice,
    IsCallable,
    HaveSameClass,
    ToObject,
    IsObject,
    ToInteger,
    ToString,
    IsConstructing,

    // ==================== Typed objects ====================
    ObjectIsTypedObject,
    ObjectIsTransparentTypedObject,
    ObjectIsOpaqueTypedObject,
    ObjectIsTypeDescr,
    TypeDescrIsSimpleType,
    TypeDescrIsArrayType,
    TypeDescrIsSizedArrayType,
    TypeDescrIsUnsizedArrayType,
    SetTypedObjectOffset,

    // ==================== Testing functions ====================
    TestingInParallelSection,
    TestingBailout,
    TestingAssertFloat32,

    // ==================== Bound functions ====================
    CallOrConstructBoundFunction,

    // ==================== Getters ====================
    TypedArrayLengthGetter(ScalarType),
    SharedTypedArrayLengthGetter(ScalarType),
}

impl NativeId {
    /// Script-visible name used in listings and logs
    pub fn name(self) -> &'static str {
        use NativeId::*;
        match self {
            AtomicsCompareExchange => "Atomics.compareExchange",
            AtomicsLoad => "Atomics.load",
            AtomicsStore => "Atomics.store",
            AtomicsFence => "Atomics.fence",
            AtomicsAdd => "Atomics.add",
            AtomicsSub => "Atomics.sub",
            AtomicsAnd => "Atomics.and",
            AtomicsOr => "Atomics.or",
            AtomicsXor => "Atomics.xor",
            ArrayConstructor => "Array",
            ArrayPop => "Array.prototype.pop",
            ArrayShift => "Array.prototype.shift",
            ArrayPush => "Array.prototype.push",
            ArrayConcat => "Array.prototype.concat",
            ArrayJoin => "Array.prototype.join",
            ArraySplice => "Array.prototype.splice",
            MathAbs => "Math.abs",
            MathFloor => "Math.floor",
            MathCeil => "Math.ceil",
            MathRound => "Math.round",
            MathClz32 => "Math.clz32",
            MathSqrt => "Math.sqrt",
            MathAtan2 => "Math.atan2",
            MathHypot => "Math.hypot",
            MathMax => "Math.max",
            MathMin => "Math.min",
            MathPow => "Math.pow",
            MathRandom => "Math.random",
            MathImul => "Math.imul",
            MathFround => "Math.fround",
            MathSin => "Math.sin",
            MathTan => "Math.tan",
            MathCos => "Math.cos",
            MathExp => "Math.exp",
            MathLog => "Math.log",
            MathAtan => "Math.atan",
            MathAsin => "Math.asin",
            MathAcos => "Math.acos",
            MathLog10 => "Math.log10",
            MathLog2 => "Math.log2",
            MathLog1p => "Math.log1p",
            MathExpm1 => "Math.expm1",
            MathCosh => "Math.cosh",
            MathSinh => "Math.sinh",
            MathTanh => "Math.tanh",
            MathAcosh => "Math.acosh",
            MathAsinh => "Math.asinh",
            MathAtanh => "Math.atanh",
            MathSign => "Math.sign",
            MathTrunc => "Math.trunc",
            MathCbrt => "Math.cbrt",
            StringConstructor => "String",
            StringSplit => "String.prototype.split",
            StringCharCodeAt => "String.prototype.charCodeAt",
            StringFromCharCode => "String.fromCharCode",
            StringCharAt => "String.prototype.charAt",
            StringReplace => "String.prototype.replace",
            RegExpExec => "RegExp.prototype.exec",
            RegExpTest => "RegExp.prototype.test",
            UnsafePutElements => "UnsafePutElements",
            NewDenseArray => "NewDenseArray",
            UnsafeSetReservedSlot => "UnsafeSetReservedSlot",
            UnsafeGetReservedSlot => "UnsafeGetReservedSlot",
            ShouldForceSequential => "ShouldForceSequential",
            InParallelSection => "InParallelSection",
            ForkJoinGetSlice => "ForkJoinGetSlice",
            IsCallable => "IsCallable",
            HaveSameClass => "HaveSameClass",
            ToObject => "ToObject",
            IsObject => "IsObject",
            ToInteger => "ToInteger",
            ToString => "ToString",
            IsConstructing => "IsConstructing",
            ObjectIsTypedObject => "ObjectIsTypedObject",
            ObjectIsTransparentTypedObject => "ObjectIsTransparentTypedObject",
            ObjectIsOpaqueTypedObject => "ObjectIsOpaqueTypedObject",
            ObjectIsTypeDescr => "ObjectIsTypeDescr",
            TypeDescrIsSimpleType => "TypeDescrIsSimpleType",
            TypeDescrIsArrayType => "TypeDescrIsArrayType",
            TypeDescrIsSizedArrayType => "TypeDescrIsSizedArrayType",
            TypeDescrIsUnsizedArrayType => "TypeDescrIsUnsizedArrayType",
            SetTypedObjectOffset => "SetTypedObjectOffset",
            TestingInParallelSection => "inParallelSection",
            TestingBailout => "bailout",
            TestingAssertFloat32 => "assertFloat32",
            CallOrConstructBoundFunction => "(bound function)",
            TypedArrayLengthGetter(_) => "get TypedArray.prototype.length",
            SharedTypedArrayLengthGetter(_) => "get SharedTypedArray.prototype.length",
        }
    }
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeId::TypedArrayLengthGetter(t) | NativeId::SharedTypedArrayLengthGetter(t) => {
                write!(f, "{} <{}>", self.name(), t)
            }
            _ => f.write_str(self.name()),
        }
    }
}
