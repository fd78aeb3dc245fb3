//! Dispatch Table: native identity to specializer

use super::{
    array, atomics, bound, intrinsics, math, parallel, regexp, string, typed_object,
    InliningStatus, Inliner,
};
use crate::call::CallInfo;
use crate::error::Result;
use crate::mir::{AtomicBinop, MathFunction, MirBuilder, PopShiftMode};
use crate::natives::NativeId;
use crate::types::{
    ClassId, ScalarType, ARRAY_TYPE_DESCR_CLASSES, OPAQUE_TYPED_OBJECT_CLASSES,
    SIMPLE_TYPE_DESCR_CLASSES, SIZED_ARRAY_TYPE_DESCR_CLASSES, TRANSPARENT_TYPED_OBJECT_CLASSES,
    TYPED_OBJECT_CLASSES, UNSIZED_ARRAY_TYPE_DESCR_CLASSES,
};
use crate::value::JsFunction;
use rustc_hash::FxHashMap as HashMap;
use std::fmt;
use std::sync::OnceLock;

pub type SpecializeFn = fn(&Inliner<'_>, &mut MirBuilder, &CallInfo) -> Result<InliningStatus>;

/// Specialization strategy for one native
#[derive(Clone, Copy)]
pub enum Specializer {
    Plain(SpecializeFn),
    MathFunction(MathFunction),
    Rounding(math::Rounding),
    MinMax { is_max: bool },
    PopShift(PopShiftMode),
    AtomicBinop(AtomicBinop),
    /// Class membership test against a fixed candidate list
    HasClass(&'static [ClassId]),
    TypedArrayLength { shared: bool, scalar: ScalarType },
    BoundFunction,
}

impl fmt::Debug for Specializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specializer::Plain(_) => write!(f, "Plain"),
            Specializer::MathFunction(func) => write!(f, "MathFunction({})", func.name()),
            Specializer::Rounding(r) => write!(f, "Rounding({:?})", r),
            Specializer::MinMax { is_max } => write!(f, "MinMax {{ is_max: {} }}", is_max),
            Specializer::PopShift(mode) => write!(f, "PopShift({:?})", mode),
            Specializer::AtomicBinop(op) => write!(f, "AtomicBinop({:?})", op),
            Specializer::HasClass(classes) => write!(f, "HasClass({:?})", classes),
            Specializer::TypedArrayLength { shared, scalar } => {
                write!(f, "TypedArrayLength {{ shared: {}, scalar: {} }}", shared, scalar)
            }
            Specializer::BoundFunction => write!(f, "BoundFunction"),
        }
    }
}

impl Specializer {
    pub fn run(
        self,
        inliner: &Inliner<'_>,
        builder: &mut MirBuilder,
        call: &CallInfo,
        callee: &JsFunction,
    ) -> Result<InliningStatus> {
        match self {
            Specializer::Plain(f) => f(inliner, builder, call),
            Specializer::MathFunction(func) => math::inline_math_function(builder, call, func),
            Specializer::Rounding(rounding) => math::inline_math_rounding(builder, call, rounding),
            Specializer::MinMax { is_max } => math::inline_math_min_max(builder, call, is_max),
            Specializer::PopShift(mode) => array::inline_array_pop_shift(inliner, builder, call, mode),
            Specializer::AtomicBinop(op) => atomics::inline_atomics_binop(builder, call, op),
            Specializer::HasClass(classes) => typed_object::inline_has_class(builder, call, classes),
            Specializer::TypedArrayLength { shared, scalar } => {
                typed_object::inline_typed_array_length(builder, call, shared, scalar)
            }
            Specializer::BoundFunction => bound::inline_bound_function(inliner, builder, call, callee),
        }
    }
}

const ALL_SCALAR_TYPES: [ScalarType; 9] = [
    ScalarType::Int8,
    ScalarType::Uint8,
    ScalarType::Int16,
    ScalarType::Uint16,
    ScalarType::Int32,
    ScalarType::Uint32,
    ScalarType::Float32,
    ScalarType::Float64,
    ScalarType::Uint8Clamped,
];

/// Read-only map from native identity to specializer
pub struct DispatchTable {
    calls: HashMap<NativeId, Specializer>,
    getters: HashMap<NativeId, Specializer>,
}

impl DispatchTable {
    /// Table shared by every compilation
    pub fn global() -> &'static DispatchTable {
        static TABLE: OnceLock<DispatchTable> = OnceLock::new();
        TABLE.get_or_init(DispatchTable::build)
    }

    fn build() -> Self {
        use NativeId::*;
        use Specializer::*;

        let mut calls: HashMap<NativeId, Specializer> = HashMap::default();
        let mut add = |native: NativeId, specializer: Specializer| {
            calls.insert(native, specializer);
        };

        // ==================== Atomics ====================
        add(AtomicsCompareExchange, Plain(atomics::inline_atomics_compare_exchange));
        add(AtomicsLoad, Plain(atomics::inline_atomics_load));
        add(AtomicsStore, Plain(atomics::inline_atomics_store));
        add(AtomicsFence, Plain(atomics::inline_atomics_fence));
        add(AtomicsAdd, AtomicBinop(crate::mir::AtomicBinop::Add));
        add(AtomicsSub, AtomicBinop(crate::mir::AtomicBinop::Sub));
        add(AtomicsAnd, AtomicBinop(crate::mir::AtomicBinop::And));
        add(AtomicsOr, AtomicBinop(crate::mir::AtomicBinop::Or));
        add(AtomicsXor, AtomicBinop(crate::mir::AtomicBinop::Xor));

        // ==================== Array ====================
        add(ArrayConstructor, Plain(array::inline_array));
        add(ArrayPop, PopShift(PopShiftMode::Pop));
        add(ArrayShift, PopShift(PopShiftMode::Shift));
        add(ArrayPush, Plain(array::inline_array_push));
        add(ArrayConcat, Plain(array::inline_array_concat));
        add(ArrayJoin, Plain(array::inline_array_join));
        add(ArraySplice, Plain(array::inline_array_splice));

        // ==================== Math ====================
        add(MathAbs, Plain(math::inline_math_abs));
        add(MathFloor, Rounding(math::Rounding::Floor));
        add(MathCeil, Rounding(math::Rounding::Ceil));
        add(MathRound, Rounding(math::Rounding::Round));
        add(MathClz32, Plain(math::inline_math_clz32));
        add(MathSqrt, Plain(math::inline_math_sqrt));
        add(MathAtan2, Plain(math::inline_math_atan2));
        add(MathHypot, Plain(math::inline_math_hypot));
        add(MathMax, MinMax { is_max: true });
        add(MathMin, MinMax { is_max: false });
        add(MathPow, Plain(math::inline_math_pow));
        add(MathRandom, Plain(math::inline_math_random));
        add(MathImul, Plain(math::inline_math_imul));
        add(MathFround, Plain(math::inline_math_fround));
        for (native, func) in [
            (MathSin, crate::mir::MathFunction::Sin),
            (MathTan, crate::mir::MathFunction::Tan),
            (MathCos, crate::mir::MathFunction::Cos),
            (MathExp, crate::mir::MathFunction::Exp),
            (MathLog, crate::mir::MathFunction::Log),
            (MathAtan, crate::mir::MathFunction::Atan),
            (MathAsin, crate::mir::MathFunction::Asin),
            (MathAcos, crate::mir::MathFunction::Acos),
            (MathLog10, crate::mir::MathFunction::Log10),
            (MathLog2, crate::mir::MathFunction::Log2),
            (MathLog1p, crate::mir::MathFunction::Log1p),
            (MathExpm1, crate::mir::MathFunction::Expm1),
            (MathCosh, crate::mir::MathFunction::Cosh),
            (MathSinh, crate::mir::MathFunction::Sinh),
            (MathTanh, crate::mir::MathFunction::Tanh),
            (MathAcosh, crate::mir::MathFunction::Acosh),
            (MathAsinh, crate::mir::MathFunction::Asinh),
            (MathAtanh, crate::mir::MathFunction::Atanh),
            (MathSign, crate::mir::MathFunction::Sign),
            (MathTrunc, crate::mir::MathFunction::Trunc),
            (MathCbrt, crate::mir::MathFunction::Cbrt),
        ] {
            add(native, MathFunction(func));
        }

        // ==================== String / RegExp ====================
        add(StringConstructor, Plain(string::inline_string_object));
        add(StringSplit, Plain(string::inline_string_split));
        add(StringCharCodeAt, Plain(string::inline_str_char_code_at));
        add(StringFromCharCode, Plain(string::inline_str_from_char_code));
        add(StringCharAt, Plain(string::inline_str_char_at));
        add(StringReplace, Plain(string::inline_str_replace));
        add(RegExpExec, Plain(regexp::inline_regexp_exec));
        add(RegExpTest, Plain(regexp::inline_regexp_test));

        // ==================== Self-hosting intrinsics ====================
        add(UnsafePutElements, Plain(intrinsics::inline_unsafe_put_elements));
        add(NewDenseArray, Plain(parallel::inline_new_dense_array));
        add(UnsafeSetReservedSlot, Plain(intrinsics::inline_unsafe_set_reserved_slot));
        add(UnsafeGetReservedSlot, Plain(intrinsics::inline_unsafe_get_reserved_slot));
        add(ShouldForceSequential, Plain(parallel::inline_force_sequential_or_in_parallel_section));
        add(InParallelSection, Plain(parallel::inline_force_sequential_or_in_parallel_section));
        add(ForkJoinGetSlice, Plain(parallel::inline_fork_join_get_slice));
        add(IsCallable, Plain(intrinsics::inline_is_callable));
        add(HaveSameClass, Plain(intrinsics::inline_have_same_class));
        add(ToObject, Plain(intrinsics::inline_to_object));
        add(IsObject, Plain(intrinsics::inline_is_object));
        add(ToInteger, Plain(intrinsics::inline_to_integer));
        add(ToString, Plain(intrinsics::inline_to_string));
        add(IsConstructing, Plain(intrinsics::inline_is_constructing));

        // ==================== Typed objects ====================
        add(ObjectIsTypedObject, HasClass(TYPED_OBJECT_CLASSES));
        add(ObjectIsTransparentTypedObject, HasClass(TRANSPARENT_TYPED_OBJECT_CLASSES));
        add(ObjectIsOpaqueTypedObject, HasClass(OPAQUE_TYPED_OBJECT_CLASSES));
        add(ObjectIsTypeDescr, Plain(typed_object::inline_object_is_type_descr));
        add(TypeDescrIsSimpleType, HasClass(SIMPLE_TYPE_DESCR_CLASSES));
        add(TypeDescrIsArrayType, HasClass(ARRAY_TYPE_DESCR_CLASSES));
        add(TypeDescrIsSizedArrayType, HasClass(SIZED_ARRAY_TYPE_DESCR_CLASSES));
        add(TypeDescrIsUnsizedArrayType, HasClass(UNSIZED_ARRAY_TYPE_DESCR_CLASSES));
        add(SetTypedObjectOffset, Plain(typed_object::inline_set_typed_object_offset));

        // ==================== Testing functions ====================
        add(TestingInParallelSection, Plain(parallel::inline_force_sequential_or_in_parallel_section));
        add(TestingBailout, Plain(intrinsics::inline_bailout));
        add(TestingAssertFloat32, Plain(intrinsics::inline_assert_float32));

        // ==================== Bound functions ====================
        add(CallOrConstructBoundFunction, BoundFunction);

        let mut getters: HashMap<NativeId, Specializer> = HashMap::default();
        for scalar in ALL_SCALAR_TYPES {
            getters.insert(
                TypedArrayLengthGetter(scalar),
                TypedArrayLength {
                    shared: false,
                    scalar,
                },
            );
            getters.insert(
                SharedTypedArrayLengthGetter(scalar),
                TypedArrayLength {
                    shared: true,
                    scalar,
                },
            );
        }

        Self { calls, getters }
    }

    pub fn lookup(&self, native: NativeId) -> Option<Specializer> {
        self.calls.get(&native).copied()
    }

    pub fn lookup_getter(&self, native: NativeId) -> Option<Specializer> {
        self.getters.get(&native).copied()
    }

    pub fn len(&self) -> usize {
        self.calls.len() + self.getters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.getters.is_empty()
    }

    /// All call entries, sorted by script-visible name
    pub fn entries(&self) -> Vec<(NativeId, Specializer)> {
        let mut entries: Vec<_> = self.calls.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(native, _)| native.name());
        entries
    }
}
