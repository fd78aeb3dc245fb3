//! Observed type sets and the feasibility queries specializers ask of them

use super::frozen::{Dependency, Frozen};
use super::{ClassId, MirType, ScalarType};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// Primitive members of a type set
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PrimitiveTypes: u16 {
        const UNDEFINED = 1 << 0;
        const NULL = 1 << 1;
        const BOOLEAN = 1 << 2;
        const INT32 = 1 << 3;
        const DOUBLE = 1 << 4;
        const STRING = 1 << 5;
        const SYMBOL = 1 << 6;
        /// Optimized-away arguments and other engine-internal markers
        const MAGIC = 1 << 7;
    }
}

bitflags! {
    /// Facts recorded on a type object, each of which can only become set
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ObjectFlags: u32 {
        /// Some object has non-dense indexed properties
        const SPARSE_INDEXES = 1 << 0;
        /// Some array's length overflowed int32
        const LENGTH_OVERFLOW = 1 << 1;
        /// Some object was exposed to an active iterator
        const ITERATED = 1 << 2;
        /// Some array may contain holes
        const NON_PACKED = 1 << 3;
        /// Some object may share copy-on-write elements
        const COPY_ON_WRITE = 1 << 4;
    }
}

impl PrimitiveTypes {
    /// Flags for a value of static type `ty`
    pub fn from_mir_type(ty: MirType) -> PrimitiveTypes {
        match ty {
            MirType::Undefined => PrimitiveTypes::UNDEFINED,
            MirType::Null => PrimitiveTypes::NULL,
            MirType::Boolean => PrimitiveTypes::BOOLEAN,
            MirType::Int32 => PrimitiveTypes::INT32,
            MirType::Double | MirType::Float32 => PrimitiveTypes::INT32 | PrimitiveTypes::DOUBLE,
            MirType::String => PrimitiveTypes::STRING,
            MirType::Symbol => PrimitiveTypes::SYMBOL,
            _ => PrimitiveTypes::empty(),
        }
    }
}

/// Identity of a type object (the group of objects sharing class and prototype)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeObjectId(pub u32);

impl fmt::Display for TypeObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Heap an allocation from a template object lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialHeap {
    #[default]
    Nursery,
    Tenured,
}

/// Layout descriptor of a typed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypedDescr {
    Scalar(ScalarType),
    Reference,
    Struct { size: u32 },
    SizedArray { element: Box<TypedDescr>, length: u32 },
    UnsizedArray { element: Box<TypedDescr> },
}

impl TypedDescr {
    /// Scalar element type when this describes an array of scalars
    pub fn scalar_array_element(&self) -> Option<ScalarType> {
        match self {
            TypedDescr::SizedArray { element, .. } | TypedDescr::UnsizedArray { element } => {
                match **element {
                    TypedDescr::Scalar(scalar) => Some(scalar),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// A type object as recorded in a type set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectKey {
    pub id: TypeObjectId,
    pub class: ClassId,
    #[serde(default = "ObjectFlags::empty")]
    pub flags: ObjectFlags,
    /// Properties are not tracked; any value may be stored anywhere
    #[serde(default)]
    pub unknown_properties: bool,
    /// Types observed in indexed elements, if tracked
    #[serde(default)]
    pub element_types: Option<Arc<TypeSet>>,
    #[serde(default)]
    pub initial_heap: InitialHeap,
    #[serde(default)]
    pub descr: Option<TypedDescr>,
}

impl ObjectKey {
    pub fn new(id: u32, class: ClassId) -> Self {
        Self {
            id: TypeObjectId(id),
            class,
            flags: ObjectFlags::empty(),
            unknown_properties: false,
            element_types: None,
            initial_heap: InitialHeap::Nursery,
            descr: None,
        }
    }

    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_element_types(mut self, types: TypeSet) -> Self {
        self.element_types = Some(Arc::new(types));
        self
    }

    pub fn with_unknown_properties(mut self) -> Self {
        self.unknown_properties = true;
        self
    }

    pub fn with_initial_heap(mut self, heap: InitialHeap) -> Self {
        self.initial_heap = heap;
        self
    }

    pub fn with_descr(mut self, descr: TypedDescr) -> Self {
        self.descr = Some(descr);
        self
    }
}

/// Outcome of asking a predicate about every class in a type set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForAllResult {
    AllTrue,
    AllFalse,
    Mixed,
    Empty,
}

/// Whether array stores should convert int32 values to doubles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleConversion {
    AlwaysConvertToDoubles,
    MaybeConvertToDoubles,
    DontConvertToDoubles,
    AmbiguousDoubleConversion,
}

/// Guard needed after a load whose result may fall outside the observed types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BarrierKind {
    NoBarrier,
    TypeSet,
}

/// Immutable set of types a value was observed to have
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTypeSet")]
pub struct TypeSet {
    primitives: PrimitiveTypes,
    objects: Vec<Arc<ObjectKey>>,
    unknown_object: bool,
    unknown: bool,
}

/// Serialized form of a `TypeSet`, normalized on the way in
#[derive(Deserialize)]
struct RawTypeSet {
    #[serde(default = "PrimitiveTypes::empty")]
    primitives: PrimitiveTypes,
    #[serde(default)]
    objects: Vec<Arc<ObjectKey>>,
    #[serde(default)]
    unknown_object: bool,
    #[serde(default)]
    unknown: bool,
}

impl From<RawTypeSet> for TypeSet {
    fn from(raw: RawTypeSet) -> Self {
        let mut set = raw
            .objects
            .into_iter()
            .fold(TypeSet::empty().with_primitives(raw.primitives), TypeSet::with_object);
        set.unknown_object = raw.unknown_object;
        set.unknown = raw.unknown;
        set
    }
}

impl Default for TypeSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl TypeSet {
    pub fn empty() -> Self {
        Self {
            primitives: PrimitiveTypes::empty(),
            objects: Vec::new(),
            unknown_object: false,
            unknown: false,
        }
    }

    /// A set that may contain anything
    pub fn unknown() -> Self {
        Self {
            unknown: true,
            ..Self::empty()
        }
    }

    /// Set containing just the values of static type `ty`
    pub fn of(ty: MirType) -> Self {
        match ty {
            MirType::Value => Self::unknown(),
            MirType::Object => Self::empty().with_unknown_object(),
            other => Self::empty().with_primitives(PrimitiveTypes::from_mir_type(other)),
        }
    }

    pub fn with_primitives(mut self, primitives: PrimitiveTypes) -> Self {
        self.primitives |= primitives;
        // Doubles are always allowed to hold int32 values
        if self.primitives.contains(PrimitiveTypes::DOUBLE) {
            self.primitives |= PrimitiveTypes::INT32;
        }
        self
    }

    pub fn with_object(mut self, key: Arc<ObjectKey>) -> Self {
        if !self.objects.iter().any(|k| k.id == key.id) {
            self.objects.push(key);
        }
        self
    }

    pub fn with_unknown_object(mut self) -> Self {
        self.unknown_object = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.unknown && !self.unknown_object && self.primitives.is_empty() && self.objects.is_empty()
    }

    pub fn is_unknown(&self) -> bool {
        self.unknown
    }

    pub fn unknown_object(&self) -> bool {
        self.unknown || self.unknown_object
    }

    pub fn primitives(&self) -> PrimitiveTypes {
        self.primitives
    }

    pub fn objects(&self) -> &[Arc<ObjectKey>] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// The only type object in the set, when the set is that precise
    pub fn single_object(&self) -> Option<&Arc<ObjectKey>> {
        if self.unknown_object() || self.objects.len() != 1 {
            return None;
        }
        self.objects.first()
    }

    pub fn has_primitive(&self, primitives: PrimitiveTypes) -> bool {
        self.unknown || self.primitives.contains(primitives)
    }

    pub fn has_object(&self, id: TypeObjectId) -> bool {
        self.unknown_object() || self.objects.iter().any(|k| k.id == id)
    }

    /// Single static type describing every member, `Value` when there is none
    pub fn known_mir_type(&self) -> MirType {
        if self.unknown {
            return MirType::Value;
        }
        if self.unknown_object || !self.objects.is_empty() {
            return if self.primitives.is_empty() {
                MirType::Object
            } else {
                MirType::Value
            };
        }
        let p = self.primitives;
        if p == PrimitiveTypes::UNDEFINED {
            MirType::Undefined
        } else if p == PrimitiveTypes::NULL {
            MirType::Null
        } else if p == PrimitiveTypes::BOOLEAN {
            MirType::Boolean
        } else if p == PrimitiveTypes::INT32 {
            MirType::Int32
        } else if p == PrimitiveTypes::INT32 | PrimitiveTypes::DOUBLE || p == PrimitiveTypes::DOUBLE {
            MirType::Double
        } else if p == PrimitiveTypes::STRING {
            MirType::String
        } else if p == PrimitiveTypes::SYMBOL {
            MirType::Symbol
        } else {
            MirType::Value
        }
    }

    pub fn might_be(&self, ty: MirType) -> bool {
        if self.unknown {
            return true;
        }
        match ty {
            MirType::Object => self.unknown_object || !self.objects.is_empty(),
            MirType::Value => !self.is_empty(),
            MirType::Double | MirType::Float32 => self.primitives.contains(PrimitiveTypes::DOUBLE),
            MirType::Elements | MirType::None => false,
            other => self.primitives.intersects(PrimitiveTypes::from_mir_type(other)),
        }
    }

    /// Every value of `other` is also a value of `self`
    pub fn is_subset_of(&self, other: &TypeSet) -> bool {
        if other.unknown {
            return true;
        }
        if self.unknown {
            return false;
        }
        if !other.primitives.contains(self.primitives) {
            return false;
        }
        if other.unknown_object {
            return true;
        }
        if self.unknown_object {
            return false;
        }
        self.objects.iter().all(|key| other.has_object(key.id))
    }

    /// Whether a value of type `ty` (with optional observed types) fits in this set
    pub fn includes(&self, ty: MirType, value_types: Option<&TypeSet>) -> bool {
        match ty {
            MirType::Value => self.unknown || value_types.is_some_and(|t| t.is_subset_of(self)),
            MirType::Object => {
                self.unknown_object() || value_types.is_some_and(|t| t.is_subset_of(self))
            }
            MirType::Elements | MirType::None => false,
            other => self.has_primitive(PrimitiveTypes::from_mir_type(other)),
        }
    }

    /// Class shared by every object in the set
    pub fn known_class(&self) -> Option<ClassId> {
        if self.unknown_object() {
            return None;
        }
        let first = self.objects.first()?.class;
        self.objects
            .iter()
            .all(|key| key.class == first)
            .then_some(first)
    }

    pub fn typed_array_type(&self) -> Option<ScalarType> {
        match self.known_class()? {
            ClassId::TypedArray(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn shared_typed_array_type(&self) -> Option<ScalarType> {
        match self.known_class()? {
            ClassId::SharedTypedArray(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Typed-object layout shared by every object in the set
    pub fn typed_object_descr(&self) -> Option<&TypedDescr> {
        if self.unknown_object() {
            return None;
        }
        let first = self.objects.first()?.descr.as_ref()?;
        self.objects
            .iter()
            .all(|key| key.descr.as_ref() == Some(first))
            .then_some(first)
    }

    /// Whether any object may have one of `flags` set.
    ///
    /// A `false` answer depends on the flags staying clear.
    pub fn has_object_flags(&self, flags: ObjectFlags) -> Frozen<bool> {
        if self.unknown_object() {
            return Frozen::stable(true);
        }
        let mut deps = Vec::with_capacity(self.objects.len());
        for key in &self.objects {
            if key.unknown_properties || key.flags.intersects(flags) {
                return Frozen::stable(true);
            }
            deps.push(Dependency::ObjectFlagsClear {
                object: key.id,
                flags,
            });
        }
        Frozen::new(false, deps)
    }

    /// Evaluate `pred` on the class of every object in the set
    pub fn for_all_classes(&self, pred: impl Fn(ClassId) -> bool) -> ForAllResult {
        if self.unknown_object() {
            return ForAllResult::Mixed;
        }
        if self.objects.is_empty() {
            return ForAllResult::Empty;
        }
        let mut saw_true = false;
        let mut saw_false = false;
        for key in &self.objects {
            if pred(key.class) {
                saw_true = true;
            } else {
                saw_false = true;
            }
            if saw_true && saw_false {
                return ForAllResult::Mixed;
            }
        }
        if saw_true {
            ForAllResult::AllTrue
        } else {
            ForAllResult::AllFalse
        }
    }

    /// How stores into arrays of this set treat int32 values
    pub fn convert_double_elements(&self) -> Frozen<DoubleConversion> {
        if self.unknown_object() || self.objects.is_empty() {
            return Frozen::stable(DoubleConversion::AmbiguousDoubleConversion);
        }

        let mut deps = Vec::new();
        let mut always_convert = true;
        let mut maybe_convert = false;
        let mut dont_convert = false;

        for key in &self.objects {
            if key.unknown_properties {
                always_convert = false;
                continue;
            }
            deps.push(Dependency::ElementTypes { object: key.id });

            let holds_doubles = key
                .element_types
                .as_ref()
                .is_some_and(|types| types.has_primitive(PrimitiveTypes::DOUBLE));
            if !holds_doubles || key.class != ClassId::Array {
                dont_convert = true;
                always_convert = false;
                continue;
            }

            let element_type = key
                .element_types
                .as_ref()
                .map_or(MirType::Value, |types| types.known_mir_type());
            if element_type == MirType::Double && !key.flags.contains(ObjectFlags::NON_PACKED) {
                deps.push(Dependency::ObjectFlagsClear {
                    object: key.id,
                    flags: ObjectFlags::NON_PACKED,
                });
                maybe_convert = true;
            } else {
                always_convert = false;
            }
        }

        let conversion = if maybe_convert && dont_convert {
            DoubleConversion::AmbiguousDoubleConversion
        } else if always_convert {
            DoubleConversion::AlwaysConvertToDoubles
        } else if maybe_convert {
            DoubleConversion::MaybeConvertToDoubles
        } else {
            DoubleConversion::DontConvertToDoubles
        };
        Frozen::new(conversion, deps)
    }

    /// Whether storing a value into an element of these objects needs a
    /// type barrier because the element types do not already include it
    pub fn element_write_needs_barrier(
        &self,
        value_type: MirType,
        value_types: Option<&TypeSet>,
    ) -> Frozen<bool> {
        if self.unknown_object() {
            return Frozen::stable(true);
        }
        let mut deps = Vec::new();
        for key in &self.objects {
            if key.unknown_properties {
                continue;
            }
            match &key.element_types {
                Some(types) if types.includes(value_type, value_types) => {
                    deps.push(Dependency::ElementTypes { object: key.id });
                }
                _ => return Frozen::stable(true),
            }
        }
        Frozen::new(false, deps)
    }

    /// Barrier needed on an element read whose result is checked against `observed`
    pub fn element_read_barrier(&self, observed: &TypeSet) -> Frozen<BarrierKind> {
        if observed.is_unknown() {
            return Frozen::stable(BarrierKind::NoBarrier);
        }
        if self.unknown_object() {
            return Frozen::stable(BarrierKind::TypeSet);
        }
        let mut deps = Vec::new();
        for key in &self.objects {
            if key.unknown_properties {
                return Frozen::stable(BarrierKind::TypeSet);
            }
            match &key.element_types {
                Some(types) if types.is_subset_of(observed) => {
                    deps.push(Dependency::ElementTypes { object: key.id });
                }
                _ => return Frozen::stable(BarrierKind::TypeSet),
            }
        }
        Frozen::new(BarrierKind::NoBarrier, deps)
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unknown {
            return write!(f, "{{*}}");
        }
        let mut parts: Vec<String> = Vec::new();
        for (flag, name) in [
            (PrimitiveTypes::UNDEFINED, "undefined"),
            (PrimitiveTypes::NULL, "null"),
            (PrimitiveTypes::BOOLEAN, "bool"),
            (PrimitiveTypes::INT32, "int32"),
            (PrimitiveTypes::DOUBLE, "double"),
            (PrimitiveTypes::STRING, "string"),
            (PrimitiveTypes::SYMBOL, "symbol"),
            (PrimitiveTypes::MAGIC, "magic"),
        ] {
            if self.primitives.contains(flag) {
                parts.push(name.to_string());
            }
        }
        if self.unknown_object {
            parts.push("object".to_string());
        }
        for key in &self.objects {
            parts.push(format!("{}:{}", key.class, key.id));
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_key(id: u32, elements: TypeSet) -> Arc<ObjectKey> {
        Arc::new(ObjectKey::new(id, ClassId::Array).with_element_types(elements))
    }

    #[test]
    fn test_deserialized_doubles_admit_int32() {
        let loaded: TypeSet = serde_json::from_str(r#"{"primitives":"DOUBLE"}"#).unwrap();
        assert_eq!(loaded, TypeSet::of(MirType::Double));
        assert!(loaded.might_be(MirType::Int32));

        let round_trip: TypeSet = serde_json::from_str(&serde_json::to_string(&loaded).unwrap()).unwrap();
        assert_eq!(round_trip, loaded);
    }

    #[test]
    fn test_deserialized_objects_are_deduplicated() {
        let loaded: TypeSet = serde_json::from_str(
            r#"{"objects":[{"id":3,"class":"array"},{"id":3,"class":"array"}],"unknown_object":true}"#,
        )
        .unwrap();
        assert_eq!(loaded.object_count(), 1);
        assert!(loaded.might_be(MirType::Object));
    }

    #[test]
    fn test_known_mir_type() {
        assert_eq!(TypeSet::empty().known_mir_type(), MirType::Value);
        assert_eq!(TypeSet::of(MirType::Int32).known_mir_type(), MirType::Int32);
        assert_eq!(TypeSet::of(MirType::Double).known_mir_type(), MirType::Double);
        assert_eq!(TypeSet::of(MirType::Object).known_mir_type(), MirType::Object);
        let mixed = TypeSet::of(MirType::Int32).with_primitives(PrimitiveTypes::STRING);
        assert_eq!(mixed.known_mir_type(), MirType::Value);
        let obj_or_null = TypeSet::of(MirType::Null).with_unknown_object();
        assert_eq!(obj_or_null.known_mir_type(), MirType::Value);
    }

    #[test]
    fn test_subset() {
        let ints = TypeSet::of(MirType::Int32);
        let numbers = TypeSet::of(MirType::Double);
        assert!(ints.is_subset_of(&numbers));
        assert!(!numbers.is_subset_of(&ints));
        assert!(numbers.is_subset_of(&TypeSet::unknown()));

        let a = TypeSet::empty().with_object(array_key(1, TypeSet::empty()));
        let b = a.clone().with_object(array_key(2, TypeSet::empty()));
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
    }

    #[test]
    fn test_known_class() {
        let set = TypeSet::empty()
            .with_object(array_key(1, TypeSet::empty()))
            .with_object(array_key(2, TypeSet::empty()));
        assert_eq!(set.known_class(), Some(ClassId::Array));

        let set = set.with_object(Arc::new(ObjectKey::new(3, ClassId::RegExp)));
        assert_eq!(set.known_class(), None);
        assert_eq!(TypeSet::of(MirType::Object).known_class(), None);
    }

    #[test]
    fn test_object_flags_freeze_only_on_false() {
        let packed = TypeSet::empty().with_object(array_key(1, TypeSet::empty()));
        let answer = packed.has_object_flags(ObjectFlags::SPARSE_INDEXES);
        assert!(!*answer.peek());
        assert_eq!(answer.dependencies().len(), 1);

        let sparse = TypeSet::empty().with_object(Arc::new(
            ObjectKey::new(2, ClassId::Array).with_flags(ObjectFlags::SPARSE_INDEXES),
        ));
        let answer = sparse.has_object_flags(ObjectFlags::SPARSE_INDEXES | ObjectFlags::ITERATED);
        assert!(*answer.peek());
        assert!(answer.dependencies().is_empty());
    }

    #[test]
    fn test_for_all_classes() {
        let set = TypeSet::empty()
            .with_object(Arc::new(ObjectKey::new(1, ClassId::ScalarTypeDescr)))
            .with_object(Arc::new(ObjectKey::new(2, ClassId::StructTypeDescr)));
        assert_eq!(set.for_all_classes(ClassId::is_type_descr), ForAllResult::AllTrue);
        assert_eq!(
            set.for_all_classes(|c| c == ClassId::ScalarTypeDescr),
            ForAllResult::Mixed
        );
        assert_eq!(
            set.for_all_classes(|c| c == ClassId::Array),
            ForAllResult::AllFalse
        );
        assert_eq!(
            TypeSet::of(MirType::Int32).for_all_classes(|_| true),
            ForAllResult::Empty
        );
    }

    #[test]
    fn test_convert_double_elements() {
        let doubles = TypeSet::empty().with_object(array_key(1, TypeSet::of(MirType::Double)));
        assert_eq!(
            *doubles.convert_double_elements().peek(),
            DoubleConversion::AlwaysConvertToDoubles
        );

        let ints = TypeSet::empty().with_object(array_key(2, TypeSet::of(MirType::Int32)));
        assert_eq!(
            *ints.convert_double_elements().peek(),
            DoubleConversion::DontConvertToDoubles
        );

        let both = doubles.clone().with_object(array_key(2, TypeSet::of(MirType::Int32)));
        assert_eq!(
            *both.convert_double_elements().peek(),
            DoubleConversion::AmbiguousDoubleConversion
        );

        let holey = TypeSet::empty().with_object(Arc::new(
            ObjectKey::new(3, ClassId::Array)
                .with_flags(ObjectFlags::NON_PACKED)
                .with_element_types(TypeSet::of(MirType::Double)),
        ));
        let mixed = doubles.with_object(holey.objects()[0].clone());
        assert_eq!(
            *mixed.convert_double_elements().peek(),
            DoubleConversion::MaybeConvertToDoubles
        );
    }

    #[test]
    fn test_element_barriers() {
        let set = TypeSet::empty().with_object(array_key(1, TypeSet::of(MirType::Int32)));
        assert!(!*set.element_write_needs_barrier(MirType::Int32, None).peek());
        assert!(*set.element_write_needs_barrier(MirType::String, None).peek());

        let observed = TypeSet::of(MirType::Double);
        assert_eq!(
            *set.element_read_barrier(&observed).peek(),
            BarrierKind::NoBarrier
        );
        assert_eq!(
            *set.element_read_barrier(&TypeSet::of(MirType::String)).peek(),
            BarrierKind::TypeSet
        );
    }

    #[test]
    fn test_display() {
        let set = TypeSet::of(MirType::Double)
            .with_object(Arc::new(ObjectKey::new(4, ClassId::Array)));
        assert_eq!(set.to_string(), "{int32, double, Array:T4}");
        assert_eq!(TypeSet::unknown().to_string(), "{*}");
    }
}
