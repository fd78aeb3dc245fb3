//! Static value type tags carried by MIR nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statically known type of a MIR value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirType {
    Undefined,
    Null,
    Boolean,
    Int32,
    Double,
    Float32,
    String,
    Symbol,
    Object,
    /// Unknown or boxed value
    Value,
    /// Pointer to an object's element vector
    Elements,
    /// Instruction produces no value
    None,
}

impl MirType {
    /// Int32, Double or Float32
    pub fn is_number(self) -> bool {
        matches!(self, MirType::Int32 | MirType::Double | MirType::Float32)
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, MirType::Double | MirType::Float32)
    }

    /// Int32 or Double, the two representations accepted by index operands
    pub fn is_int_or_double(self) -> bool {
        matches!(self, MirType::Int32 | MirType::Double)
    }

    pub fn name(self) -> &'static str {
        match self {
            MirType::Undefined => "undefined",
            MirType::Null => "null",
            MirType::Boolean => "bool",
            MirType::Int32 => "int32",
            MirType::Double => "double",
            MirType::Float32 => "float32",
            MirType::String => "string",
            MirType::Symbol => "symbol",
            MirType::Object => "object",
            MirType::Value => "value",
            MirType::Elements => "elements",
            MirType::None => "none",
        }
    }
}

impl fmt::Display for MirType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element type of a typed array or scalar typed-object descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    Uint8Clamped,
}

impl ScalarType {
    pub fn byte_size(self) -> usize {
        match self {
            ScalarType::Int8 | ScalarType::Uint8 | ScalarType::Uint8Clamped => 1,
            ScalarType::Int16 | ScalarType::Uint16 => 2,
            ScalarType::Int32 | ScalarType::Uint32 | ScalarType::Float32 => 4,
            ScalarType::Float64 => 8,
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, ScalarType::Float32 | ScalarType::Float64)
    }

    /// Result type an atomic access on this element type must produce,
    /// or `None` when atomics are not supported for it
    pub fn atomic_result_type(self) -> Option<MirType> {
        match self {
            ScalarType::Int8
            | ScalarType::Uint8
            | ScalarType::Int16
            | ScalarType::Uint16
            | ScalarType::Int32 => Some(MirType::Int32),
            ScalarType::Uint32 => Some(MirType::Double),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Int8 => "int8",
            ScalarType::Uint8 => "uint8",
            ScalarType::Int16 => "int16",
            ScalarType::Uint16 => "uint16",
            ScalarType::Int32 => "int32",
            ScalarType::Uint32 => "uint32",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::Uint8Clamped => "uint8_clamped",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_predicates() {
        assert!(MirType::Int32.is_number());
        assert!(MirType::Float32.is_number());
        assert!(!MirType::Value.is_number());
        assert!(MirType::Double.is_floating_point());
        assert!(!MirType::Int32.is_floating_point());
        assert!(!MirType::Float32.is_int_or_double());
    }

    #[test]
    fn test_atomic_allow_list() {
        assert_eq!(ScalarType::Int8.atomic_result_type(), Some(MirType::Int32));
        assert_eq!(ScalarType::Uint16.atomic_result_type(), Some(MirType::Int32));
        assert_eq!(ScalarType::Uint32.atomic_result_type(), Some(MirType::Double));
        assert_eq!(ScalarType::Float32.atomic_result_type(), None);
        assert_eq!(ScalarType::Uint8Clamped.atomic_result_type(), None);
    }
}
