//! Operand Classifier
//!
//! Declarative signature checks run before any emission: arity, the
//! constructing flag, operand types and the type the observed result implies.

use crate::call::CallInfo;
use crate::config::ExecutionMode;
use crate::mir::MirBuilder;
use crate::natives::NativeId;
use crate::types::MirType;
use std::fmt;

/// Accepted argument counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// A non-zero multiple of the group size
    Grouped(usize),
}

impl Arity {
    pub fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Exact(n) => argc == n,
            Arity::AtLeast(n) => argc >= n,
            Arity::Grouped(n) => n > 0 && argc >= n && argc % n == 0,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::Grouped(n) => write!(f, "a multiple of {}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constructing {
    Never,
    Required,
    Either,
}

/// Type class an operand must belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Any,
    Number,
    Int32,
    IntOrDouble,
    String,
    /// A string, or a boxed value whose type is only known at runtime
    StringOrValue,
    Object,
    Boolean,
    /// Statically known never to be an object
    NotObject,
}

impl Operand {
    fn accepts(self, builder: &MirBuilder, id: crate::mir::NodeId) -> bool {
        let ty = builder.ty(id);
        match self {
            Operand::Any => true,
            Operand::Number => ty.is_number(),
            Operand::Int32 => ty == MirType::Int32,
            Operand::IntOrDouble => ty.is_int_or_double(),
            Operand::String => ty == MirType::String,
            Operand::StringOrValue => matches!(ty, MirType::String | MirType::Value),
            Operand::Object => ty == MirType::Object,
            Operand::Boolean => ty == MirType::Boolean,
            Operand::NotObject => !builder.might_be(id, MirType::Object),
        }
    }
}

/// Constraint on the type implied by the observed result types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    Any,
    Exactly(MirType),
    Number,
    IntOrDouble,
    /// Anything but undefined or null
    NotNullish,
}

impl Returns {
    fn accepts(self, ty: MirType) -> bool {
        match self {
            Returns::Any => true,
            Returns::Exactly(expected) => ty == expected,
            Returns::Number => ty.is_number(),
            Returns::IntOrDouble => ty.is_int_or_double(),
            Returns::NotNullish => !matches!(ty, MirType::Undefined | MirType::Null),
        }
    }
}

/// Shape a call must have for a specializer to consider it
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub arity: Arity,
    pub constructing: Constructing,
    pub this: Operand,
    pub args: &'static [Operand],
    pub returns: Returns,
}

impl Signature {
    /// Plain (non-constructing) call with the given arity and no type demands
    pub fn call(arity: Arity) -> Self {
        Self {
            arity,
            constructing: Constructing::Never,
            this: Operand::Any,
            args: &[],
            returns: Returns::Any,
        }
    }

    pub fn constructing(mut self, constructing: Constructing) -> Self {
        self.constructing = constructing;
        self
    }

    pub fn this(mut self, this: Operand) -> Self {
        self.this = this;
        self
    }

    /// Type classes of the leading arguments, by position
    pub fn args(mut self, args: &'static [Operand]) -> Self {
        self.args = args;
        self
    }

    pub fn returns(mut self, returns: Returns) -> Self {
        self.returns = returns;
        self
    }
}

/// Why a call was left generic
#[derive(Debug, Clone, PartialEq)]
pub enum Reject {
    Disabled,
    CallDead,
    NotNative,
    NoSpecializer(NativeId),
    Arity { expected: Arity, found: usize },
    Constructing { expected: bool },
    ThisType(MirType),
    ArgType { index: usize, found: MirType },
    ReturnType(MirType),
    ExecutionMode(ExecutionMode),
    TooManyArgs { limit: usize, found: usize },
    /// A shape or type-set condition the specializer needs does not hold
    Shape(&'static str),
}

impl fmt::Display for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reject::Disabled => write!(f, "native inlining disabled"),
            Reject::CallDead => write!(f, "call already specialized"),
            Reject::NotNative => write!(f, "callee is not a native"),
            Reject::NoSpecializer(native) => write!(f, "no specializer for {}", native),
            Reject::Arity { expected, found } => {
                write!(f, "expected {} arguments, found {}", expected, found)
            }
            Reject::Constructing { expected: true } => write!(f, "call must be a construct"),
            Reject::Constructing { expected: false } => write!(f, "call must not be a construct"),
            Reject::ThisType(ty) => write!(f, "unsupported receiver type {}", ty),
            Reject::ArgType { index, found } => {
                write!(f, "unsupported type {} for argument {}", found, index)
            }
            Reject::ReturnType(ty) => write!(f, "unsupported result type {}", ty),
            Reject::ExecutionMode(mode) => write!(f, "not available in {} mode", mode),
            Reject::TooManyArgs { limit, found } => {
                write!(f, "{} arguments exceed the limit of {}", found, limit)
            }
            Reject::Shape(reason) => f.write_str(reason),
        }
    }
}

/// Check `call` against `sig`
pub fn classify(builder: &MirBuilder, call: &CallInfo, sig: &Signature) -> Result<(), Reject> {
    match (sig.constructing, call.constructing) {
        (Constructing::Never, true) => return Err(Reject::Constructing { expected: false }),
        (Constructing::Required, false) => return Err(Reject::Constructing { expected: true }),
        _ => {}
    }

    if !sig.arity.accepts(call.argc()) {
        return Err(Reject::Arity {
            expected: sig.arity,
            found: call.argc(),
        });
    }

    let ret = call.inline_return_type();
    if !sig.returns.accepts(ret) {
        return Err(Reject::ReturnType(ret));
    }

    if !sig.this.accepts(builder, call.this) {
        return Err(Reject::ThisType(builder.ty(call.this)));
    }

    for (index, (class, &arg)) in sig.args.iter().zip(call.args.iter()).enumerate() {
        if !class.accepts(builder, arg) {
            return Err(Reject::ArgType {
                index,
                found: builder.ty(arg),
            });
        }
    }
    Ok(())
}
