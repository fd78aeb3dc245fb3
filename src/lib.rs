//! Callopt: call-site specialization of native functions for an optimizing JIT
//!
//! When a JavaScript call's target is statically known to be an engine
//! native (`Math.floor`, `Array.prototype.push`, `Atomics.load`, ...) and the
//! operand types observed by the baseline tier allow it, the generic call is
//! replaced by a short, type-specialized instruction sequence in the
//! mid-level IR. Every effectful instruction gets a resume point so compiled
//! code can bail out to the interpreter after the call; every type fact the
//! specialization relied on is recorded as a dependency of the compilation.
//!
//! # Quick Start
//!
//! ```
//! use callopt::call::{CallInfo, CallSiteId};
//! use callopt::mir::MirBuilder;
//! use callopt::natives::NativeId;
//! use callopt::types::{MirType, TypeSet};
//! use callopt::value::{Callee, ConstValue, JsFunction};
//! use callopt::{InlineConfig, Inliner, InliningStatus, SharedStubs, StaticEnv};
//!
//! fn main() -> callopt::Result<()> {
//!     let mut builder = MirBuilder::new();
//!     let fun = builder.add_parameter(0, MirType::Object, None);
//!     let this = builder.add_constant(ConstValue::Undefined);
//!     let x = builder.add_parameter(1, MirType::Double, None);
//!     let call = CallInfo::new(CallSiteId(0), fun, this, vec![x])
//!         .with_result_types(TypeSet::of(MirType::Int32));
//!
//!     let (config, env, stubs) = (InlineConfig::default(), StaticEnv::new(), SharedStubs::new());
//!     let floor = Callee::Function(JsFunction::native(1, NativeId::MathFloor));
//!     let status = Inliner::new(&config, &env, &stubs).try_specialize(&mut builder, &call, &floor)?;
//!     assert_eq!(status, InliningStatus::Inlined);
//!     println!("{}", builder.graph());
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Specialization** | [`inline`], [`natives`] |
//! | **IR** | [`mir`], [`types`] |
//! | **Call sites** | [`call`], [`value`], [`env`], [`stubs`] |
//! | **Setup** | [`config`], [`scenario`], [`error`](Error) |

pub mod call;
pub mod config;
pub mod env;
pub mod inline;
pub mod mir;
pub mod natives;
pub mod scenario;
pub mod stubs;
pub mod types;
pub mod value;

mod error;

pub use config::{ExecutionMode, InlineConfig};
pub use env::{InlineEnv, StaticEnv};
pub use error::{Error, GraphPhase, Result};
pub use inline::{InlineFrame, Inliner, InliningStatus};
pub use scenario::Scenario;
pub use stubs::SharedStubs;

/// Callopt version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
