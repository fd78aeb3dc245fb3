//! Call-site scenarios
//!
//! A scenario is a JSON description of one call site: the callee, the types
//! or constant values of its operands, what the baseline tier observed about
//! its result, and the engine facts the specializer may consult. The CLI's
//! `inspect` command and the integration tests build graphs from them.
//!
//! ```json
//! {
//!   "callee": { "function": { "object": { "id": 1, "class": "function" },
//!               "kind": { "native": { "native": "math_floor" } } } },
//!   "args": [ { "ty": "double" } ],
//!   "result_types": { "primitives": "INT32" }
//! }
//! ```

use crate::call::{CallInfo, CallKind, CallSiteId, ResultUse};
use crate::config::InlineConfig;
use crate::env::StaticEnv;
use crate::error::{Error, Result};
use crate::inline::{InlineFrame, Inliner, InliningStatus};
use crate::mir::{MirBuilder, NodeId};
use crate::stubs::SharedStubs;
use crate::types::{MirType, TypeSet};
use crate::value::{Callee, ConstValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One operand of the call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperandSpec {
    /// A value known at compile time
    Constant { constant: ConstValue },
    /// A value known only by its static type and, optionally, observed types
    Value {
        ty: MirType,
        #[serde(default)]
        types: Option<TypeSet>,
    },
}

impl OperandSpec {
    pub fn of(ty: MirType) -> Self {
        OperandSpec::Value { ty, types: None }
    }
}

fn default_site() -> CallSiteId {
    CallSiteId(0)
}

/// Serialized description of a single call site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_site")]
    pub site: CallSiteId,
    pub callee: Callee,
    /// Receiver; `undefined` when absent
    #[serde(default)]
    pub this: Option<OperandSpec>,
    #[serde(default)]
    pub args: Vec<OperandSpec>,
    #[serde(default)]
    pub constructing: bool,
    #[serde(default)]
    pub kind: CallKind,
    /// Observed result types; anything when absent
    #[serde(default)]
    pub result_types: Option<TypeSet>,
    #[serde(default)]
    pub result_use: ResultUse,
    #[serde(default)]
    pub env: StaticEnv,
    #[serde(default)]
    pub config: InlineConfig,
    #[serde(default)]
    pub frame: Option<InlineFrame>,
}

/// A scenario turned into a builder and call ready to specialize
#[derive(Debug)]
pub struct BuiltScenario {
    pub builder: MirBuilder,
    pub call: CallInfo,
    pub callee: Callee,
    pub env: StaticEnv,
    pub config: InlineConfig,
    pub frame: Option<InlineFrame>,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Scenario(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if self.kind == CallKind::Getter && !self.args.is_empty() {
            return Err(Error::Scenario("getter calls take no arguments".into()));
        }
        if self.kind == CallKind::Getter && matches!(self.callee, Callee::TypeDescr(_)) {
            return Err(Error::Scenario("a type descriptor cannot be a getter".into()));
        }
        if self.args.len() > self.config.max_call_args {
            return Err(Error::Scenario(format!(
                "{} arguments exceed max_call_args ({})",
                self.args.len(),
                self.config.max_call_args
            )));
        }
        for (index, arg) in self.args.iter().enumerate() {
            if let OperandSpec::Value {
                ty: MirType::Elements | MirType::None,
                ..
            } = arg
            {
                return Err(Error::Scenario(format!("argument {} has no value type", index)));
            }
        }
        Ok(())
    }

    /// Populate a fresh builder with the call's operands
    pub fn build(&self) -> Result<BuiltScenario> {
        self.validate()?;

        let mut builder = MirBuilder::new();
        let mut next_param = 0u16;
        let mut operand = |builder: &mut MirBuilder, desc: &OperandSpec| -> NodeId {
            match desc {
                OperandSpec::Constant { constant } => builder.add_constant(constant.clone()),
                OperandSpec::Value { ty, types } => {
                    let id = builder.add_parameter(next_param, *ty, types.clone());
                    next_param += 1;
                    id
                }
            }
        };

        let fun = operand(&mut builder, &OperandSpec::of(MirType::Object));
        let this = match &self.this {
            Some(desc) => operand(&mut builder, desc),
            None => builder.add_constant(ConstValue::Undefined),
        };
        let args = self
            .args
            .iter()
            .map(|desc| operand(&mut builder, desc))
            .collect();

        let mut call = CallInfo::new(self.site, fun, this, args)
            .constructing(self.constructing)
            .with_kind(self.kind)
            .with_result_use(self.result_use);
        if let Some(types) = &self.result_types {
            call = call.with_result_types(types.clone());
        }

        Ok(BuiltScenario {
            builder,
            call,
            callee: self.callee.clone(),
            env: self.env.clone(),
            config: self.config.clone(),
            frame: self.frame,
        })
    }
}

impl BuiltScenario {
    /// Run the specializer once on the scenario's call
    pub fn specialize(&mut self, stubs: &SharedStubs) -> Result<InliningStatus> {
        let mut inliner = Inliner::new(&self.config, &self.env, stubs);
        if let Some(frame) = self.frame {
            inliner = inliner.in_frame(frame);
        }
        inliner.try_specialize(&mut self.builder, &self.call, &self.callee)
    }
}
