//! Specialization settings

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the compiled code runs on the main thread or inside a parallel
/// (fork-join) section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// Knobs read by the inliner and its specializers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineConfig {
    /// Global switch; when off every call stays generic
    pub inline_natives: bool,
    pub execution_mode: ExecutionMode,
    /// Emit the parallel slice-fetch instruction instead of leaving the call
    pub inline_fork_join_get_slice: bool,
    /// Upper bound on arguments of a synthesized call
    pub max_call_args: usize,
    /// Largest element count a dense array may have
    pub max_dense_elements: u32,
    /// Largest array length allocated with its elements up front
    pub eager_allocation_max_length: u32,
    /// Largest typed object allocated inline
    pub inline_typed_object_max_size: u32,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            inline_natives: true,
            execution_mode: ExecutionMode::Sequential,
            inline_fork_join_get_slice: true,
            max_call_args: 500 * 1000,
            max_dense_elements: 1 << 28,
            eager_allocation_max_length: 126,
            inline_typed_object_max_size: 128,
        }
    }
}

impl InlineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parallel() -> Self {
        Self {
            execution_mode: ExecutionMode::Parallel,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: InlineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_call_args == 0 {
            return Err(Error::Config("max_call_args must be positive".into()));
        }
        if self.eager_allocation_max_length >= self.max_dense_elements {
            return Err(Error::Config(format!(
                "eager_allocation_max_length ({}) must be below max_dense_elements ({})",
                self.eager_allocation_max_length, self.max_dense_elements
            )));
        }
        Ok(())
    }

    pub fn is_parallel(&self) -> bool {
        self.execution_mode == ExecutionMode::Parallel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InlineConfig::default();
        assert!(config.inline_natives);
        assert!(!config.is_parallel());
        assert_eq!(config.max_call_args, 500_000);
        assert!(InlineConfig::parallel().is_parallel());
    }

    #[test]
    fn test_from_json_partial() {
        let config = InlineConfig::from_json(r#"{"execution_mode": "parallel"}"#).unwrap();
        assert!(config.is_parallel());
        assert_eq!(config.eager_allocation_max_length, 126);
    }

    #[test]
    fn test_from_json_rejects_bad_limits() {
        let err = InlineConfig::from_json(r#"{"max_call_args": 0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(InlineConfig::from_json("{not json").is_err());
    }
}
