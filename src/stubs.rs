//! Shared helper stubs used by specialized regexp operations
//!
//! Stubs are created lazily by whichever compilation needs them first and are
//! then shared read-only. Two compilations racing to create the same stub
//! both build one; the first installed wins and the other copy is dropped.

use crate::env::InlineEnv;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StubKind {
    RegExpExec,
    RegExpTest,
}

impl fmt::Display for StubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StubKind::RegExpExec => write!(f, "regexp-exec"),
            StubKind::RegExpTest => write!(f, "regexp-test"),
        }
    }
}

/// Handle to generated helper code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubCode {
    pub kind: StubKind,
    pub id: u64,
}

/// Process-wide stub slots, one per kind
#[derive(Debug, Default)]
pub struct SharedStubs {
    regexp_exec: OnceLock<Arc<StubCode>>,
    regexp_test: OnceLock<Arc<StubCode>>,
}

impl SharedStubs {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: StubKind) -> &OnceLock<Arc<StubCode>> {
        match kind {
            StubKind::RegExpExec => &self.regexp_exec,
            StubKind::RegExpTest => &self.regexp_test,
        }
    }

    pub fn get(&self, kind: StubKind) -> Option<Arc<StubCode>> {
        self.slot(kind).get().cloned()
    }

    /// Return the stub of `kind`, creating it through `env` if it does not exist yet
    pub fn ensure(&self, kind: StubKind, env: &dyn InlineEnv) -> Result<Arc<StubCode>> {
        let slot = self.slot(kind);
        if let Some(stub) = slot.get() {
            return Ok(Arc::clone(stub));
        }
        let created = Arc::new(env.create_stub(kind)?);
        tracing::debug!(%kind, id = created.id, "created shared stub");
        Ok(Arc::clone(slot.get_or_init(|| created)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;
    use crate::error::Error;

    #[test]
    fn test_ensure_creates_once() {
        let stubs = SharedStubs::new();
        let env = StaticEnv::new();
        assert!(stubs.get(StubKind::RegExpExec).is_none());

        let first = stubs.ensure(StubKind::RegExpExec, &env).unwrap();
        let second = stubs.ensure(StubKind::RegExpExec, &env).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(stubs.get(StubKind::RegExpTest).is_none());
    }

    #[test]
    fn test_ensure_reports_failure() {
        let stubs = SharedStubs::new();
        let env = StaticEnv::new().with_failing_stubs();
        let err = stubs.ensure(StubKind::RegExpTest, &env).unwrap_err();
        assert!(matches!(err, Error::StubUnavailable { kind: StubKind::RegExpTest, .. }));
        assert!(stubs.get(StubKind::RegExpTest).is_none());
    }

    #[test]
    fn test_concurrent_ensure_agrees() {
        let stubs = Arc::new(SharedStubs::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stubs = Arc::clone(&stubs);
                std::thread::spawn(move || {
                    let env = StaticEnv::new();
                    stubs.ensure(StubKind::RegExpExec, &env).unwrap()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for stub in &results[1..] {
            assert!(Arc::ptr_eq(stub, &results[0]));
        }
    }
}
