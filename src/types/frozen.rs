//! Type facts a specialization relies on
//!
//! Feasibility queries never register constraints on their own. They hand
//! back a [`Frozen`] value that carries the dependencies the answer rests on.
//! A specializer gathers them into a [`Dependencies`] list and passes it to
//! the builder when it commits, so a declined specialization leaves no trace.

use super::{ObjectFlags, TypeObjectId};
use std::fmt;

/// A single type fact that must stay true for compiled code to remain valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    /// None of `flags` may become set on the type object
    ObjectFlagsClear {
        object: TypeObjectId,
        flags: ObjectFlags,
    },
    /// The element type set of the type object may not grow
    ElementTypes { object: TypeObjectId },
    /// The array prototype chain may not acquire indexed properties
    NoIndexedPrototypeProperties,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::ObjectFlagsClear { object, flags } => {
                write!(f, "flags-clear {} {:?}", object, flags)
            }
            Dependency::ElementTypes { object } => write!(f, "element-types {}", object),
            Dependency::NoIndexedPrototypeProperties => write!(f, "no-indexed-proto"),
        }
    }
}

/// Ordered, duplicate-free list of dependencies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dependencies {
    items: Vec<Dependency>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dep: Dependency) {
        if !self.items.contains(&dep) {
            self.items.push(dep);
        }
    }

    pub fn extend<I: IntoIterator<Item = Dependency>>(&mut self, deps: I) {
        for dep in deps {
            self.push(dep);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.items.iter()
    }

    pub fn contains(&self, dep: &Dependency) -> bool {
        self.items.contains(dep)
    }
}

/// Answer to a type query together with the facts it depends on
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Frozen<T> {
    value: T,
    deps: Vec<Dependency>,
}

impl<T> Frozen<T> {
    pub fn new(value: T, deps: Vec<Dependency>) -> Self {
        Self { value, deps }
    }

    /// An answer that stays valid whatever happens to the type sets
    pub fn stable(value: T) -> Self {
        Self {
            value,
            deps: Vec::new(),
        }
    }

    /// Take the answer, adding its dependencies to `into`
    pub fn record(self, into: &mut Dependencies) -> T {
        into.extend(self.deps);
        self.value
    }

    /// Look at the answer without relying on it
    pub fn peek(&self) -> &T {
        &self.value
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.deps
    }
}
