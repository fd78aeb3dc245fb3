//! Facts the specializer asks of the engine around it

use crate::call::CallSiteId;
use crate::error::{Error, Result};
use crate::natives::NativeId;
use crate::stubs::{StubCode, StubKind};
use crate::types::ClassId;
use crate::value::{ObjectId, ObjectRef, TemplateObject};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Engine services consulted while specializing a call
pub trait InlineEnv {
    /// Whether the object lives in the young generation and may move, so it
    /// cannot be baked into compiled code as a constant
    fn is_short_lived(&self, object: &ObjectRef) -> bool;

    /// Object sampled at `site` by the baseline tier for calls to `native`
    fn template_object_for(&self, site: CallSiteId, native: NativeId) -> Option<&TemplateObject>;

    /// Object sampled at `site` for a construct hook of `class`
    fn template_object_for_class_hook(
        &self,
        site: CallSiteId,
        class: ClassId,
    ) -> Option<&TemplateObject>;

    /// Whether the array prototype chain has indexed properties
    fn array_prototype_has_indexed_property(&self) -> bool;

    fn create_stub(&self, kind: StubKind) -> Result<StubCode>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteTemplate {
    pub site: CallSiteId,
    pub native: NativeId,
    pub template: TemplateObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassHookTemplate {
    pub site: CallSiteId,
    pub class: ClassId,
    pub template: TemplateObject,
}

/// Environment backed by fixed tables, used by the CLI and tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticEnv {
    pub short_lived: FxHashSet<ObjectId>,
    pub templates: Vec<SiteTemplate>,
    pub class_hook_templates: Vec<ClassHookTemplate>,
    pub indexed_array_prototype: bool,
    pub fail_stub_creation: bool,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_short_lived(mut self, id: ObjectId) -> Self {
        self.short_lived.insert(id);
        self
    }

    pub fn with_template(mut self, site: CallSiteId, native: NativeId, template: TemplateObject) -> Self {
        self.templates.push(SiteTemplate {
            site,
            native,
            template,
        });
        self
    }

    pub fn with_class_hook_template(
        mut self,
        site: CallSiteId,
        class: ClassId,
        template: TemplateObject,
    ) -> Self {
        self.class_hook_templates.push(ClassHookTemplate {
            site,
            class,
            template,
        });
        self
    }

    pub fn with_indexed_array_prototype(mut self) -> Self {
        self.indexed_array_prototype = true;
        self
    }

    pub fn with_failing_stubs(mut self) -> Self {
        self.fail_stub_creation = true;
        self
    }
}

impl InlineEnv for StaticEnv {
    fn is_short_lived(&self, object: &ObjectRef) -> bool {
        self.short_lived.contains(&object.id)
    }

    fn template_object_for(&self, site: CallSiteId, native: NativeId) -> Option<&TemplateObject> {
        self.templates
            .iter()
            .find(|t| t.site == site && t.native == native)
            .map(|t| &t.template)
    }

    fn template_object_for_class_hook(
        &self,
        site: CallSiteId,
        class: ClassId,
    ) -> Option<&TemplateObject> {
        self.class_hook_templates
            .iter()
            .find(|t| t.site == site && t.class == class)
            .map(|t| &t.template)
    }

    fn array_prototype_has_indexed_property(&self) -> bool {
        self.indexed_array_prototype
    }

    fn create_stub(&self, kind: StubKind) -> Result<StubCode> {
        if self.fail_stub_creation {
            return Err(Error::StubUnavailable {
                kind,
                reason: "code allocation failed".into(),
            });
        }
        Ok(StubCode {
            kind,
            id: kind as u64 + 1,
        })
    }
}
