//! Intrinsics that only specialize inside a fork-join parallel section

use super::classify::{classify, Arity, Operand, Returns, Signature};
use super::{decline, InliningStatus, Inliner, Reject};
use crate::call::CallInfo;
use crate::config::ExecutionMode;
use crate::error::Result;
use crate::mir::{MirBuilder, MirOp};
use crate::natives::NativeId;
use crate::types::{Dependencies, MirType, TypeSet};
use crate::value::ConstValue;
use std::sync::Arc;

fn require_parallel(inliner: &Inliner<'_>) -> std::result::Result<(), Reject> {
    match inliner.config().execution_mode {
        ExecutionMode::Parallel => Ok(()),
        mode => Err(Reject::ExecutionMode(mode)),
    }
}

/// Answers "are we in a parallel section" for the self-hosted checks and
/// the testing function alike. Sequential code keeps the runtime answer.
pub(super) fn inline_force_sequential_or_in_parallel_section(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(builder, call, &Signature::call(Arity::AtLeast(0))));
    check!(require_parallel(inliner));

    let mut emit = builder.commit(call, Dependencies::new())?;
    emit.push_constant(ConstValue::Boolean(true));
    emit.finish()
}

pub(super) fn inline_fork_join_get_slice(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(require_parallel(inliner));
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Int32])
            .returns(Returns::Exactly(MirType::Int32))
    ));
    if !inliner.config().inline_fork_join_get_slice {
        return decline(Reject::Disabled);
    }

    let mut emit = builder.commit(call, Dependencies::new())?;
    let cx = emit.fork_join_context();
    let slice = emit.add(MirOp::ForkJoinGetSlice, &[cx], MirType::Int32);
    emit.push(slice);
    emit.finish()
}

pub(super) fn inline_new_dense_array(
    inliner: &Inliner<'_>,
    builder: &mut MirBuilder,
    call: &CallInfo,
) -> Result<InliningStatus> {
    check!(classify(
        builder,
        call,
        &Signature::call(Arity::Exact(1))
            .args(&[Operand::Int32])
            .returns(Returns::Exactly(MirType::Object))
    ));
    check!(require_parallel(inliner));

    let Some(result_object) = call.result_types.single_object() else {
        return decline(Reject::Shape("result is not a single known object"));
    };
    let Some(template) = inliner.env().template_object_for(call.site, NativeId::NewDenseArray) else {
        return decline(Reject::Shape("no template object"));
    };
    require!(
        template.type_object.id == result_object.id,
        "template does not match the observed result"
    );
    let template_value = ConstValue::Object(template.object.clone());
    let template_types = Arc::new(TypeSet::empty().with_object(Arc::clone(&template.type_object)));

    let mut emit = builder.commit(call, Dependencies::new())?;
    let cx = emit.fork_join_context();
    let template = emit.constant(template_value);
    let array = emit.add_with_types(
        MirOp::NewDenseArrayPar,
        &[cx, call.arg(0), template],
        MirType::Object,
        template_types,
    );
    emit.push(array);
    emit.resume_after(array)?;
    emit.finish()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Harness, SITE};
    use super::*;
    use crate::config::InlineConfig;
    use crate::env::StaticEnv;
    use crate::types::{ClassId, ObjectKey};
    use crate::value::{ObjectRef, TemplateObject};

    fn parallel() -> Harness {
        let mut h = Harness::new();
        h.config = InlineConfig::parallel();
        h
    }

    #[test]
    fn test_in_parallel_section_depends_on_mode() {
        let mut h = parallel();
        let call = h.call(vec![], TypeSet::of(MirType::Boolean));
        assert_eq!(h.run(NativeId::InParallelSection, &call).unwrap(), InliningStatus::Inlined);
        assert_eq!(h.builder.constant(h.result()), Some(&ConstValue::Boolean(true)));

        let mut h = Harness::new();
        let call = h.call(vec![], TypeSet::of(MirType::Boolean));
        assert_eq!(h.run(NativeId::ShouldForceSequential, &call).unwrap(), InliningStatus::NotInlined);
        assert_eq!(h.run(NativeId::TestingInParallelSection, &call).unwrap(), InliningStatus::NotInlined);
    }

    #[test]
    fn test_get_slice_shares_the_context() {
        let mut h = parallel();
        let n = h.param(MirType::Int32);
        let first = h.call(vec![n], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ForkJoinGetSlice, &first).unwrap(), InliningStatus::Inlined);
        assert_eq!(h.result_op(), &MirOp::ForkJoinGetSlice);

        let mut second = h.call(vec![n], TypeSet::of(MirType::Int32));
        second.site = crate::call::CallSiteId(8);
        h.run(NativeId::ForkJoinGetSlice, &second).unwrap();
        assert_eq!(h.count(|op| matches!(op, MirOp::ForkJoinContext)), 1);
    }

    #[test]
    fn test_get_slice_declines_when_disabled_or_sequential() {
        let mut h = parallel();
        h.config.inline_fork_join_get_slice = false;
        let n = h.param(MirType::Int32);
        let call = h.call(vec![n], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ForkJoinGetSlice, &call).unwrap(), InliningStatus::NotInlined);

        let mut h = Harness::new();
        let n = h.param(MirType::Int32);
        let call = h.call(vec![n], TypeSet::of(MirType::Int32));
        assert_eq!(h.run(NativeId::ForkJoinGetSlice, &call).unwrap(), InliningStatus::NotInlined);
    }

    #[test]
    fn test_new_dense_array_needs_matching_template() {
        let key = Arc::new(ObjectKey::new(9, ClassId::Array));
        let template = TemplateObject::new(ObjectRef::new(90, ClassId::Array), Arc::clone(&key));

        let mut h = parallel();
        h.env = StaticEnv::new().with_template(SITE, NativeId::NewDenseArray, template);
        let n = h.param(MirType::Int32);
        let call = h.call(vec![n], TypeSet::empty().with_object(Arc::clone(&key)));
        assert_eq!(h.run(NativeId::NewDenseArray, &call).unwrap(), InliningStatus::Inlined);
        assert_eq!(h.result_op(), &MirOp::NewDenseArrayPar);
        h.assert_effects_resumable();

        let other = Arc::new(ObjectKey::new(10, ClassId::Array));
        let mut h2 = parallel();
        h2.env = h.env.clone();
        let n = h2.param(MirType::Int32);
        let call = h2.call(vec![n], TypeSet::empty().with_object(other));
        assert_eq!(h2.run(NativeId::NewDenseArray, &call).unwrap(), InliningStatus::NotInlined);
    }
}
