//! Scenario files: loading, building and specializing call sites from JSON

use callopt::call::{CallKind, CallSiteId};
use callopt::mir::MirOp;
use callopt::natives::NativeId;
use callopt::scenario::OperandSpec;
use callopt::types::{MirType, ScalarType};
use callopt::value::{Callee, ConstValue, JsFunction};
use callopt::{Error, InliningStatus, Scenario, SharedStubs};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_scenario(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

const CHAR_CODE_AT: &str = r#"{
    "name": "constant charCodeAt",
    "site": 12,
    "callee": { "function": { "object": { "id": 1, "class": "function" },
                "kind": { "native": { "native": "string_char_code_at" } } } },
    "this": { "constant": { "string": "AB" } },
    "args": [ { "constant": { "int32": 1 } } ],
    "result_types": { "primitives": "INT32" }
}"#;

#[test]
fn test_load_from_file_and_specialize() {
    let file = write_scenario(CHAR_CODE_AT);
    let scenario = Scenario::from_file(file.path()).unwrap();
    assert_eq!(scenario.name.as_deref(), Some("constant charCodeAt"));
    assert_eq!(scenario.site, CallSiteId(12));

    let mut built = scenario.build().unwrap();
    let status = built.specialize(&SharedStubs::new()).unwrap();
    assert_eq!(status, InliningStatus::Inlined);

    let top = built.builder.peek().unwrap();
    assert_eq!(built.builder.constant(top), Some(&ConstValue::Int32(66)));
    assert!(built.builder.is_call_dead(CallSiteId(12)));
}

#[test]
fn test_graph_dump_lists_resume_points() {
    let json = r#"{
        "callee": { "function": { "object": { "id": 1, "class": "function" },
                    "kind": { "native": { "native": "atomics_store" } } } },
        "args": [
            { "ty": "object", "types": { "objects": [ { "id": 4, "class": { "shared_typed_array": "int32" } } ] } },
            { "ty": "int32" },
            { "ty": "double" }
        ],
        "result_types": { "primitives": "INT32" }
    }"#;
    let mut built = Scenario::from_json(json).unwrap().build().unwrap();
    assert_eq!(built.specialize(&SharedStubs::new()).unwrap(), InliningStatus::Inlined);

    let dump = built.builder.graph().to_string();
    assert!(dump.contains("rp0 after"), "{}", dump);
    assert_eq!(
        built
            .builder
            .graph()
            .count_ops(|op| matches!(op, MirOp::StoreTypedArrayElement { scalar: ScalarType::Int32, .. })),
        1
    );
}

#[test]
fn test_failing_stub_is_an_error() {
    let json = r#"{
        "callee": { "function": { "object": { "id": 1, "class": "function" },
                    "kind": { "native": { "native": "reg_exp_test" } } } },
        "this": { "ty": "object", "types": { "objects": [ { "id": 2, "class": "reg_exp" } ] } },
        "args": [ { "ty": "string" } ],
        "result_types": { "primitives": "BOOLEAN" },
        "env": { "fail_stub_creation": true }
    }"#;
    let mut built = Scenario::from_json(json).unwrap().build().unwrap();
    let err = built.specialize(&SharedStubs::new()).unwrap_err();
    assert!(matches!(err, Error::StubUnavailable { .. }));
    assert!(!err.is_graph_invariant());
}

#[test]
fn test_config_section_is_validated() {
    let json = r#"{
        "callee": { "function": { "object": { "id": 1, "class": "function" },
                    "kind": { "interpreted": {} } } },
        "config": { "max_call_args": 0 }
    }"#;
    assert!(matches!(Scenario::from_json(json), Err(Error::Config(_))));

    let file = write_scenario("{ not json");
    assert!(matches!(Scenario::from_file(file.path()), Err(Error::Json { .. })));
}

#[test]
fn test_getter_scenarios_take_no_arguments() {
    let scenario = Scenario {
        name: None,
        site: CallSiteId(0),
        callee: Callee::Function(JsFunction::native(1, NativeId::TypedArrayLengthGetter(ScalarType::Int8))),
        this: Some(OperandSpec::of(MirType::Object)),
        args: vec![OperandSpec::of(MirType::Int32)],
        constructing: false,
        kind: CallKind::Getter,
        result_types: None,
        result_use: Default::default(),
        env: Default::default(),
        config: Default::default(),
        frame: None,
    };
    assert!(matches!(scenario.build(), Err(Error::Scenario(_))));

    let scenario = Scenario {
        args: vec![],
        ..scenario
    };
    let mut built = scenario.build().unwrap();
    // No observed types for the receiver, so the getter stays generic
    assert_eq!(built.specialize(&SharedStubs::new()).unwrap(), InliningStatus::NotInlined);
}

#[test]
fn test_missing_file_is_a_scenario_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scenario::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Scenario(_)));
}
