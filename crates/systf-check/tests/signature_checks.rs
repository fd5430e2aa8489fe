use systf_check::diagnostics::DiagnosticKind;
use systf_check::host::{Handle, HostFault};
use systf_check::signature::{
    no_arg_compiletf, one_numeric_arg_compiletf, one_opt_numeric_arg_compiletf,
    one_string_arg_compiletf, two_numeric_args_compiletf, ArgPredicate,
};
use systf_check::trace::{TraceBuilder, TraceHost};
use systf_contracts::{COMPILETF_OK, FINISH_CODE_ERROR, SYSTF_TRACE_SCHEMA_VERSION};
use systf_objects::{ConstKind, ObjectKind};

type Compiletf = fn(&mut TraceHost, &str) -> Result<i32, HostFault>;
type MakeArg = fn(&mut TraceBuilder, Handle) -> Handle;

/// Builds a trace holding one call in module `top` at top.v line 5, with the
/// arguments `args` creates, and makes that call current.
fn single_call(routine: &str, args: impl FnOnce(&mut TraceBuilder, Handle) -> Vec<Handle>) -> TraceHost {
    let mut b = TraceBuilder::new();
    let top = b.module("top");
    let list = args(&mut b, top);
    let call = b.call(routine, "top.v", 5, top, &list);
    let mut host = b.build_host().expect("build trace host");
    host.enter(call);
    host
}

fn run(check: Compiletf, host: &mut TraceHost, routine: &str) {
    let status = check(host, routine).expect("no host fault");
    assert_eq!(status, COMPILETF_OK);
}

fn kinds(host: &TraceHost) -> Vec<DiagnosticKind> {
    host.diagnostics().iter().map(|d| d.kind).collect()
}

#[test]
fn no_arg_accepts_empty_call() {
    let mut host = single_call("$time", |_, _| Vec::new());
    run(no_arg_compiletf::<TraceHost>, &mut host, "$time");
    assert!(host.diagnostics().is_empty());
    assert!(host.output().is_empty());
    assert_eq!(host.finish_code(), None);
}

#[test]
fn no_arg_reports_any_argument_once() {
    let mut host = single_call("$time", |b, top| vec![b.object(ObjectKind::Memory, top)]);
    run(no_arg_compiletf::<TraceHost>, &mut host, "$time");
    assert_eq!(kinds(&host), vec![DiagnosticKind::ExtraArguments { count: 1 }]);
    assert_eq!(
        host.output(),
        &[
            "ERROR: top.v line 5: $time does not take an argument.".to_string(),
            format!("{}Found 1 extra argument.", " ".repeat("ERROR: top.v line 5: ".len())),
        ]
    );
    assert_eq!(host.finish_code(), Some(FINISH_CODE_ERROR));

    let mut host = single_call("$time", |b, top| {
        vec![
            b.constant(ConstKind::String, top),
            b.object(ObjectKind::Reg, top),
            b.object(ObjectKind::Module, top),
        ]
    });
    run(no_arg_compiletf::<TraceHost>, &mut host, "$time");
    assert_eq!(kinds(&host), vec![DiagnosticKind::ExtraArguments { count: 3 }]);
    assert!(host.output()[1].ends_with("Found 3 extra arguments."));
}

#[test]
fn one_numeric_missing_argument_short_circuits() {
    let mut host = single_call("$dumplimit", |_, _| Vec::new());
    run(one_numeric_arg_compiletf::<TraceHost>, &mut host, "$dumplimit");
    assert_eq!(kinds(&host), vec![DiagnosticKind::MissingRequiredArgument]);
    assert_eq!(
        host.output(),
        &["ERROR: top.v line 5: $dumplimit requires a single numeric argument.".to_string()]
    );
    assert_eq!(host.finish_code(), Some(FINISH_CODE_ERROR));
    assert_eq!(host.finish_requests(), 1);
}

#[test]
fn one_numeric_rejects_string_constant() {
    let mut host = single_call("$itor", |b, top| vec![b.constant(ConstKind::String, top)]);
    run(one_numeric_arg_compiletf::<TraceHost>, &mut host, "$itor");
    assert_eq!(
        kinds(&host),
        vec![DiagnosticKind::WrongArgumentType {
            position: 1,
            expected: ArgPredicate::Numeric
        }]
    );
    assert_eq!(
        host.output(),
        &["ERROR: top.v line 5: $itor's argument must be numeric.".to_string()]
    );
    assert!(host.finish_code().is_some());
}

#[test]
fn one_numeric_counts_extra_arguments() {
    let mut host = single_call("$itor", |b, top| {
        vec![b.object(ObjectKind::Reg, top), b.object(ObjectKind::Net, top)]
    });
    run(one_numeric_arg_compiletf::<TraceHost>, &mut host, "$itor");
    assert_eq!(kinds(&host), vec![DiagnosticKind::ExtraArguments { count: 1 }]);
    assert_eq!(host.output()[0], "ERROR: top.v line 5: $itor takes a single numeric argument.");
    assert!(host.output()[1].ends_with(" 1 extra argument."));

    let mut host = single_call("$itor", |b, top| {
        vec![
            b.constant(ConstKind::Decimal, top),
            b.object(ObjectKind::Net, top),
            b.constant(ConstKind::String, top),
        ]
    });
    run(one_numeric_arg_compiletf::<TraceHost>, &mut host, "$itor");
    assert_eq!(kinds(&host), vec![DiagnosticKind::ExtraArguments { count: 2 }]);
    assert!(host.output()[1].ends_with(" 2 extra arguments."));
}

#[test]
fn one_numeric_keeps_checking_after_wrong_type() {
    let mut host = single_call("$rtoi", |b, top| {
        vec![b.object(ObjectKind::Module, top), b.object(ObjectKind::Reg, top)]
    });
    run(one_numeric_arg_compiletf::<TraceHost>, &mut host, "$rtoi");
    assert_eq!(
        kinds(&host),
        vec![
            DiagnosticKind::WrongArgumentType {
                position: 1,
                expected: ArgPredicate::Numeric
            },
            DiagnosticKind::ExtraArguments { count: 1 },
        ]
    );
    assert_eq!(host.output().len(), 3);
    assert_eq!(host.finish_code(), Some(FINISH_CODE_ERROR));
    assert_eq!(host.finish_requests(), 2);
}

#[test]
fn optional_numeric_allows_absence_and_real_values() {
    let mut host = single_call("$finish", |_, _| Vec::new());
    run(one_opt_numeric_arg_compiletf::<TraceHost>, &mut host, "$finish");
    assert!(host.diagnostics().is_empty());
    assert_eq!(host.finish_code(), None);

    let mut host = single_call("$finish", |b, top| vec![b.object(ObjectKind::RealVar, top)]);
    run(one_opt_numeric_arg_compiletf::<TraceHost>, &mut host, "$finish");
    assert!(host.diagnostics().is_empty());
}

#[test]
fn optional_numeric_reports_type_and_extras() {
    let mut host = single_call("$stop", |b, top| {
        vec![
            b.parameter(ConstKind::String, top),
            b.constant(ConstKind::Int, top),
            b.constant(ConstKind::Int, top),
        ]
    });
    run(one_opt_numeric_arg_compiletf::<TraceHost>, &mut host, "$stop");
    assert_eq!(host.output()[0], "ERROR: top.v line 5: $stop's argument must be numeric.");
    assert_eq!(host.output()[1], "ERROR: top.v line 5: $stop takes at most one numeric argument.");
    assert!(host.output()[2].ends_with("Found 2 extra arguments."));
}

#[test]
fn two_numeric_without_arguments_uses_combined_message() {
    let mut host = single_call("$pow", |_, _| Vec::new());
    run(two_numeric_args_compiletf::<TraceHost>, &mut host, "$pow");
    assert_eq!(kinds(&host), vec![DiagnosticKind::MissingRequiredArgument]);
    assert_eq!(
        host.output(),
        &["ERROR: top.v line 5: $pow requires two numeric arguments.".to_string()]
    );
}

#[test]
fn two_numeric_missing_second_is_distinct() {
    let mut host = single_call("$pow", |b, top| vec![b.object(ObjectKind::IntegerVar, top)]);
    run(two_numeric_args_compiletf::<TraceHost>, &mut host, "$pow");
    assert_eq!(
        kinds(&host),
        vec![DiagnosticKind::MissingSecondArgument { position: 2 }]
    );
    assert_eq!(
        host.output(),
        &["ERROR: top.v line 5: $pow requires a second (numeric) argument.".to_string()]
    );
    assert_eq!(host.finish_code(), Some(FINISH_CODE_ERROR));
}

#[test]
fn two_numeric_reports_first_type_then_missing_second() {
    let mut host = single_call("$atan2", |b, top| vec![b.constant(ConstKind::String, top)]);
    run(two_numeric_args_compiletf::<TraceHost>, &mut host, "$atan2");
    assert_eq!(
        kinds(&host),
        vec![
            DiagnosticKind::WrongArgumentType {
                position: 1,
                expected: ArgPredicate::Numeric
            },
            DiagnosticKind::MissingSecondArgument { position: 2 },
        ]
    );
    assert_eq!(host.output()[0], "ERROR: top.v line 5: $atan2's first argument must be numeric.");
}

#[test]
fn two_numeric_reports_every_bad_position() {
    let mut host = single_call("$hypot", |b, top| {
        vec![
            b.object(ObjectKind::Task, top),
            b.parameter(ConstKind::String, top),
            b.object(ObjectKind::TimeVar, top),
        ]
    });
    run(two_numeric_args_compiletf::<TraceHost>, &mut host, "$hypot");
    assert_eq!(
        host.output()[..3],
        [
            "ERROR: top.v line 5: $hypot's first argument must be numeric.".to_string(),
            "ERROR: top.v line 5: $hypot's second argument must be numeric.".to_string(),
            "ERROR: top.v line 5: $hypot takes two numeric arguments.".to_string(),
        ]
    );
    assert!(host.output()[3].ends_with("Found 1 extra argument."));
    assert_eq!(host.diagnostics().len(), 3);
}

#[test]
fn one_string_accepts_string_capable_objects() {
    let makers: [MakeArg; 4] = [
        |b, top| b.constant(ConstKind::String, top),
        |b, top| b.constant(ConstKind::Binary, top),
        |b, top| b.object(ObjectKind::Reg, top),
        |b, top| b.object(ObjectKind::PartSelect, top),
    ];
    for make in makers {
        let mut host = single_call("$dumpfile", |b, top| vec![make(b, top)]);
        run(one_string_arg_compiletf::<TraceHost>, &mut host, "$dumpfile");
        assert!(host.diagnostics().is_empty(), "{:?}", host.output());
    }
}

#[test]
fn one_string_rejects_real_and_numeric_literals() {
    let makers: [MakeArg; 2] = [
        |b, top| b.object(ObjectKind::RealVar, top),
        |b, top| b.constant(ConstKind::Decimal, top),
    ];
    for make in makers {
        let mut host = single_call("$dumpfile", |b, top| vec![make(b, top)]);
        run(one_string_arg_compiletf::<TraceHost>, &mut host, "$dumpfile");
        assert_eq!(
            host.output(),
            &["ERROR: top.v line 5: $dumpfile's argument must be a string.".to_string()]
        );
    }

    let mut host = single_call("$dumpfile", |_, _| Vec::new());
    run(one_string_arg_compiletf::<TraceHost>, &mut host, "$dumpfile");
    assert_eq!(
        host.output(),
        &["ERROR: top.v line 5: $dumpfile requires a single string argument.".to_string()]
    );
}

#[test]
fn no_current_call_is_a_host_fault() {
    let mut b = TraceBuilder::new();
    let top = b.module("top");
    b.call("$time", "top.v", 1, top, &[]);
    let mut host = b.build_host().unwrap();
    assert_eq!(
        no_arg_compiletf(&mut host, "$time"),
        Err(HostFault::NoCurrentCall)
    );
    assert!(host.output().is_empty());
}

#[test]
fn constant_without_subtype_is_a_host_fault() {
    let text = format!(
        r#"{{"schema_version":"{SYSTF_TRACE_SCHEMA_VERSION}",
            "objects":[{{"id":1,"kind":"module"}},{{"id":2,"kind":"constant","scope":1}}],
            "calls":[{{"id":3,"routine":"$itor","file":"t.v","line":2,"scope":1,"args":[2]}}]}}"#
    );
    let mut host = TraceHost::from_json(text.as_bytes()).unwrap();
    let call = Handle::new(3).unwrap();
    host.enter(call);
    let err = one_numeric_arg_compiletf(&mut host, "$itor").unwrap_err();
    assert_eq!(
        err,
        HostFault::MissingConstKind {
            handle: Handle::new(2).unwrap(),
            kind: ObjectKind::Constant
        }
    );
    assert!(host.diagnostics().is_empty());
}
