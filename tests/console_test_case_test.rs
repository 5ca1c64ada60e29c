//! Integration tests for ConsoleTestCase against the fixture application.

use std::path::PathBuf;
use std::sync::Arc;

use rstest::{fixture, rstest};

use console_harness::application::{ApplicationError, ApplicationResult};
use console_harness::config::AppConfig;
use console_harness::domain::{ParamValue, RouteMatch};
use console_harness::harness::{ConsoleTestCase, HarnessError, STATUS_DOMAIN_MESSAGE};
use console_harness::infrastructure::Console;
use console_harness::util::testing;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[fixture]
fn test_case() -> ConsoleTestCase {
    testing::init_test_setup();
    let config = AppConfig::from_file(&fixture_path("application.toml")).expect("fixture config");
    let mut test = ConsoleTestCase::new();
    test.set_application_config(config).expect("set config");
    test.set_up().expect("set up");
    test
}

fn assertion_message(err: HarnessError) -> String {
    assert!(err.is_assertion(), "expected assertion failure, got {err:?}");
    err.to_string()
}

#[rstest]
fn given_harness_when_created_then_uses_console_request(test_case: ConsoleTestCase) {
    assert!(test_case.use_console_request());
}

#[rstest]
fn given_successful_dispatch_when_asserting_status_then_reports_actual_code(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("--console").unwrap();
    test_case.assert_response_status_code(0).unwrap();

    let message = assertion_message(test_case.assert_response_status_code(1).unwrap_err());
    assert!(message.contains(r#"actual status code is "0""#), "{message}");
}

#[rstest]
fn given_successful_dispatch_when_asserting_not_status_then_fails_on_equal(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("--console").unwrap();
    test_case.assert_not_response_status_code(1).unwrap();

    let message = assertion_message(test_case.assert_not_response_status_code(0).unwrap_err());
    assert!(message.contains(r#"actual status code is "0""#), "{message}");
}

#[rstest]
fn given_failing_dispatch_when_asserting_status_then_reports_error_code(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("fail disk").unwrap();
    test_case.assert_response_status_code(1).unwrap();
    test_case.assert_not_response_status_code(0).unwrap();
    test_case.assert_console_output_contains("failed: disk").unwrap();

    let message = assertion_message(test_case.assert_response_status_code(0).unwrap_err());
    assert!(message.contains(r#"actual status code is "1""#), "{message}");
}

#[rstest]
fn given_unmatched_command_when_dispatching_then_error_status_and_usage(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("does-not-exist --at-all").unwrap();

    test_case.assert_response_status_code(1).unwrap();
    test_case.assert_console_output_contains("Console test application").unwrap();
    test_case.assert_console_output_contains("Usage:").unwrap();
    test_case
        .assert_console_output_contains("Reason for failure: Invalid arguments or no arguments provided")
        .unwrap();
    assert!(test_case.route_match().is_none());
    let message = assertion_message(test_case.assert_matched_route_name("console").unwrap_err());
    assert!(message.contains("no route matched"), "{message}");
}

#[rstest]
#[case("--console", 2)]
#[case("--console", -1)]
#[case("--console", 255)]
#[case("fail", 2)]
#[case("fail", -1)]
#[case("fail", 255)]
fn given_bad_code_when_asserting_status_then_usage_error(
    mut test_case: ConsoleTestCase,
    #[case] command: &str,
    #[case] code: i32,
) {
    test_case.dispatch(command).unwrap();

    let err = test_case.assert_response_status_code(code).unwrap_err();
    assert!(err.is_usage());
    assert_eq!(
        err.to_string(),
        "Console status code assert value must be 0 (valid) or 1 (error)"
    );

    let err = test_case.assert_not_response_status_code(code).unwrap_err();
    assert!(err.is_usage());
    assert_eq!(err.to_string(), STATUS_DOMAIN_MESSAGE);
}

#[rstest]
fn given_output_when_asserting_contains_then_reports_actual_content(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("--console").unwrap();
    test_case.assert_console_output_contains("foo").unwrap();
    test_case.assert_console_output_contains("foo, bar").unwrap();

    let message = assertion_message(test_case.assert_console_output_contains("baz").unwrap_err());
    assert!(message.contains(r#"actual content is "foo, bar"#), "{message}");
}

#[rstest]
fn given_output_when_asserting_not_contains_then_fails_on_substring(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("--console").unwrap();
    test_case.assert_not_console_output_contains("baz").unwrap();

    let message = assertion_message(test_case.assert_not_console_output_contains("foo").unwrap_err());
    assert!(message.contains(r#"actual content is "foo, bar"#), "{message}");
}

#[rstest]
#[case(r#"filter --date="2013-03-07 00:00:00" --id=10 --text="custom text""#)]
#[case(r#"filter --date "2013-03-07 00:00:00" --id=10 --text="custom text""#)]
fn given_value_arguments_when_dispatching_then_route_match_has_values(
    mut test_case: ConsoleTestCase,
    #[case] command: &str,
) {
    test_case.dispatch(command).unwrap();

    let route_match = test_case.route_match().expect("Did not receive a route match?");
    assert_eq!(route_match.matched_route_name(), Some("arguments"));
    assert_eq!(route_match.param("date").as_str(), Some("2013-03-07 00:00:00"));
    assert_eq!(route_match.param("id").as_str(), Some("10"));
    assert_eq!(route_match.param("text").as_str(), Some("custom text"));
    assert_eq!(route_match.param("controller").as_str(), Some("baz"));

    test_case.assert_console_output_contains("text=custom text").unwrap();
}

#[rstest]
fn given_mandatory_values_when_quoted_either_way_after_reset_then_same_route(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("foo --bar='FOO' --baz='ARE'").unwrap();
    let route_match = test_case.route_match().expect("route match");
    assert_eq!(route_match.matched_route_name(), Some("arguments-mandatory"));

    test_case.reset();

    test_case.dispatch(r#"foo --bar="FOO" --baz="ARE""#).unwrap();
    let route_match = test_case.route_match().expect("route match");
    assert_eq!(route_match.matched_route_name(), Some("arguments-mandatory"));
    test_case.assert_console_output_contains("bar=FOO baz=ARE").unwrap();
}

#[rstest]
fn given_literal_flags_when_dispatching_then_booleans_and_absent_values(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("literal --foo --bar").unwrap();
    test_case.assert_matched_route_name("arguments-literal").unwrap();
    let route_match = test_case.route_match().expect("route match");
    assert_eq!(route_match.param("foo").as_bool(), Some(true));
    assert_eq!(route_match.param("bar").as_bool(), Some(true));
    assert_eq!(route_match.param("optional").as_bool(), Some(false));
    assert!(route_match.param("doo").is_absent());

    test_case.reset();

    test_case.dispatch("literal --foo --bar --doo test").unwrap();
    test_case.assert_matched_route_name("arguments-literal").unwrap();
    let route_match = test_case.route_match().expect("route match");
    assert_eq!(route_match.param("foo").as_bool(), Some(true));
    assert_eq!(route_match.param("bar").as_bool(), Some(true));
    assert_eq!(route_match.param("optional").as_bool(), Some(false));
    assert_eq!(route_match.param("doo"), &ParamValue::from("test"));
}

#[rstest]
fn given_wrong_route_name_when_asserting_then_reports_actual_name(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("literal --foo --bar").unwrap();
    test_case.assert_not_matched_route_name("console").unwrap();

    let message = assertion_message(test_case.assert_matched_route_name("console").unwrap_err());
    assert!(
        message.contains(r#"actual matched route name is "arguments-literal""#),
        "{message}"
    );
    assert!(test_case
        .assert_not_matched_route_name("arguments-literal")
        .unwrap_err()
        .is_assertion());
}

#[rstest]
fn given_route_params_when_asserting_param_then_compares_values(mut test_case: ConsoleTestCase) {
    test_case.dispatch("literal --foo --bar --doo test").unwrap();

    test_case.assert_route_param("foo", true).unwrap();
    test_case.assert_route_param("optional", false).unwrap();
    test_case.assert_route_param("doo", "test").unwrap();
    test_case.assert_route_param("missing", ParamValue::Absent).unwrap();

    let message = assertion_message(test_case.assert_route_param("doo", "other").unwrap_err());
    assert!(message.contains(r#"actual value is "test""#), "{message}");
}

#[rstest]
fn given_consecutive_dispatches_without_reset_when_asserting_then_last_result_wins(
    mut test_case: ConsoleTestCase,
) {
    test_case.dispatch("fail").unwrap();
    test_case.assert_response_status_code(1).unwrap();

    test_case.dispatch("--console").unwrap();
    test_case.assert_response_status_code(0).unwrap();
    test_case.assert_not_console_output_contains("failed").unwrap();
    test_case.assert_matched_route_name("console").unwrap();
}

#[rstest]
fn given_reset_when_dispatching_again_then_match_is_independent(mut test_case: ConsoleTestCase) {
    test_case.dispatch("filter --id=10").unwrap();
    assert_eq!(test_case.route_match().unwrap().param("id").as_str(), Some("10"));

    test_case.reset();
    assert!(test_case.route_match().is_none());
    assert!(test_case.dispatch_result().is_none());

    test_case.dispatch("filter --text=x").unwrap();
    let route_match = test_case.route_match().expect("route match");
    assert!(route_match.param("id").is_absent());
    assert_eq!(route_match.param("text").as_str(), Some("x"));
}

#[rstest]
fn given_status_outside_domain_when_dispatching_then_assertion_failure(
    mut test_case: ConsoleTestCase,
) {
    let err = test_case.dispatch("exit 2").unwrap_err();

    let message = assertion_message(err);
    assert!(message.contains(r#"returned status code "2""#), "{message}");
    assert!(test_case.dispatch_result().is_none());
    assert!(test_case.assert_response_status_code(0).unwrap_err().is_usage());
}

#[rstest]
fn given_failing_handler_when_dispatching_then_error_propagates_and_capture_ends(
    mut test_case: ConsoleTestCase,
) {
    test_case
        .register_handler(
            "console",
            Arc::new(|_: &RouteMatch, console: &Console| -> ApplicationResult<i32> {
                console.write("partial").ok();
                Err(ApplicationError::handler("console", "exploded"))
            }),
        )
        .unwrap();

    let err = test_case.dispatch("--console").unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Application(ApplicationError::Handler { .. })
    ));

    // the console is back on its original sink: a new capture starts empty
    let app = test_case.application().unwrap();
    let capture = app.console().capture();
    assert_eq!(capture.finish(), "");
}

#[rstest]
fn given_custom_handler_when_reset_then_handler_survives(mut test_case: ConsoleTestCase) {
    test_case
        .register_handler(
            "console",
            Arc::new(|m: &RouteMatch, console: &Console| -> ApplicationResult<i32> {
                console
                    .write(&format!("custom {}", m.param("console")))
                    .map_err(|e| ApplicationError::handler("console", e.to_string()))?;
                Ok(0)
            }),
        )
        .unwrap();

    test_case.dispatch("--console").unwrap();
    test_case.assert_console_output_contains("custom true").unwrap();

    test_case.reset();
    test_case.dispatch("--console").unwrap();
    test_case.assert_console_output_contains("custom true").unwrap();
}

#[test]
fn given_missing_config_when_setting_up_then_configuration_error() {
    testing::init_test_setup();
    let mut test = ConsoleTestCase::new();

    assert!(matches!(test.set_up(), Err(HarnessError::Configuration(_))));
}
