//! Error taxonomy coverage

use decalc_engine::{Error, Expression, Num, OperandSide};

fn eval_err(text: &str) -> Error {
    Expression::parse(text, &[])
        .and_then(|mut e| e.evaluate())
        .unwrap_err()
}

#[test]
fn excess_open_brackets() {
    match eval_err("((2 + 3)") {
        Error::UnbalancedOpen(expression) => assert_eq!(expression, "( ( 2 + 3 )"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn excess_close_brackets() {
    assert!(matches!(eval_err("(2 + 3))"), Error::UnbalancedClose(_)));
}

#[test]
fn undefined_variables_are_listed() {
    let err = Expression::parse("a + b + c", &[Num::from(1).named("b")]).unwrap_err();
    match err {
        Error::UndefinedVariables { names, expression } => {
            assert_eq!(names, vec!["a".to_string(), "c".to_string()]);
            assert_eq!(expression, "a + b + c");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_symbol() {
    match eval_err("2 $ 3") {
        Error::UnknownSymbol { symbol, .. } => assert_eq!(symbol, "$"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_function() {
    match eval_err("frob(2)") {
        Error::UnknownFunction { name, .. } => assert_eq!(name, "frob"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_right_operand() {
    match eval_err("*") {
        Error::MissingOperand { operator, side } => {
            assert_eq!(operator, "*");
            assert_eq!(side, OperandSide::Right);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_left_operand_for_non_additive() {
    match eval_err("* 5") {
        Error::MissingOperand { operator, side } => {
            assert_eq!(operator, "*");
            assert_eq!(side, OperandSide::Left);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn division_by_zero_is_wrapped_with_trace() {
    match eval_err("1 + 5 / 0") {
        Error::OperatorFailed {
            operator,
            reason,
            trace,
            ..
        } => {
            assert_eq!(operator, "/");
            assert!(reason.contains("Division by zero"), "reason: {reason}");
            let trace = trace.expect("diagnostic re-run should attach a trail");
            assert!(trace.contains("<error:"), "trace: {trace}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn function_failure_is_wrapped() {
    match eval_err("sqrt(-1)") {
        Error::FunctionFailed {
            function, reason, ..
        } => {
            assert_eq!(function, "sqrt");
            assert!(reason.contains("square root"), "reason: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn number_format_errors() {
    assert!(matches!(
        Num::parse("not a number"),
        Err(Error::NumberFormat { .. })
    ));
    assert!(matches!(
        Num::parse("1.2.3 or 4.5"),
        Err(Error::NumberFormat { .. })
    ));
}

#[test]
fn parse_errors_do_not_mark_the_expression_evaluated() {
    let mut expr = Expression::parse("5 / 0", &[]).unwrap();
    assert!(expr.evaluate().is_err());
    assert!(!expr.is_evaluated());
    assert_eq!(expr.last_result(), None);
}
