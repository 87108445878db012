//! Postfix stack evaluator
//!
//! Walks a postfix token list left to right, pushing operands and applying
//! operators to the top two stack entries. A missing right operand is
//! always fatal; a missing left operand is synthesized as zero for `+`
//! and `-` only, so `+5` evaluates to `5`.

use tracing::trace;

use crate::error::{Error, OperandSide, Result};
use crate::num::Num;
use crate::properties::Properties;
use crate::token::{Argument, FunctionCall, Token, TokenList};

/// Evaluates `postfix`, returning the raw result and, when `track` is on,
/// the collected step trail.
///
/// On failure with tracking off, the evaluation re-runs once with tracking
/// forced on so the raised error carries the trail; the re-run never
/// changes which error is reported.
pub(crate) fn evaluate(
    postfix: &TokenList,
    infix_text: &str,
    calculator: &Properties,
    track: bool,
    detailed: bool,
) -> Result<(Num, Option<Vec<String>>)> {
    let mut steps = Vec::new();
    match run(postfix, infix_text, calculator, &mut steps, track, detailed) {
        Ok(result) => Ok((result, track.then_some(steps))),
        Err(err) if !track => {
            steps.clear();
            let _ = run(postfix, infix_text, calculator, &mut steps, true, detailed);
            Err(attach_trail(err, steps))
        }
        Err(err) => Err(attach_trail(err, steps)),
    }
}

fn attach_trail(err: Error, steps: Vec<String>) -> Error {
    if steps.is_empty() {
        return err;
    }
    let trail = steps.join("\n");
    match err {
        Error::OperatorFailed {
            operator,
            expression,
            reason,
            trace: None,
        } => Error::OperatorFailed {
            operator,
            expression,
            reason,
            trace: Some(trail),
        },
        Error::FunctionFailed {
            function,
            expression,
            reason,
            trace: None,
        } => Error::FunctionFailed {
            function,
            expression,
            reason,
            trace: Some(trail),
        },
        other => other,
    }
}

fn value_text(num: &Num, detailed: bool) -> String {
    if detailed {
        format!("[{}] {num}", num.properties())
    } else {
        num.to_string()
    }
}

fn run(
    postfix: &TokenList,
    infix_text: &str,
    calculator: &Properties,
    steps: &mut Vec<String>,
    track: bool,
    detailed: bool,
) -> Result<Num> {
    let mut stack: Vec<Num> = Vec::new();

    for token in postfix {
        match token {
            Token::Number(num) => stack.push(num.clone()),
            Token::Function(call) => {
                let value = call_function(call, infix_text, calculator, steps, track)?;
                stack.push(value);
            }
            Token::Operator(op) => {
                let right = stack.pop().ok_or_else(|| Error::MissingOperand {
                    operator: op.symbol().to_string(),
                    side: OperandSide::Right,
                })?;
                let left = match stack.pop() {
                    Some(value) => value,
                    None if matches!(op.symbol(), "+" | "-") => Num::zero(),
                    None => {
                        return Err(Error::MissingOperand {
                            operator: op.symbol().to_string(),
                            side: OperandSide::Left,
                        })
                    }
                };
                match op.apply(calculator, &left, &right) {
                    Ok(result) => {
                        if track {
                            steps.push(format!(
                                "{}\t{}\t{}\t=\t{}",
                                value_text(&left, detailed),
                                op.symbol(),
                                value_text(&right, detailed),
                                value_text(&result, detailed),
                            ));
                        }
                        trace!(
                            left = %left,
                            operator = op.symbol(),
                            right = %right,
                            result = %result,
                            "applied operator"
                        );
                        stack.push(result);
                    }
                    Err(err) => {
                        if track {
                            steps.push(format!(
                                "{}\t{}\t{}\t=\t<error: {err}>",
                                value_text(&left, detailed),
                                op.symbol(),
                                value_text(&right, detailed),
                            ));
                        }
                        return Err(Error::OperatorFailed {
                            operator: op.symbol().to_string(),
                            expression: infix_text.to_string(),
                            reason: err.to_string(),
                            trace: None,
                        });
                    }
                }
            }
            // postfix lists carry no brackets
            Token::Bracket(_) => {}
        }
    }

    stack
        .pop()
        .ok_or_else(|| Error::Arithmetic("nothing to evaluate".to_string()))
}

fn call_function(
    call: &FunctionCall,
    infix_text: &str,
    calculator: &Properties,
    steps: &mut Vec<String>,
    track: bool,
) -> Result<Num> {
    let mut args = Vec::with_capacity(call.arguments().len());
    for arg in call.arguments() {
        match arg {
            Argument::Literal(num) => args.push(num.clone()),
            Argument::Sub(expr) => {
                let mut sub = expr.clone();
                args.push(sub.evaluate()?);
            }
        }
    }

    match call.function().apply(calculator, &args) {
        Ok(value) => {
            trace!(function = %call, result = %value, "applied function");
            Ok(value)
        }
        Err(err) => {
            if track {
                steps.push(format!("{call}\t=\t<error: {err}>"));
            }
            Err(Error::FunctionFailed {
                function: call.function().symbol().to_string(),
                expression: infix_text.to_string(),
                reason: err.to_string(),
                trace: None,
            })
        }
    }
}
