//! Expression calculator
//!
//! An [`Expression`] owns an infix token list, a lazily converted postfix
//! cache, a local extension registry and the format policy inherited by
//! its results. Auxiliary expressions attached with [`Expression::bind`]
//! are spliced into the owner's infix list when it materializes, right
//! before conversion and evaluation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::convert::NumConverter;
use crate::engine;
use crate::error::Result;
use crate::num::Num;
use crate::ops::{Function, Operator};
use crate::parser::Parser;
use crate::postfix;
use crate::properties::Properties;
use crate::registry::{global, Registry};
use crate::rounding::Rounding;
use crate::token::{Bracket, Token, TokenList};

#[derive(Clone, Debug)]
struct Bound {
    expression: Expression,
    spliced: bool,
}

/// An infix expression plus everything needed to evaluate it.
#[derive(Clone, Debug, Default)]
pub struct Expression {
    infix: TokenList,
    postfix: TokenList,
    properties: Properties,
    local: Registry,
    bound: Vec<Bound>,
    last_result: Option<Num>,
    last_trace: Option<Vec<String>>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(properties: Properties) -> Self {
        Expression {
            properties,
            ..Default::default()
        }
    }

    pub(crate) fn from_tokens(infix: TokenList, properties: Properties) -> Self {
        Expression {
            infix,
            properties,
            ..Default::default()
        }
    }

    /// Parses `text` into a new expression, substituting `values` for its
    /// variables.
    pub fn parse(text: &str, values: &[Num]) -> Result<Self> {
        let mut expression = Self::new();
        expression.append_text(text, values)?;
        Ok(expression)
    }

    /// Parses `text` and appends its tokens to this expression.
    pub fn append_text(&mut self, text: &str, values: &[Num]) -> Result<&mut Self> {
        let tokens = Parser::new(&self.local, &self.properties).parse(text, values)?;
        self.infix.extend(tokens);
        self.last_result = None;
        Ok(self)
    }

    /// Appends a clone of `other`'s tokens, bracketed when
    /// `within_brackets` is set so `other` keeps its own grouping.
    pub fn append(&mut self, other: &Expression, within_brackets: bool) -> &mut Self {
        if within_brackets {
            self.infix.push(Token::Bracket(Bracket::Open));
        }
        self.infix.extend(other.infix.tokens().to_vec());
        if within_brackets {
            self.infix.push(Token::Bracket(Bracket::Close));
        }
        self.last_result = None;
        self
    }

    /// Attaches a fresh auxiliary expression inheriting this expression's
    /// policy, and returns it for the caller to fill in. Its tokens are
    /// spliced into this expression when it materializes.
    pub fn bind(&mut self) -> &mut Expression {
        self.bind_expression(Expression::with_properties(self.properties.clone()))
    }

    /// Attaches an existing expression as an auxiliary.
    pub fn bind_expression(&mut self, expression: Expression) -> &mut Expression {
        self.bound.push(Bound {
            expression,
            spliced: false,
        });
        let last = self.bound.len() - 1;
        &mut self.bound[last].expression
    }

    /// Splices every not-yet-spliced auxiliary into the infix list, in
    /// bind order. Idempotent: each auxiliary is spliced at most once.
    pub fn materialize(&mut self) {
        for i in 0..self.bound.len() {
            if self.bound[i].spliced {
                continue;
            }
            self.bound[i].expression.materialize();
            let tokens = self.bound[i].expression.infix.tokens().to_vec();
            self.infix.extend(tokens);
            self.bound[i].spliced = true;
        }
    }

    fn ensure_postfix(&mut self) -> Result<()> {
        if self.postfix.is_empty() || self.infix.is_dirty() {
            self.postfix = postfix::to_postfix(&self.infix)?;
            self.infix.mark_clean();
        }
        Ok(())
    }

    /// Evaluates the expression and returns a clone of the result carrying
    /// this expression's format policy.
    pub fn evaluate(&mut self) -> Result<Num> {
        self.eval_inner(false, false)
    }

    /// Evaluates with step tracking; the trail is kept on the expression
    /// (see [`Expression::trace`]).
    pub fn evaluate_traced(&mut self, detailed: bool) -> Result<Num> {
        self.eval_inner(true, detailed)
    }

    fn eval_inner(&mut self, track: bool, detailed: bool) -> Result<Num> {
        self.materialize();
        self.ensure_postfix()?;
        self.last_result = None;
        self.last_trace = None;

        let infix_text = self.infix.to_text(false);
        let (mut result, steps) =
            engine::evaluate(&self.postfix, &infix_text, &self.properties, track, detailed)?;
        result.set_properties(&self.properties);

        debug!(expression = %infix_text, result = %result, "evaluated expression");
        self.last_trace = steps;
        self.last_result = Some(result.clone());
        Ok(result)
    }

    /// Clone of the most recent result, if the expression has been
    /// evaluated since it last changed.
    pub fn last_result(&self) -> Option<Num> {
        self.last_result.clone()
    }

    pub fn is_evaluated(&self) -> bool {
        self.last_result.is_some()
    }

    /// Step trail of the most recent tracked evaluation.
    pub fn trace(&self) -> Option<&[String]> {
        self.last_trace.as_deref()
    }

    /// Infix rendering, after materializing bound auxiliaries.
    pub fn infix_text(&mut self) -> String {
        self.materialize();
        self.infix.to_text(false)
    }

    /// Postfix rendering, e.g. `5 9 6 / 3 * 2 / +`.
    pub fn postfix_text(&mut self) -> Result<String> {
        self.materialize();
        self.ensure_postfix()?;
        Ok(self.postfix.to_text(false))
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn set_scale(&mut self, scale: i64) -> &mut Self {
        self.properties.set_scale(scale);
        self
    }

    pub fn set_rounding(&mut self, rounding: Rounding) -> &mut Self {
        self.properties.set_rounding(rounding);
        self
    }

    /// Registers an operator in the local tier, shadowing the global one
    /// with the same symbol for this expression only.
    pub fn register_operator(&mut self, operator: Arc<dyn Operator>) -> &mut Self {
        self.local.register_operator(operator);
        self
    }

    pub fn register_function(&mut self, function: Arc<dyn Function>) -> &mut Self {
        self.local.register_function(function);
        self
    }

    pub fn register_converter<T: Any>(&mut self, converter: Arc<dyn NumConverter>) -> &mut Self {
        self.local.register_converter::<T>(converter);
        self
    }

    /// Converts a foreign value, local converter tier first.
    pub fn convert(&self, value: &dyn Any) -> Result<Num> {
        match self.local.converter_for(value) {
            Some(converter) => converter.to_num(value),
            None => global::convert_to_num(value),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.infix.to_text(false))
    }
}
