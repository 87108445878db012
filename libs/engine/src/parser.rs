//! Infix tokenizer and parser
//!
//! Turns expression text plus substitution values into a [`TokenList`]:
//!
//! 1. collect variable names and pair them with values (named first, the
//!    rest positionally);
//! 2. cut out function spans by scanning for `name(` and counting bracket
//!    depth to the matching close;
//! 3. tokenize the plain spans with a regex alternation built from the
//!    registered operator symbols and the calculator's separators;
//! 4. fold a subtraction sign into the following literal when it cannot be
//!    a binary operator (start of list, after an operator, after an open
//!    bracket).

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::num::Num;
use crate::properties::Properties;
use crate::registry::{global, Registry};
use crate::token::{Argument, Bracket, FunctionCall, Token, TokenList};

static VARIABLE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").unwrap());

static FUNCTION_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9]*\(").unwrap());

/// Parser for one expression, resolving symbols local-tier first.
pub struct Parser<'a> {
    local: &'a Registry,
    properties: &'a Properties,
}

impl<'a> Parser<'a> {
    pub fn new(local: &'a Registry, properties: &'a Properties) -> Self {
        Parser { local, properties }
    }

    /// Parses `text` into an infix token list, substituting `values` for
    /// the variables it contains.
    pub fn parse(&self, text: &str, values: &[Num]) -> Result<TokenList> {
        let variables = self.map_values(text, values)?;
        let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();

        let mut list = TokenList::new();
        let token_regex = self.token_regex()?;
        self.parse_spans(&stripped, text, &variables, &token_regex, &mut list)?;

        debug!(expression = text, tokens = list.len(), "parsed infix expression");
        Ok(list)
    }

    /// Variable names in first-seen order, skipping identifiers directly
    /// followed by `(` (function calls).
    fn collect_variable_names(text: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for m in VARIABLE_NAME.find_iter(text) {
            let rest = text[m.end()..].trim_start();
            if rest.starts_with('(') {
                continue;
            }
            if !names.iter().any(|n| n == m.as_str()) {
                names.push(m.as_str().to_string());
            }
        }
        names
    }

    /// Pairs variable names with values: named values by name first, the
    /// remaining names positionally with the remaining unnamed values.
    fn map_values(&self, text: &str, values: &[Num]) -> Result<Vec<(String, Num)>> {
        let names = Self::collect_variable_names(text);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut used = vec![false; values.len()];
        let mut mapped: Vec<(String, Option<Num>)> =
            names.into_iter().map(|name| (name, None)).collect();

        for (name, slot) in mapped.iter_mut() {
            let found = values
                .iter()
                .enumerate()
                .find(|(i, v)| !used[*i] && v.name() == Some(name.as_str()));
            if let Some((i, value)) = found {
                used[i] = true;
                *slot = Some(value.clone());
            }
        }

        for (_, slot) in mapped.iter_mut() {
            if slot.is_some() {
                continue;
            }
            let found = values
                .iter()
                .enumerate()
                .find(|(i, v)| !used[*i] && v.name().is_none());
            if let Some((i, value)) = found {
                used[i] = true;
                *slot = Some(value.clone());
            }
        }

        let missing: Vec<String> = mapped
            .iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(Error::UndefinedVariables {
                expression: text.to_string(),
                names: missing,
            });
        }

        Ok(mapped
            .into_iter()
            .filter_map(|(name, slot)| slot.map(|value| (name, value)))
            .collect())
    }

    /// Alternates function spans and plain spans over the whole text.
    fn parse_spans(
        &self,
        stripped: &str,
        original: &str,
        variables: &[(String, Num)],
        token_regex: &Regex,
        list: &mut TokenList,
    ) -> Result<()> {
        let mut pos = 0;
        while let Some(m) = FUNCTION_START.find_at(stripped, pos) {
            self.tokenize_span(&stripped[pos..m.start()], original, variables, token_regex, list)?;

            let open = m.end() - 1;
            let close = Self::matching_close(stripped, open)
                .ok_or_else(|| Error::UnbalancedOpen(original.to_string()))?;
            let name = &stripped[m.start()..open];
            let inner = &stripped[open + 1..close];

            let function = self
                .local
                .function(name)
                .or_else(|| global::function(name))
                .ok_or_else(|| Error::UnknownFunction {
                    name: name.to_string(),
                    expression: original.to_string(),
                })?;

            let mut arguments = Vec::new();
            for arg_text in Self::split_arguments(inner) {
                let mut sub = TokenList::new();
                self.parse_spans(arg_text, original, variables, token_regex, &mut sub)?;
                match sub.tokens() {
                    [Token::Number(num)] => arguments.push(Argument::Literal(num.clone())),
                    _ => arguments.push(Argument::Sub(Expression::from_tokens(
                        sub,
                        self.properties.clone(),
                    ))),
                }
            }

            list.push(Token::Function(FunctionCall::new(function, arguments)));
            pos = close + 1;
        }
        self.tokenize_span(&stripped[pos..], original, variables, token_regex, list)
    }

    /// Index of the close bracket matching the open bracket at `open`.
    fn matching_close(text: &str, open: usize) -> Option<usize> {
        let mut depth = 0i32;
        for (i, c) in text[open..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Splits a function argument list on top-level commas only.
    fn split_arguments(inner: &str) -> Vec<&str> {
        let mut parts = Vec::new();
        if inner.is_empty() {
            return parts;
        }
        let mut depth = 0i32;
        let mut start = 0;
        for (i, c) in inner.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                ',' if depth == 0 => {
                    parts.push(&inner[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        parts.push(&inner[start..]);
        parts
    }

    /// Tokenizer alternation: number | operator | brackets | identifier.
    ///
    /// Built per parse because the operator set and separators are
    /// configurable. The number alternative mirrors the separator policy:
    /// grouping characters may appear before the decimal point.
    fn token_regex(&self) -> Result<Regex> {
        let separator = self.properties.input_decimal_separator();
        let grouping = self
            .properties
            .grouping_separator()
            .unwrap_or(if separator == '.' { ',' } else { '.' });
        let number = format!(
            r"[0-9{g}]*{s}[0-9]*|[0-9]+",
            g = regex::escape(&grouping.to_string()),
            s = regex::escape(&separator.to_string()),
        );

        let mut symbols: Vec<String> = self
            .local
            .operator_symbols()
            .map(str::to_string)
            .collect();
        symbols.extend(global::operator_symbols());
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        symbols.dedup();
        let operators = if symbols.is_empty() {
            // never matches
            "[^\\s\\S]".to_string()
        } else {
            symbols
                .iter()
                .map(|s| regex::escape(s))
                .collect::<Vec<_>>()
                .join("|")
        };

        let pattern = format!(r"({number})|({operators})|(\()|(\))|([A-Za-z]+)");
        Regex::new(&pattern).map_err(|e| Error::Arithmetic(format!("tokenizer pattern: {e}")))
    }

    fn tokenize_span(
        &self,
        span: &str,
        original: &str,
        variables: &[(String, Num)],
        token_regex: &Regex,
        list: &mut TokenList,
    ) -> Result<()> {
        let unknown = |fragment: &str| Error::UnknownSymbol {
            symbol: fragment.to_string(),
            expression: original.to_string(),
        };

        let mut last_end = 0;
        for caps in token_regex.captures_iter(span) {
            let Some(m) = caps.get(0) else { continue };
            if m.start() > last_end {
                return Err(unknown(&span[last_end..m.start()]));
            }
            last_end = m.end();

            if caps.get(1).is_some() {
                let num = Num::parse_with_separator(
                    m.as_str(),
                    self.properties.input_decimal_separator(),
                )?;
                Self::push_number(list, num);
            } else if caps.get(2).is_some() {
                let symbol = m.as_str();
                let operator = self
                    .local
                    .operator(symbol)
                    .or_else(|| global::operator(symbol))
                    .ok_or_else(|| unknown(symbol))?;
                list.push(Token::Operator(operator));
            } else if caps.get(3).is_some() {
                list.push(Token::Bracket(Bracket::Open));
            } else if caps.get(4).is_some() {
                list.push(Token::Bracket(Bracket::Close));
            } else {
                let name = m.as_str();
                let value = variables
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| unknown(name))?;
                Self::push_number(list, value);
            }
        }
        if last_end < span.len() {
            return Err(unknown(&span[last_end..]));
        }
        Ok(())
    }

    /// Pushes a number, folding a preceding subtraction sign into it when
    /// that sign cannot be a binary operator.
    fn push_number(list: &mut TokenList, num: Num) {
        let len = list.len();
        let after_sub = matches!(list.last(), Some(Token::Operator(op)) if op.symbol() == "-");
        if after_sub {
            let fold = len == 1
                || matches!(
                    list.tokens().get(len - 2),
                    Some(Token::Operator(_)) | Some(Token::Bracket(Bracket::Open))
                );
            if fold {
                list.pop();
                list.push(Token::Number(num.negated()));
                return;
            }
        }
        list.push(Token::Number(num));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, values: &[Num]) -> Result<TokenList> {
        let local = Registry::new();
        let properties = Properties::default();
        Parser::new(&local, &properties).parse(text, values)
    }

    #[test]
    fn tokenizes_numbers_and_operators() {
        let list = parse("5 + 9 / 6 * 3 / 2", &[]).unwrap();
        assert_eq!(list.to_text(false), "5 + 9 / 6 * 3 / 2");
        assert_eq!(list.len(), 9);
    }

    #[test]
    fn tokenizes_brackets() {
        let list = parse("(5 + 2) * 3", &[]).unwrap();
        assert_eq!(list.to_text(false), "( 5 + 2 ) * 3");
    }

    #[test]
    fn folds_negative_literals() {
        let list = parse("5 * -2", &[]).unwrap();
        assert_eq!(list.to_text(false), "5 * -2");
        assert_eq!(list.len(), 3);

        let list = parse("-5 + 3", &[]).unwrap();
        assert_eq!(list.to_text(false), "-5 + 3");
        assert_eq!(list.len(), 3);

        let list = parse("(-5 + 3)", &[]).unwrap();
        assert_eq!(list.to_text(false), "( -5 + 3 )");
    }

    #[test]
    fn keeps_binary_subtraction() {
        let list = parse("5 - 2", &[]).unwrap();
        assert_eq!(list.len(), 3);
        assert!(matches!(list.tokens()[1], Token::Operator(_)));

        // after a close bracket the sign is binary
        let list = parse("(2 + 3) - 1", &[]).unwrap();
        assert_eq!(list.to_text(false), "( 2 + 3 ) - 1");
        assert_eq!(list.len(), 7);
    }

    #[test]
    fn substitutes_named_and_positional_variables() {
        let list = parse("x + y", &[Num::from(3).named("y"), Num::from(10)]).unwrap();
        assert_eq!(list.to_text(false), "10 + 3");
    }

    #[test]
    fn undefined_variable_lists_names() {
        let err = parse("a + b", &[Num::from(1)]).unwrap_err();
        match err {
            Error::UndefinedVariables { names, .. } => assert_eq!(names, vec!["b".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parses_function_spans() {
        let list = parse("abs(-2-(abs(-8)))", &[]).unwrap();
        assert_eq!(list.len(), 1);
        let Token::Function(call) = &list.tokens()[0] else {
            panic!("expected function token");
        };
        assert_eq!(call.function().symbol(), "abs");
        assert_eq!(call.arguments().len(), 1);
        assert!(matches!(call.arguments()[0], Argument::Sub(_)));
    }

    #[test]
    fn function_literal_argument() {
        let list = parse("sin(10)", &[]).unwrap();
        let Token::Function(call) = &list.tokens()[0] else {
            panic!("expected function token");
        };
        assert!(matches!(call.arguments()[0], Argument::Literal(_)));
    }

    #[test]
    fn unknown_function_and_symbol() {
        assert!(matches!(
            parse("frobnicate(1)", &[]),
            Err(Error::UnknownFunction { .. })
        ));
        assert!(matches!(
            parse("2 # 3", &[]),
            Err(Error::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn grouped_literal_with_decimal_point() {
        let list = parse("1,255.06 + 1", &[]).unwrap();
        assert_eq!(list.to_text(false), "1255.06 + 1");
    }

    #[test]
    fn comma_decimal_separator() {
        let local = Registry::new();
        let mut properties = Properties::default();
        properties.set_decimal_separator(',');
        let list = Parser::new(&local, &properties).parse("2,5 + 1", &[]).unwrap();
        assert_eq!(list.to_text(false), "2.5 + 1");
    }
}
