//! Token representation shared by the parser, converter and evaluator

use std::fmt;
use std::sync::Arc;

use crate::expression::Expression;
use crate::num::Num;
use crate::ops::{Function, Operator};

/// Grouping bracket. Brackets sit above every operator priority so the
/// shunting-yard conversion never pops past an open bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Open,
    Close,
}

impl Bracket {
    pub const PRIORITY: u8 = 50;

    pub fn symbol(self) -> char {
        match self {
            Bracket::Open => '(',
            Bracket::Close => ')',
        }
    }
}

/// One argument of a function call: either a literal, or a nested
/// expression evaluated on demand.
#[derive(Clone, Debug)]
pub enum Argument {
    Literal(Num),
    Sub(Expression),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Literal(num) => write!(f, "{num}"),
            Argument::Sub(expr) => write!(f, "{expr}"),
        }
    }
}

/// A resolved function with its parsed argument list.
#[derive(Clone)]
pub struct FunctionCall {
    function: Arc<dyn Function>,
    arguments: Vec<Argument>,
}

impl FunctionCall {
    pub(crate) fn new(function: Arc<dyn Function>, arguments: Vec<Argument>) -> Self {
        FunctionCall {
            function,
            arguments,
        }
    }

    pub fn function(&self) -> &Arc<dyn Function> {
        &self.function
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

impl fmt::Debug for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCall")
            .field("function", &self.function.symbol())
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function.symbol())?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// One element of an infix or postfix token list.
#[derive(Clone)]
pub enum Token {
    Number(Num),
    Operator(Arc<dyn Operator>),
    Bracket(Bracket),
    Function(FunctionCall),
}

impl Token {
    /// Conversion priority; `None` for operands.
    pub fn priority(&self) -> Option<u8> {
        match self {
            Token::Operator(op) => Some(op.priority()),
            Token::Bracket(_) => Some(Bracket::PRIORITY),
            _ => None,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(num) => f.debug_tuple("Number").field(num).finish(),
            Token::Operator(op) => f.debug_tuple("Operator").field(&op.symbol()).finish(),
            Token::Bracket(b) => f.debug_tuple("Bracket").field(b).finish(),
            Token::Function(call) => f.debug_tuple("Function").field(call).finish(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(num) => write!(f, "{num}"),
            Token::Operator(op) => f.write_str(op.symbol()),
            Token::Bracket(b) => write!(f, "{}", b.symbol()),
            Token::Function(call) => write!(f, "{call}"),
        }
    }
}

/// Append-only token sequence with a dirty flag, so a cached postfix
/// conversion can be invalidated when the infix list grows.
#[derive(Clone, Debug, Default)]
pub struct TokenList {
    tokens: Vec<Token>,
    dirty: bool,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
        self.dirty = true;
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) {
        for token in tokens {
            self.push(token);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Token> {
        self.dirty = true;
        self.tokens.pop()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Space-joined rendering; the detailed variant prefixes each number
    /// with its `Properties` summary.
    pub fn to_text(&self, detailed: bool) -> String {
        let mut out = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            match token {
                Token::Number(num) if detailed => {
                    out.push_str(&format!("[{}] {num}", num.properties()));
                }
                other => out.push_str(&other.to_string()),
            }
        }
        out
    }
}

impl fmt::Display for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(false))
    }
}

impl IntoIterator for TokenList {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
