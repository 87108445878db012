//! Infix to postfix conversion

use crate::error::{Error, Result};
use crate::token::{Bracket, Token, TokenList};

/// Shunting-yard conversion of an infix token list.
///
/// The pop rule is `>=`, so operators of equal priority associate to the
/// left (`3 - 2 + 1` becomes `3 2 - 1 +`). A running bracket counter
/// distinguishes excess open brackets from excess close brackets.
pub fn to_postfix(infix: &TokenList) -> Result<TokenList> {
    let mut output = TokenList::new();
    let mut stack: Vec<Token> = Vec::new();
    let mut balance = 0i32;

    for token in infix {
        match token {
            Token::Number(_) | Token::Function(_) => output.push(token.clone()),
            Token::Bracket(Bracket::Open) => {
                balance += 1;
                stack.push(token.clone());
            }
            Token::Bracket(Bracket::Close) => {
                balance -= 1;
                if balance < 0 {
                    return Err(Error::UnbalancedClose(infix.to_text(false)));
                }
                while let Some(top) = stack.pop() {
                    match top {
                        Token::Bracket(Bracket::Open) => break,
                        other => output.push(other),
                    }
                }
            }
            Token::Operator(op) => {
                loop {
                    let pop = matches!(
                        stack.last(),
                        Some(Token::Operator(top)) if top.priority() >= op.priority()
                    );
                    if !pop {
                        break;
                    }
                    if let Some(top) = stack.pop() {
                        output.push(top);
                    }
                }
                stack.push(token.clone());
            }
        }
    }

    if balance > 0 {
        return Err(Error::UnbalancedOpen(infix.to_text(false)));
    }
    while let Some(top) = stack.pop() {
        if !matches!(top, Token::Bracket(_)) {
            output.push(top);
        }
    }
    Ok(output)
}
