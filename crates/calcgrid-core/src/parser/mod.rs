//! Parser module
//!
//! Two stages feed the evaluator:
//! - Tokenizer: splits an expression string into number and operator tokens
//! - Infix-to-postfix converter: reorders tokens into Reverse Polish
//!   Notation (shunting-yard)
//!
//! Neither stage validates the expression. Malformed number literals pass
//! through and fail at parse time in the evaluator; unbalanced parentheses
//! are tolerated and surface as structural errors downstream.

use crate::types::BinaryOp;

/// A lexical token of an arithmetic expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Maximal run of non-operator, non-parenthesis characters.
    /// Not guaranteed to be a well-formed number.
    Number(String),
    /// One of `+ - * /`
    Op(BinaryOp),
    LeftParen,
    RightParen,
}

/// Split an expression string into tokens.
///
/// Whitespace is dropped without breaking a number run, so `"1 2+3"`
/// tokenizes the same as `"12+3"`. Never fails; garbage input yields a
/// degenerate token sequence the evaluator will reject.
pub fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut buffer = String::new();

    for ch in expr.chars() {
        if ch.is_whitespace() {
            continue;
        }
        let token = match ch {
            '+' => Some(Token::Op(BinaryOp::Add)),
            '-' => Some(Token::Op(BinaryOp::Sub)),
            '*' => Some(Token::Op(BinaryOp::Mul)),
            '/' => Some(Token::Op(BinaryOp::Div)),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        match token {
            Some(token) => {
                if !buffer.is_empty() {
                    tokens.push(Token::Number(std::mem::take(&mut buffer)));
                }
                tokens.push(token);
            }
            None => buffer.push(ch),
        }
    }

    if !buffer.is_empty() {
        tokens.push(Token::Number(buffer));
    }

    tokens
}

// Precedence on the operator stack. `(` is a sentinel that only an explicit
// `)` removes.
fn stack_precedence(token: &Token) -> u8 {
    match token {
        Token::Op(op) => op.precedence(),
        _ => 0,
    }
}

/// Reorder tokens into Reverse Polish Notation using the shunting-yard
/// algorithm. Operators are left-associative: equal precedence pops.
///
/// Unbalanced parentheses are tolerated: an unmatched `)` pops whatever is
/// available, an unmatched `(` is flushed to the output at end of input and
/// skipped by the evaluator.
pub fn to_postfix(tokens: Vec<Token>) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::LeftParen => operators.push(token),
            Token::RightParen => {
                while let Some(top) = operators.pop() {
                    if top == Token::LeftParen {
                        break;
                    }
                    output.push(top);
                }
            }
            Token::Op(op) => {
                while let Some(top) = operators.pop() {
                    if stack_precedence(&top) < op.precedence() {
                        operators.push(top);
                        break;
                    }
                    output.push(top);
                }
                operators.push(Token::Op(op));
            }
        }
    }

    while let Some(token) = operators.pop() {
        output.push(token);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Token {
        Token::Number(s.to_string())
    }

    #[test]
    fn test_tokenize_splits_numbers_and_operators() {
        let tokens = tokenize("2+3*4");
        assert_eq!(
            tokens,
            vec![
                num("2"),
                Token::Op(BinaryOp::Add),
                num("3"),
                Token::Op(BinaryOp::Mul),
                num("4"),
            ]
        );
    }

    #[test]
    fn test_tokenize_handles_parentheses_and_fractions() {
        let tokens = tokenize("(1.5+2)/7");
        assert_eq!(
            tokens,
            vec![
                Token::LeftParen,
                num("1.5"),
                Token::Op(BinaryOp::Add),
                num("2"),
                Token::RightParen,
                Token::Op(BinaryOp::Div),
                num("7"),
            ]
        );
    }

    #[test]
    fn test_tokenize_drops_whitespace_without_splitting_runs() {
        assert_eq!(tokenize("1 2+3"), tokenize("12+3"));
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_passes_malformed_literals_through() {
        let tokens = tokenize("abc+2");
        assert_eq!(tokens[0], num("abc"));
    }

    #[test]
    fn test_postfix_honors_precedence() {
        let rpn = to_postfix(tokenize("2+3*4"));
        assert_eq!(
            rpn,
            vec![
                num("2"),
                num("3"),
                num("4"),
                Token::Op(BinaryOp::Mul),
                Token::Op(BinaryOp::Add),
            ]
        );
    }

    #[test]
    fn test_postfix_is_left_associative() {
        let rpn = to_postfix(tokenize("10-2-3"));
        assert_eq!(
            rpn,
            vec![
                num("10"),
                num("2"),
                Token::Op(BinaryOp::Sub),
                num("3"),
                Token::Op(BinaryOp::Sub),
            ]
        );
    }

    #[test]
    fn test_postfix_parentheses_override_precedence() {
        let rpn = to_postfix(tokenize("(2+3)*4"));
        assert_eq!(
            rpn,
            vec![
                num("2"),
                num("3"),
                Token::Op(BinaryOp::Add),
                num("4"),
                Token::Op(BinaryOp::Mul),
            ]
        );
    }

    #[test]
    fn test_postfix_tolerates_unmatched_closing_paren() {
        // ")2+3" pops an empty stack without panicking
        let rpn = to_postfix(tokenize(")2+3"));
        assert_eq!(rpn, vec![num("2"), num("3"), Token::Op(BinaryOp::Add)]);
    }

    #[test]
    fn test_postfix_flushes_unmatched_opening_paren() {
        let rpn = to_postfix(tokenize("(2+3"));
        assert_eq!(
            rpn,
            vec![
                num("2"),
                num("3"),
                Token::Op(BinaryOp::Add),
                Token::LeftParen,
            ]
        );
    }
}
