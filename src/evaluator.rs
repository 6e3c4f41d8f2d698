use crate::error::Result;
use crate::operator::OperatorRegistry;
use crate::tokenizer::{TokenType, Tokenizer};

use std::io::BufRead;

/// Evaluates prefix expressions against a fixed set of operators
#[derive(Clone, Copy, Debug)]
pub struct Evaluator<'r> {
    operators: &'r OperatorRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(operators: &'r OperatorRegistry) -> Self {
        Self { operators }
    }

    /// Consume exactly one expression from `tokens` and return its value.
    ///
    /// Operands are evaluated left to right by recursing once per operand, so
    /// nesting depth is bounded only by the call stack.
    pub fn expression<R: BufRead>(&self, tokens: &mut Tokenizer<R>) -> Result<f64> {
        let token = tokens.next_token()?;

        match token.kind() {
            TokenType::Number(n) => Ok(*n),
            TokenType::Word(symbol) => {
                let op = self.operators.lookup(symbol).ok_or_else(|| {
                    tokens.error_at(&token, format!("unknown operator `{symbol}`"))
                })?;

                let mut operands = Vec::with_capacity(op.arity());

                while operands.len() < op.arity() {
                    let exhausted = matches!(
                        tokens.peek_token()?.kind(),
                        TokenType::EndOfLine | TokenType::EndOfStream
                    );

                    if exhausted {
                        let next = tokens.peek_token()?.clone();
                        return Err(tokens
                            .error_at(&next, format!(
                                "operator `{symbol}` expects {} operands, found {}",
                                op.arity(), operands.len()))
                            .note(format!("reached {}", next.kind()))
                            .into());
                    }

                    operands.push(self.expression(tokens)?);
                }

                let value = op.apply(&operands);
                tracing::trace!(op = symbol.as_str(), ?operands, value, "apply");

                Ok(value)
            }
            other => Err(tokens
                .error_at(&token, format!("expected an expression, found {other}"))
                .into()),
        }
    }
}
