mod error;
mod evaluator;
mod operator;
mod tokenizer;

pub use error::{CalcError, Result, SyntaxError};
pub use evaluator::Evaluator;
pub use operator::{extended, four_operations, Operator, OperatorRegistry};
pub use tokenizer::{Token, TokenType, Tokenizer};

use std::io::{BufRead, Write};

/// How top level expressions are delimited in the input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// every line holds exactly one expression
    Line,
    /// expressions follow each other with no terminator, newlines are whitespace
    Stream,
}

impl Framing {
    fn line_significant(self) -> bool {
        self == Framing::Line
    }
}

/// Evaluates streams of prefix expressions.
///
/// Operators are added while the calculator is being set up; evaluation only
/// needs `&self`, so a configured calculator can be shared across threads.
#[derive(Clone, Debug)]
pub struct Calculator {
    operators: OperatorRegistry,
}

impl Default for Calculator {
    /// A calculator knowing the four operations
    fn default() -> Self {
        Self::new(four_operations())
    }
}

impl Calculator {
    pub fn new<Ops: IntoIterator<Item = Operator>>(ops: Ops) -> Self {
        Self {
            operators: ops.into_iter().collect(),
        }
    }

    pub fn with_operator(mut self, op: Operator) -> Self {
        self.add(op);
        self
    }

    pub fn add(&mut self, op: Operator) {
        self.operators.register(op);
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    /// Evaluate every expression in `input`, writing one result per line to `output`.
    ///
    /// Stops at the first error; results written before it stay written.
    /// Returns how many expressions were evaluated.
    pub fn evaluate<R: BufRead, W: Write>(&self, input: R, output: &mut W, framing: Framing) -> Result<usize> {
        let mut count = 0;

        for value in self.values(input, framing) {
            writeln!(output, "{}", value?)?;
            count += 1;
        }

        output.flush()?;
        Ok(count)
    }

    /// The results of the expressions in `input`, in order.
    ///
    /// The iterator ends after the first error.
    pub fn values<'a, R: BufRead + 'a>(&'a self, input: R, framing: Framing) -> impl Iterator<Item = Result<f64>> + 'a {
        let mut session = Session {
            tokens: Tokenizer::new(input, framing.line_significant()),
            evaluator: Evaluator::new(&self.operators),
            framing,
            done: false,
        };

        std::iter::from_fn(move || {
            if session.done {
                return None;
            }

            let next = session.next_value().transpose();
            session.done = !matches!(next, Some(Ok(_)));
            next
        })
    }
}

struct Session<'a, R: BufRead> {
    tokens: Tokenizer<R>,
    evaluator: Evaluator<'a>,
    framing: Framing,
    done: bool,
}

impl<'a, R: BufRead> Session<'a, R> {
    /// `None` once the input is exhausted
    fn next_value(&mut self) -> Result<Option<f64>> {
        if *self.tokens.peek_token()?.kind() == TokenType::EndOfStream {
            return Ok(None);
        }

        let value = self.evaluator.expression(&mut self.tokens)?;

        if self.framing == Framing::Line {
            let token = self.tokens.next_token()?;

            if !matches!(token.kind(), TokenType::EndOfLine | TokenType::EndOfStream) {
                return Err(self.tokens
                    .error_at(&token, format!("expected end of line after expression, found `{}`", token.lexeme))
                    .note("each line holds exactly one expression".into())
                    .into());
            }
        }

        tracing::debug!(value, "expression evaluated");

        Ok(Some(value))
    }
}
