use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

type Evaluate = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// A named operation taking a fixed number of operands
#[derive(Clone)]
pub struct Operator {
    symbol: String,
    arity: usize,
    evaluate: Evaluate,
}

impl Operator {
    /// `evaluate` is always handed exactly `arity` operands, in source order
    pub fn new<F>(symbol: &str, arity: usize, evaluate: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            symbol: symbol.to_string(),
            arity,
            evaluate: Arc::new(evaluate),
        }
    }

    pub fn constant(symbol: &str, value: f64) -> Self {
        Self::new(symbol, 0, move |_| value)
    }

    pub fn unary(symbol: &str, f: fn(f64) -> f64) -> Self {
        Self::new(symbol, 1, move |args| f(args[0]))
    }

    pub fn binary(symbol: &str, f: fn(f64, f64) -> f64) -> Self {
        Self::new(symbol, 2, move |args| f(args[0], args[1]))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Run the operator on `operands`.
    ///
    /// # Panics
    ///
    /// If `operands.len()` differs from [`Operator::arity`].
    pub fn apply(&self, operands: &[f64]) -> f64 {
        assert!(
            operands.len() == self.arity,
            "operator `{}` expects {} operands, got {}",
            self.symbol, self.arity, operands.len()
        );
        (self.evaluate)(operands)
    }
}

impl Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("symbol", &self.symbol)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol, self.arity)
    }
}

/// Maps operator symbols to operators.
///
/// Filled in once before evaluation starts and only read afterwards, so a
/// finished registry can be shared between sessions without locking.
#[derive(Clone, Debug, Default)]
pub struct OperatorRegistry {
    operators: HashMap<String, Operator>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `op`, replacing any operator already registered under its symbol
    pub fn register(&mut self, op: Operator) {
        if let Some(old) = self.operators.insert(op.symbol.clone(), op) {
            tracing::debug!(symbol = old.symbol(), arity = old.arity(), "operator replaced");
        }
    }

    pub fn lookup(&self, symbol: &str) -> Option<&Operator> {
        self.operators.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// registered symbols in sorted order
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

impl Extend<Operator> for OperatorRegistry {
    fn extend<T: IntoIterator<Item = Operator>>(&mut self, iter: T) {
        for op in iter {
            self.register(op);
        }
    }
}

impl FromIterator<Operator> for OperatorRegistry {
    fn from_iter<T: IntoIterator<Item = Operator>>(iter: T) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

/// `+ - * /`, each binary. Division by zero follows IEEE 754.
pub fn four_operations() -> Vec<Operator> {
    vec![
        Operator::binary("+", |x, y| x + y),
        Operator::binary("-", |x, y| x - y),
        Operator::binary("*", |x, y| x * y),
        Operator::binary("/", |x, y| x / y),
    ]
}

/// The four operations plus a handful of common functions and constants
pub fn extended() -> Vec<Operator> {
    let mut ops = four_operations();

    ops.extend([
        Operator::binary("^", f64::powf),
        Operator::binary("%", |x, y| x % y),
        Operator::binary("min", f64::min),
        Operator::binary("max", f64::max),
        Operator::unary("neg", |x| -x),
        Operator::unary("abs", f64::abs),
        Operator::unary("sqrt", f64::sqrt),
        Operator::constant("pi", std::f64::consts::PI),
        Operator::constant("e", std::f64::consts::E),
    ]);

    ops
}
