//! Safe arithmetic expression evaluation.
//!
//! Pipeline for calculator input:
//! - `%` is rewritten textually to `/100` ([`normalize_percent`])
//! - the result is parsed into an [`Expr`] by a restricted grammar
//! - the tree is reduced using only the fixed operator and function tables

pub mod evaluator;
pub mod parser;
pub mod tables;


pub use evaluator::{evaluate_expr, EvalError};
pub use parser::{parse_expression, Expr, ParseError, MAX_DEPTH};
pub use tables::{lookup_function, BinaryOperator, Builtin, UnaryOperator, FUNCTIONS};

use thiserror::Error;

/// Failure of a full evaluation: either the text did not parse, or the tree
/// could not be reduced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),
    #[error("{0}")]
    Eval(#[from] EvalError),
}

impl CalcError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }

    pub fn is_eval(&self) -> bool {
        matches!(self, Self::Eval(_))
    }
}

/// Replace every `%` with `/100`.
///
/// Plain text substitution with no knowledge of the surrounding tokens:
/// `"2+50%"` becomes `"2+50/100"`, which is 2.5.
pub fn normalize_percent(input: &str) -> String {
    input.replace('%', "/100")
}

/// Evaluate calculator input.
pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    let normalized = normalize_percent(input);
    let expr = parse_expression(&normalized)?;
    Ok(evaluate_expr(&expr)?)
}
