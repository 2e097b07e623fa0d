//! Allow-list evaluator: reduces a parsed [`Expr`] to a number.

use super::parser::Expr;
use super::tables::lookup_function;
use thiserror::Error;

/// Evaluation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A function name absent from the function table
    #[error("{0} is not allowed")]
    NotAllowed(String),
    /// Division or modulo by zero, or zero raised to a negative power
    #[error("division by zero")]
    DivisionByZero,
    /// Wrong number of arguments for an allow-listed function
    #[error("invalid function arguments: {name}() takes {expected} argument(s), {given} given")]
    InvalidArguments {
        name: String,
        expected: usize,
        given: usize,
    },
    /// Function or operator applied outside its valid input range
    #[error("math domain error: {0}")]
    MathDomain(String),
    #[error("numerical result out of range: {0}")]
    Overflow(String),
}

/// Evaluate a syntax tree.
///
/// Pure: the result depends only on `expr` and the fixed tables.
pub fn evaluate_expr(expr: &Expr) -> Result<f64, EvalError> {
    let value = match expr {
        Expr::Number(n) => return Ok(*n),

        Expr::BinaryOp { op, left, right } => {
            let l = evaluate_expr(left)?;
            let r = evaluate_expr(right)?;
            op.apply(l, r)?
        }

        Expr::UnaryOp { op, operand } => op.apply(evaluate_expr(operand)?),

        Expr::Call { name, args } => {
            let function = lookup_function(name)
                .ok_or_else(|| EvalError::NotAllowed(format!("function '{}'", name)))?;

            let values = args
                .iter()
                .map(evaluate_expr)
                .collect::<Result<Vec<_>, _>>()?;

            match values.as_slice() {
                [arg] if function.arity == 1 => function.call(*arg)?,
                _ => {
                    return Err(EvalError::InvalidArguments {
                        name: name.clone(),
                        expected: function.arity,
                        given: values.len(),
                    })
                }
            }
        }
    };

    if value.is_nan() {
        return Err(EvalError::MathDomain(format!(
            "result of {} is not a number",
            describe(expr)
        )));
    }
    // Literals are finite, so an infinite node result is always an overflow.
    if value.is_infinite() {
        return Err(EvalError::Overflow(format!(
            "result of {} is infinite",
            describe(expr)
        )));
    }
    Ok(value)
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Number(n) => n.to_string(),
        Expr::BinaryOp { op, .. } => format!("'{}'", op.symbol()),
        Expr::UnaryOp { op, .. } => format!("unary '{}'", op.symbol()),
        Expr::Call { name, .. } => format!("{}()", name),
    }
}
