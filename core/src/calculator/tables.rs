//! The fixed operator and function tables.
//!
//! Everything the evaluator is able to compute is listed here. Operators are
//! closed enums whose `apply` methods are the operator table; functions live in
//! the immutable [`FUNCTIONS`] array. Nothing outside these tables can be
//! reached from an expression.

use super::evaluator::EvalError;

/// Binary operator tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
}

impl BinaryOperator {
    /// Surface syntax of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
            Self::Mod => "%",
        }
    }

    pub fn apply(&self, l: f64, r: f64) -> Result<f64, EvalError> {
        match self {
            Self::Add => Ok(l + r),
            Self::Sub => Ok(l - r),
            Self::Mul => Ok(l * r),
            Self::Div => {
                if r == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(l / r)
                }
            }
            Self::Mod => {
                if r == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                // Floored modulo: the result takes the sign of the divisor.
                let m = l % r;
                if m != 0.0 && (m < 0.0) != (r < 0.0) {
                    Ok(m + r)
                } else {
                    Ok(m)
                }
            }
            Self::Pow => power(l, r),
        }
    }
}

fn power(base: f64, exp: f64) -> Result<f64, EvalError> {
    if base == 0.0 && exp < 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    if base < 0.0 && exp.is_finite() && exp.fract() != 0.0 {
        return Err(EvalError::MathDomain(format!(
            "negative base {} raised to fractional power {}",
            base, exp
        )));
    }
    let value = base.powf(exp);
    if value.is_infinite() && base.is_finite() && exp.is_finite() {
        return Err(EvalError::Overflow(format!("{} ** {}", base, exp)));
    }
    Ok(value)
}

/// Unary prefix operator tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Plus,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Self::Neg => -value,
            Self::Plus => value,
        }
    }
}

/// An allow-listed function.
#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    apply: fn(f64) -> Result<f64, EvalError>,
}

impl Builtin {
    /// Invoke the function. The caller is responsible for checking `arity`.
    pub fn call(&self, arg: f64) -> Result<f64, EvalError> {
        (self.apply)(arg)
    }
}

pub static FUNCTIONS: [Builtin; 10] = [
    Builtin { name: "sqrt", arity: 1, apply: sqrt },
    Builtin { name: "log", arity: 1, apply: ln },
    Builtin { name: "log10", arity: 1, apply: log10 },
    Builtin { name: "sin", arity: 1, apply: sin },
    Builtin { name: "cos", arity: 1, apply: cos },
    Builtin { name: "tan", arity: 1, apply: tan },
    Builtin { name: "ceil", arity: 1, apply: ceil },
    Builtin { name: "floor", arity: 1, apply: floor },
    Builtin { name: "abs", arity: 1, apply: abs },
    Builtin { name: "round", arity: 1, apply: round },
];

/// Find a function by its exact (case-sensitive) name.
pub fn lookup_function(name: &str) -> Option<&'static Builtin> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

fn sqrt(x: f64) -> Result<f64, EvalError> {
    if x < 0.0 {
        Err(EvalError::MathDomain("sqrt of negative number".to_string()))
    } else {
        Ok(x.sqrt())
    }
}

fn ln(x: f64) -> Result<f64, EvalError> {
    if x <= 0.0 {
        Err(EvalError::MathDomain("log of non-positive number".to_string()))
    } else {
        Ok(x.ln())
    }
}

fn log10(x: f64) -> Result<f64, EvalError> {
    if x <= 0.0 {
        Err(EvalError::MathDomain("log10 of non-positive number".to_string()))
    } else {
        Ok(x.log10())
    }
}

fn trig_arg(name: &str, x: f64) -> Result<f64, EvalError> {
    if x.is_infinite() {
        Err(EvalError::MathDomain(format!("{} of infinity", name)))
    } else {
        Ok(x)
    }
}

fn sin(x: f64) -> Result<f64, EvalError> {
    trig_arg("sin", x).map(f64::sin)
}

fn cos(x: f64) -> Result<f64, EvalError> {
    trig_arg("cos", x).map(f64::cos)
}

fn tan(x: f64) -> Result<f64, EvalError> {
    trig_arg("tan", x).map(f64::tan)
}

// Rounding functions produce integers, so infinity has no representable result.
fn integral_arg(name: &str, x: f64) -> Result<f64, EvalError> {
    if x.is_infinite() {
        Err(EvalError::Overflow(format!("cannot {} infinity", name)))
    } else {
        Ok(x)
    }
}

fn ceil(x: f64) -> Result<f64, EvalError> {
    integral_arg("ceil", x).map(f64::ceil)
}

fn floor(x: f64) -> Result<f64, EvalError> {
    integral_arg("floor", x).map(f64::floor)
}

fn abs(x: f64) -> Result<f64, EvalError> {
    Ok(x.abs())
}

/// Round half to even, so `round(2.5) == 2` and `round(3.5) == 4`.
fn round(x: f64) -> Result<f64, EvalError> {
    integral_arg("round", x).map(f64::round_ties_even)
}
