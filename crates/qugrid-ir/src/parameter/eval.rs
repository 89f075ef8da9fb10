//! Complex-valued evaluation of parameter expressions.

use std::f64::consts::{E, PI};

use num_complex::Complex64;
use rustc_hash::FxHashMap;

use super::{Function, ParameterExpression};
use crate::error::{IrError, IrResult};

/// Values bound to free symbols during evaluation.
pub type SymbolTable = FxHashMap<String, Complex64>;

impl ParameterExpression {
    /// Evaluate to a complex number, resolving symbols from `symbols`.
    pub fn evaluate(&self, symbols: &SymbolTable) -> IrResult<Complex64> {
        Ok(match self {
            ParameterExpression::Constant(v) => Complex64::new(*v, 0.0),
            ParameterExpression::Symbol(name) => *symbols
                .get(name)
                .ok_or_else(|| IrError::UnboundParameter(name.clone()))?,
            ParameterExpression::Pi => Complex64::new(PI, 0.0),
            ParameterExpression::E => Complex64::new(E, 0.0),
            ParameterExpression::ImaginaryUnit => Complex64::i(),
            ParameterExpression::Group(e) => e.evaluate(symbols)?,
            ParameterExpression::Neg(e) => -e.evaluate(symbols)?,
            ParameterExpression::Add(a, b) => a.evaluate(symbols)? + b.evaluate(symbols)?,
            ParameterExpression::Sub(a, b) => a.evaluate(symbols)? - b.evaluate(symbols)?,
            ParameterExpression::Mul(a, b) => a.evaluate(symbols)? * b.evaluate(symbols)?,
            ParameterExpression::Div(a, b) => a.evaluate(symbols)? / b.evaluate(symbols)?,
            ParameterExpression::Pow(a, b) => power(a.evaluate(symbols)?, b.evaluate(symbols)?),
            ParameterExpression::Call(func, args) => {
                let values = args
                    .iter()
                    .map(|a| a.evaluate(symbols))
                    .collect::<IrResult<Vec<_>>>()?;
                call(*func, &values)?
            }
        })
    }

    /// Evaluate an expression that only uses built-in constants.
    pub fn evaluate_constant(&self) -> IrResult<Complex64> {
        self.evaluate(&SymbolTable::default())
    }
}

/// `base^exponent`, exact for real integer exponents and non-negative real bases.
fn power(base: Complex64, exponent: Complex64) -> Complex64 {
    if exponent.im == 0.0 {
        let n = exponent.re;
        if n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX) {
            #[allow(clippy::cast_possible_truncation)]
            return base.powi(n as i32);
        }
        if base.im == 0.0 && base.re >= 0.0 {
            return Complex64::new(base.re.powf(n), 0.0);
        }
    }
    base.powc(exponent)
}

fn call(func: Function, args: &[Complex64]) -> IrResult<Complex64> {
    if args.len() != func.arity() {
        return Err(IrError::ArityMismatch {
            function: func.name().to_string(),
            expected: func.arity(),
            got: args.len(),
        });
    }
    let x = args[0];
    Ok(match func {
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Sqrt => {
            if x.im == 0.0 && x.re >= 0.0 {
                Complex64::new(x.re.sqrt(), 0.0)
            } else {
                x.sqrt()
            }
        }
        Function::Exp => x.exp(),
        Function::Log => x.ln(),
        Function::Abs => Complex64::new(x.norm(), 0.0),
        Function::Pow => power(x, args[1]),
    })
}
