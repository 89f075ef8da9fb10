//! Parameter expressions for parametric gates.
//!
//! Gate matrix templates and custom-gate parameter bindings are written as
//! small infix expressions (`cos(theta/2)`, `exp(i*lambda)/sqrt(2)`). This
//! module parses them into a [`ParameterExpression`] tree that can be
//! evaluated to a complex number, have symbols substituted by other
//! expressions, and be printed back to text.

mod eval;
mod lexer;
mod parser;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

pub use eval::SymbolTable;

/// Built-in functions callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Exp,
    Log,
    Abs,
    Pow,
}

impl Function {
    /// Name as written in expressions.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Abs => "abs",
            Function::Pow => "pow",
        }
    }

    /// Number of arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            Function::Pow => 2,
            _ => 1,
        }
    }

    /// Resolve a function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "sqrt" => Some(Function::Sqrt),
            "exp" => Some(Function::Exp),
            "log" => Some(Function::Log),
            "abs" => Some(Function::Abs),
            "pow" => Some(Function::Pow),
            _ => None,
        }
    }
}

/// A parsed parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A numeric literal.
    Constant(f64),
    /// A free symbol, usually a formal gate parameter.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Euler's number.
    E,
    /// The imaginary unit `i`.
    ImaginaryUnit,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Exponentiation.
    Pow(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Function call.
    Call(Function, Vec<ParameterExpression>),
    /// Explicit parentheses, kept so printing reproduces them.
    Group(Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Whether `name` is read as a constant (`pi`, `PI`, `e`, `i`) and so
    /// can never appear as a [`Symbol`](Self::Symbol).
    pub fn is_reserved_name(name: &str) -> bool {
        matches!(name, "pi" | "PI" | "e" | "i")
    }

    /// Parse an expression from text.
    pub fn parse(source: &str) -> IrResult<Self> {
        parser::Parser::new(source)?.parse_complete()
    }

    /// Check if this expression contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_)
            | ParameterExpression::Pi
            | ParameterExpression::E
            | ParameterExpression::ImaginaryUnit => false,
            ParameterExpression::Neg(e) | ParameterExpression::Group(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b)
            | ParameterExpression::Pow(a, b) => a.is_symbolic() || b.is_symbolic(),
            ParameterExpression::Call(_, args) => args.iter().any(Self::is_symbolic),
        }
    }

    /// Get all symbol names in this expression.
    pub fn symbols(&self) -> HashSet<String> {
        let mut set = HashSet::new();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut HashSet<String>) {
        match self {
            ParameterExpression::Constant(_)
            | ParameterExpression::Pi
            | ParameterExpression::E
            | ParameterExpression::ImaginaryUnit => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) | ParameterExpression::Group(e) => e.collect_symbols(set),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b)
            | ParameterExpression::Pow(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
            ParameterExpression::Call(_, args) => {
                for arg in args {
                    arg.collect_symbols(set);
                }
            }
        }
    }

    /// Replace every symbol found in `replacements` by the parenthesised
    /// replacement expression.
    pub fn substitute(&self, replacements: &FxHashMap<String, ParameterExpression>) -> Self {
        let sub = |e: &ParameterExpression| Box::new(e.substitute(replacements));
        match self {
            ParameterExpression::Symbol(name) => match replacements.get(name) {
                Some(replacement) => ParameterExpression::Group(Box::new(replacement.clone())),
                None => self.clone(),
            },
            ParameterExpression::Constant(_)
            | ParameterExpression::Pi
            | ParameterExpression::E
            | ParameterExpression::ImaginaryUnit => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(sub(e)),
            ParameterExpression::Group(e) => ParameterExpression::Group(sub(e)),
            ParameterExpression::Add(a, b) => ParameterExpression::Add(sub(a), sub(b)),
            ParameterExpression::Sub(a, b) => ParameterExpression::Sub(sub(a), sub(b)),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(sub(a), sub(b)),
            ParameterExpression::Div(a, b) => ParameterExpression::Div(sub(a), sub(b)),
            ParameterExpression::Pow(a, b) => ParameterExpression::Pow(sub(a), sub(b)),
            ParameterExpression::Call(func, args) => ParameterExpression::Call(
                *func,
                args.iter().map(|a| a.substitute(replacements)).collect(),
            ),
        }
    }

    /// Binding strength used when printing.
    fn precedence(&self) -> u8 {
        match self {
            ParameterExpression::Add(..) | ParameterExpression::Sub(..) => 1,
            ParameterExpression::Mul(..) | ParameterExpression::Div(..) => 2,
            ParameterExpression::Neg(_) => 3,
            ParameterExpression::Constant(v) if v.is_sign_negative() => 3,
            ParameterExpression::Pow(..) => 4,
            _ => 5,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "pi"),
            ParameterExpression::E => write!(f, "e"),
            ParameterExpression::ImaginaryUnit => write!(f, "i"),
            ParameterExpression::Group(e) => write!(f, "({e})"),
            ParameterExpression::Neg(e) => {
                write!(f, "-")?;
                e.fmt_operand(f, 4)
            }
            ParameterExpression::Add(a, b) => {
                a.fmt_operand(f, 1)?;
                write!(f, "+")?;
                b.fmt_operand(f, 2)
            }
            ParameterExpression::Sub(a, b) => {
                a.fmt_operand(f, 1)?;
                write!(f, "-")?;
                b.fmt_operand(f, 2)
            }
            ParameterExpression::Mul(a, b) => {
                a.fmt_operand(f, 2)?;
                write!(f, "*")?;
                b.fmt_operand(f, 3)
            }
            ParameterExpression::Div(a, b) => {
                a.fmt_operand(f, 2)?;
                write!(f, "/")?;
                b.fmt_operand(f, 3)
            }
            ParameterExpression::Pow(a, b) => {
                a.fmt_operand(f, 5)?;
                write!(f, "^")?;
                b.fmt_operand(f, 3)
            }
            ParameterExpression::Call(func, args) => {
                write!(f, "{}(", func.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for ParameterExpression {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParameterExpression::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}
