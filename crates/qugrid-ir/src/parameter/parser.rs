//! Precedence-climbing parser for parameter expressions.

use super::lexer::{SpannedToken, Token, tokenize};
use super::{Function, ParameterExpression};
use crate::error::{IrError, IrResult};

/// Binary operators, in the order they bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Pow => 4,
    }
}

/// Operand precedence of unary minus: binds tighter than `*`, looser than `^`.
const UNARY_OPERAND_PREC: u8 = 4;

/// Parser state.
pub(super) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser from source.
    pub(super) fn new(source: &'a str) -> IrResult<Self> {
        let mut tokens = Vec::new();
        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, msg)) => {
                    return Err(IrError::InvalidExpression {
                        expression: source.to_string(),
                        message: format!("{msg} at position {}", span.start),
                    });
                }
            }
        }

        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    fn error(&self, message: impl Into<String>) -> IrError {
        IrError::InvalidExpression {
            expression: self.source.to_string(),
            message: message.into(),
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    #[allow(clippy::needless_pass_by_value)]
    fn expect(&mut self, expected: Token) -> IrResult<()> {
        let found = self
            .advance()
            .ok_or_else(|| self.error(format!("expected '{expected}', found end of input")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(self.error(format!("expected '{expected}', found '{found}'")));
        }
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse the whole input as one expression.
    pub(super) fn parse_complete(&mut self) -> IrResult<ParameterExpression> {
        if self.is_eof() {
            return Err(self.error("empty expression"));
        }
        let expr = self.parse_expression()?;
        if let Some(token) = self.peek() {
            return Err(self.error(format!("unexpected trailing '{token}'")));
        }
        Ok(expr)
    }

    fn parse_expression(&mut self) -> IrResult<ParameterExpression> {
        self.parse_binary_expr(0)
    }

    /// Parse binary expression with precedence climbing. `^` is right-associative.
    fn parse_binary_expr(&mut self, min_prec: u8) -> IrResult<ParameterExpression> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance();

            let next_prec = if op == BinOp::Pow { prec } else { prec + 1 };
            let right = Box::new(self.parse_binary_expr(next_prec)?);
            let lhs = Box::new(left);
            left = match op {
                BinOp::Add => ParameterExpression::Add(lhs, right),
                BinOp::Sub => ParameterExpression::Sub(lhs, right),
                BinOp::Mul => ParameterExpression::Mul(lhs, right),
                BinOp::Div => ParameterExpression::Div(lhs, right),
                BinOp::Pow => ParameterExpression::Pow(lhs, right),
            };
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> IrResult<ParameterExpression> {
        if self.consume(&Token::Minus) {
            let expr = self.parse_binary_expr(UNARY_OPERAND_PREC)?;
            return Ok(ParameterExpression::Neg(Box::new(expr)));
        }
        if self.consume(&Token::Plus) {
            return self.parse_binary_expr(UNARY_OPERAND_PREC);
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> IrResult<ParameterExpression> {
        let token = self
            .advance()
            .ok_or_else(|| self.error("unexpected end of input"))?;

        match token {
            Token::Number(v) => Ok(ParameterExpression::Constant(v)),
            Token::Identifier(name) => {
                if self.consume(&Token::LParen) {
                    let func =
                        Function::from_name(&name).ok_or(IrError::UnknownFunction(name.clone()))?;
                    let args = self.parse_expression_list()?;
                    self.expect(Token::RParen)?;
                    if args.len() != func.arity() {
                        return Err(IrError::ArityMismatch {
                            function: name,
                            expected: func.arity(),
                            got: args.len(),
                        });
                    }
                    return Ok(ParameterExpression::Call(func, args));
                }
                // Keep in sync with `ParameterExpression::is_reserved_name`.
                Ok(match name.as_str() {
                    "pi" | "PI" => ParameterExpression::Pi,
                    "e" => ParameterExpression::E,
                    "i" => ParameterExpression::ImaginaryUnit,
                    _ => ParameterExpression::Symbol(name),
                })
            }
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(ParameterExpression::Group(Box::new(expr)))
            }
            other => Err(self.error(format!("expected expression, found '{other}'"))),
        }
    }

    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Caret => Some(BinOp::Pow),
            _ => None,
        }
    }

    fn parse_expression_list(&mut self) -> IrResult<Vec<ParameterExpression>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParameterExpression {
        ParameterExpression::parse(source).unwrap()
    }

    fn sym(name: &str) -> Box<ParameterExpression> {
        Box::new(ParameterExpression::symbol(name))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse("a+b*c"),
            ParameterExpression::Add(
                sym("a"),
                Box::new(ParameterExpression::Mul(sym("b"), sym("c")))
            )
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            parse("a-b-c"),
            ParameterExpression::Sub(
                Box::new(ParameterExpression::Sub(sym("a"), sym("b"))),
                sym("c")
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse("a^b^c"),
            ParameterExpression::Pow(
                sym("a"),
                Box::new(ParameterExpression::Pow(sym("b"), sym("c")))
            )
        );
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        assert_eq!(
            parse("-a^2"),
            ParameterExpression::Neg(Box::new(ParameterExpression::Pow(
                sym("a"),
                Box::new(ParameterExpression::Constant(2.0))
            )))
        );
        assert_eq!(
            parse("-a*b"),
            ParameterExpression::Mul(Box::new(ParameterExpression::Neg(sym("a"))), sym("b"))
        );
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(parse("pi"), ParameterExpression::Pi);
        assert_eq!(parse("PI"), ParameterExpression::Pi);
        assert_eq!(parse("e"), ParameterExpression::E);
        assert_eq!(parse("i"), ParameterExpression::ImaginaryUnit);
    }

    #[test]
    fn test_function_call() {
        assert_eq!(
            parse("pow(x, 2)"),
            ParameterExpression::Call(
                Function::Pow,
                vec![
                    ParameterExpression::symbol("x"),
                    ParameterExpression::Constant(2.0)
                ]
            )
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            ParameterExpression::parse("foo(1)"),
            Err(IrError::UnknownFunction(name)) if name == "foo"
        ));
        assert!(matches!(
            ParameterExpression::parse("sin(1, 2)"),
            Err(IrError::ArityMismatch { expected: 1, got: 2, .. })
        ));
        assert!(matches!(
            ParameterExpression::parse("(1+2"),
            Err(IrError::InvalidExpression { .. })
        ));
        assert!(matches!(
            ParameterExpression::parse("1 2"),
            Err(IrError::InvalidExpression { .. })
        ));
        assert!(matches!(
            ParameterExpression::parse(""),
            Err(IrError::InvalidExpression { .. })
        ));
    }
}
