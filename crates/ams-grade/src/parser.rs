use ams_core::errors::GradeError;
use ams_frame::Value;

use crate::ast::{BinOp, BoolOp, CmpOp, Expr, Stmt, UnaryOp};
use crate::lexer::{syntax_error, tokenize, Keyword, Spanned, Tok};

/// Parses one doctest statement: an assignment or an expression.
pub fn parse_statement(source: &str) -> Result<Stmt, GradeError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(syntax_error("empty-statement", "nothing to evaluate", 0));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.len(),
    };
    let stmt = parser.statement()?;
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(syntax_error(
            "unexpected-token",
            format!("unexpected {:?} after statement", extra.tok),
            extra.offset,
        ));
    }
    Ok(stmt)
}

/// Parses a bare expression.
pub fn parse_expression(source: &str) -> Result<Expr, GradeError> {
    match parse_statement(source)? {
        Stmt::Expr(expr) => Ok(expr),
        Stmt::Assign { .. } => Err(syntax_error(
            "unexpected-assignment",
            "expected an expression, found an assignment",
            0,
        )),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|spanned| &spanned.tok)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + ahead).map(|spanned| &spanned.tok)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.end, |spanned| spanned.offset)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|spanned| spanned.tok.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Tok) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        self.eat(&Tok::Keyword(keyword))
    }

    fn expect(&mut self, expected: Tok) -> Result<(), GradeError> {
        if self.eat(&expected) {
            return Ok(());
        }
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_string(), |tok| format!("{tok:?}"));
        Err(syntax_error(
            "unexpected-token",
            format!("expected {expected:?}, found {found}"),
            self.offset(),
        ))
    }

    fn statement(&mut self) -> Result<Stmt, GradeError> {
        if let (Some(Tok::Name(name)), Some(Tok::Assign)) = (self.peek(), self.peek_at(1)) {
            let target = name.clone();
            self.pos += 2;
            let value = self.expression()?;
            return Ok(Stmt::Assign { target, value });
        }
        Ok(Stmt::Expr(self.expression()?))
    }

    fn expression(&mut self) -> Result<Expr, GradeError> {
        self.or_test()
    }

    fn or_test(&mut self) -> Result<Expr, GradeError> {
        let mut left = self.and_test()?;
        while self.eat_keyword(Keyword::Or) {
            let right = self.and_test()?;
            left = Expr::BoolOp {
                op: BoolOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and_test(&mut self) -> Result<Expr, GradeError> {
        let mut left = self.not_test()?;
        while self.eat_keyword(Keyword::And) {
            let right = self.not_test()?;
            left = Expr::BoolOp {
                op: BoolOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn not_test(&mut self) -> Result<Expr, GradeError> {
        if self.eat_keyword(Keyword::Not) {
            let operand = self.not_test()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let tok = self.peek()?.clone();
        let op = match tok {
            Tok::EqEq => CmpOp::Eq,
            Tok::NotEq => CmpOp::NotEq,
            Tok::Lt => CmpOp::Lt,
            Tok::Le => CmpOp::Le,
            Tok::Gt => CmpOp::Gt,
            Tok::Ge => CmpOp::Ge,
            Tok::Keyword(Keyword::In) => CmpOp::In,
            Tok::Keyword(Keyword::Not)
                if self.peek_at(1) == Some(&Tok::Keyword(Keyword::In)) =>
            {
                self.pos += 1;
                CmpOp::NotIn
            }
            Tok::Keyword(Keyword::Is) => {
                if self.peek_at(1) == Some(&Tok::Keyword(Keyword::Not)) {
                    self.pos += 1;
                    CmpOp::IsNot
                } else {
                    CmpOp::Is
                }
            }
            _ => return None,
        };
        self.pos += 1;
        Some(op)
    }

    fn comparison(&mut self) -> Result<Expr, GradeError> {
        let first = self.arith()?;
        let mut rest = Vec::new();
        while let Some(op) = self.comparison_op() {
            rest.push((op, self.arith()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn arith(&mut self) -> Result<Expr, GradeError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinOp::Add,
                Some(Tok::Minus) => BinOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.term()?;
            left = binary(op, left, right);
        }
    }

    fn term(&mut self) -> Result<Expr, GradeError> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => BinOp::Mul,
                Some(Tok::Slash) => BinOp::Div,
                Some(Tok::DoubleSlash) => BinOp::FloorDiv,
                Some(Tok::Percent) => BinOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.factor()?;
            left = binary(op, left, right);
        }
    }

    fn factor(&mut self) -> Result<Expr, GradeError> {
        let op = match self.peek() {
            Some(Tok::Minus) => UnaryOp::Neg,
            Some(Tok::Plus) => UnaryOp::Pos,
            _ => return self.power(),
        };
        self.pos += 1;
        let operand = self.factor()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn power(&mut self) -> Result<Expr, GradeError> {
        let base = self.postfix()?;
        if self.eat(&Tok::DoubleStar) {
            let exponent = self.factor()?;
            return Ok(binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr, GradeError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat(&Tok::LParen) {
                let (args, kwargs) = self.call_arguments()?;
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                    kwargs,
                };
            } else if self.eat(&Tok::LBracket) {
                let index = self.expression()?;
                self.expect(Tok::RBracket)?;
                expr = Expr::Subscript {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat(&Tok::Dot) {
                let offset = self.offset();
                match self.advance() {
                    Some(Tok::Name(name)) => {
                        expr = Expr::Attribute {
                            object: Box::new(expr),
                            name,
                        }
                    }
                    _ => {
                        return Err(syntax_error(
                            "expected-attribute",
                            "expected an attribute name after '.'",
                            offset,
                        ))
                    }
                }
            } else {
                return Ok(expr);
            }
        }
    }

    fn call_arguments(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), GradeError> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();
        while !self.eat(&Tok::RParen) {
            if let (Some(Tok::Name(name)), Some(Tok::Assign)) = (self.peek(), self.peek_at(1)) {
                let name = name.clone();
                self.pos += 2;
                kwargs.push((name, self.expression()?));
            } else {
                if !kwargs.is_empty() {
                    return Err(syntax_error(
                        "positional-after-keyword",
                        "positional argument follows keyword argument",
                        self.offset(),
                    ));
                }
                args.push(self.expression()?);
            }
            if !self.eat(&Tok::Comma) {
                self.expect(Tok::RParen)?;
                break;
            }
        }
        Ok((args, kwargs))
    }

    fn atom(&mut self) -> Result<Expr, GradeError> {
        let offset = self.offset();
        let tok = self.advance().ok_or_else(|| {
            syntax_error("unexpected-eof", "unexpected end of input", offset)
        })?;
        match tok {
            Tok::Name(name) => Ok(Expr::Name(name)),
            Tok::Int(int) => Ok(Expr::Literal(Value::Int(int))),
            Tok::Float(float) => Ok(Expr::Literal(Value::Float(float))),
            Tok::Str(mut text) => {
                // adjacent literals concatenate
                while let Some(Tok::Str(more)) = self.peek() {
                    text.push_str(more);
                    self.pos += 1;
                }
                Ok(Expr::Literal(Value::Str(text)))
            }
            Tok::Ellipsis => Ok(Expr::Literal(Value::Ellipsis)),
            Tok::Keyword(Keyword::True) => Ok(Expr::Literal(Value::Bool(true))),
            Tok::Keyword(Keyword::False) => Ok(Expr::Literal(Value::Bool(false))),
            Tok::Keyword(Keyword::None) => Ok(Expr::Literal(Value::None)),
            Tok::LParen => self.parenthesized(),
            Tok::LBracket => self.list_display(),
            other => Err(syntax_error(
                "unexpected-token",
                format!("unexpected {other:?}"),
                offset,
            )),
        }
    }

    fn parenthesized(&mut self) -> Result<Expr, GradeError> {
        if self.eat(&Tok::RParen) {
            return Ok(Expr::Tuple(Vec::new()));
        }
        let first = self.expression()?;
        if self.eat(&Tok::RParen) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Tok::Comma) {
            if self.peek() == Some(&Tok::RParen) {
                break;
            }
            items.push(self.expression()?);
        }
        self.expect(Tok::RParen)?;
        Ok(Expr::Tuple(items))
    }

    fn list_display(&mut self) -> Result<Expr, GradeError> {
        if self.eat(&Tok::RBracket) {
            return Ok(Expr::List(Vec::new()));
        }
        let first = self.expression()?;
        if self.eat_keyword(Keyword::For) {
            let offset = self.offset();
            let target = match self.advance() {
                Some(Tok::Name(name)) => name,
                _ => {
                    return Err(syntax_error(
                        "expected-target",
                        "expected a loop variable after 'for'",
                        offset,
                    ))
                }
            };
            if !self.eat_keyword(Keyword::In) {
                return Err(syntax_error(
                    "expected-in",
                    "expected 'in' in comprehension",
                    self.offset(),
                ));
            }
            let iter = self.or_test()?;
            let condition = if self.eat_keyword(Keyword::If) {
                Some(Box::new(self.or_test()?))
            } else {
                None
            };
            self.expect(Tok::RBracket)?;
            return Ok(Expr::ListComp {
                element: Box::new(first),
                target,
                iter: Box::new(iter),
                condition,
            });
        }
        let mut items = vec![first];
        while self.eat(&Tok::Comma) {
            if self.peek() == Some(&Tok::RBracket) {
                break;
            }
            items.push(self.expression()?);
        }
        self.expect(Tok::RBracket)?;
        Ok(Expr::List(items))
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
