//! Recursive-descent parser producing [`Expr`] trees
//!
//! Precedence, lowest first: assignment (`<-`, `=`, right associative),
//! comparison, `+ -`, `* /`, `%%`, `:`, unary `- + !`, `^` (right
//! associative), then calls and indexing.

use super::lexer::{tokenize, Token, TokenKind};
use crate::errors::EvalError;

/// Nesting beyond this is refused instead of risking the stack. Applies both
/// to parser recursion and to the height of the finished tree.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    Range,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
    Ident(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Assign(String, Box<Expr>),
    Call(String, Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

/// Parse a whole line into its `;`-separated statements
pub fn parse(source: &str) -> Result<Vec<Expr>, EvalError> {
    Parser::new(source)?.parse_program()
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, EvalError> {
        Ok(Parser { source, tokens: tokenize(source)?, pos: 0, depth: 0 })
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> EvalError {
        let token = &self.tokens[self.pos];
        EvalError::recognized(format!(
            "unexpected {} in \"{}\"",
            token.kind.describe(),
            self.source[..token.end].trim_end()
        ))
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), EvalError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    pub fn parse_program(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut statements = Vec::new();
        loop {
            while self.eat(&TokenKind::Semi) {}
            if *self.peek() == TokenKind::Eof {
                break;
            }
            statements.push(self.assignment()?);
            match self.peek() {
                TokenKind::Semi | TokenKind::Eof => {}
                _ => return Err(self.unexpected()),
            }
        }
        Ok(statements)
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Opaque);
        }
        Ok(())
    }

    /// Refuse trees the evaluator could not walk; long flat chains such as
    /// `1+1+...` nest on the left without recursing in the parser
    fn node(&self, expr: Expr) -> Result<Expr, EvalError> {
        if height(&expr) > MAX_DEPTH {
            return Err(EvalError::Opaque);
        }
        Ok(expr)
    }

    fn assignment(&mut self) -> Result<Expr, EvalError> {
        self.enter()?;
        let target = self.comparison()?;
        let expr = if matches!(self.peek(), TokenKind::LArrow | TokenKind::Assign) {
            self.advance();
            let value = self.assignment()?;
            match target {
                Expr::Ident(name) => self.node(Expr::Assign(name, Box::new(value)))?,
                _ => {
                    return Err(EvalError::recognized(
                        "invalid (do_set) left-hand side to assignment",
                    ))
                }
            }
        } else {
            target
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.additive()?;
            lhs = self.node(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))?;
        }
    }

    fn additive(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = self.node(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))?;
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.modulo()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.modulo()?;
            lhs = self.node(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))?;
        }
    }

    fn modulo(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.range()?;
        while self.eat(&TokenKind::Modulo) {
            let rhs = self.range()?;
            lhs = self.node(Expr::Binary(BinOp::Mod, Box::new(lhs), Box::new(rhs)))?;
        }
        Ok(lhs)
    }

    fn range(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        while self.eat(&TokenKind::Colon) {
            let rhs = self.unary()?;
            lhs = self.node(Expr::Binary(BinOp::Range, Box::new(lhs), Box::new(rhs)))?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.unary()?;
        self.depth -= 1;
        self.node(Expr::Unary(op, Box::new(operand)))
    }

    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.postfix()?;
        if self.eat(&TokenKind::Caret) {
            self.enter()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return self.node(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    let name = match &expr {
                        Expr::Ident(name) => name.clone(),
                        _ => return Err(self.unexpected()),
                    };
                    self.advance();
                    let args = self.arguments()?;
                    expr = self.node(Expr::Call(name, args))?;
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.assignment()?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = self.node(Expr::Index(Box::new(expr), Box::new(index)))?;
                }
                _ => return Ok(expr),
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.assignment()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let expr = match self.peek().clone() {
            TokenKind::Num(n) => Expr::Num(n),
            TokenKind::Str(s) => Expr::Str(s),
            TokenKind::True => Expr::Bool(true),
            TokenKind::False => Expr::Bool(false),
            TokenKind::Null => Expr::Null,
            TokenKind::Ident(name) => Expr::Ident(name),
            TokenKind::LParen => {
                self.advance();
                let inner = self.assignment()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(expr)
    }
}

/// Longest root-to-leaf path; children are already within `MAX_DEPTH`
fn height(expr: &Expr) -> usize {
    match expr {
        Expr::Unary(_, inner) | Expr::Assign(_, inner) => 1 + height(inner),
        Expr::Binary(_, lhs, rhs) | Expr::Index(lhs, rhs) => 1 + height(lhs).max(height(rhs)),
        Expr::Call(_, args) => 1 + args.iter().map(height).max().unwrap_or(0),
        _ => 1,
    }
}
