//! Recursive-descent parser for validation snippets.

use super::lexer::Token;
use super::SnippetError;

/// A statement in a snippet.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let name = expr`
    Let { name: String, value: Expr },
    /// `debug(label, expr)` — records into the diagnostic side channel.
    Debug { label: Expr, value: Expr },
    /// `return expr` (or bare `return`, yielding null).
    Return(Expr),
    /// A bare expression; the last one evaluated becomes the yield value
    /// when no `return` runs.
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// An expression in a snippet.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Ident(String),
    Member {
        object: Box<Expr>,
        field: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A builtin call such as `len(x)`; resolved at evaluation time.
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// Parses a token stream into a list of statements.
pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt>, SnippetError> {
    let mut parser = Parser { tokens, pos: 0 };
    parser.program()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn program(&mut self) -> Result<Vec<Stmt>, SnippetError> {
        let mut stmts = Vec::new();

        loop {
            self.skip_separators();
            if self.at_end() {
                break;
            }
            stmts.push(self.statement()?);

            // Each statement ends at a separator or the end of input.
            match self.peek() {
                None | Some(Token::Separator) => {}
                Some(other) => {
                    return Err(SnippetError::new(format!(
                        "expected end of statement, found {}",
                        describe(other)
                    )));
                }
            }
        }

        if stmts.is_empty() {
            return Err(SnippetError::new("snippet is empty"));
        }

        Ok(stmts)
    }

    fn statement(&mut self) -> Result<Stmt, SnippetError> {
        match self.peek() {
            Some(Token::Let) => {
                self.advance();
                let name = match self.advance() {
                    Some(Token::Ident(name)) => name.clone(),
                    other => {
                        return Err(SnippetError::new(format!(
                            "expected name after 'let', found {}",
                            describe_opt(other)
                        )));
                    }
                };
                self.expect(&Token::Assign, "expected '=' in let binding")?;
                let value = self.expression()?;
                Ok(Stmt::Let { name, value })
            }
            Some(Token::Debug) => {
                self.advance();
                self.expect(&Token::LParen, "expected '(' after 'debug'")?;
                let label = self.expression()?;
                self.expect(&Token::Comma, "expected ',' between debug name and value")?;
                let value = self.expression()?;
                self.expect(&Token::RParen, "expected ')' to close debug(...)")?;
                Ok(Stmt::Debug { label, value })
            }
            Some(Token::Return) => {
                self.advance();
                match self.peek() {
                    None | Some(Token::Separator) => Ok(Stmt::Return(Expr::Null)),
                    _ => Ok(Stmt::Return(self.expression()?)),
                }
            }
            _ => Ok(Stmt::Expr(self.expression()?)),
        }
    }

    // Precedence climbing, loosest first: || , && , == != , < <= > >= ,
    // + - , * / , unary, postfix, primary.

    fn expression(&mut self) -> Result<Expr, SnippetError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, SnippetError> {
        let mut lhs = self.and_expr()?;
        while self.eat(&Token::OrOr) {
            let rhs = self.and_expr()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, SnippetError> {
        let mut lhs = self.equality_expr()?;
        while self.eat(&Token::AndAnd) {
            let rhs = self.equality_expr()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn equality_expr(&mut self) -> Result<Expr, SnippetError> {
        let mut lhs = self.comparison_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.comparison_expr()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn comparison_expr(&mut self) -> Result<Expr, SnippetError> {
        let mut lhs = self.additive_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.additive_expr()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn additive_expr(&mut self) -> Result<Expr, SnippetError> {
        let mut lhs = self.multiplicative_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.multiplicative_expr()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn multiplicative_expr(&mut self) -> Result<Expr, SnippetError> {
        let mut lhs = self.unary_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.unary_expr()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Expr, SnippetError> {
        match self.peek() {
            Some(Token::Bang) => {
                self.advance();
                let expr = self.unary_expr()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(expr),
                })
            }
            Some(Token::Minus) => {
                self.advance();
                let expr = self.unary_expr()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(expr),
                })
            }
            _ => self.postfix_expr(),
        }
    }

    fn postfix_expr(&mut self) -> Result<Expr, SnippetError> {
        let mut expr = self.primary_expr()?;

        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    let field = match self.advance() {
                        Some(Token::Ident(name)) => name.clone(),
                        other => {
                            return Err(SnippetError::new(format!(
                                "expected field name after '.', found {}",
                                describe_opt(other)
                            )));
                        }
                    };
                    expr = Expr::Member {
                        object: Box::new(expr),
                        field,
                    };
                }
                Some(Token::LBracket) => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(&Token::RBracket, "expected ']' to close index")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn primary_expr(&mut self) -> Result<Expr, SnippetError> {
        match self.advance() {
            Some(Token::Null) => Ok(Expr::Null),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Number(n)) => Ok(Expr::Number(*n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s.clone())),
            Some(Token::Ident(name)) => {
                let name = name.clone();
                if self.eat(&Token::LParen) {
                    let mut args = Vec::new();
                    if !self.eat(&Token::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if self.eat(&Token::Comma) {
                                continue;
                            }
                            self.expect(&Token::RParen, "expected ')' to close call")?;
                            break;
                        }
                    }
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.expression()?;
                self.expect(&Token::RParen, "expected ')' to close group")?;
                Ok(expr)
            }
            other => Err(SnippetError::new(format!(
                "expected expression, found {}",
                describe_opt(other)
            ))),
        }
    }

    // Token stream helpers.

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, msg: &str) -> Result<(), SnippetError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(SnippetError::new(format!(
                "{msg}, found {}",
                describe_opt(self.peek())
            )))
        }
    }

    fn skip_separators(&mut self) {
        while self.peek() == Some(&Token::Separator) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("identifier `{name}`"),
        Token::Number(n) => format!("number {n}"),
        Token::Str(_) => "string literal".to_string(),
        Token::Separator => "end of statement".to_string(),
        other => format!("{other:?}"),
    }
}

fn describe_opt(token: Option<&Token>) -> String {
    match token {
        Some(t) => describe(t),
        None => "end of snippet".to_string(),
    }
}
