use crate::{
    ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, Program, Stmt, StmtKind, UnaryOp},
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    lexer::{Keyword, Lexer, Token, TokenKind},
};

pub fn parse_program(source: &str) -> Result<Program, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn parse_program(&mut self) -> Result<Program, Diagnostic> {
        let mut items = Vec::new();
        while !self.check(&TokenKind::Eof) {
            items.push(self.parse_statement()?);
        }
        Ok(Program { items })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, Diagnostic> {
        self.consume(TokenKind::LBrace, "expected `{` to start block")?;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            items.push(self.parse_statement()?);
        }
        self.consume(TokenKind::RBrace, "expected `}` to close block")?;
        Ok(items)
    }

    fn parse_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let kind = self.peek().kind.clone();
        match kind {
            TokenKind::Keyword(Keyword::Var) => self.parse_var_decl(),
            TokenKind::Keyword(Keyword::Fn) if self.peek_next_is_identifier() => {
                self.parse_function()
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.advance().span.start;
        let name = self.consume(TokenKind::Identifier, "expected variable name")?;
        let initializer = if self.matches(TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume_optional_semicolon();
        Ok(Stmt {
            kind: StmtKind::Var {
                name: name.lexeme,
                initializer,
            },
            span: SourceSpan::new(start, self.previous().span.end),
        })
    }

    fn parse_function(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.advance().span.start;
        let name = self.consume(TokenKind::Identifier, "expected function name")?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::Function {
                name: name.lexeme,
                params,
                body,
            },
            span: SourceSpan::new(start, self.previous().span.end),
        })
    }

    fn parse_params(&mut self) -> Result<Vec<String>, Diagnostic> {
        self.consume(TokenKind::LParen, "expected `(` before parameters")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param = self.consume(TokenKind::Identifier, "expected parameter name")?;
                params.push(param.lexeme);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "expected `)` after parameters")?;
        Ok(params)
    }

    fn parse_if(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.advance().span.start;
        let condition = self.parse_expression()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.matches(TokenKind::Keyword(Keyword::Else)) {
            if self.check(&TokenKind::Keyword(Keyword::If)) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span: SourceSpan::new(start, self.previous().span.end),
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.advance().span.start;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            span: SourceSpan::new(start, self.previous().span.end),
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.advance().span.start;
        let value = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.check(&TokenKind::Eof)
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_optional_semicolon();
        Ok(Stmt {
            kind: StmtKind::Return(value),
            span: SourceSpan::new(start, self.previous().span.end),
        })
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let first = self.parse_expression()?;
        let start = first.span.start;
        let mut exprs = vec![first];
        while self.matches(TokenKind::Comma) {
            exprs.push(self.parse_expression()?);
        }
        self.consume_optional_semicolon();
        Ok(Stmt {
            kind: StmtKind::Expr(exprs),
            span: SourceSpan::new(start, self.previous().span.end),
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        let target = self.parse_or()?;
        if !self.matches(TokenKind::Assign) {
            return Ok(target);
        }
        let assign = self.previous().clone();
        let value = self.parse_expression()?;
        match target.kind {
            ExprKind::Variable(name) => Ok(Expr {
                span: SourceSpan::new(target.span.start, value.span.end),
                kind: ExprKind::Assign {
                    name,
                    value: Box::new(value),
                },
            }),
            _ => Err(self.error(&assign, "invalid assignment target")),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_and()?;
        while self.matches(TokenKind::DoublePipe) {
            let right = self.parse_and()?;
            expr = logical(LogicalOp::Or, expr, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_equality()?;
        while self.matches(TokenKind::DoubleAmpersand) {
            let right = self.parse_equality()?;
            expr = logical(LogicalOp::And, expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqualEqual => BinaryOp::Equal,
                TokenKind::BangEqual => BinaryOp::NotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        let Some(op) = op else {
            return self.parse_call();
        };
        let start = self.advance().span.start;
        let operand = self.parse_unary()?;
        Ok(Expr {
            span: SourceSpan::new(start, operand.span.end),
            kind: ExprKind::Unary {
                op,
                expr: Box::new(operand),
            },
        })
    }

    fn parse_call(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(TokenKind::LParen) {
                let args = self.parse_arguments(TokenKind::RParen)?;
                expr = Expr {
                    span: SourceSpan::new(expr.span.start, self.previous().span.end),
                    kind: ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                };
            } else if self.matches(TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.consume(TokenKind::RBracket, "expected `]` after index")?;
                expr = Expr {
                    span: SourceSpan::new(expr.span.start, self.previous().span.end),
                    kind: ExprKind::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    },
                };
            } else if self.matches(TokenKind::Dot) {
                let field = self.consume(TokenKind::Identifier, "expected field name after `.`")?;
                expr = Expr {
                    span: SourceSpan::new(expr.span.start, field.span.end),
                    kind: ExprKind::Field {
                        target: Box::new(expr),
                        field: field.lexeme,
                    },
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_arguments(&mut self, terminator: TokenKind) -> Result<Vec<Expr>, Diagnostic> {
        let mut args = Vec::new();
        if !self.check(&terminator) {
            loop {
                args.push(self.parse_expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(terminator, "expected closing delimiter after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.advance();
        let kind = match token.kind {
            TokenKind::Number => ExprKind::Literal(self.number(&token)?),
            TokenKind::String => ExprKind::Literal(Literal::String(token.lexeme.clone())),
            TokenKind::Keyword(Keyword::True) => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::Keyword(Keyword::False) => ExprKind::Literal(Literal::Bool(false)),
            TokenKind::Keyword(Keyword::Nil) => ExprKind::Literal(Literal::Nil),
            TokenKind::Identifier => ExprKind::Variable(token.lexeme.clone()),
            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RParen, "expected `)` after expression")?;
                return Ok(Expr {
                    kind: inner.kind,
                    span: SourceSpan::new(token.span.start, self.previous().span.end),
                });
            }
            TokenKind::LBracket => ExprKind::Array(self.parse_arguments(TokenKind::RBracket)?),
            TokenKind::Keyword(Keyword::Fn) => {
                let params = self.parse_params()?;
                let body = self.parse_block()?;
                ExprKind::Lambda { params, body }
            }
            TokenKind::Eof => return Err(self.error(&token, "unexpected end of input")),
            _ => {
                return Err(self.error(&token, &format!("unexpected token `{}`", token.lexeme)));
            }
        };
        Ok(Expr {
            kind,
            span: SourceSpan::new(token.span.start, self.previous().span.end),
        })
    }

    fn number(&self, token: &Token) -> Result<Literal, Diagnostic> {
        let text = token.lexeme.replace('_', "");
        let literal = if text.contains('.') {
            text.parse().ok().map(Literal::Float)
        } else {
            text.parse().ok().map(Literal::Int)
        };
        literal.ok_or_else(|| self.error(token, "invalid number literal"))
    }

    fn consume_optional_semicolon(&mut self) {
        while self.matches(TokenKind::Semicolon) {}
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, Diagnostic> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(self.peek(), message))
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn peek_next_is_identifier(&self) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|token| token.kind == TokenKind::Identifier)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with `Eof`.
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn error(&self, token: &Token, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message).with_span(token.span)
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr {
        span: SourceSpan::new(left.span.start, right.span.end),
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

fn logical(op: LogicalOp, left: Expr, right: Expr) -> Expr {
    Expr {
        span: SourceSpan::new(left.span.start, right.span.end),
        kind: ExprKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}
