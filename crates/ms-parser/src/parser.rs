use ms_core::ast::{
    Argument, BinaryOp, Block, CallExpr, ConditionalBranch, Expr, Script, Statement, UnaryOp,
};
use ms_core::{ModScriptError, MsValue, SourceSpan};

use crate::grammar::{Grammar, Keyword};
use crate::lexer::{Lexer, Operator, Punct, Token, TokenKind};

/// Deepest combined nesting of blocks, calls and operators a script may use.
/// Every later tree walk recurses at most this far.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Recursive-descent parser over a lazy token stream. The first lex or
/// syntax error ends parsing; nothing is resynchronized.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<Token>,
    comments: Vec<Token>,
    end_span: SourceSpan,
    depth: usize,
}

#[tracing::instrument(level = "debug", skip_all, fields(version = ?grammar.version))]
pub fn parse_script(source: &str, grammar: &Grammar) -> Result<Script, ModScriptError> {
    let mut parser = Parser::new(source, grammar);
    let script = parser.parse()?;
    tracing::debug!(statements = script.body.len(), "parsed script");
    Ok(script)
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, grammar: &'a Grammar) -> Self {
        Self {
            lexer: Lexer::new(source, grammar),
            lookahead: None,
            comments: Vec::new(),
            end_span: SourceSpan::synthetic(),
            depth: 0,
        }
    }

    fn descend(&mut self) -> Result<(), ModScriptError> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = self.peek()?.span;
            return Err(ModScriptError::syntax(
                "PARSE_NESTING_TOO_DEEP",
                format!("Script nests deeper than {} levels.", MAX_NESTING_DEPTH),
                span,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn parse(&mut self) -> Result<Script, ModScriptError> {
        let start = self.peek()?.span;
        let statements = self.parse_statements(&[], "script")?;
        let end = self.peek()?.span;
        Ok(Script {
            body: Block::new(statements, start.to(end)),
        })
    }

    fn next_significant(&mut self) -> Result<Token, ModScriptError> {
        loop {
            let token = match self.lexer.next() {
                Some(token) => token?,
                None => Token {
                    kind: TokenKind::EndOfInput,
                    lexeme: String::new(),
                    span: self.end_span,
                },
            };
            if token.kind == TokenKind::Comment {
                self.comments.push(token);
                continue;
            }
            if token.kind == TokenKind::EndOfInput {
                self.end_span = token.span;
            }
            return Ok(token);
        }
    }

    fn peek(&mut self) -> Result<&Token, ModScriptError> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.next_significant()?,
        };
        Ok(self.lookahead.insert(token))
    }

    fn advance(&mut self) -> Result<Token, ModScriptError> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.next_significant(),
        }
    }

    fn peek_kind(&mut self) -> Result<TokenKind, ModScriptError> {
        Ok(self.peek()?.kind)
    }

    fn expected(&mut self, what: &str) -> Result<ModScriptError, ModScriptError> {
        let token = self.peek()?;
        Ok(ModScriptError::syntax(
            "PARSE_EXPECTED",
            format!("Expected {}, found {}.", what, token.describe()),
            token.span,
        ))
    }

    fn expect_keyword(&mut self, keyword: Keyword, context: &str) -> Result<Token, ModScriptError> {
        if self.peek_kind()? == TokenKind::Keyword(keyword) {
            return self.advance();
        }
        Err(self.expected(&format!("{} {}", keyword, context))?)
    }

    fn expect_punct(&mut self, punct: Punct, context: &str) -> Result<Token, ModScriptError> {
        if self.peek_kind()? == TokenKind::Punct(punct) {
            return self.advance();
        }
        Err(self.expected(&format!("'{}' {}", punct.as_str(), context))?)
    }

    fn expect_identifier(&mut self, context: &str) -> Result<Token, ModScriptError> {
        if self.peek_kind()? == TokenKind::Identifier {
            return self.advance();
        }
        Err(self.expected(&format!("an identifier {}", context))?)
    }

    fn drain_comments(&mut self, statements: &mut Vec<Statement>) {
        for token in self.comments.drain(..) {
            statements.push(Statement::Comment {
                text: token.lexeme,
                span: token.span,
            });
        }
    }

    fn parse_statements(
        &mut self,
        terminators: &[Keyword],
        construct: &str,
    ) -> Result<Vec<Statement>, ModScriptError> {
        let mut statements = Vec::new();
        loop {
            let kind = self.peek_kind()?;
            self.drain_comments(&mut statements);
            match kind {
                TokenKind::EndOfInput if terminators.is_empty() => break,
                TokenKind::EndOfInput => {
                    let names = terminators
                        .iter()
                        .map(|keyword| keyword.to_string())
                        .collect::<Vec<_>>()
                        .join(" or ");
                    return Err(self.expected(&format!("{} to close {}", names, construct))?);
                }
                TokenKind::Keyword(keyword) if terminators.contains(&keyword) => break,
                _ => statements.push(self.parse_statement()?),
            }
        }
        Ok(statements)
    }

    fn parse_block(
        &mut self,
        terminators: &[Keyword],
        construct: &str,
    ) -> Result<Block, ModScriptError> {
        self.descend()?;
        let start = self.peek()?.span;
        let statements = self.parse_statements(terminators, construct)?;
        let end = self.peek()?.span;
        self.depth -= 1;
        Ok(Block::new(statements, start.to(end)))
    }

    fn parse_statement(&mut self) -> Result<Statement, ModScriptError> {
        match self.peek_kind()? {
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Begin) => {
                self.advance()?;
                let block = self.parse_block(&[Keyword::End], "'begin' block")?;
                self.expect_keyword(Keyword::End, "to close 'begin' block")?;
                Ok(Statement::Block(block))
            }
            TokenKind::Keyword(Keyword::Set) => {
                let start = self.advance()?.span;
                let name = self.expect_identifier("after 'set'")?;
                self.expect_assign("after variable name")?;
                let value = self.parse_expr()?;
                Ok(Statement::Set {
                    name: name.lexeme,
                    span: start.to(value.span()),
                    value,
                })
            }
            TokenKind::Keyword(Keyword::Return) => {
                let span = self.advance()?.span;
                Ok(Statement::Return { span })
            }
            TokenKind::Identifier => {
                let name = self.advance()?;
                match self.peek_kind()? {
                    TokenKind::Operator(Operator::Assign) => {
                        self.advance()?;
                        let value = self.parse_expr()?;
                        Ok(Statement::Assign {
                            span: name.span.to(value.span()),
                            name: name.lexeme,
                            value,
                        })
                    }
                    TokenKind::Punct(Punct::LParen) => Ok(Statement::Call(self.parse_call(name)?)),
                    _ => Err(self.expected(&format!(
                        "'=' or '(' after identifier '{}'",
                        name.lexeme
                    ))?),
                }
            }
            _ => {
                let token = self.peek()?;
                Err(ModScriptError::syntax(
                    "PARSE_UNEXPECTED_TOKEN",
                    format!("Expected a statement, found {}.", token.describe()),
                    token.span,
                ))
            }
        }
    }

    fn expect_assign(&mut self, context: &str) -> Result<(), ModScriptError> {
        if self.peek_kind()? == TokenKind::Operator(Operator::Assign) {
            self.advance()?;
            return Ok(());
        }
        Err(self.expected(&format!("'=' {}", context))?)
    }

    fn parse_if(&mut self) -> Result<Statement, ModScriptError> {
        let start = self.advance()?.span;
        let mut branches = Vec::new();
        let mut otherwise = None;

        let guard = self.parse_expr()?;
        self.expect_keyword(Keyword::Then, "after 'if' condition")?;
        let body = self.parse_block(
            &[Keyword::ElseIf, Keyword::Else, Keyword::EndIf],
            "'if' statement",
        )?;
        branches.push(ConditionalBranch { guard, body });

        let end = loop {
            match self.peek_kind()? {
                TokenKind::Keyword(Keyword::ElseIf) => {
                    self.advance()?;
                    let guard = self.parse_expr()?;
                    self.expect_keyword(Keyword::Then, "after 'elseif' condition")?;
                    let body = self.parse_block(
                        &[Keyword::ElseIf, Keyword::Else, Keyword::EndIf],
                        "'if' statement",
                    )?;
                    branches.push(ConditionalBranch { guard, body });
                }
                TokenKind::Keyword(Keyword::Else) => {
                    self.advance()?;
                    otherwise = Some(self.parse_block(&[Keyword::EndIf], "'if' statement")?);
                    break self.expect_keyword(Keyword::EndIf, "to close 'if' statement")?;
                }
                _ => break self.expect_keyword(Keyword::EndIf, "to close 'if' statement")?,
            }
        };

        Ok(Statement::If {
            branches,
            otherwise,
            span: start.to(end.span),
        })
    }

    fn parse_while(&mut self) -> Result<Statement, ModScriptError> {
        let start = self.advance()?.span;
        let guard = self.parse_expr()?;
        self.expect_keyword(Keyword::Do, "after 'while' condition")?;
        let body = self.parse_block(&[Keyword::EndWhile], "'while' loop")?;
        let end = self.expect_keyword(Keyword::EndWhile, "to close 'while' loop")?;
        Ok(Statement::While {
            guard,
            body,
            span: start.to(end.span),
        })
    }

    fn parse_call(&mut self, name: Token) -> Result<CallExpr, ModScriptError> {
        self.descend()?;
        self.expect_punct(Punct::LParen, "to open argument list")?;
        let mut args = Vec::new();
        if self.peek_kind()? != TokenKind::Punct(Punct::RParen) {
            loop {
                args.push(self.parse_argument()?);
                if self.peek_kind()? == TokenKind::Punct(Punct::Comma) {
                    self.advance()?;
                    continue;
                }
                break;
            }
        }
        let end = self.expect_punct(Punct::RParen, "to close argument list")?;
        self.depth -= 1;
        Ok(CallExpr {
            name: name.lexeme,
            args,
            span: name.span.to(end.span),
        })
    }

    fn parse_argument(&mut self) -> Result<Argument, ModScriptError> {
        if self.peek_kind()? != TokenKind::Identifier {
            return Ok(Argument {
                name: None,
                value: self.parse_expr()?,
            });
        }

        let ident = self.advance()?;
        if self.peek_kind()? == TokenKind::Punct(Punct::Colon) {
            self.advance()?;
            return Ok(Argument {
                name: Some(ident.lexeme),
                value: self.parse_expr()?,
            });
        }

        let left = self.parse_identifier_tail(ident)?;
        Ok(Argument {
            name: None,
            value: self.parse_binary_rest(left, 1)?,
        })
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ModScriptError> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ModScriptError> {
        self.descend()?;
        let left = self.parse_prefix(min_precedence)?;
        let expr = self.parse_binary_rest(left, min_precedence)?;
        self.depth -= 1;
        Ok(expr)
    }

    /// Each folded operator deepens the left-leaning tree by one level.
    fn parse_binary_rest(&mut self, mut left: Expr, min_precedence: u8) -> Result<Expr, ModScriptError> {
        let mut folded = 0;
        while let Some(op) = self.peek_binary_op()? {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.descend()?;
            folded += 1;
            self.advance()?;
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::Binary {
                op,
                span: left.span().to(right.span()),
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth -= folded;
        Ok(left)
    }

    fn peek_binary_op(&mut self) -> Result<Option<BinaryOp>, ModScriptError> {
        let op = match self.peek_kind()? {
            TokenKind::Keyword(Keyword::Or) => BinaryOp::Or,
            TokenKind::Keyword(Keyword::And) => BinaryOp::And,
            TokenKind::Operator(operator) => match operator {
                Operator::Eq => BinaryOp::Eq,
                Operator::NotEq => BinaryOp::NotEq,
                Operator::Less => BinaryOp::Less,
                Operator::LessEq => BinaryOp::LessEq,
                Operator::Greater => BinaryOp::Greater,
                Operator::GreaterEq => BinaryOp::GreaterEq,
                Operator::Plus => BinaryOp::Add,
                Operator::Minus => BinaryOp::Sub,
                Operator::Star => BinaryOp::Mul,
                Operator::Slash => BinaryOp::Div,
                Operator::Percent => BinaryOp::Rem,
                Operator::Assign => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    /// `not` binds looser than comparisons, so it cannot start the operand
    /// of a comparison, an arithmetic operator or a negation.
    fn parse_prefix(&mut self, min_precedence: u8) -> Result<Expr, ModScriptError> {
        let op = match self.peek_kind()? {
            TokenKind::Keyword(Keyword::Not) if min_precedence <= UnaryOp::Not.precedence() => {
                UnaryOp::Not
            }
            TokenKind::Operator(Operator::Minus) => UnaryOp::Negate,
            _ => return self.parse_primary(),
        };
        let start = self.advance()?.span;
        let operand = self.parse_binary(op.precedence())?;
        Ok(Expr::Unary {
            op,
            span: start.to(operand.span()),
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ModScriptError> {
        match self.peek_kind()? {
            TokenKind::Number => {
                let token = self.advance()?;
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    ModScriptError::syntax(
                        "PARSE_NUMBER",
                        format!("Invalid number literal \"{}\".", token.lexeme),
                        token.span,
                    )
                })?;
                Ok(Expr::Literal {
                    value: MsValue::Number(value),
                    span: token.span,
                })
            }
            TokenKind::String => {
                let token = self.advance()?;
                Ok(Expr::Literal {
                    value: MsValue::String(token.lexeme),
                    span: token.span,
                })
            }
            TokenKind::Keyword(keyword @ (Keyword::True | Keyword::False)) => {
                let token = self.advance()?;
                Ok(Expr::Literal {
                    value: MsValue::Bool(keyword == Keyword::True),
                    span: token.span,
                })
            }
            TokenKind::Identifier => {
                let ident = self.advance()?;
                self.parse_identifier_tail(ident)
            }
            TokenKind::Punct(Punct::LParen) => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect_punct(Punct::RParen, "to close parenthesized expression")?;
                Ok(inner)
            }
            _ => Err(self.expected("an expression")?),
        }
    }

    fn parse_identifier_tail(&mut self, ident: Token) -> Result<Expr, ModScriptError> {
        if self.peek_kind()? == TokenKind::Punct(Punct::LParen) {
            return Ok(Expr::Call(self.parse_call(ident)?));
        }
        Ok(Expr::Variable {
            name: ident.lexeme,
            span: ident.span,
        })
    }
}
