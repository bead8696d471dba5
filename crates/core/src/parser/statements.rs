use super::Parser;
use crate::ast::{Expr, Statement};
use crate::context::Construct;
use crate::error::{ErrorCode, ParseError, Severity};
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let kind = self.effective_kind();
        self.parse_statement_as(kind)
    }

    /// Parse a statement whose leading token is read as `kind`.
    pub(super) fn parse_statement_as(&mut self, kind: TokenKind) -> Result<Statement, ParseError> {
        match kind {
            TokenKind::Function => Ok(Statement::Item(Box::new(
                self.parse_callable(Construct::Function)?,
            ))),
            TokenKind::Component => Ok(Statement::Item(Box::new(
                self.parse_callable(Construct::Component)?,
            ))),
            _ => {
                let stmt = self.statement_body(kind)?;
                self.end_statement()?;
                Ok(stmt)
            }
        }
    }

    fn statement_body(&mut self, kind: TokenKind) -> Result<Statement, ParseError> {
        let line = self.cur_line();
        match kind {
            TokenKind::Let | TokenKind::State => {
                self.advance();
                let name = self.expect_name()?;
                self.expect(TokenKind::Equals)?;
                let value = self.expression()?;
                Ok(if kind == TokenKind::Let {
                    Statement::Let { name, value, line }
                } else {
                    Statement::State { name, value, line }
                })
            }
            TokenKind::When => self.parse_when(),
            TokenKind::Return => {
                self.advance();
                let value = if self.at_statement_end() || self.at(TokenKind::Else) {
                    None
                } else {
                    Some(self.expression()?)
                };
                Ok(Statement::Return { value, line })
            }
            TokenKind::Render => {
                self.advance();
                let value = self.expression()?;
                Ok(Statement::Render { value, line })
            }
            TokenKind::LBrace => {
                self.advance();
                let body = self.parse_block_body(line)?;
                Ok(Statement::Block { body, line })
            }
            TokenKind::Import | TokenKind::Export | TokenKind::Directive => Err(self.coded(
                ErrorCode::UnexpectedToken,
                Severity::Error,
                format!(
                    "'{}' is only allowed at the top level",
                    self.cur().display_text()
                ),
                &[],
            )),
            _ => {
                let value = self.expression()?;
                Ok(Statement::Expr { value, line })
            }
        }
    }

    /// `when condition then result [else result]`
    fn parse_when(&mut self) -> Result<Statement, ParseError> {
        let line = self.cur_line();
        self.advance();

        let condition = self.with_construct(Construct::When, |p| {
            let condition = if p.at(TokenKind::Then) || p.at_statement_end() {
                let error = p.coded(
                    ErrorCode::InvalidWhen,
                    Severity::Error,
                    "Missing condition after 'when'",
                    &[],
                );
                p.push_error(error);
                Expr::Missing
            } else {
                p.expression()?
            };

            if !p.eat(TokenKind::Then) {
                let context = p.context();
                match p.engine.missing_delimiter(p.pos, &context) {
                    Some(error) => p.push_error(error),
                    None => return Err(p.unexpected(&[TokenKind::Then])),
                }
            }
            Ok(condition)
        })?;

        let then = Box::new(self.branch()?);
        let otherwise = if self.eat(TokenKind::Else) {
            Some(Box::new(self.branch()?))
        } else {
            None
        };
        Ok(Statement::When {
            condition,
            then,
            otherwise,
            line,
        })
    }

    fn branch(&mut self) -> Result<Statement, ParseError> {
        let line = self.cur_line();
        if self.at_statement_end() {
            let already_reported = self
                .errors
                .last()
                .is_some_and(|e| e.position == self.cur().position);
            if !already_reported {
                let error = self.coded(
                    ErrorCode::InvalidWhen,
                    Severity::Error,
                    "Missing result after when condition",
                    &[],
                );
                self.push_error(error);
            }
            return Ok(Statement::Error { line });
        }
        let kind = self.effective_kind();
        self.statement_body(kind)
    }
}
