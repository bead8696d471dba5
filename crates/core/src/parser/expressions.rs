use super::{unquote, Parser};
use crate::ast::Expr;
use crate::context::Construct;
use crate::error::{ErrorCode, ParseError, Severity};
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.with_construct(Construct::Expression, |p| p.binary(0))
    }

    // -- Binary operators (precedence climbing) -----------------

    fn binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        while let Some(prec) = self.binary_precedence() {
            if prec < min_prec {
                break;
            }
            let op = self.advance().text.clone();
            self.skip_newlines();
            let rhs = self.binary(prec + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn binary_precedence(&self) -> Option<u8> {
        if self.at(TokenKind::Symbol) {
            precedence(&self.cur().text)
        } else {
            None
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::Symbol) && matches!(self.cur().text.as_str(), "!" | "-") {
            let op = self.advance().text.clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.postfix()
    }

    // -- Calls and member access --------------------------------

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.list_items(TokenKind::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        field,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Comma-separated expressions up to and including `close`.
    fn list_items(&mut self, close: TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(close) {
                break;
            }
            items.push(self.binary(0)?);
            self.skip_newlines();
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(close)?;
            break;
        }
        Ok(items)
    }

    // -- Primary ------------------------------------------------

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.cur();
        let expr = match token.kind {
            TokenKind::Text => Expr::ident(token.text.clone()),
            TokenKind::StringLit => Expr::Str {
                value: unquote(&token.text),
            },
            TokenKind::Number => Expr::Number {
                value: token.text.clone(),
            },
            TokenKind::True => Expr::Bool { value: true },
            TokenKind::False => Expr::Bool { value: false },
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.binary(0)?;
                self.skip_newlines();
                self.expect(TokenKind::RParen)?;
                return Ok(Expr::Group {
                    inner: Box::new(inner),
                });
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.list_items(TokenKind::RBracket)?;
                return Ok(Expr::List { items });
            }
            TokenKind::Newline
            | TokenKind::Semicolon
            | TokenKind::RBrace
            | TokenKind::Eof
            | TokenKind::Then
            | TokenKind::Else
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::Comma => {
                // Nothing to consume: report the gap and let the caller go on.
                let error = self.coded(
                    ErrorCode::MissingToken,
                    Severity::Error,
                    "Expected an expression here",
                    &[],
                );
                self.push_error(error);
                return Ok(Expr::Missing);
            }
            _ => return Err(self.unexpected(&[])),
        };
        self.advance();
        Ok(expr)
    }
}

fn precedence(op: &str) -> Option<u8> {
    let prec = match op {
        "->" | "=>" => 1,
        "||" => 2,
        "&&" => 3,
        "==" | "!=" => 4,
        "<" | ">" | "<=" | ">=" => 5,
        "+" | "-" => 6,
        "*" | "/" | "%" => 7,
        _ => return None,
    };
    Some(prec)
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expr, Item, Statement};
    use crate::config::EngineConfig;
    use crate::dictionary::KeywordDictionary;
    use crate::error::ErrorCode;
    use crate::lexer;
    use crate::parser::parse;

    fn first_value(src: &str) -> (Expr, Vec<ErrorCode>) {
        let stream = lexer::tokenize(src);
        let out = parse(
            &stream.tokens,
            Some(src),
            KeywordDictionary::builtin(),
            &EngineConfig::default(),
        )
        .unwrap();
        let codes = out.errors.iter().map(|e| e.code).collect();
        match out.tree.items.into_iter().next() {
            Some(Item::Statement(Statement::Let { value, .. })) => (value, codes),
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn calls_members_and_lists() {
        let (value, codes) = first_value("let v = ui.button([1, 2], \"ok\")\n");
        assert!(codes.is_empty());
        match value {
            Expr::Call { callee, args } => {
                assert!(matches!(*callee, Expr::Member { ref field, .. } if field == "button"));
                assert!(matches!(args[0], Expr::List { ref items } if items.len() == 2));
                assert_eq!(
                    args[1],
                    Expr::Str {
                        value: "ok".into()
                    }
                );
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn unary_and_grouping() {
        let (value, _) = first_value("let v = !(a || b)\n");
        match value {
            Expr::Unary { op, operand } => {
                assert_eq!(op, "!");
                assert!(matches!(*operand, Expr::Group { .. }));
            }
            other => panic!("expected unary, got {:?}", other),
        }
    }

    #[test]
    fn missing_value_becomes_placeholder() {
        let (value, codes) = first_value("let v =\n");
        assert!(value.is_missing());
        assert_eq!(codes, vec![ErrorCode::MissingToken]);
    }

    #[test]
    fn multiline_argument_lists() {
        let (value, codes) = first_value("let v = f(\n  a,\n  b\n)\n");
        assert!(codes.is_empty());
        assert!(matches!(value, Expr::Call { ref args, .. } if args.len() == 2));
    }
}
