use super::{Parser, Result};
use crate::ast::{
    AttributeExpression, CallExpression, DictLiteral, Expression, IndexExpression,
    InfixExpression, ListLiteral, Operator, PrefixExpression,
};
use super::ParseError;
use crate::token::{Token, TokenType};

/// Bound on `Parser::nesting`, which also bounds the height of the tree.
const MAX_NESTING: usize = 1000;
const RED_ZONE: usize = 128 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Or,
    And,
    Not,
    Compare,
    Sum,
    Product,
    Prefix,
    Power,
    Postfix,
}

impl Parser {
    fn infix_precedence(&self) -> Precedence {
        match self.cur_token() {
            Token::Or => Precedence::Or,
            Token::And => Precedence::And,
            Token::Eq
            | Token::NotEq
            | Token::LT
            | Token::LtEq
            | Token::GT
            | Token::GtEq
            | Token::In => Precedence::Compare,
            Token::Not if self.peek_token().is(TokenType::In) => Precedence::Compare,
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Asterisk | Token::Slash | Token::DoubleSlash | Token::Percent => {
                Precedence::Product
            }
            Token::DoubleAsterisk => Precedence::Power,
            Token::LParen | Token::LBracket | Token::Dot => Precedence::Postfix,
            _ => Precedence::Lowest,
        }
    }

    pub(super) fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_precedence(Precedence::Lowest)
    }

    fn parse_precedence(&mut self, precedence: Precedence) -> Result<Expression> {
        let base = self.nesting;
        let result = stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || {
            self.nest()?;
            let mut left = self.parse_prefix()?;

            while precedence < self.infix_precedence() {
                self.nest()?;
                left = self.parse_infix(left)?;
            }

            Ok(left)
        });
        self.nesting = base;
        result
    }

    fn nest(&mut self) -> Result<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(ParseError::TooDeeplyNested {
                position: self.position(),
            });
        }
        Ok(())
    }

    fn parse_prefix(&mut self) -> Result<Expression> {
        let expression = match self.cur_token() {
            Token::Ident(name) => Expression::Identifier(name.clone()),
            Token::Int(n) => Expression::IntegerLiteral(*n),
            Token::Float(x) => Expression::FloatLiteral(*x),
            Token::String(s) => Expression::String(s.clone()),
            Token::True => Expression::Boolean(true),
            Token::False => Expression::Boolean(false),
            Token::None => Expression::None,
            Token::Minus | Token::Plus => {
                let operator = match self.next_token() {
                    Token::Minus => Operator::Minus,
                    _ => Operator::Plus,
                };
                let right = self.parse_precedence(Precedence::Prefix)?;
                return Ok(Expression::Prefix(PrefixExpression {
                    operator,
                    right: Box::new(right),
                }));
            }
            Token::Not => {
                self.next_token();
                let right = self.parse_precedence(Precedence::Not)?;
                return Ok(Expression::Prefix(PrefixExpression {
                    operator: Operator::Not,
                    right: Box::new(right),
                }));
            }
            Token::LParen => {
                self.next_token();
                let inner = self.parse_expression()?;
                self.expect(TokenType::RParen, "')'")?;
                return Ok(inner);
            }
            Token::LBracket => {
                self.next_token();
                let elements = self.parse_expression_list(TokenType::RBracket, "']'")?;
                return Ok(Expression::List(ListLiteral::from(elements)));
            }
            Token::LBrace => {
                self.next_token();
                return self.parse_dict_literal();
            }
            _ => return Err(self.error("an expression")),
        };
        self.next_token();
        Ok(expression)
    }

    fn parse_infix(&mut self, left: Expression) -> Result<Expression> {
        let precedence = self.infix_precedence();

        match self.cur_token() {
            Token::LParen => {
                self.next_token();
                let arguments = self.parse_expression_list(TokenType::RParen, "')'")?;
                Ok(Expression::Call(CallExpression {
                    function: Box::new(left),
                    arguments,
                }))
            }
            Token::LBracket => {
                self.next_token();
                let index = self.parse_expression()?;
                self.expect(TokenType::RBracket, "']'")?;
                Ok(Expression::Index(IndexExpression {
                    left: Box::new(left),
                    index: Box::new(index),
                }))
            }
            Token::Dot => {
                self.next_token();
                let name = self.expect_ident("attribute name")?;
                Ok(Expression::Attribute(AttributeExpression {
                    object: Box::new(left),
                    name,
                }))
            }
            Token::DoubleAsterisk => {
                self.next_token();
                // Right-associative, and the exponent may carry a sign.
                let right = self.parse_precedence(Precedence::Prefix)?;
                Ok(infix(left, Operator::Power, right))
            }
            Token::Not => {
                self.next_token();
                self.expect(TokenType::In, "'in'")?;
                let right = self.parse_precedence(precedence)?;
                Ok(infix(left, Operator::NotIn, right))
            }
            token => {
                let operator = match Operator::from_token(token) {
                    Some(op) => op,
                    None => return Err(self.error("an operator")),
                };
                self.next_token();
                let right = self.parse_precedence(precedence)?;
                Ok(infix(left, operator, right))
            }
        }
    }

    /// Comma-separated expressions up to `close`, allowing a trailing comma.
    /// The opening delimiter must already be consumed.
    pub(super) fn parse_expression_list(
        &mut self,
        close: TokenType,
        expected: &str,
    ) -> Result<Vec<Expression>> {
        let mut list = vec![];
        while !self.cur_is(close) {
            list.push(self.parse_expression()?);
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(close, expected)?;
        Ok(list)
    }

    fn parse_dict_literal(&mut self) -> Result<Expression> {
        let mut pairs = vec![];
        while !self.cur_is(TokenType::RBrace) {
            let key = self.parse_expression()?;
            self.expect(TokenType::Colon, "':'")?;
            let value = self.parse_expression()?;
            pairs.push((key, value));
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RBrace, "'}'")?;
        Ok(Expression::Dict(DictLiteral::from(pairs)))
    }
}

fn infix(left: Expression, operator: Operator, right: Expression) -> Expression {
    Expression::Infix(InfixExpression {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}
