mod expression;
#[cfg(test)]
mod tests;

use crate::ast::{
    AssignStatement, BlockStatement, ClassDefinition, ConditionalBlock, ExceptClause, Expression,
    ForStatement, FromImportStatement, FunctionDefinition, IfStatement, ImportStatement,
    ImportedName, Operator, Parameter, Program, RaiseStatement, Statement, Target, TryStatement,
    WhileStatement,
};
use crate::token::{Position, SpannedToken, Token, TokenType};
use custom_error::custom_error;
use std::rc::Rc;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub ParseError

    UnexpectedToken{expected: String, found: Token, position: Position} = "expected {expected}, got {found} at {position}",
    InvalidTarget{position: Position} = "cannot assign to expression at {position}",
    OutsideLoop{keyword: &'static str, position: Position} = "'{keyword}' outside loop at {position}",
    OutsideFunction{position: Position} = "'return' outside function at {position}",
    InvalidClassBody{position: Position} = "class body may only contain method definitions and attributes at {position}",
    DuplicateParameter{name: String, position: Position} = "duplicate parameter '{name}' at {position}",
    NonDefaultAfterDefault{name: String, position: Position} = "parameter '{name}' without a default follows one with a default at {position}",
    TooDeeplyNested{position: Position} = "expression nested too deeply at {position}",
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::InvalidTarget { position }
            | Self::OutsideLoop { position, .. }
            | Self::OutsideFunction { position }
            | Self::InvalidClassBody { position }
            | Self::DuplicateParameter { position, .. }
            | Self::NonDefaultAfterDefault { position, .. }
            | Self::TooDeeplyNested { position } => *position,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parses a token stream as produced by [`crate::lexer::tokenize`].
pub fn parse(tokens: Vec<SpannedToken>) -> Result<Program> {
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    tokens: Vec<SpannedToken>,
    index: usize,
    loop_depth: usize,
    function_depth: usize,
    /// Open subexpressions plus operators chained onto them.
    nesting: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if !tokens.last().map_or(false, |t| t.token.is(TokenType::Eof)) {
            let position = tokens.last().map(|t| t.position).unwrap_or_default();
            tokens.push(SpannedToken {
                token: Token::Eof,
                position,
            });
        }

        Self {
            tokens,
            index: 0,
            loop_depth: 0,
            function_depth: 0,
            nesting: 0,
        }
    }

    fn cur_token(&self) -> &Token {
        &self.tokens[self.index].token
    }

    fn peek_token(&self) -> &Token {
        let next = (self.index + 1).min(self.tokens.len() - 1);
        &self.tokens[next].token
    }

    fn position(&self) -> Position {
        self.tokens[self.index].position
    }

    fn next_token(&mut self) -> Token {
        let token = self.cur_token().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn cur_is(&self, token_type: TokenType) -> bool {
        self.cur_token().is(token_type)
    }

    fn eat(&mut self, token_type: TokenType) -> bool {
        if self.cur_is(token_type) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_type: TokenType, expected: &str) -> Result<Token> {
        if self.cur_is(token_type) {
            Ok(self.next_token())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String> {
        match self.cur_token() {
            Token::Ident(name) => {
                let name = name.clone();
                self.next_token();
                Ok(name)
            }
            _ => Err(self.error(expected)),
        }
    }

    fn error(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_owned(),
            found: self.cur_token().clone(),
            position: self.position(),
        }
    }

    pub fn parse_program(mut self) -> Result<Program> {
        let mut program = Program::default();

        while !self.cur_is(TokenType::Eof) {
            if self.eat(TokenType::Newline) {
                continue;
            }
            self.parse_statement(&mut program.statements)?;
        }

        Ok(program)
    }

    /// Parses one logical line, or one compound statement, appending to `out`.
    fn parse_statement(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        let stmt = match self.cur_token() {
            Token::If => self.parse_if_statement()?,
            Token::While => self.parse_while_statement()?,
            Token::For => self.parse_for_statement()?,
            Token::Def => Statement::Function(Rc::new(self.parse_function_definition()?)),
            Token::Class => self.parse_class_definition()?,
            Token::Try => self.parse_try_statement()?,
            _ => return self.parse_simple_line(out),
        };
        out.push(stmt);
        Ok(())
    }

    fn parse_simple_line(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        loop {
            out.push(self.parse_simple_statement()?);
            if !self.eat(TokenType::Semicolon) {
                break;
            }
            if self.cur_is(TokenType::Newline) || self.cur_is(TokenType::Eof) {
                break;
            }
        }
        if !self.cur_is(TokenType::Eof) {
            self.expect(TokenType::Newline, "end of line")?;
        }
        Ok(())
    }

    fn parse_simple_statement(&mut self) -> Result<Statement> {
        let position = self.position();
        match self.cur_token() {
            Token::Pass => {
                self.next_token();
                Ok(Statement::Pass)
            }
            Token::Break | Token::Continue => {
                let keyword = if self.cur_is(TokenType::Break) {
                    "break"
                } else {
                    "continue"
                };
                if self.loop_depth == 0 {
                    return Err(ParseError::OutsideLoop { keyword, position });
                }
                Ok(match self.next_token() {
                    Token::Break => Statement::Break,
                    _ => Statement::Continue,
                })
            }
            Token::Return => self.parse_return_statement(),
            Token::Import => self.parse_import_statement(),
            Token::From => self.parse_from_import_statement(),
            Token::Raise => self.parse_raise_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.cur_token(),
            Token::Newline | Token::Semicolon | Token::Eof | Token::Dedent
        )
    }

    fn parse_return_statement(&mut self) -> Result<Statement> {
        if self.function_depth == 0 {
            return Err(ParseError::OutsideFunction {
                position: self.position(),
            });
        }
        self.next_token();

        if self.at_statement_end() {
            Ok(Statement::Return(None))
        } else {
            Ok(Statement::Return(Some(self.parse_expression()?)))
        }
    }

    fn parse_import_statement(&mut self) -> Result<Statement> {
        self.next_token();
        let module = self.expect_ident("module name")?;
        let alias = if self.eat(TokenType::As) {
            Some(self.expect_ident("alias after 'as'")?)
        } else {
            None
        };
        Ok(Statement::Import(ImportStatement { module, alias }))
    }

    fn parse_from_import_statement(&mut self) -> Result<Statement> {
        self.next_token();
        let module = self.expect_ident("module name")?;
        self.expect(TokenType::Import, "'import'")?;

        let mut names = vec![];
        loop {
            let name = self.expect_ident("name to import")?;
            let alias = if self.eat(TokenType::As) {
                Some(self.expect_ident("alias after 'as'")?)
            } else {
                None
            };
            names.push(ImportedName { name, alias });
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        Ok(Statement::FromImport(FromImportStatement { module, names }))
    }

    fn parse_raise_statement(&mut self) -> Result<Statement> {
        self.next_token();

        if self.at_statement_end() {
            return Ok(Statement::Raise(RaiseStatement::Reraise));
        }

        match self.cur_token() {
            Token::LParen => {
                self.next_token();
                let arguments = self.parse_expression_list(TokenType::RParen, "')'")?;
                Ok(Statement::Raise(RaiseStatement::Call(arguments)))
            }
            Token::Ident(_) => {
                let tag = self.expect_ident("exception tag")?;
                let message = if self.eat(TokenType::LParen) {
                    if self.eat(TokenType::RParen) {
                        None
                    } else {
                        let message = self.parse_expression()?;
                        self.expect(TokenType::RParen, "')'")?;
                        Some(message)
                    }
                } else {
                    None
                };
                Ok(Statement::Raise(RaiseStatement::Tagged { tag, message }))
            }
            _ => Err(self.error("'(' or exception tag after 'raise'")),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Statement> {
        let position = self.position();
        let expression = self.parse_expression()?;

        let operator = match self.cur_token() {
            Token::Assign => None,
            token @ Token::PlusAssign
            | token @ Token::MinusAssign
            | token @ Token::AsteriskAssign
            | token @ Token::SlashAssign => Operator::from_token(token),
            _ => return Ok(Statement::Expr(expression)),
        };
        self.next_token();

        let target = match expression {
            Expression::Identifier(name) => Target::Name(name),
            Expression::Attribute(attr) => Target::Attribute {
                object: *attr.object,
                name: attr.name,
            },
            Expression::Index(index) => Target::Index {
                object: *index.left,
                index: *index.index,
            },
            _ => return Err(ParseError::InvalidTarget { position }),
        };
        let value = self.parse_expression()?;

        Ok(Statement::Assign(AssignStatement {
            target,
            operator,
            value,
        }))
    }

    /// A block after `:`, either indented on the following lines or inline.
    fn parse_block(&mut self) -> Result<BlockStatement> {
        self.expect(TokenType::Colon, "':'")?;

        let mut statements = vec![];
        if self.eat(TokenType::Newline) {
            self.expect(TokenType::Indent, "an indented block")?;
            while !self.cur_is(TokenType::Dedent) && !self.cur_is(TokenType::Eof) {
                if self.eat(TokenType::Newline) {
                    continue;
                }
                self.parse_statement(&mut statements)?;
            }
            self.eat(TokenType::Dedent);
        } else {
            self.parse_simple_line(&mut statements)?;
        }

        Ok(statements.into())
    }

    fn parse_loop_body(&mut self) -> Result<BlockStatement> {
        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;
        body
    }

    fn parse_if_statement(&mut self) -> Result<Statement> {
        self.next_token();
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        let mut branches = vec![ConditionalBlock { condition, body }];

        while self.eat(TokenType::Elif) {
            let condition = self.parse_expression()?;
            let body = self.parse_block()?;
            branches.push(ConditionalBlock { condition, body });
        }

        let alternative = if self.eat(TokenType::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::If(IfStatement {
            branches,
            alternative,
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Statement> {
        self.next_token();
        let condition = self.parse_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(WhileStatement { condition, body }))
    }

    fn parse_for_statement(&mut self) -> Result<Statement> {
        self.next_token();
        let variable = self.expect_ident("loop variable")?;
        self.expect(TokenType::In, "'in'")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Statement::For(ForStatement {
            variable,
            iterable,
            body,
        }))
    }

    fn parse_function_definition(&mut self) -> Result<FunctionDefinition> {
        self.expect(TokenType::Def, "'def'")?;
        let name = self.expect_ident("function name")?;
        self.expect(TokenType::LParen, "'('")?;

        let mut parameters: Vec<Parameter> = vec![];
        while !self.cur_is(TokenType::RParen) {
            let position = self.position();
            let param_name = self.expect_ident("parameter name")?;
            if parameters.iter().any(|p| p.name == param_name) {
                return Err(ParseError::DuplicateParameter {
                    name: param_name,
                    position,
                });
            }
            let default = if self.eat(TokenType::Assign) {
                Some(self.parse_expression()?)
            } else {
                if parameters.iter().any(|p| p.default.is_some()) {
                    return Err(ParseError::NonDefaultAfterDefault {
                        name: param_name,
                        position,
                    });
                }
                None
            };
            parameters.push(Parameter {
                name: param_name,
                default,
            });
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RParen, "')'")?;

        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let body = self.parse_block();
        self.function_depth -= 1;
        self.loop_depth = saved_loop_depth;

        Ok(FunctionDefinition {
            name,
            parameters,
            body: body?,
        })
    }

    fn parse_class_definition(&mut self) -> Result<Statement> {
        let position = self.position();
        self.next_token();
        let name = self.expect_ident("class name")?;
        if self.eat(TokenType::LParen) {
            self.expect(TokenType::RParen, "')'")?;
        }
        let body = self.parse_block()?;

        let mut attributes = vec![];
        let mut methods = vec![];
        for stmt in body.statements {
            match stmt {
                Statement::Function(def) => methods.push(def),
                Statement::Assign(AssignStatement {
                    target: Target::Name(attr),
                    operator: None,
                    value,
                }) => attributes.push((attr, value)),
                Statement::Pass | Statement::Expr(Expression::String(_)) => {}
                _ => return Err(ParseError::InvalidClassBody { position }),
            }
        }

        Ok(Statement::Class(ClassDefinition {
            name,
            attributes,
            methods,
        }))
    }

    fn parse_try_statement(&mut self) -> Result<Statement> {
        self.next_token();
        let body = self.parse_block()?;

        let mut handlers = vec![];
        while self.eat(TokenType::Except) {
            let tag = match self.cur_token() {
                Token::Ident(_) => Some(self.expect_ident("exception tag")?),
                _ => None,
            };
            let binding = if self.eat(TokenType::As) {
                Some(self.expect_ident("name after 'as'")?)
            } else {
                None
            };
            let body = self.parse_block()?;
            handlers.push(ExceptClause { tag, binding, body });
        }

        if handlers.is_empty() {
            return Err(self.error("'except'"));
        }

        Ok(Statement::Try(TryStatement { body, handlers }))
    }
}
