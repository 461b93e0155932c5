use crate::token::{Position, SpannedToken, Token, TokenType};
use custom_error::custom_error;
use std::collections::VecDeque;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub LexError

    UnterminatedString{position: Position} = "unterminated string starting at {position}",
    UnexpectedCharacter{ch: char, position: Position} = "unexpected character '{ch}' at {position}",
    InvalidNumber{literal: String, position: Position} = "invalid number literal '{literal}' at {position}",
    InconsistentDedent{position: Position} = "unindent does not match any outer indentation level at {position}",
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            Self::UnterminatedString { position }
            | Self::UnexpectedCharacter { position, .. }
            | Self::InvalidNumber { position, .. }
            | Self::InconsistentDedent { position } => *position,
        }
    }
}

const TAB_WIDTH: usize = 8;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    read_position: usize,
    ch: char,
    line: usize,
    column: usize,

    indent_stack: Vec<usize>,
    pending: VecDeque<SpannedToken>,
    // Open (, [ and { suspend layout tokens until they close.
    nesting: usize,
    at_line_start: bool,
    last_emitted: Option<TokenType>,
    finished: bool,
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Lexes a whole program, ending with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    Lexer::new(source).collect()
}

impl Iterator for Lexer {
    type Item = Result<SpannedToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(tok) if tok.token.is(TokenType::Eof) => self.finished = true,
            Err(_) => self.finished = true,
            _ => {}
        }
        Some(result)
    }
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            input: input.chars().collect(),
            position: 0,
            read_position: 0,
            ch: '\0',
            line: 1,
            column: 0,
            indent_stack: vec![0],
            pending: VecDeque::new(),
            nesting: 0,
            at_line_start: true,
            last_emitted: None,
            finished: false,
        };
        lexer.read_char();
        lexer
    }

    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.line += 1;
            self.column = 0;
        }
        self.ch = self.input.get(self.read_position).copied().unwrap_or('\0');
        self.position = self.read_position;
        self.read_position += 1;
        self.column += 1;
    }

    fn peek_char(&self) -> char {
        self.input.get(self.read_position).copied().unwrap_or('\0')
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn emit(&mut self, token: Token, position: Position) -> SpannedToken {
        self.last_emitted = Some(TokenType::from(&token));
        SpannedToken { token, position }
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                self.last_emitted = Some(TokenType::from(&tok.token));
                return Ok(tok);
            }

            if self.at_line_start && self.nesting == 0 {
                self.handle_indentation()?;
                continue;
            }

            self.skip_whitespace();

            if self.at_end() {
                if self.finish_input() {
                    continue;
                }
                return Ok(self.emit(Token::Eof, self.here()));
            }

            return self.read_token();
        }
    }

    /// Queues the closing `Newline` and `Dedent`s once input runs out.
    /// Returns false when nothing is left to queue.
    fn finish_input(&mut self) -> bool {
        let position = self.here();
        let mut queued = false;
        let needs_newline = match self.last_emitted {
            None | Some(TokenType::Newline) | Some(TokenType::Indent) | Some(TokenType::Dedent) => false,
            Some(_) => true,
        };
        if needs_newline {
            self.pending.push_back(SpannedToken {
                token: Token::Newline,
                position,
            });
            queued = true;
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending.push_back(SpannedToken {
                token: Token::Dedent,
                position,
            });
            queued = true;
        }
        queued
    }

    fn handle_indentation(&mut self) -> Result<(), LexError> {
        let mut width = 0;
        loop {
            match self.ch {
                ' ' => width += 1,
                '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                '\r' | '\x0c' => {}
                _ => break,
            }
            self.read_char();
        }

        if self.at_end() {
            self.at_line_start = false;
            return Ok(());
        }

        if self.ch == '#' {
            self.skip_comment();
        }
        if self.ch == '\n' {
            // Blank or comment-only line.
            self.read_char();
            return Ok(());
        }
        if self.at_end() {
            self.at_line_start = false;
            return Ok(());
        }

        self.at_line_start = false;
        let position = self.here();
        let current = self.indent_stack.last().copied().unwrap_or(0);

        if width > current {
            self.indent_stack.push(width);
            self.pending.push_back(SpannedToken {
                token: Token::Indent,
                position,
            });
        } else if width < current {
            while self.indent_stack.len() > 1
                && self.indent_stack.last().map_or(false, |&top| top > width)
            {
                self.indent_stack.pop();
                self.pending.push_back(SpannedToken {
                    token: Token::Dedent,
                    position,
                });
            }
            if self.indent_stack.last().copied().unwrap_or(0) != width {
                return Err(LexError::InconsistentDedent { position });
            }
        }
        Ok(())
    }

    fn read_token(&mut self) -> Result<SpannedToken, LexError> {
        let position = self.here();

        let token = match self.ch {
            '\n' => {
                self.at_line_start = true;
                Token::Newline
            }
            '=' => self.either('=', Token::Eq, Token::Assign),
            '+' => self.either('=', Token::PlusAssign, Token::Plus),
            '-' => self.either('=', Token::MinusAssign, Token::Minus),
            '*' => {
                if self.peek_char() == '*' {
                    self.read_char();
                    Token::DoubleAsterisk
                } else {
                    self.either('=', Token::AsteriskAssign, Token::Asterisk)
                }
            }
            '/' => {
                if self.peek_char() == '/' {
                    self.read_char();
                    Token::DoubleSlash
                } else {
                    self.either('=', Token::SlashAssign, Token::Slash)
                }
            }
            '%' => Token::Percent,
            '!' => {
                if self.peek_char() == '=' {
                    self.read_char();
                    Token::NotEq
                } else {
                    return Err(LexError::UnexpectedCharacter { ch: '!', position });
                }
            }
            '<' => self.either('=', Token::LtEq, Token::LT),
            '>' => self.either('=', Token::GtEq, Token::GT),
            ',' => Token::Comma,
            '.' => Token::Dot,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '(' | '[' | '{' => {
                self.nesting += 1;
                match self.ch {
                    '(' => Token::LParen,
                    '[' => Token::LBracket,
                    _ => Token::LBrace,
                }
            }
            ')' | ']' | '}' => {
                self.nesting = self.nesting.saturating_sub(1);
                match self.ch {
                    ')' => Token::RParen,
                    ']' => Token::RBracket,
                    _ => Token::RBrace,
                }
            }
            '"' | '\'' => {
                let literal = self.read_string(position)?;
                return Ok(self.emit(Token::String(literal), position));
            }
            c => {
                if is_letter(c) {
                    let token = Token::from(self.read_identifier().as_str());
                    return Ok(self.emit(token, position));
                } else if c.is_ascii_digit() {
                    let token = self.read_number(position)?;
                    return Ok(self.emit(token, position));
                } else {
                    return Err(LexError::UnexpectedCharacter { ch: c, position });
                }
            }
        };
        self.read_char();
        Ok(self.emit(token, position))
    }

    fn either(&mut self, next: char, matched: Token, otherwise: Token) -> Token {
        if self.peek_char() == next {
            self.read_char();
            matched
        } else {
            otherwise
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while is_letter(self.ch) || self.ch.is_ascii_digit() {
            self.read_char()
        }
        self.input[start..self.position].iter().collect()
    }

    fn read_number(&mut self, position: Position) -> Result<Token, LexError> {
        let start = self.position;
        while self.ch.is_ascii_digit() {
            self.read_char()
        }
        let is_float = self.ch == '.' && self.peek_char().is_ascii_digit();
        if is_float {
            self.read_char();
            while self.ch.is_ascii_digit() {
                self.read_char()
            }
        }
        let literal: String = self.input[start..self.position].iter().collect();

        let token = if is_float {
            literal.parse().map(Token::Float).ok()
        } else {
            literal.parse().map(Token::Int).ok()
        };
        token.ok_or(LexError::InvalidNumber { literal, position })
    }

    fn read_string(&mut self, position: Position) -> Result<String, LexError> {
        let quote = self.ch;
        let mut value = String::new();
        self.read_char();

        loop {
            if self.at_end() || self.ch == '\n' {
                return Err(LexError::UnterminatedString { position });
            }
            match self.ch {
                c if c == quote => break,
                '\\' => {
                    self.read_char();
                    if self.at_end() || self.ch == '\n' {
                        return Err(LexError::UnterminatedString { position });
                    }
                    value.push(match self.ch {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                }
                c => value.push(c),
            }
            self.read_char();
        }
        // Closing quote.
        self.read_char();
        Ok(value)
    }

    fn skip_comment(&mut self) {
        while self.ch != '\n' && !self.at_end() {
            self.read_char();
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.ch {
                ' ' | '\t' | '\r' | '\x0c' => self.read_char(),
                '\n' if self.nesting > 0 => self.read_char(),
                '\\' if self.peek_char() == '\n' => {
                    self.read_char();
                    self.read_char();
                }
                '#' => self.skip_comment(),
                _ => break,
            }
            if self.at_end() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("lex errors found")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_next_token() {
        let input = "five = 5
ten = 10.5

def add(x, y):
    return x + y

result = add(five, ten)
-/ * 5 // 2 ** 3 % 4
5 < 10 > 5 <= 6 >= 7
10 == 10
10 != 9
x += 1
\"hello\" 'world'
[1, 2] {\"a\": b.c}
";

        let expected = vec![
            Token::Ident("five".to_owned()),
            Token::Assign,
            Token::Int(5),
            Token::Newline,
            Token::Ident("ten".to_owned()),
            Token::Assign,
            Token::Float(10.5),
            Token::Newline,
            Token::Def,
            Token::Ident("add".to_owned()),
            Token::LParen,
            Token::Ident("x".to_owned()),
            Token::Comma,
            Token::Ident("y".to_owned()),
            Token::RParen,
            Token::Colon,
            Token::Newline,
            Token::Indent,
            Token::Return,
            Token::Ident("x".to_owned()),
            Token::Plus,
            Token::Ident("y".to_owned()),
            Token::Newline,
            Token::Dedent,
            Token::Ident("result".to_owned()),
            Token::Assign,
            Token::Ident("add".to_owned()),
            Token::LParen,
            Token::Ident("five".to_owned()),
            Token::Comma,
            Token::Ident("ten".to_owned()),
            Token::RParen,
            Token::Newline,
            Token::Minus,
            Token::Slash,
            Token::Asterisk,
            Token::Int(5),
            Token::DoubleSlash,
            Token::Int(2),
            Token::DoubleAsterisk,
            Token::Int(3),
            Token::Percent,
            Token::Int(4),
            Token::Newline,
            Token::Int(5),
            Token::LT,
            Token::Int(10),
            Token::GT,
            Token::Int(5),
            Token::LtEq,
            Token::Int(6),
            Token::GtEq,
            Token::Int(7),
            Token::Newline,
            Token::Int(10),
            Token::Eq,
            Token::Int(10),
            Token::Newline,
            Token::Int(10),
            Token::NotEq,
            Token::Int(9),
            Token::Newline,
            Token::Ident("x".to_owned()),
            Token::PlusAssign,
            Token::Int(1),
            Token::Newline,
            Token::String("hello".to_owned()),
            Token::String("world".to_owned()),
            Token::Newline,
            Token::LBracket,
            Token::Int(1),
            Token::Comma,
            Token::Int(2),
            Token::RBracket,
            Token::LBrace,
            Token::String("a".to_owned()),
            Token::Colon,
            Token::Ident("b".to_owned()),
            Token::Dot,
            Token::Ident("c".to_owned()),
            Token::RBrace,
            Token::Newline,
            Token::Eof,
        ];

        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn test_keywords() {
        let cases = vec![
            ("if", Token::If),
            ("elif", Token::Elif),
            ("else", Token::Else),
            ("while", Token::While),
            ("for", Token::For),
            ("in", Token::In),
            ("class", Token::Class),
            ("import", Token::Import),
            ("from", Token::From),
            ("as", Token::As),
            ("try", Token::Try),
            ("except", Token::Except),
            ("raise", Token::Raise),
            ("True", Token::True),
            ("False", Token::False),
            ("None", Token::None),
            ("and", Token::And),
            ("or", Token::Or),
            ("not", Token::Not),
            ("true", Token::Ident("true".to_owned())),
            ("_private1", Token::Ident("_private1".to_owned())),
        ];

        for (input, token) in cases.into_iter() {
            assert_eq!(kinds(input), vec![token, Token::Newline, Token::Eof]);
        }
    }

    #[test]
    fn test_nested_blocks_close_at_end_of_input() {
        let input = "if a:\n    if b:\n        c\n";
        assert_eq!(
            kinds(input),
            vec![
                Token::If,
                Token::Ident("a".to_owned()),
                Token::Colon,
                Token::Newline,
                Token::Indent,
                Token::If,
                Token::Ident("b".to_owned()),
                Token::Colon,
                Token::Newline,
                Token::Indent,
                Token::Ident("c".to_owned()),
                Token::Newline,
                Token::Dedent,
                Token::Dedent,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_blank_lines_and_comments_do_not_affect_layout() {
        let input = "# header\n\nwhile x:\n    a\n\n        # stray comment\n    b\nc";
        assert_eq!(
            kinds(input),
            vec![
                Token::While,
                Token::Ident("x".to_owned()),
                Token::Colon,
                Token::Newline,
                Token::Indent,
                Token::Ident("a".to_owned()),
                Token::Newline,
                Token::Ident("b".to_owned()),
                Token::Newline,
                Token::Dedent,
                Token::Ident("c".to_owned()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_brackets_suspend_layout() {
        let input = "xs = [\n    1,\n        2,\n]\ny";
        assert_eq!(
            kinds(input),
            vec![
                Token::Ident("xs".to_owned()),
                Token::Assign,
                Token::LBracket,
                Token::Int(1),
                Token::Comma,
                Token::Int(2),
                Token::Comma,
                Token::RBracket,
                Token::Newline,
                Token::Ident("y".to_owned()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\t\"q\" \\ \x""#),
            vec![
                Token::String("a\nb\t\"q\" \\ x".to_owned()),
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("x = 1\n  \ny = 'two'").expect("lex errors found");
        let positions: Vec<(usize, usize)> = tokens
            .iter()
            .map(|t| (t.position.line, t.position.column))
            .collect();
        assert_eq!(
            positions[..4].to_vec(),
            vec![(1, 1), (1, 3), (1, 5), (1, 6)]
        );
        assert_eq!(tokens[4].position, Position::new(3, 1));
        assert_eq!(tokens[6].position, Position::new(3, 5));
    }

    #[test]
    fn test_errors() {
        let cases = vec![
            ("x = \"open", LexError::UnterminatedString { position: Position::new(1, 5) }),
            ("'split\nline'", LexError::UnterminatedString { position: Position::new(1, 1) }),
            ("s = 'a\\\nb'", LexError::UnterminatedString { position: Position::new(1, 5) }),
            ("a ? b", LexError::UnexpectedCharacter { ch: '?', position: Position::new(1, 3) }),
            ("!x", LexError::UnexpectedCharacter { ch: '!', position: Position::new(1, 1) }),
            (
                "99999999999999999999",
                LexError::InvalidNumber {
                    literal: "99999999999999999999".to_owned(),
                    position: Position::new(1, 1),
                },
            ),
            (
                "if a:\n    b\n  c\n",
                LexError::InconsistentDedent { position: Position::new(3, 3) },
            ),
        ];

        for (input, error) in cases.into_iter() {
            assert_eq!(tokenize(input), Err(error), "input: {:?}", input);
        }
    }
}
