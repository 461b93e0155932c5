use std::fmt::{self, Display, Formatter};
use strum_macros::{Display, EnumDiscriminants};

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(derive(Hash, Display))]
#[strum_discriminants(name(TokenType))]
pub enum Token {
    Eof,

    // Layout
    Newline,
    Indent,
    Dedent,

    // Identifiers and literals
    Ident(String),
    Int(i64),
    Float(f64),
    String(String),

    // Operators
    Assign,
    PlusAssign,
    MinusAssign,
    AsteriskAssign,
    SlashAssign,
    Plus,
    Minus,
    Asterisk,
    DoubleAsterisk,
    Slash,
    DoubleSlash,
    Percent,
    LT,
    LtEq,
    GT,
    GtEq,
    Eq,
    NotEq,

    // Delimiters
    Comma,
    Dot,
    Colon,
    Semicolon,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Def,
    Return,
    Class,
    Import,
    From,
    As,
    Try,
    Except,
    Raise,
    Pass,
    Break,
    Continue,
    True,
    False,
    None,
    And,
    Or,
    Not,
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        match text {
            "if" => Self::If,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "while" => Self::While,
            "for" => Self::For,
            "in" => Self::In,
            "def" => Self::Def,
            "return" => Self::Return,
            "class" => Self::Class,
            "import" => Self::Import,
            "from" => Self::From,
            "as" => Self::As,
            "try" => Self::Try,
            "except" => Self::Except,
            "raise" => Self::Raise,
            "pass" => Self::Pass,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "True" => Self::True,
            "False" => Self::False,
            "None" => Self::None,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            identifier => Self::Ident(identifier.to_owned()),
        }
    }
}

impl Token {
    pub fn is(&self, token_type: TokenType) -> bool {
        TokenType::from(self) == token_type
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let text = match self {
            Self::Eof => "end of input",
            Self::Newline => "newline",
            Self::Indent => "indent",
            Self::Dedent => "dedent",
            Self::Ident(name) => return write!(f, "identifier '{}'", name),
            Self::Int(n) => return write!(f, "integer {}", n),
            Self::Float(x) => return write!(f, "float {:?}", x),
            Self::String(s) => return write!(f, "string {:?}", s),
            Self::Assign => "'='",
            Self::PlusAssign => "'+='",
            Self::MinusAssign => "'-='",
            Self::AsteriskAssign => "'*='",
            Self::SlashAssign => "'/='",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Asterisk => "'*'",
            Self::DoubleAsterisk => "'**'",
            Self::Slash => "'/'",
            Self::DoubleSlash => "'//'",
            Self::Percent => "'%'",
            Self::LT => "'<'",
            Self::LtEq => "'<='",
            Self::GT => "'>'",
            Self::GtEq => "'>='",
            Self::Eq => "'=='",
            Self::NotEq => "'!='",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Colon => "':'",
            Self::Semicolon => "';'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::If => "'if'",
            Self::Elif => "'elif'",
            Self::Else => "'else'",
            Self::While => "'while'",
            Self::For => "'for'",
            Self::In => "'in'",
            Self::Def => "'def'",
            Self::Return => "'return'",
            Self::Class => "'class'",
            Self::Import => "'import'",
            Self::From => "'from'",
            Self::As => "'as'",
            Self::Try => "'try'",
            Self::Except => "'except'",
            Self::Raise => "'raise'",
            Self::Pass => "'pass'",
            Self::Break => "'break'",
            Self::Continue => "'continue'",
            Self::True => "'True'",
            Self::False => "'False'",
            Self::None => "'None'",
            Self::And => "'and'",
            Self::Or => "'or'",
            Self::Not => "'not'",
        };
        write!(f, "{}", text)
    }
}

/// 1-based source location of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: Position,
}
