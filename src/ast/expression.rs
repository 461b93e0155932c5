use crate::token::Token;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    String(String),
    Boolean(bool),
    None,
    List(ListLiteral),
    Dict(DictLiteral),
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    Call(CallExpression),
    Index(IndexExpression),
    Attribute(AttributeExpression),
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{}", name),
            Self::IntegerLiteral(n) => write!(f, "{}", n),
            Self::FloatLiteral(x) => write!(f, "{:?}", x),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Boolean(true) => write!(f, "True"),
            Self::Boolean(false) => write!(f, "False"),
            Self::None => write!(f, "None"),
            Self::List(list) => write!(f, "{}", list),
            Self::Dict(dict) => write!(f, "{}", dict),
            Self::Prefix(prefix) => write!(f, "{}", prefix),
            Self::Infix(infix) => write!(f, "{}", infix),
            Self::Call(call) => write!(f, "{}", call),
            Self::Index(index) => write!(f, "{}", index),
            Self::Attribute(attr) => write!(f, "{}", attr),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Operator {
    #[strum(to_string = "+")]
    Plus,
    #[strum(to_string = "-")]
    Minus,
    #[strum(to_string = "*")]
    Asterisk,
    #[strum(to_string = "/")]
    Slash,
    #[strum(to_string = "//")]
    FloorDiv,
    #[strum(to_string = "%")]
    Modulo,
    #[strum(to_string = "**")]
    Power,
    #[strum(to_string = "<")]
    LT,
    #[strum(to_string = "<=")]
    LtEq,
    #[strum(to_string = ">")]
    GT,
    #[strum(to_string = ">=")]
    GtEq,
    #[strum(to_string = "==")]
    Eq,
    #[strum(to_string = "!=")]
    NotEq,
    #[strum(to_string = "in")]
    In,
    #[strum(to_string = "not in")]
    NotIn,
    #[strum(to_string = "and")]
    And,
    #[strum(to_string = "or")]
    Or,
    #[strum(to_string = "not")]
    Not,
}

impl Operator {
    /// Maps an operator token, or the arithmetic part of an augmented
    /// assignment token, to its operator.
    pub fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::Plus | Token::PlusAssign => Self::Plus,
            Token::Minus | Token::MinusAssign => Self::Minus,
            Token::Asterisk | Token::AsteriskAssign => Self::Asterisk,
            Token::Slash | Token::SlashAssign => Self::Slash,
            Token::DoubleSlash => Self::FloorDiv,
            Token::Percent => Self::Modulo,
            Token::DoubleAsterisk => Self::Power,
            Token::LT => Self::LT,
            Token::LtEq => Self::LtEq,
            Token::GT => Self::GT,
            Token::GtEq => Self::GtEq,
            Token::Eq => Self::Eq,
            Token::NotEq => Self::NotEq,
            Token::In => Self::In,
            Token::And => Self::And,
            Token::Or => Self::Or,
            Token::Not => Self::Not,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub operator: Operator,
    pub right: Box<Expression>,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.operator {
            Operator::Not => write!(f, "(not {})", self.right),
            op => write!(f, "({}{})", op, self.right),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: Operator,
    pub right: Box<Expression>,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let arguments: Vec<String> = self.arguments.iter().map(Expression::to_string).collect();

        write!(f, "{}({})", self.function, arguments.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListLiteral {
    pub elements: Vec<Expression>,
}

impl Display for ListLiteral {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(Expression::to_string).collect();

        write!(f, "[{}]", elements.join(", "))
    }
}

impl From<Vec<Expression>> for ListLiteral {
    fn from(elements: Vec<Expression>) -> Self {
        Self { elements }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeExpression {
    pub object: Box<Expression>,
    pub name: String,
}

impl Display for AttributeExpression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.object, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictLiteral {
    pub pairs: Vec<(Expression, Expression)>,
}

impl Display for DictLiteral {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let pairs: Vec<String> = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

impl From<Vec<(Expression, Expression)>> for DictLiteral {
    fn from(pairs: Vec<(Expression, Expression)>) -> Self {
        Self { pairs }
    }
}
