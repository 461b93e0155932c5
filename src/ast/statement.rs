use super::{Expression, Operator};
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Expression),
    Assign(AssignStatement),
    If(IfStatement),
    While(WhileStatement),
    For(ForStatement),
    Function(Rc<FunctionDefinition>),
    Class(ClassDefinition),
    Return(Option<Expression>),
    Import(ImportStatement),
    FromImport(FromImportStatement),
    Try(TryStatement),
    Raise(RaiseStatement),
    Pass,
    Break,
    Continue,
}

impl Statement {
    fn write_indented(&self, f: &mut Formatter, depth: usize) -> fmt::Result {
        let pad = INDENT.repeat(depth);
        match self {
            Self::Expr(expr) => writeln!(f, "{}{}", pad, expr),
            Self::Assign(stmt) => writeln!(f, "{}{}", pad, stmt),
            Self::If(stmt) => {
                for (i, branch) in stmt.branches.iter().enumerate() {
                    let keyword = if i == 0 { "if" } else { "elif" };
                    writeln!(f, "{}{} {}:", pad, keyword, branch.condition)?;
                    branch.body.write_indented(f, depth + 1)?;
                }
                if let Some(alternative) = &stmt.alternative {
                    writeln!(f, "{}else:", pad)?;
                    alternative.write_indented(f, depth + 1)?;
                }
                Ok(())
            }
            Self::While(stmt) => {
                writeln!(f, "{}while {}:", pad, stmt.condition)?;
                stmt.body.write_indented(f, depth + 1)
            }
            Self::For(stmt) => {
                writeln!(f, "{}for {} in {}:", pad, stmt.variable, stmt.iterable)?;
                stmt.body.write_indented(f, depth + 1)
            }
            Self::Function(def) => def.write_indented(f, depth),
            Self::Class(def) => {
                writeln!(f, "{}class {}:", pad, def.name)?;
                let inner = INDENT.repeat(depth + 1);
                for (name, value) in def.attributes.iter() {
                    writeln!(f, "{}{} = {}", inner, name, value)?;
                }
                for method in def.methods.iter() {
                    method.write_indented(f, depth + 1)?;
                }
                if def.attributes.is_empty() && def.methods.is_empty() {
                    writeln!(f, "{}pass", inner)?;
                }
                Ok(())
            }
            Self::Return(Some(value)) => writeln!(f, "{}return {}", pad, value),
            Self::Return(None) => writeln!(f, "{}return", pad),
            Self::Import(stmt) => writeln!(f, "{}{}", pad, stmt),
            Self::FromImport(stmt) => writeln!(f, "{}{}", pad, stmt),
            Self::Try(stmt) => {
                writeln!(f, "{}try:", pad)?;
                stmt.body.write_indented(f, depth + 1)?;
                for handler in stmt.handlers.iter() {
                    write!(f, "{}except", pad)?;
                    if let Some(tag) = &handler.tag {
                        write!(f, " {}", tag)?;
                    }
                    if let Some(binding) = &handler.binding {
                        write!(f, " as {}", binding)?;
                    }
                    writeln!(f, ":")?;
                    handler.body.write_indented(f, depth + 1)?;
                }
                Ok(())
            }
            Self::Raise(stmt) => writeln!(f, "{}{}", pad, stmt),
            Self::Pass => writeln!(f, "{}pass", pad),
            Self::Break => writeln!(f, "{}break", pad),
            Self::Continue => writeln!(f, "{}continue", pad),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub(super) fn write_indented(&self, f: &mut Formatter, depth: usize) -> fmt::Result {
        if self.statements.is_empty() {
            return writeln!(f, "{}pass", INDENT.repeat(depth));
        }
        for stmt in self.statements.iter() {
            stmt.write_indented(f, depth)?;
        }
        Ok(())
    }
}

impl From<Vec<Statement>> for BlockStatement {
    fn from(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// Left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    Attribute { object: Expression, name: String },
    Index { object: Expression, index: Expression },
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::Attribute { object, name } => write!(f, "{}.{}", object, name),
            Self::Index { object, index } => write!(f, "{}[{}]", object, index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStatement {
    pub target: Target,
    /// Set for augmented assignments such as `+=`.
    pub operator: Option<Operator>,
    pub value: Expression,
}

impl Display for AssignStatement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.operator {
            Some(op) => write!(f, "{} {}= {}", self.target, op, self.value),
            None => write!(f, "{} = {}", self.target, self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBlock {
    pub condition: Expression,
    pub body: BlockStatement,
}

/// `if` with its `elif` chain folded into `branches`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub branches: Vec<ConditionalBlock>,
    pub alternative: Option<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub variable: String,
    pub iterable: Expression,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Expression>,
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "{}={}", self.name, default),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: BlockStatement,
}

impl FunctionDefinition {
    fn write_indented(&self, f: &mut Formatter, depth: usize) -> fmt::Result {
        let parameters: Vec<String> = self.parameters.iter().map(Parameter::to_string).collect();
        writeln!(
            f,
            "{}def {}({}):",
            INDENT.repeat(depth),
            self.name,
            parameters.join(", ")
        )?;
        self.body.write_indented(f, depth + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    pub name: String,
    pub attributes: Vec<(String, Expression)>,
    pub methods: Vec<Rc<FunctionDefinition>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub module: String,
    pub alias: Option<String>,
}

impl Display for ImportStatement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "import {}", self.module)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    /// The name bound in the importing scope.
    pub fn binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromImportStatement {
    pub module: String,
    pub names: Vec<ImportedName>,
}

impl Display for FromImportStatement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let names: Vec<String> = self
            .names
            .iter()
            .map(|n| match &n.alias {
                Some(alias) => format!("{} as {}", n.name, alias),
                None => n.name.clone(),
            })
            .collect();
        write!(f, "from {} import {}", self.module, names.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptClause {
    /// `None` for a bare `except`.
    pub tag: Option<String>,
    pub binding: Option<String>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    pub body: BlockStatement,
    pub handlers: Vec<ExceptClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RaiseStatement {
    /// Bare `raise` inside a handler.
    Reraise,
    /// `raise(message)` or `raise(tag, message)`.
    Call(Vec<Expression>),
    /// `raise Tag` or `raise Tag(message)`.
    Tagged {
        tag: String,
        message: Option<Expression>,
    },
}

impl Display for RaiseStatement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Reraise => write!(f, "raise"),
            Self::Call(arguments) => {
                let arguments: Vec<String> = arguments.iter().map(Expression::to_string).collect();
                write!(f, "raise({})", arguments.join(", "))
            }
            Self::Tagged { tag, message: None } => write!(f, "raise {}", tag),
            Self::Tagged {
                tag,
                message: Some(message),
            } => write!(f, "raise {}({})", tag, message),
        }
    }
}
