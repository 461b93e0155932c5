use crate::ast;
use custom_error::custom_error;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub EvalError

    IdentifierNotFound{name: String} = "name '{name}' is not defined",
    UnsupportedOperand{operator: ast::Operator, operand: String} = "bad operand type for unary {operator}: '{operand}'",
    UnsupportedOperands{operator: ast::Operator, left: String, right: String} = "unsupported operand type(s) for {operator}: '{left}' and '{right}'",
    NotComparable{operator: ast::Operator, left: String, right: String} = "'{operator}' not supported between instances of '{left}' and '{right}'",
    ZeroDivision{detail: &'static str} = "{detail}",
    Overflow = "integer overflow",
    NotCallable{type_name: String} = "'{type_name}' object is not callable",
    IncorrectArity{name: String, expected: String, got: usize} = "{name}() takes {expected} arguments ({got} given)",
    UnsupportedArgType{fn_name: &'static str, type_name: String} = "argument to '{fn_name}' not supported, got '{type_name}'",
    NoLength{type_name: String} = "object of type '{type_name}' has no len()",
    NotIndexable{type_name: String} = "'{type_name}' object is not subscriptable",
    NotAssignable{type_name: String} = "'{type_name}' object does not support item assignment",
    InvalidIndexType{type_name: String, index_type: String} = "{type_name} indices must be integers, not '{index_type}'",
    IndexOutOfRange{type_name: String} = "{type_name} index out of range",
    PopFromEmpty = "pop from empty list",
    NotHashable{type_name: String} = "unhashable type: '{type_name}'",
    KeyNotFound{key: String} = "{key}",
    NotIterable{type_name: String} = "'{type_name}' object is not iterable",
    InvalidMembership{type_name: String} = "'in <string>' requires string as left operand, not {type_name}",
    AttributeNotFound{type_name: String, name: String} = "'{type_name}' object has no attribute '{name}'",
    ModuleAttributeNotFound{module: String, name: String} = "module '{module}' has no attribute '{name}'",
    InvalidIntLiteral{literal: String} = "invalid literal for int() with base 10: '{literal}'",
    InvalidFloatLiteral{literal: String} = "could not convert string to float: '{literal}'",
    EmptySequence{fn_name: &'static str} = "{fn_name}() arg is an empty sequence",
    RangeStepZero = "range() arg 3 must not be zero",
    RecursionLimit = "maximum recursion depth exceeded",
    ModuleNotFound{name: String} = "No module named '{name}'",
    ModuleSyntax{name: String, detail: String} = "cannot load module '{name}': {detail}",
    ImportNameNotFound{name: String, module: String} = "cannot import name '{name}' from '{module}'",
    CircularImport{name: String} = "circular import of '{name}'",
    NoActiveException = "No active exception to re-raise",
    InvalidRaise{got: usize} = "raise() takes 1 or 2 arguments ({got} given)",
}

impl EvalError {
    /// The exception tag user code sees when this fault is raised.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::IdentifierNotFound { .. } | Self::NoActiveException => "RuntimeError",
            Self::ZeroDivision { .. } => "ZeroDivisionError",
            Self::Overflow => "OverflowError",
            Self::IndexOutOfRange { .. } | Self::PopFromEmpty => "IndexError",
            Self::KeyNotFound { .. } => "KeyError",
            Self::AttributeNotFound { .. } | Self::ModuleAttributeNotFound { .. } => {
                "AttributeError"
            }
            Self::InvalidIntLiteral { .. }
            | Self::InvalidFloatLiteral { .. }
            | Self::EmptySequence { .. }
            | Self::RangeStepZero => "ValueError",
            Self::RecursionLimit => "RecursionError",
            Self::ModuleNotFound { .. }
            | Self::ModuleSyntax { .. }
            | Self::ImportNameNotFound { .. }
            | Self::CircularImport { .. } => "ImportError",
            Self::UnsupportedOperand { .. }
            | Self::UnsupportedOperands { .. }
            | Self::NotComparable { .. }
            | Self::NotCallable { .. }
            | Self::IncorrectArity { .. }
            | Self::UnsupportedArgType { .. }
            | Self::NoLength { .. }
            | Self::NotIndexable { .. }
            | Self::NotAssignable { .. }
            | Self::InvalidIndexType { .. }
            | Self::NotHashable { .. }
            | Self::NotIterable { .. }
            | Self::InvalidMembership { .. }
            | Self::InvalidRaise { .. } => "TypeError",
        }
    }

    pub fn arity(name: &str, expected: usize, got: usize) -> Self {
        Self::IncorrectArity {
            name: name.to_owned(),
            expected: expected.to_string(),
            got,
        }
    }

    /// Arity error for calls accepting between `min` and `max` arguments.
    pub fn arity_range(name: &str, min: usize, max: usize, got: usize) -> Self {
        if min == max {
            return Self::arity(name, min, got);
        }
        Self::IncorrectArity {
            name: name.to_owned(),
            expected: format!("from {} to {}", min, max),
            got,
        }
    }
}
