use crate::ast;
use crate::builtins::{Builtin, NativeMethod};
use crate::environment::ScopeId;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

mod eval_error;
pub use eval_error::EvalError;

mod hash;
pub use hash::HashKey;

mod dict;
pub use dict::DictValue;

mod exception;
pub use exception::{Exception, CATCH_ALL};

mod iter;
pub use iter::{ObjectIter, RangeValue};

pub type Result<T> = std::result::Result<T, EvalError>;

pub type ListRef = Rc<RefCell<Vec<Object>>>;
pub type DictRef = Rc<RefCell<DictValue>>;

/// Containers nested deeper than this print as `...`.
const MAX_DISPLAY_DEPTH: usize = 64;
/// Containers nested deeper than this fail to compare with `RecursionLimit`.
const MAX_COMPARE_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    None,
    List(ListRef),
    Dict(DictRef),
    Range(RangeValue),
    Function(Rc<FunctionObject>),
    Builtin(Builtin),
    NativeMethod(Rc<NativeMethod>),
    BoundMethod(Rc<BoundMethod>),
    Class(Rc<ClassObject>),
    Instance(Rc<Instance>),
    Module(Rc<ModuleObject>),
    Exception(Rc<Exception>),
}

impl Display for Object {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.write(f, false, 0)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::None
    }
}

impl From<i64> for Object {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Object {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for Object {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        s.to_owned().into()
    }
}

impl From<Vec<Object>> for Object {
    fn from(elements: Vec<Object>) -> Self {
        Self::List(Rc::new(RefCell::new(elements)))
    }
}

impl From<DictValue> for Object {
    fn from(dict: DictValue) -> Self {
        Self::Dict(Rc::new(RefCell::new(dict)))
    }
}

impl From<RangeValue> for Object {
    fn from(range: RangeValue) -> Self {
        Self::Range(range)
    }
}

impl From<Exception> for Object {
    fn from(exception: Exception) -> Self {
        Self::Exception(Rc::new(exception))
    }
}

impl From<HashKey> for Object {
    fn from(key: HashKey) -> Self {
        match key {
            HashKey::Integer(n) => Self::Integer(n),
            HashKey::String(s) => Self::String(s),
            HashKey::Boolean(b) => Self::Boolean(b),
            HashKey::None => Self::None,
        }
    }
}

impl Object {
    /// Runtime kind as reported by `type()`.
    pub fn type_name(&self) -> String {
        match self {
            Self::Instance(instance) => instance.class.name.clone(),
            _ => self.kind().to_owned(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "str",
            Self::Boolean(_) => "bool",
            Self::None => "NoneType",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Range(_) => "range",
            Self::Function(_) => "function",
            Self::Builtin(_) | Self::NativeMethod(_) => "builtin_function_or_method",
            Self::BoundMethod(_) => "method",
            Self::Class(_) => "type",
            Self::Instance(_) => "object",
            Self::Module(_) => "module",
            Self::Exception(_) => "Exception",
        }
    }

    pub fn truth_value(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::None => false,
            Self::Integer(n) => *n != 0,
            Self::Float(x) => *x != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(list) => !list.borrow().is_empty(),
            Self::Dict(dict) => !dict.borrow().is_empty(),
            Self::Range(range) => range.len() > 0,
            _ => true,
        }
    }

    /// Quoted form used inside containers and by `repr()`.
    pub fn repr(&self) -> String {
        ReprDisplay(self).to_string()
    }

    pub fn len(&self) -> Result<usize> {
        match self {
            Self::String(s) => Ok(s.chars().count()),
            Self::List(list) => Ok(list.borrow().len()),
            Self::Dict(dict) => Ok(dict.borrow().len()),
            Self::Range(range) => Ok(range.len()),
            obj => Err(EvalError::NoLength {
                type_name: obj.type_name(),
            }),
        }
    }

    pub fn iter(&self) -> Result<ObjectIter> {
        match self {
            Self::List(list) => Ok(ObjectIter::list(list.clone())),
            Self::Dict(dict) => Ok(ObjectIter::keys(&dict.borrow())),
            Self::Range(range) => Ok(ObjectIter::range(*range)),
            Self::String(s) => Ok(ObjectIter::chars(s)),
            obj => Err(EvalError::NotIterable {
                type_name: obj.type_name(),
            }),
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`, `min` and `max`.
    pub fn compare(&self, other: &Object, operator: ast::Operator) -> Result<Ordering> {
        self.compare_at(other, operator, 0)
    }

    fn compare_at(&self, other: &Object, operator: ast::Operator, depth: usize) -> Result<Ordering> {
        let unordered = || EvalError::NotComparable {
            operator,
            left: self.type_name(),
            right: other.type_name(),
        };
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Ok(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Ok(a.cmp(b)),
            (Self::List(a), Self::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(Ordering::Equal);
                }
                if depth >= MAX_COMPARE_DEPTH {
                    return Err(EvalError::RecursionLimit);
                }
                let (a, b) = (a.borrow(), b.borrow());
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equals_at(y, depth + 1)? {
                        return x.compare_at(y, operator, depth + 1);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (left, right) => match (left.as_float(), right.as_float()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(unordered),
                _ => Err(unordered()),
            },
        }
    }

    /// Numeric view for int/float promotion.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn contains(&self, item: &Object) -> Result<bool> {
        match self {
            Self::List(list) => {
                for element in list.borrow().iter() {
                    if element.equals(item)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Dict(dict) => Ok(dict.borrow().contains_key(&HashKey::try_from(item)?)),
            Self::Range(range) => Ok(matches!(item, Self::Integer(n) if range.contains(*n))),
            Self::String(s) => match item {
                Self::String(needle) => Ok(s.contains(needle.as_str())),
                other => Err(EvalError::InvalidMembership {
                    type_name: other.type_name(),
                }),
            },
            obj => Err(EvalError::NotIterable {
                type_name: obj.type_name(),
            }),
        }
    }

    fn write(&self, f: &mut Formatter, quoted: bool, depth: usize) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", format_float(*x)),
            Self::String(s) if quoted => write_quoted(f, s),
            Self::String(s) => write!(f, "{}", s),
            Self::Boolean(true) => write!(f, "True"),
            Self::Boolean(false) => write!(f, "False"),
            Self::None => write!(f, "None"),
            Self::List(list) => {
                if depth > MAX_DISPLAY_DEPTH {
                    return write!(f, "[...]");
                }
                write!(f, "[")?;
                for (i, element) in list.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    element.write(f, true, depth + 1)?;
                }
                write!(f, "]")
            }
            Self::Dict(dict) => {
                if depth > MAX_DISPLAY_DEPTH {
                    return write!(f, "{{...}}");
                }
                write!(f, "{{")?;
                for (i, (key, value)) in dict.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    value.write(f, true, depth + 1)?;
                }
                write!(f, "}}")
            }
            Self::Range(range) => write!(f, "{}", range),
            Self::Function(func) => write!(f, "<function {}>", func.name()),
            Self::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name),
            Self::NativeMethod(method) => write!(
                f,
                "<built-in method {} of {} object>",
                method.name,
                method.receiver.type_name()
            ),
            Self::BoundMethod(method) => write!(
                f,
                "<bound method {}.{}>",
                method.receiver.type_name(),
                method.function.name()
            ),
            Self::Class(class) => write!(f, "<class '{}'>", class.name),
            Self::Instance(instance) => write!(f, "<{} object>", instance.class.name),
            Self::Module(module) => write!(f, "<module '{}'>", module.name),
            Self::Exception(exception) if quoted => write!(
                f,
                "{}({})",
                exception.tag,
                exception.message.repr()
            ),
            Self::Exception(exception) => write!(f, "{}", exception.message),
        }
    }
}

/// Resolves a possibly negative index against a sequence length.
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 {
        index.checked_add(len as i64)?
    } else {
        index
    };
    if resolved >= 0 && (resolved as usize) < len {
        Some(resolved as usize)
    } else {
        None
    }
}

struct ReprDisplay<'a>(&'a Object);

impl Display for ReprDisplay<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.write(f, true, 0)
    }
}

fn write_quoted(f: &mut Formatter, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{}", quote)?;
    for ch in s.chars() {
        match ch {
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "{}", quote)
}

pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let text = format!("{:?}", x);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

impl Object {
    /// Structural equality for `==`, `!=` and `in`.
    pub fn equals(&self, other: &Object) -> Result<bool> {
        self.equals_at(other, 0)
    }

    fn equals_at(&self, other: &Object, depth: usize) -> Result<bool> {
        let equal = match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Integer(_), Self::Float(_)) | (Self::Float(_), Self::Integer(_)) => {
                self.as_float() == other.as_float()
            }
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::None, Self::None) => true,
            (Self::List(a), Self::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                if depth >= MAX_COMPARE_DEPTH {
                    return Err(EvalError::RecursionLimit);
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equals_at(y, depth + 1)? {
                        return Ok(false);
                    }
                }
                true
            }
            (Self::Dict(a), Self::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                if depth >= MAX_COMPARE_DEPTH {
                    return Err(EvalError::RecursionLimit);
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (key, value) in a.iter() {
                    let same = match b.get(key) {
                        Some(theirs) => value.equals_at(theirs, depth + 1)?,
                        None => false,
                    };
                    if !same {
                        return Ok(false);
                    }
                }
                true
            }
            (Self::Range(a), Self::Range(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a.name == b.name,
            (Self::NativeMethod(a), Self::NativeMethod(b)) => Rc::ptr_eq(a, b),
            (Self::BoundMethod(a), Self::BoundMethod(b)) => {
                Rc::ptr_eq(&a.function, &b.function)
                    && a.receiver.equals_at(&b.receiver, depth + 1)?
            }
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            (Self::Module(a), Self::Module(b)) => Rc::ptr_eq(a, b),
            (Self::Exception(a), Self::Exception(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        Ok(equal)
    }
}

/// Containers too deeply nested to compare are unequal.
impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

/// A user-defined function closed over the scope it was defined in.
#[derive(Debug)]
pub struct FunctionObject {
    pub definition: Rc<ast::FunctionDefinition>,
    /// Values for the trailing parameters that declare defaults,
    /// evaluated once when the `def` runs.
    pub defaults: Vec<Object>,
    pub env: ScopeId,
}

impl FunctionObject {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn required_parameters(&self) -> usize {
        self.definition.parameters.len() - self.defaults.len()
    }
}

#[derive(Debug)]
pub struct BoundMethod {
    pub receiver: Object,
    pub function: Rc<FunctionObject>,
}

#[derive(Debug)]
pub struct ClassObject {
    pub name: String,
    pub methods: HashMap<String, Rc<FunctionObject>>,
    pub attributes: RefCell<HashMap<String, Object>>,
}

impl ClassObject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            methods: HashMap::new(),
            attributes: RefCell::new(HashMap::new()),
        }
    }

    pub fn method(&self, name: &str) -> Option<Rc<FunctionObject>> {
        self.methods.get(name).cloned()
    }
}

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<ClassObject>,
    pub attributes: RefCell<HashMap<String, Object>>,
}

impl Instance {
    pub fn new(class: Rc<ClassObject>) -> Self {
        Self {
            class,
            attributes: RefCell::new(HashMap::new()),
        }
    }
}

/// Namespace produced by executing a module once.
#[derive(Debug)]
pub struct ModuleObject {
    pub name: String,
    pub scope: ScopeId,
}

#[cfg(test)]
mod tests;
