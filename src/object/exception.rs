use super::{EvalError, Object};
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// Name that matches every tag in an `except` clause.
pub const CATCH_ALL: &str = "Exception";

/// A raised exception: a free-form tag, a message, and the exception that
/// was being handled when this one was raised.
#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    pub tag: String,
    pub message: Object,
    pub cause: Option<Rc<Exception>>,
}

impl Exception {
    pub fn new(tag: &str, message: impl Into<Object>) -> Self {
        Self {
            tag: tag.to_owned(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: Option<Rc<Exception>>) -> Self {
        self.cause = cause;
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        name == CATCH_ALL || self.tag == name
    }

    /// This exception followed by its causes, innermost last.
    pub fn chain(&self) -> impl Iterator<Item = &Exception> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }
}

impl Display for Exception {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.tag, self.message)
    }
}

impl From<EvalError> for Exception {
    fn from(err: EvalError) -> Self {
        Exception::new(err.tag(), err.to_string())
    }
}
