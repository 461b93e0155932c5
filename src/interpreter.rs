use crate::ast::Program;
use crate::config::Config;
use crate::evaluator::Evaluator;
use crate::lexer::{tokenize, LexError};
use crate::modules::ModuleSource;
use crate::object::{Exception, Object};
use crate::output::Output;
use crate::parser::{parse, ParseError};
use custom_error::custom_error;
use tracing::warn;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub SyntaxError

    Lex{source: LexError} = "{source}",
    Parse{source: ParseError} = "{source}",
}

/// Lexes and parses a complete program.
pub fn parse_source(source: &str) -> Result<Program, SyntaxError> {
    let tokens = tokenize(source).map_err(|source| SyntaxError::Lex { source })?;
    parse(tokens).map_err(|source| SyntaxError::Parse { source })
}

/// How a program run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed,
    Failed(Exception),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::Failed(_) => 1,
        }
    }

    /// `Uncaught <tag>: <message>`, followed by one `caused by` line per
    /// exception in the cause chain.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::Completed => None,
            Self::Failed(exception) => {
                let mut lines = vec![format!("Uncaught {}", exception)];
                lines.extend(
                    exception
                        .chain()
                        .skip(1)
                        .map(|cause| format!("  caused by {}", cause)),
                );
                Some(lines.join("\n"))
            }
        }
    }
}

/// Parses and evaluates programs against one persistent top-level scope.
pub struct Interpreter {
    evaluator: Evaluator,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Self {
            evaluator: Evaluator::new(config),
        }
    }

    pub fn with_output(mut self, output: impl Output + 'static) -> Self {
        self.evaluator.set_output(Box::new(output));
        self
    }

    pub fn with_modules(mut self, source: impl ModuleSource + 'static) -> Self {
        self.evaluator.set_module_source(Box::new(source));
        self
    }

    pub fn config(&self) -> &Config {
        self.evaluator.config()
    }

    /// Current value of a top-level binding.
    pub fn global(&self, name: &str) -> Option<Object> {
        self.evaluator.global(name)
    }

    /// Names of successfully imported modules, sorted.
    pub fn loaded_modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.evaluator.modules().loaded().map(String::from).collect();
        names.sort();
        names
    }

    /// Runs `source`. Syntax errors are reported before anything executes.
    pub fn run(&mut self, source: &str) -> Result<Outcome, SyntaxError> {
        let program = parse_source(source)?;
        Ok(Self::finish(self.evaluator.eval_program(&program)))
    }

    /// Runs one REPL entry, returning the value of a trailing expression
    /// statement when `echo_results` is enabled and the value is not `None`.
    pub fn run_interactive(
        &mut self,
        source: &str,
    ) -> Result<(Outcome, Option<Object>), SyntaxError> {
        let program = parse_source(source)?;
        if !self.evaluator.config().echo_results {
            return Ok((Self::finish(self.evaluator.eval_program(&program)), None));
        }
        match self.evaluator.eval_interactive(&program) {
            Ok(Some(Object::None)) | Ok(None) => Ok((Outcome::Completed, None)),
            Ok(Some(value)) => Ok((Outcome::Completed, Some(value))),
            Err(exception) => Ok((Self::finish(Err(exception)), None)),
        }
    }

    fn finish(result: Result<(), Exception>) -> Outcome {
        match result {
            Ok(()) => Outcome::Completed,
            Err(exception) => {
                warn!(tag = %exception.tag, message = %exception.message, "uncaught exception");
                Outcome::Failed(exception)
            }
        }
    }
}
