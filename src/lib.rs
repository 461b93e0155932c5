pub mod ast;
pub mod builtins;
pub mod config;
pub mod environment;
mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod modules;
pub mod object;
pub mod output;
pub mod parser;
pub mod repl;
pub mod token;

pub use config::Config;
pub use interpreter::{parse_source, Interpreter, Outcome, SyntaxError};
pub use modules::{DirectoryModules, ModuleSource};
pub use object::{Exception, Object};
pub use output::{BufferOutput, Output, StdoutOutput};
