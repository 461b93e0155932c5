use crate::config::Config;
use crate::interpreter::Interpreter;
use crate::modules::ModuleSource;
use std::io::{self, Write};

static PROMPT: &str = ">> ";
static CONTINUATION: &str = ".. ";

/// Lines are collected until the entry is complete: a line opening a block
/// (ending in `:`) keeps reading until a blank line.
fn read_entry() -> Option<String> {
    let mut entry = String::new();
    let mut prompt = PROMPT;
    loop {
        print!("{}", prompt);
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) if entry.is_empty() => return None,
            Ok(0) | Err(_) => return Some(entry),
            Ok(_) => {}
        }

        let blank = line.trim().is_empty();
        if prompt == CONTINUATION && blank {
            return Some(entry);
        }
        entry.push_str(&line);
        if prompt == PROMPT && !line.trim_end().ends_with(':') {
            return Some(entry);
        }
        prompt = CONTINUATION;
    }
}

pub fn start(mut config: Config, modules: impl ModuleSource + 'static) {
    config.echo_results = true;
    let mut interpreter = Interpreter::new(config).with_modules(modules);
    while let Some(entry) = read_entry() {
        if entry.trim().is_empty() {
            continue;
        }
        match interpreter.run_interactive(&entry) {
            Err(err) => println!("SyntaxError: {}", err),
            Ok((outcome, value)) => {
                if let Some(value) = value {
                    println!("{}", value.repr());
                }
                if let Some(diagnostic) = outcome.diagnostic() {
                    println!("{}", diagnostic);
                }
            }
        }
    }
    println!();
}
