use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Destination for lines written by `print`.
pub trait Output {
    fn write_line(&mut self, line: &str);
}

#[derive(Debug, Default)]
pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn write_line(&mut self, line: &str) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        // A closed pipe leaves nothing useful to do with the line.
        let _ = writeln!(handle, "{}", line);
    }
}

/// Collects printed lines in memory. Clones share the same buffer, so a
/// handle kept by the caller sees everything the interpreter writes.
#[derive(Debug, Clone, Default)]
pub struct BufferOutput {
    lines: Rc<RefCell<Vec<String>>>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Output for BufferOutput {
    fn write_line(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}
