use std::env;
use std::path::PathBuf;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Colon-separated list of extra module directories.
pub const PATH_VARIABLE: &str = "SERPENT_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Nested calls allowed before `RecursionError` is raised.
    pub max_call_depth: usize,
    /// Directories searched for `<name>.py` when a module is imported.
    pub module_paths: Vec<PathBuf>,
    /// Print the value of expression statements, as the REPL does.
    pub echo_results: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            module_paths: vec![],
            echo_results: false,
        }
    }
}

impl Config {
    /// Defaults plus any module directories named in `SERPENT_PATH`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(paths) = env::var_os(PATH_VARIABLE) {
            config.module_paths.extend(env::split_paths(&paths));
        }
        config
    }

    pub fn with_module_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_paths.push(path.into());
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
