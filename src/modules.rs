use crate::object::ModuleObject;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

/// Maps a module name to its source text.
pub trait ModuleSource {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> ModuleSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

impl ModuleSource for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolves nothing; every import fails.
#[derive(Debug, Default)]
pub struct NoModules;

impl ModuleSource for NoModules {
    fn resolve(&self, _: &str) -> Option<String> {
        None
    }
}

/// Reads `<dir>/<name>.py` from the first directory that has it.
#[derive(Debug, Clone, Default)]
pub struct DirectoryModules {
    paths: Vec<PathBuf>,
}

impl DirectoryModules {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl ModuleSource for DirectoryModules {
    fn resolve(&self, name: &str) -> Option<String> {
        if name.contains(|c: char| c == '/' || c == '\\') {
            return None;
        }
        self.paths
            .iter()
            .map(|dir| dir.join(format!("{}.py", name)))
            .find_map(|path| fs::read_to_string(path).ok())
    }
}

#[derive(Debug, Clone)]
pub enum ModuleState {
    /// The module body is executing; importing it again is a cycle.
    Loading,
    Loaded(Rc<ModuleObject>),
}

/// Run-once table of imported modules.
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: HashMap<String, ModuleState>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self, name: &str) -> Option<ModuleState> {
        self.entries.get(name).cloned()
    }

    pub fn begin(&mut self, name: &str) {
        self.entries.insert(name.to_owned(), ModuleState::Loading);
    }

    pub fn finish(&mut self, module: Rc<ModuleObject>) {
        self.entries
            .insert(module.name.clone(), ModuleState::Loaded(module));
    }

    /// Forgets a module whose body failed, so a later import retries it.
    pub fn abandon(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(name, state)| match state {
            ModuleState::Loaded(_) => Some(name.as_str()),
            ModuleState::Loading => None,
        })
    }
}
