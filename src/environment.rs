use crate::object::Object;
use std::collections::HashMap;

/// Handle to a scope owned by an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct Scope {
    store: HashMap<String, Object>,
    outer: Option<ScopeId>,
}

/// Arena of lexical scopes. Closures and modules hold `ScopeId`s instead of
/// owning their scopes, so a function stored in the scope it closes over
/// does not keep itself alive through a reference cycle.
///
/// Scopes are pushed when a call starts and truncated away when it returns,
/// unless something created during the call captured them. Capture is a
/// watermark, not a count: a captured scope stays in the arena until the
/// environment is dropped, even after the closure that captured it is gone.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    /// Highest scope index referenced by a live closure or module.
    captured: Option<usize>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            captured: Some(0),
        }
    }

    /// The program's top-level scope.
    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// A fresh scope with no enclosing scope, used for module bodies.
    pub fn root(&mut self) -> ScopeId {
        self.push(None)
    }

    pub fn enclosed(&mut self, outer: ScopeId) -> ScopeId {
        self.push(Some(outer))
    }

    fn push(&mut self, outer: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope {
            store: HashMap::new(),
            outer,
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Resolves `name` starting at `scope` and walking outward.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<Object> {
        let mut current = Some(scope);
        while let Some(ScopeId(index)) = current {
            let scope = self.scopes.get(index)?;
            if let Some(value) = scope.store.get(name) {
                return Some(value.clone());
            }
            current = scope.outer;
        }
        None
    }

    /// Resolves `name` in `scope` only.
    pub fn get_local(&self, scope: ScopeId, name: &str) -> Option<Object> {
        self.scopes
            .get(scope.0)
            .and_then(|scope| scope.store.get(name).cloned())
    }

    /// Binds `name` in `scope`, shadowing any outer binding.
    pub fn set(&mut self, scope: ScopeId, name: &str, val: Object) {
        if let Some(scope) = self.scopes.get_mut(scope.0) {
            scope.store.insert(name.to_owned(), val);
        }
    }

    /// Marks `scope` as referenced by a value that may outlive the current call.
    /// The mark is never lifted.
    pub fn capture(&mut self, scope: ScopeId) {
        self.captured = self.captured.max(Some(scope.0));
    }

    /// Drops `scope` and everything above it once a call has returned,
    /// provided none of those scopes were captured.
    pub fn release(&mut self, scope: ScopeId) {
        if self.captured.map_or(true, |captured| captured < scope.0) {
            self.scopes.truncate(scope.0);
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let mut env = Environment::new();
        let global = env.global();
        env.set(global, "x", Object::Integer(1));
        env.set(global, "y", Object::Integer(2));

        let inner = env.enclosed(global);
        env.set(inner, "x", Object::Integer(10));

        assert_eq!(env.get(inner, "x"), Some(Object::Integer(10)));
        assert_eq!(env.get(inner, "y"), Some(Object::Integer(2)));
        assert_eq!(env.get(global, "x"), Some(Object::Integer(1)));
        assert_eq!(env.get_local(inner, "y"), None);
        assert_eq!(env.get(inner, "z"), None);
    }

    #[test]
    fn test_root_scopes_are_isolated() {
        let mut env = Environment::new();
        let global = env.global();
        env.set(global, "x", Object::Integer(1));

        let module = env.root();
        assert_eq!(env.get(module, "x"), None);
    }

    #[test]
    fn test_release_reclaims_uncaptured_scopes() {
        let mut env = Environment::new();
        let global = env.global();

        let call = env.enclosed(global);
        let nested = env.enclosed(call);
        env.set(nested, "tmp", Object::Integer(1));
        assert_eq!(env.len(), 3);

        env.release(call);
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_release_keeps_captured_scopes() {
        let mut env = Environment::new();
        let global = env.global();

        let call = env.enclosed(global);
        env.set(call, "count", Object::Integer(0));
        env.capture(call);
        env.release(call);
        assert_eq!(env.len(), 2);
        assert_eq!(env.get(call, "count"), Some(Object::Integer(0)));

        let later = env.enclosed(global);
        env.release(later);
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_capturing_calls_pin_their_scopes() {
        let mut env = Environment::new();
        let global = env.global();

        // Each call defines a helper, capturing its own scope.
        for _ in 0..10 {
            let call = env.enclosed(global);
            env.capture(call);
            env.release(call);
        }
        assert_eq!(env.len(), 11);

        // Calls that capture nothing still reclaim above the watermark.
        let plain = env.enclosed(global);
        env.release(plain);
        assert_eq!(env.len(), 11);
    }
}
