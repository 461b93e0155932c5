use super::{EvalResult, Evaluator};
use crate::ast::{FromImportStatement, ImportStatement};
use crate::environment::ScopeId;
use crate::interpreter::parse_source;
use crate::modules::ModuleState;
use crate::object::{EvalError, ModuleObject, Object};
use std::rc::Rc;
use tracing::debug;

impl Evaluator {
    pub(super) fn exec_import(&mut self, stmt: &ImportStatement, scope: ScopeId) -> EvalResult<()> {
        let module = self.import_module(&stmt.module)?;
        let binding = stmt.alias.as_deref().unwrap_or(&stmt.module);
        self.env.set(scope, binding, Object::Module(module));
        Ok(())
    }

    pub(super) fn exec_from_import(
        &mut self,
        stmt: &FromImportStatement,
        scope: ScopeId,
    ) -> EvalResult<()> {
        let module = self.import_module(&stmt.module)?;
        for imported in stmt.names.iter() {
            let value = self
                .env
                .get_local(module.scope, &imported.name)
                .ok_or_else(|| EvalError::ImportNameNotFound {
                    name: imported.name.clone(),
                    module: module.name.clone(),
                })?;
            self.env.set(scope, imported.binding(), value);
        }
        Ok(())
    }

    /// Returns the cached namespace for `name`, executing the module body
    /// the first time it is imported.
    fn import_module(&mut self, name: &str) -> EvalResult<Rc<ModuleObject>> {
        match self.modules.state(name) {
            Some(ModuleState::Loaded(module)) => {
                debug!(module = name, "module cache hit");
                return Ok(module);
            }
            Some(ModuleState::Loading) => {
                return Err(EvalError::CircularImport {
                    name: name.to_owned(),
                }
                .into())
            }
            None => {}
        }

        let source = self
            .source
            .resolve(name)
            .ok_or_else(|| EvalError::ModuleNotFound {
                name: name.to_owned(),
            })?;
        let program = parse_source(&source).map_err(|err| EvalError::ModuleSyntax {
            name: name.to_owned(),
            detail: err.to_string(),
        })?;

        debug!(module = name, "loading module");
        let scope = self.env.root();
        self.env.capture(scope);
        self.modules.begin(name);
        match self.exec_block(&program.statements, scope) {
            Ok(_) => {
                let module = Rc::new(ModuleObject {
                    name: name.to_owned(),
                    scope,
                });
                self.modules.finish(module.clone());
                Ok(module)
            }
            Err(exception) => {
                debug!(module = name, tag = %exception.tag, "module failed to load");
                self.modules.abandon(name);
                Err(exception)
            }
        }
    }
}
