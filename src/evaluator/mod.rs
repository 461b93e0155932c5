use crate::ast::{
    AssignStatement, ClassDefinition, FunctionDefinition, Program, RaiseStatement, Statement,
    Target, TryStatement,
};
use crate::config::Config;
use crate::environment::{Environment, ScopeId};
use crate::modules::{ModuleCache, ModuleSource, NoModules};
use crate::object::{ClassObject, EvalError, Exception, FunctionObject, Object, CATCH_ALL};
use crate::output::{Output, StdoutOutput};
use std::rc::Rc;
use tracing::trace;

mod expression;
mod imports;
pub mod operators;

pub type EvalResult<T> = std::result::Result<T, Exception>;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Object),
    Break,
    Continue,
}

pub struct Evaluator {
    env: Environment,
    config: Config,
    modules: ModuleCache,
    source: Box<dyn ModuleSource>,
    output: Box<dyn Output>,
    depth: usize,
    /// Exceptions whose `except` bodies are running, innermost last.
    handling: Vec<Rc<Exception>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Evaluator {
    pub fn new(config: Config) -> Self {
        Self {
            env: Environment::new(),
            config,
            modules: ModuleCache::new(),
            source: Box::new(NoModules),
            output: Box::new(StdoutOutput),
            depth: 0,
            handling: vec![],
        }
    }

    pub fn set_output(&mut self, output: Box<dyn Output>) {
        self.output = output;
    }

    pub fn set_module_source(&mut self, source: Box<dyn ModuleSource>) {
        self.source = source;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn modules(&self) -> &ModuleCache {
        &self.modules
    }

    /// Looks up a top-level binding.
    pub fn global(&self, name: &str) -> Option<Object> {
        self.env.get_local(self.env.global(), name)
    }

    /// Runs `program` in the top-level scope, which persists between calls.
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<()> {
        let global = self.env.global();
        self.exec_block(&program.statements, global)?;
        Ok(())
    }

    /// Like `eval_program`, but returns the value of a trailing expression
    /// statement.
    pub fn eval_interactive(&mut self, program: &Program) -> EvalResult<Option<Object>> {
        let global = self.env.global();
        match program.statements.split_last() {
            Some((Statement::Expr(last), rest)) => {
                self.exec_block(rest, global)?;
                self.eval(last, global).map(Some)
            }
            _ => self.eval_program(program).map(|_| None),
        }
    }

    fn exec_block(&mut self, statements: &[Statement], scope: ScopeId) -> EvalResult<Flow> {
        for statement in statements.iter() {
            match self.exec(statement, scope)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, statement: &Statement, scope: ScopeId) -> EvalResult<Flow> {
        match statement {
            Statement::Expr(expression) => {
                self.eval(expression, scope)?;
            }
            Statement::Assign(stmt) => self.exec_assign(stmt, scope)?,
            Statement::If(stmt) => {
                for branch in stmt.branches.iter() {
                    if self.eval(&branch.condition, scope)?.truth_value() {
                        return self.exec_block(&branch.body.statements, scope);
                    }
                }
                if let Some(alternative) = &stmt.alternative {
                    return self.exec_block(&alternative.statements, scope);
                }
            }
            Statement::While(stmt) => {
                while self.eval(&stmt.condition, scope)?.truth_value() {
                    match self.exec_block(&stmt.body.statements, scope)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            Statement::For(stmt) => {
                let iterable = self.eval(&stmt.iterable, scope)?;
                for item in iterable.iter()? {
                    self.env.set(scope, &stmt.variable, item);
                    match self.exec_block(&stmt.body.statements, scope)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            Statement::Function(def) => {
                let function = self.define_function(def, scope)?;
                self.env.set(scope, &def.name, Object::Function(function));
            }
            Statement::Class(def) => {
                let class = self.define_class(def, scope)?;
                self.env.set(scope, &def.name, Object::Class(Rc::new(class)));
            }
            Statement::Return(value) => {
                let value = match value {
                    Some(expression) => self.eval(expression, scope)?,
                    None => Object::None,
                };
                return Ok(Flow::Return(value));
            }
            Statement::Import(stmt) => self.exec_import(stmt, scope)?,
            Statement::FromImport(stmt) => self.exec_from_import(stmt, scope)?,
            Statement::Try(stmt) => return self.exec_try(stmt, scope),
            Statement::Raise(stmt) => return Err(self.raise(stmt, scope)?),
            Statement::Pass => {}
            Statement::Break => return Ok(Flow::Break),
            Statement::Continue => return Ok(Flow::Continue),
        }
        Ok(Flow::Normal)
    }

    fn exec_assign(&mut self, stmt: &AssignStatement, scope: ScopeId) -> EvalResult<()> {
        let operator = match stmt.operator {
            None => {
                let value = self.eval(&stmt.value, scope)?;
                return self.assign(&stmt.target, value, scope);
            }
            Some(operator) => operator,
        };

        // The target's subexpressions are evaluated once, before the value.
        match &stmt.target {
            Target::Name(name) => {
                let current = self.lookup(name, scope)?;
                let value = self.eval(&stmt.value, scope)?;
                let updated = operators::infix(operator, current, value)?;
                self.env.set(scope, name, updated);
            }
            Target::Attribute { object, name } => {
                let receiver = self.eval(object, scope)?;
                let current = self.get_attribute(&receiver, name)?;
                let value = self.eval(&stmt.value, scope)?;
                let updated = operators::infix(operator, current, value)?;
                self.set_attribute(&receiver, name, updated)?;
            }
            Target::Index { object, index } => {
                let container = self.eval(object, scope)?;
                let key = self.eval(index, scope)?;
                let current = operators::index(&container, &key)?;
                let value = self.eval(&stmt.value, scope)?;
                let updated = operators::infix(operator, current, value)?;
                operators::set_index(&container, key, updated)?;
            }
        }
        Ok(())
    }

    fn assign(&mut self, target: &Target, value: Object, scope: ScopeId) -> EvalResult<()> {
        match target {
            Target::Name(name) => self.env.set(scope, name, value),
            Target::Attribute { object, name } => {
                let receiver = self.eval(object, scope)?;
                self.set_attribute(&receiver, name, value)?;
            }
            Target::Index { object, index } => {
                let container = self.eval(object, scope)?;
                let key = self.eval(index, scope)?;
                operators::set_index(&container, key, value)?;
            }
        }
        Ok(())
    }

    fn define_function(
        &mut self,
        def: &Rc<FunctionDefinition>,
        scope: ScopeId,
    ) -> EvalResult<Rc<FunctionObject>> {
        let mut defaults = vec![];
        for parameter in def.parameters.iter() {
            if let Some(default) = &parameter.default {
                defaults.push(self.eval(default, scope)?);
            }
        }
        self.env.capture(scope);
        Ok(Rc::new(FunctionObject {
            definition: def.clone(),
            defaults,
            env: scope,
        }))
    }

    fn define_class(&mut self, def: &ClassDefinition, scope: ScopeId) -> EvalResult<ClassObject> {
        let mut class = ClassObject::new(&def.name);
        for (name, value) in def.attributes.iter() {
            let value = self.eval(value, scope)?;
            class.attributes.get_mut().insert(name.clone(), value);
        }
        for method in def.methods.iter() {
            let function = self.define_function(method, scope)?;
            class.methods.insert(method.name.clone(), function);
        }
        Ok(class)
    }

    fn exec_try(&mut self, stmt: &TryStatement, scope: ScopeId) -> EvalResult<Flow> {
        let exception = match self.exec_block(&stmt.body.statements, scope) {
            Err(exception) => exception,
            flow => return flow,
        };
        let handler = stmt.handlers.iter().find(|handler| {
            handler
                .tag
                .as_deref()
                .map_or(true, |tag| exception.matches(tag))
        });
        let handler = match handler {
            Some(handler) => handler,
            None => return Err(exception),
        };
        trace!(tag = %exception.tag, "exception handled");

        let exception = Rc::new(exception);
        if let Some(binding) = &handler.binding {
            self.env
                .set(scope, binding, Object::Exception(exception.clone()));
        }
        self.handling.push(exception);
        let result = self.exec_block(&handler.body.statements, scope);
        self.handling.pop();
        result
    }

    /// Builds the exception a `raise` statement throws.
    fn raise(&mut self, stmt: &RaiseStatement, scope: ScopeId) -> EvalResult<Exception> {
        let exception = match stmt {
            RaiseStatement::Reraise => {
                return match self.handling.last() {
                    Some(current) => Ok(Exception::clone(current)),
                    None => Ok(EvalError::NoActiveException.into()),
                }
            }
            RaiseStatement::Call(arguments) => {
                let mut args = self.eval_expressions(arguments, scope)?;
                match (args.pop(), args.pop(), args.is_empty()) {
                    (Some(Object::Exception(existing)), None, _) => {
                        return Ok(Exception::clone(&existing))
                    }
                    (Some(message), None, _) => Exception::new(CATCH_ALL, message),
                    (Some(message), Some(tag), true) => Exception::new(&tag.to_string(), message),
                    _ => {
                        return Ok(EvalError::InvalidRaise {
                            got: arguments.len(),
                        }
                        .into())
                    }
                }
            }
            RaiseStatement::Tagged { tag, message: None } => {
                // `raise e` re-raises a caught exception bound to `e`.
                if let Some(Object::Exception(existing)) = self.env.get(scope, tag) {
                    return Ok(Exception::clone(&existing));
                }
                Exception::new(tag, "")
            }
            RaiseStatement::Tagged {
                tag,
                message: Some(message),
            } => {
                let message = self.eval(message, scope)?;
                Exception::new(tag, message)
            }
        };
        Ok(exception.with_cause(self.handling.last().cloned()))
    }
}
