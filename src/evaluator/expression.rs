use super::{operators, EvalResult, Evaluator, Flow};
use crate::ast::{Expression, Operator};
use crate::builtins;
use crate::environment::ScopeId;
use crate::object::{
    BoundMethod, ClassObject, DictValue, EvalError, FunctionObject, HashKey, Instance, Object,
};
use std::rc::Rc;
use tracing::trace;

/// Grow the native stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

impl Evaluator {
    pub(super) fn eval(&mut self, expression: &Expression, scope: ScopeId) -> EvalResult<Object> {
        stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || {
            self.eval_expression(expression, scope)
        })
    }

    fn eval_expression(&mut self, expression: &Expression, scope: ScopeId) -> EvalResult<Object> {
        let value = match expression {
            Expression::Identifier(name) => self.lookup(name, scope)?,
            Expression::IntegerLiteral(n) => Object::Integer(*n),
            Expression::FloatLiteral(x) => Object::Float(*x),
            Expression::String(s) => Object::String(s.clone()),
            Expression::Boolean(b) => Object::Boolean(*b),
            Expression::None => Object::None,
            Expression::List(literal) => self.eval_expressions(&literal.elements, scope)?.into(),
            Expression::Dict(literal) => {
                let mut dict = DictValue::new();
                for (key, value) in literal.pairs.iter() {
                    let key = HashKey::try_from(self.eval(key, scope)?)?;
                    let value = self.eval(value, scope)?;
                    dict.insert(key, value);
                }
                dict.into()
            }
            Expression::Prefix(prefix) => {
                let right = self.eval(&prefix.right, scope)?;
                operators::prefix(prefix.operator, right)?
            }
            Expression::Infix(infix) => {
                let left = self.eval(&infix.left, scope)?;
                match infix.operator {
                    Operator::And if !left.truth_value() => left,
                    Operator::Or if left.truth_value() => left,
                    Operator::And | Operator::Or => self.eval(&infix.right, scope)?,
                    operator => {
                        let right = self.eval(&infix.right, scope)?;
                        operators::infix(operator, left, right)?
                    }
                }
            }
            Expression::Call(call) => {
                let function = self.eval(&call.function, scope)?;
                let arguments = self.eval_expressions(&call.arguments, scope)?;
                self.call(function, arguments)?
            }
            Expression::Index(index) => {
                let container = self.eval(&index.left, scope)?;
                let key = self.eval(&index.index, scope)?;
                operators::index(&container, &key)?
            }
            Expression::Attribute(attribute) => {
                let receiver = self.eval(&attribute.object, scope)?;
                self.get_attribute(&receiver, &attribute.name)?
            }
        };
        Ok(value)
    }

    pub(super) fn eval_expressions(
        &mut self,
        expressions: &[Expression],
        scope: ScopeId,
    ) -> EvalResult<Vec<Object>> {
        let mut values = Vec::with_capacity(expressions.len());
        for expression in expressions.iter() {
            values.push(self.eval(expression, scope)?);
        }
        Ok(values)
    }

    /// Resolves a name through the scope chain, then the builtins.
    pub(super) fn lookup(&self, name: &str, scope: ScopeId) -> EvalResult<Object> {
        match self.env.get(scope, name).or_else(|| builtins::lookup(name)) {
            Some(value) => Ok(value),
            None => Err(EvalError::IdentifierNotFound {
                name: name.to_owned(),
            }
            .into()),
        }
    }

    pub(super) fn call(&mut self, callee: Object, arguments: Vec<Object>) -> EvalResult<Object> {
        match callee {
            Object::Function(function) => self.call_function(&function, None, arguments),
            Object::BoundMethod(method) => {
                self.call_function(&method.function, Some(method.receiver.clone()), arguments)
            }
            Object::Builtin(builtin) => Ok((builtin.func)(self.output.as_mut(), arguments)?),
            Object::NativeMethod(method) => Ok((method.func)(&method.receiver, arguments)?),
            Object::Class(class) => self.instantiate(class, arguments),
            other => Err(EvalError::NotCallable {
                type_name: other.type_name(),
            }
            .into()),
        }
    }

    fn call_function(
        &mut self,
        function: &Rc<FunctionObject>,
        receiver: Option<Object>,
        arguments: Vec<Object>,
    ) -> EvalResult<Object> {
        if self.depth >= self.config.max_call_depth {
            return Err(EvalError::RecursionLimit.into());
        }

        let parameters = &function.definition.parameters;
        let mut arguments: Vec<Object> = receiver.into_iter().chain(arguments).collect();
        let required = function.required_parameters();
        if arguments.len() < required || arguments.len() > parameters.len() {
            return Err(EvalError::arity_range(
                function.name(),
                required,
                parameters.len(),
                arguments.len(),
            )
            .into());
        }
        let supplied = arguments.len() - required;
        arguments.extend(function.defaults[supplied..].iter().cloned());

        let scope = self.env.enclosed(function.env);
        for (parameter, argument) in parameters.iter().zip(arguments) {
            self.env.set(scope, &parameter.name, argument);
        }

        self.depth += 1;
        trace!(function = function.name(), depth = self.depth, "call");
        let result = self.exec_block(&function.definition.body.statements, scope);
        self.depth -= 1;
        self.env.release(scope);

        match result? {
            Flow::Return(value) => Ok(value),
            _ => Ok(Object::None),
        }
    }

    fn instantiate(&mut self, class: Rc<ClassObject>, arguments: Vec<Object>) -> EvalResult<Object> {
        let instance = Object::Instance(Rc::new(Instance::new(class.clone())));
        match class.method("__init__") {
            Some(initializer) => {
                self.call_function(&initializer, Some(instance.clone()), arguments)?;
            }
            None if !arguments.is_empty() => {
                return Err(EvalError::arity(&class.name, 0, arguments.len()).into());
            }
            None => {}
        }
        Ok(instance)
    }

    pub(super) fn get_attribute(&self, receiver: &Object, name: &str) -> EvalResult<Object> {
        let found = match receiver {
            Object::Instance(instance) => {
                let own = instance.attributes.borrow().get(name).cloned();
                own.or_else(|| {
                    instance.class.method(name).map(|function| {
                        Object::BoundMethod(Rc::new(BoundMethod {
                            receiver: receiver.clone(),
                            function,
                        }))
                    })
                })
                .or_else(|| instance.class.attributes.borrow().get(name).cloned())
            }
            Object::Class(class) => class
                .method(name)
                .map(Object::Function)
                .or_else(|| class.attributes.borrow().get(name).cloned()),
            Object::Module(module) => {
                return self.env.get_local(module.scope, name).ok_or_else(|| {
                    EvalError::ModuleAttributeNotFound {
                        module: module.name.clone(),
                        name: name.to_owned(),
                    }
                    .into()
                })
            }
            Object::Exception(exception) => match name {
                "tag" => Some(exception.tag.clone().into()),
                "message" => Some(exception.message.clone()),
                _ => None,
            },
            _ => builtins::method(receiver, name),
        };
        found.ok_or_else(|| {
            EvalError::AttributeNotFound {
                type_name: receiver.type_name(),
                name: name.to_owned(),
            }
            .into()
        })
    }

    pub(super) fn set_attribute(&self, receiver: &Object, name: &str, value: Object) -> EvalResult<()> {
        let attributes = match receiver {
            Object::Instance(instance) => &instance.attributes,
            Object::Class(class) => &class.attributes,
            other => {
                return Err(EvalError::AttributeNotFound {
                    type_name: other.type_name(),
                    name: name.to_owned(),
                }
                .into())
            }
        };
        attributes.borrow_mut().insert(name.to_owned(), value);
        Ok(())
    }
}
