use crate::ast::Operator;
use crate::evaluator::operators;
use crate::object::*;
use crate::output::Output;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

pub type BuiltinFunction = fn(&mut dyn Output, Vec<Object>) -> Result<Object>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFunction,
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

pub type MethodFunction = fn(&Object, Vec<Object>) -> Result<Object>;

/// A list or dict method bound to its receiver.
pub struct NativeMethod {
    pub name: &'static str,
    pub receiver: Object,
    pub func: MethodFunction,
}

impl Debug for NativeMethod {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "NativeMethod({}.{})", self.receiver.type_name(), self.name)
    }
}

fn check_arity(name: &str, args: &[Object], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(EvalError::arity_range(name, min, max, args.len()));
    }
    Ok(())
}

fn single(name: &str, args: Vec<Object>) -> Result<Object> {
    check_arity(name, &args, 1, 1)?;
    Ok(args.into_iter().next().unwrap_or_default())
}

fn print(output: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    let parts: Vec<String> = args.iter().map(Object::to_string).collect();
    output.write_line(&parts.join(" "));
    Ok(Object::None)
}

fn len(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    let obj = single("len", args)?;
    Ok(Object::Integer(obj.len()? as i64))
}

fn range(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    let mut bounds = Vec::with_capacity(args.len());
    for arg in args.iter() {
        match arg {
            Object::Integer(n) => bounds.push(*n),
            obj => {
                return Err(EvalError::UnsupportedArgType {
                    fn_name: "range",
                    type_name: obj.type_name(),
                })
            }
        }
    }
    let range = match bounds[..] {
        [stop] => RangeValue::new(0, stop, 1),
        [start, stop] => RangeValue::new(start, stop, 1),
        [_, _, 0] => return Err(EvalError::RangeStepZero),
        [start, stop, step] => RangeValue::new(start, stop, step),
        _ => return Err(EvalError::arity_range("range", 1, 3, bounds.len())),
    };
    Ok(range.into())
}

fn to_str(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    check_arity("str", &args, 0, 1)?;
    Ok(args
        .first()
        .map(Object::to_string)
        .unwrap_or_default()
        .into())
}

fn repr(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    Ok(single("repr", args)?.repr().into())
}

fn int(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    check_arity("int", &args, 0, 1)?;
    match args.into_iter().next() {
        None => Ok(Object::Integer(0)),
        Some(Object::Integer(n)) => Ok(Object::Integer(n)),
        Some(Object::Boolean(b)) => Ok(Object::Integer(b as i64)),
        Some(Object::Float(x)) => {
            let truncated = x.trunc();
            if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64
            {
                return Err(EvalError::Overflow);
            }
            Ok(Object::Integer(truncated as i64))
        }
        Some(Object::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Object::Integer)
            .map_err(|_| EvalError::InvalidIntLiteral { literal: s }),
        Some(obj) => Err(EvalError::UnsupportedArgType {
            fn_name: "int",
            type_name: obj.type_name(),
        }),
    }
}

fn float(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    check_arity("float", &args, 0, 1)?;
    match args.into_iter().next() {
        None => Ok(Object::Float(0.0)),
        Some(Object::Integer(n)) => Ok(Object::Float(n as f64)),
        Some(Object::Float(x)) => Ok(Object::Float(x)),
        Some(Object::Boolean(b)) => Ok(Object::Float(if b { 1.0 } else { 0.0 })),
        Some(Object::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Object::Float)
            .map_err(|_| EvalError::InvalidFloatLiteral { literal: s }),
        Some(obj) => Err(EvalError::UnsupportedArgType {
            fn_name: "float",
            type_name: obj.type_name(),
        }),
    }
}

fn to_bool(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    check_arity("bool", &args, 0, 1)?;
    Ok(args.first().map_or(false, Object::truth_value).into())
}

fn type_of(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    Ok(single("type", args)?.type_name().into())
}

/// Either one iterable argument or several scalars.
fn candidates(name: &'static str, args: Vec<Object>) -> Result<Vec<Object>> {
    if args.is_empty() {
        return Err(EvalError::IncorrectArity {
            name: name.to_owned(),
            expected: "at least 1".to_owned(),
            got: 0,
        });
    }
    let items: Vec<Object> = if args.len() == 1 {
        args[0].iter()?.collect()
    } else {
        args
    };
    if items.is_empty() {
        return Err(EvalError::EmptySequence { fn_name: name });
    }
    Ok(items)
}

fn extreme(name: &'static str, args: Vec<Object>, wanted: Operator) -> Result<Object> {
    let mut items = candidates(name, args)?.into_iter();
    let mut best = items.next().unwrap_or_default();
    for item in items {
        let ordering = item.compare(&best, wanted)?;
        let better = match wanted {
            Operator::GT => ordering.is_gt(),
            _ => ordering.is_lt(),
        };
        if better {
            best = item;
        }
    }
    Ok(best)
}

fn min(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    extreme("min", args, Operator::LT)
}

fn max(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    extreme("max", args, Operator::GT)
}

fn sum(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    check_arity("sum", &args, 1, 2)?;
    let mut args = args.into_iter();
    let iterable = args.next().unwrap_or_default();
    let mut total = args.next().unwrap_or(Object::Integer(0));
    for item in iterable.iter()? {
        total = operators::infix(Operator::Plus, total, item)?;
    }
    Ok(total)
}

fn abs(_: &mut dyn Output, args: Vec<Object>) -> Result<Object> {
    match single("abs", args)? {
        Object::Integer(n) => n.checked_abs().map(Object::Integer).ok_or(EvalError::Overflow),
        Object::Float(x) => Ok(Object::Float(x.abs())),
        obj => Err(EvalError::UnsupportedOperand {
            operator: Operator::Minus,
            operand: obj.type_name(),
        }),
    }
}

lazy_static! {
    pub static ref BUILTINS: HashMap<&'static str, Builtin> = {
        let table: [(&'static str, BuiltinFunction); 13] = [
            ("print", print),
            ("len", len),
            ("range", range),
            ("str", to_str),
            ("repr", repr),
            ("int", int),
            ("float", float),
            ("bool", to_bool),
            ("type", type_of),
            ("min", min),
            ("max", max),
            ("sum", sum),
            ("abs", abs),
        ];
        table
            .iter()
            .map(|&(name, func)| (name, Builtin { name, func }))
            .collect()
    };
}

pub fn lookup(name: &str) -> Option<Object> {
    BUILTINS.get(name).map(|builtin| Object::Builtin(*builtin))
}

fn list_append(receiver: &Object, args: Vec<Object>) -> Result<Object> {
    let value = single("append", args)?;
    if let Object::List(list) = receiver {
        list.borrow_mut().push(value);
    }
    Ok(Object::None)
}

fn list_pop(receiver: &Object, args: Vec<Object>) -> Result<Object> {
    check_arity("pop", &args, 0, 1)?;
    let list = match receiver {
        Object::List(list) => list,
        _ => return Ok(Object::None),
    };
    let mut list = list.borrow_mut();
    if list.is_empty() {
        return Err(EvalError::PopFromEmpty);
    }
    let index = match args.first() {
        None => list.len() - 1,
        Some(Object::Integer(i)) => {
            normalize_index(*i, list.len()).ok_or_else(|| EvalError::IndexOutOfRange {
                type_name: "pop".to_owned(),
            })?
        }
        Some(obj) => {
            return Err(EvalError::InvalidIndexType {
                type_name: "list".to_owned(),
                index_type: obj.type_name(),
            })
        }
    };
    Ok(list.remove(index))
}

fn dict_keys(receiver: &Object, args: Vec<Object>) -> Result<Object> {
    check_arity("keys", &args, 0, 0)?;
    match receiver {
        Object::Dict(dict) => {
            let keys: Vec<Object> = dict.borrow().keys().cloned().map(Object::from).collect();
            Ok(keys.into())
        }
        _ => Ok(Object::None),
    }
}

fn dict_values(receiver: &Object, args: Vec<Object>) -> Result<Object> {
    check_arity("values", &args, 0, 0)?;
    match receiver {
        Object::Dict(dict) => {
            let values: Vec<Object> = dict.borrow().values().cloned().collect();
            Ok(values.into())
        }
        _ => Ok(Object::None),
    }
}

fn dict_get(receiver: &Object, args: Vec<Object>) -> Result<Object> {
    check_arity("get", &args, 1, 2)?;
    let mut args = args.into_iter();
    let key = HashKey::try_from(args.next().unwrap_or_default())?;
    let default = args.next().unwrap_or_default();
    match receiver {
        Object::Dict(dict) => Ok(dict.borrow().get(&key).cloned().unwrap_or(default)),
        _ => Ok(default),
    }
}

/// Looks up a built-in method on a list or dict receiver.
pub fn method(receiver: &Object, name: &str) -> Option<Object> {
    let (name, func): (&'static str, MethodFunction) = match (receiver, name) {
        (Object::List(_), "append") => ("append", list_append),
        (Object::List(_), "pop") => ("pop", list_pop),
        (Object::Dict(_), "keys") => ("keys", dict_keys),
        (Object::Dict(_), "values") => ("values", dict_values),
        (Object::Dict(_), "get") => ("get", dict_get),
        _ => return None,
    };
    Some(Object::NativeMethod(Rc::new(NativeMethod {
        name,
        receiver: receiver.clone(),
        func,
    })))
}
