use crate::ast::Operator;
use crate::object::{normalize_index, EvalError, HashKey, Object, Result};

pub fn prefix(operator: Operator, right: Object) -> Result<Object> {
    match (operator, right) {
        (Operator::Not, right) => Ok(Object::Boolean(!right.truth_value())),
        (Operator::Minus, Object::Integer(n)) => {
            n.checked_neg().map(Object::Integer).ok_or(EvalError::Overflow)
        }
        (Operator::Minus, Object::Float(x)) => Ok(Object::Float(-x)),
        (Operator::Plus, right @ (Object::Integer(_) | Object::Float(_))) => Ok(right),
        (operator, right) => Err(EvalError::UnsupportedOperand {
            operator,
            operand: right.type_name(),
        }),
    }
}

pub fn infix(operator: Operator, left: Object, right: Object) -> Result<Object> {
    match operator {
        Operator::Eq => Ok(left.equals(&right)?.into()),
        Operator::NotEq => Ok((!left.equals(&right)?).into()),
        Operator::LT => Ok(left.compare(&right, operator)?.is_lt().into()),
        Operator::LtEq => Ok(left.compare(&right, operator)?.is_le().into()),
        Operator::GT => Ok(left.compare(&right, operator)?.is_gt().into()),
        Operator::GtEq => Ok(left.compare(&right, operator)?.is_ge().into()),
        Operator::In => Ok(right.contains(&left)?.into()),
        Operator::NotIn => Ok((!right.contains(&left)?).into()),
        Operator::And => Ok(if left.truth_value() { right } else { left }),
        Operator::Or => Ok(if left.truth_value() { left } else { right }),
        Operator::Not => Err(EvalError::UnsupportedOperand {
            operator,
            operand: right.type_name(),
        }),
        _ => arithmetic(operator, left, right),
    }
}

fn arithmetic(operator: Operator, left: Object, right: Object) -> Result<Object> {
    match (&left, &right) {
        (Object::Integer(a), Object::Integer(b)) => integer_infix(operator, *a, *b),
        (Object::Float(_), Object::Integer(_) | Object::Float(_))
        | (Object::Integer(_), Object::Float(_)) => {
            let (a, b) = (left.as_float(), right.as_float());
            match (a, b) {
                (Some(a), Some(b)) => float_infix(operator, a, b),
                _ => Err(mismatch(operator, &left, &right)),
            }
        }
        (Object::String(a), Object::String(b)) if operator == Operator::Plus => {
            Ok(Object::String(format!("{}{}", a, b)))
        }
        (Object::List(a), Object::List(b)) if operator == Operator::Plus => {
            let mut elements = a.borrow().clone();
            elements.extend(b.borrow().iter().cloned());
            Ok(elements.into())
        }
        (Object::String(s), Object::Integer(n)) | (Object::Integer(n), Object::String(s))
            if operator == Operator::Asterisk =>
        {
            Ok(Object::String(s.repeat(repeat_count(*n, s.len())?)))
        }
        (Object::List(list), Object::Integer(n)) | (Object::Integer(n), Object::List(list))
            if operator == Operator::Asterisk =>
        {
            let elements = list.borrow();
            let count = repeat_count(*n, elements.len())?;
            let repeated: Vec<Object> = elements
                .iter()
                .cycle()
                .take(elements.len() * count)
                .cloned()
                .collect();
            Ok(repeated.into())
        }
        _ => Err(mismatch(operator, &left, &right)),
    }
}

fn repeat_count(n: i64, unit: usize) -> Result<usize> {
    let count = n.max(0) as usize;
    match count.checked_mul(unit) {
        Some(total) if total <= isize::MAX as usize => Ok(count),
        _ => Err(EvalError::Overflow),
    }
}

fn mismatch(operator: Operator, left: &Object, right: &Object) -> EvalError {
    EvalError::UnsupportedOperands {
        operator,
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn integer_infix(operator: Operator, left: i64, right: i64) -> Result<Object> {
    let value = match operator {
        Operator::Plus => left.checked_add(right),
        Operator::Minus => left.checked_sub(right),
        Operator::Asterisk => left.checked_mul(right),
        Operator::Slash => {
            if right == 0 {
                return Err(EvalError::ZeroDivision {
                    detail: "division by zero",
                });
            }
            return Ok(Object::Float(left as f64 / right as f64));
        }
        Operator::FloorDiv | Operator::Modulo => {
            if right == 0 {
                return Err(EvalError::ZeroDivision {
                    detail: "integer division or modulo by zero",
                });
            }
            if operator == Operator::FloorDiv {
                floor_div(left, right)
            } else {
                floor_mod(left, right)
            }
        }
        Operator::Power => {
            if right < 0 {
                if left == 0 {
                    return Err(EvalError::ZeroDivision {
                        detail: "0.0 cannot be raised to a negative power",
                    });
                }
                return Ok(Object::Float((left as f64).powf(right as f64)));
            }
            u32::try_from(right)
                .ok()
                .and_then(|exponent| left.checked_pow(exponent))
        }
        _ => {
            return Err(EvalError::UnsupportedOperands {
                operator,
                left: "int".to_owned(),
                right: "int".to_owned(),
            })
        }
    };
    value.map(Object::Integer).ok_or(EvalError::Overflow)
}

fn floor_div(left: i64, right: i64) -> Option<i64> {
    let quotient = left.checked_div(right)?;
    if left % right != 0 && ((left < 0) != (right < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

fn floor_mod(left: i64, right: i64) -> Option<i64> {
    let remainder = left.checked_rem(right)?;
    if remainder != 0 && ((remainder < 0) != (right < 0)) {
        Some(remainder + right)
    } else {
        Some(remainder)
    }
}

fn float_infix(operator: Operator, left: f64, right: f64) -> Result<Object> {
    let value = match operator {
        Operator::Plus => left + right,
        Operator::Minus => left - right,
        Operator::Asterisk => left * right,
        Operator::Slash if right == 0.0 => {
            return Err(EvalError::ZeroDivision {
                detail: "float division by zero",
            })
        }
        Operator::Slash => left / right,
        Operator::FloorDiv | Operator::Modulo if right == 0.0 => {
            return Err(EvalError::ZeroDivision {
                detail: "float modulo",
            })
        }
        Operator::FloorDiv => (left / right).floor(),
        Operator::Modulo => {
            let remainder = left % right;
            if remainder != 0.0 && ((remainder < 0.0) != (right < 0.0)) {
                remainder + right
            } else {
                remainder
            }
        }
        Operator::Power if left == 0.0 && right < 0.0 => {
            return Err(EvalError::ZeroDivision {
                detail: "0.0 cannot be raised to a negative power",
            })
        }
        Operator::Power => left.powf(right),
        _ => {
            return Err(EvalError::UnsupportedOperands {
                operator,
                left: "float".to_owned(),
                right: "float".to_owned(),
            })
        }
    };
    Ok(Object::Float(value))
}

fn sequence_name(container: &Object) -> &'static str {
    match container {
        Object::String(_) => "string",
        Object::Range(_) => "range object",
        _ => "list",
    }
}

fn invalid_index(container: &Object, key: &Object) -> EvalError {
    EvalError::InvalidIndexType {
        type_name: sequence_name(container).to_owned(),
        index_type: key.type_name(),
    }
}

fn out_of_range(container: &Object) -> EvalError {
    EvalError::IndexOutOfRange {
        type_name: sequence_name(container).to_owned(),
    }
}

/// `container[key]`
pub fn index(container: &Object, key: &Object) -> Result<Object> {
    match (container, key) {
        (Object::List(list), Object::Integer(i)) => {
            let list = list.borrow();
            normalize_index(*i, list.len())
                .map(|i| list[i].clone())
                .ok_or_else(|| out_of_range(container))
        }
        (Object::String(s), Object::Integer(i)) => {
            let chars: Vec<char> = s.chars().collect();
            normalize_index(*i, chars.len())
                .map(|i| Object::String(chars[i].to_string()))
                .ok_or_else(|| out_of_range(container))
        }
        (Object::Range(range), Object::Integer(i)) => normalize_index(*i, range.len())
            .and_then(|i| range.get(i))
            .map(Object::Integer)
            .ok_or_else(|| out_of_range(container)),
        (Object::List(_) | Object::String(_) | Object::Range(_), key) => {
            Err(invalid_index(container, key))
        }
        (Object::Dict(dict), key) => dict
            .borrow()
            .get(&HashKey::try_from(key)?)
            .cloned()
            .ok_or_else(|| EvalError::KeyNotFound { key: key.repr() }),
        (obj, _) => Err(EvalError::NotIndexable {
            type_name: obj.type_name(),
        }),
    }
}

/// `container[key] = value`
pub fn set_index(container: &Object, key: Object, value: Object) -> Result<()> {
    match (container, &key) {
        (Object::List(list), Object::Integer(i)) => {
            let mut list = list.borrow_mut();
            let slot = normalize_index(*i, list.len()).ok_or_else(|| EvalError::IndexOutOfRange {
                type_name: "list assignment".to_owned(),
            })?;
            list[slot] = value;
            Ok(())
        }
        (Object::List(_), key) => Err(invalid_index(container, key)),
        (Object::Dict(dict), key) => {
            let key = HashKey::try_from(key)?;
            dict.borrow_mut().insert(key, value);
            Ok(())
        }
        (obj, _) => Err(EvalError::NotAssignable {
            type_name: obj.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn test_integer_arithmetic() {
        let cases = vec![
            (Operator::Plus, 7, 2, Object::Integer(9)),
            (Operator::Minus, 7, 9, Object::Integer(-2)),
            (Operator::Asterisk, 7, 2, Object::Integer(14)),
            (Operator::Slash, 7, 2, Object::Float(3.5)),
            (Operator::Slash, 6, 2, Object::Float(3.0)),
            (Operator::FloorDiv, 7, 2, Object::Integer(3)),
            (Operator::FloorDiv, -7, 2, Object::Integer(-4)),
            (Operator::Modulo, 7, 3, Object::Integer(1)),
            (Operator::Modulo, -7, 3, Object::Integer(2)),
            (Operator::Modulo, 7, -3, Object::Integer(-2)),
            (Operator::Power, 2, 10, Object::Integer(1024)),
            (Operator::Power, 2, -1, Object::Float(0.5)),
        ];

        for (operator, left, right, expected) in cases.into_iter() {
            assert_eq!(
                infix(operator, left.into(), right.into()),
                Ok(expected),
                "{} {} {}",
                left,
                operator,
                right
            );
        }
    }

    #[test]
    fn test_arithmetic_errors() {
        let cases = vec![
            (Operator::Slash, Object::Integer(1), Object::Integer(0), "ZeroDivisionError"),
            (Operator::Modulo, Object::Integer(1), Object::Integer(0), "ZeroDivisionError"),
            (Operator::Slash, Object::Float(1.0), Object::Float(0.0), "ZeroDivisionError"),
            (Operator::Plus, Object::Integer(i64::MAX), Object::Integer(1), "OverflowError"),
            (Operator::Power, Object::Integer(10), Object::Integer(40), "OverflowError"),
            (Operator::Plus, Object::Integer(1), Object::from("a"), "TypeError"),
            (Operator::Minus, Object::from("a"), Object::from("b"), "TypeError"),
            (Operator::LT, Object::Integer(1), Object::from("b"), "TypeError"),
            (Operator::In, Object::Integer(1), Object::Integer(2), "TypeError"),
        ];

        for (operator, left, right, tag) in cases.into_iter() {
            let result = infix(operator, left, right);
            assert_eq!(result.map_err(|e| e.tag()), Err(tag), "{}", operator);
        }
    }

    #[test]
    fn test_mixed_and_sequence_operations() {
        let xs: Object = vec![Object::Integer(1), Object::Integer(2)].into();
        let cases = vec![
            (Operator::Plus, Object::Integer(1), Object::Float(0.5), "1.5"),
            (Operator::Asterisk, Object::Float(2.0), Object::Integer(3), "6.0"),
            (Operator::Plus, Object::from("ab"), Object::from("cd"), "abcd"),
            (Operator::Asterisk, Object::from("ab"), Object::Integer(3), "ababab"),
            (Operator::Asterisk, Object::Integer(-1), Object::from("ab"), ""),
            (Operator::Plus, xs.clone(), vec![Object::Integer(3)].into(), "[1, 2, 3]"),
            (Operator::Asterisk, xs.clone(), Object::Integer(2), "[1, 2, 1, 2]"),
            (Operator::Eq, Object::Integer(1), Object::Float(1.0), "True"),
            (Operator::LtEq, Object::from("abc"), Object::from("abd"), "True"),
            (Operator::In, Object::Integer(2), xs.clone(), "True"),
            (Operator::NotIn, Object::from("z"), Object::from("xyz"), "False"),
            (Operator::And, Object::Integer(0), Object::Integer(5), "0"),
            (Operator::Or, Object::None, Object::from("fallback"), "fallback"),
        ];

        for (operator, left, right, expected) in cases.into_iter() {
            let result = infix(operator, left, right).map(|obj| obj.to_string());
            assert_eq!(result, Ok(expected.to_owned()), "{}", operator);
        }
    }

    #[test]
    fn test_concatenation_builds_new_list() {
        let a: Object = vec![Object::Integer(1)].into();
        let b: Object = vec![Object::Integer(2)].into();
        let joined = infix(Operator::Plus, a.clone(), b.clone()).expect("concat failed");
        match (&joined, &a, &b) {
            (Object::List(joined), Object::List(a), Object::List(b)) => {
                assert!(!Rc::ptr_eq(joined, a));
                assert!(!Rc::ptr_eq(joined, b));
            }
            other => panic!("expected lists, got {:?}", other),
        }
        assert_eq!(joined.to_string(), "[1, 2]");
        assert_eq!(a.to_string(), "[1]");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(prefix(Operator::Minus, Object::Integer(5)), Ok(Object::Integer(-5)));
        assert_eq!(prefix(Operator::Not, Object::from("")), Ok(Object::Boolean(true)));
        assert_eq!(prefix(Operator::Plus, Object::Float(1.5)), Ok(Object::Float(1.5)));
        assert_eq!(
            prefix(Operator::Minus, Object::from("x")).map_err(|e| e.tag()),
            Err("TypeError")
        );
    }

    #[test]
    fn test_indexing() {
        let xs: Object = vec![Object::Integer(10), Object::Integer(20), Object::Integer(30)].into();
        let cases = vec![
            (xs.clone(), Object::Integer(0), Ok(Object::Integer(10))),
            (xs.clone(), Object::Integer(-1), Ok(Object::Integer(30))),
            (xs.clone(), Object::Integer(-3), Ok(Object::Integer(10))),
            (
                xs.clone(),
                Object::Integer(3),
                Err(EvalError::IndexOutOfRange {
                    type_name: "list".to_owned(),
                }),
            ),
            (
                xs.clone(),
                Object::Integer(-4),
                Err(EvalError::IndexOutOfRange {
                    type_name: "list".to_owned(),
                }),
            ),
            (Object::from("hello"), Object::Integer(-1), Ok(Object::from("o"))),
            (
                crate::object::RangeValue::new(0, 10, 2).into(),
                Object::Integer(2),
                Ok(Object::Integer(4)),
            ),
            (
                xs.clone(),
                Object::from("0"),
                Err(EvalError::InvalidIndexType {
                    type_name: "list".to_owned(),
                    index_type: "str".to_owned(),
                }),
            ),
            (
                Object::Integer(5),
                Object::Integer(0),
                Err(EvalError::NotIndexable {
                    type_name: "int".to_owned(),
                }),
            ),
        ];

        for (container, key, expected) in cases.into_iter() {
            assert_eq!(index(&container, &key), expected, "{}[{}]", container, key);
        }
    }

    #[test]
    fn test_dict_subscripts() {
        let dict: Object = crate::object::DictValue::new().into();
        set_index(&dict, "a".into(), Object::Integer(1)).expect("insert failed");
        set_index(&dict, "b".into(), Object::Integer(2)).expect("insert failed");
        set_index(&dict, "a".into(), Object::Integer(3)).expect("overwrite failed");

        assert_eq!(dict.to_string(), "{'a': 3, 'b': 2}");
        assert_eq!(index(&dict, &"b".into()), Ok(Object::Integer(2)));
        assert_eq!(
            index(&dict, &"missing".into()),
            Err(EvalError::KeyNotFound {
                key: "'missing'".to_owned()
            })
        );
        assert_eq!(
            set_index(&dict, Object::Float(1.5), Object::None),
            Err(EvalError::NotHashable {
                type_name: "float".to_owned()
            })
        );
    }

    #[test]
    fn test_list_assignment() {
        let xs: Object = vec![Object::Integer(1), Object::Integer(2)].into();
        let alias = xs.clone();
        set_index(&xs, Object::Integer(-1), Object::from("last")).expect("assignment failed");
        assert_eq!(alias.to_string(), "[1, 'last']");
        assert_eq!(
            set_index(&xs, Object::Integer(2), Object::None).map_err(|e| e.tag()),
            Err("IndexError")
        );
        assert_eq!(
            set_index(&Object::from("abc"), Object::Integer(0), Object::None).map_err(|e| e.tag()),
            Err("TypeError")
        );
    }
}
