use super::*;
use pretty_assertions::assert_eq;

fn list(elements: Vec<Object>) -> Object {
    elements.into()
}

fn dict(pairs: Vec<(&str, Object)>) -> Object {
    pairs
        .into_iter()
        .map(|(key, value)| (HashKey::from(key), value))
        .collect::<DictValue>()
        .into()
}

#[test]
fn test_display() {
    let cases = vec![
        (Object::Integer(-3), "-3"),
        (Object::Float(5.0), "5.0"),
        (Object::Float(3.14), "3.14"),
        (Object::Float(1e20), "1e+20"),
        (Object::Float(f64::NAN), "nan"),
        (Object::Boolean(true), "True"),
        (Object::None, "None"),
        (Object::from("plain"), "plain"),
        (list(vec![]), "[]"),
        (
            list(vec![Object::from("a"), Object::Integer(1), Object::None]),
            "['a', 1, None]",
        ),
        (
            dict(vec![("name", Object::from("Alice")), ("age", Object::Integer(30))]),
            "{'name': 'Alice', 'age': 30}",
        ),
        (dict(vec![]), "{}"),
        (list(vec![Object::from("it's")]), "[\"it's\"]"),
        (list(vec![Object::from("a\nb")]), "['a\\nb']"),
        (RangeValue::new(0, 5, 1).into(), "range(0, 5)"),
        (RangeValue::new(5, 0, -1).into(), "range(5, 0, -1)"),
        (Exception::new("ValueError", "bad").into(), "bad"),
        (
            list(vec![Exception::new("ValueError", "bad").into()]),
            "[ValueError('bad')]",
        ),
    ];

    for (input, expected) in cases.into_iter() {
        assert_eq!(input.to_string(), expected);
    }
}

#[test]
fn test_self_referential_list_prints() {
    let xs = list(vec![Object::Integer(1)]);
    if let Object::List(inner) = &xs {
        inner.borrow_mut().push(xs.clone());
    }
    assert!(xs.to_string().contains("[...]"));
}

fn self_referential_list() -> Object {
    let xs = list(vec![]);
    if let Object::List(inner) = &xs {
        inner.borrow_mut().push(xs.clone());
    }
    xs
}

#[test]
fn test_self_referential_lists_compare_with_an_error() {
    let a = self_referential_list();
    let b = self_referential_list();

    assert_eq!(a.equals(&a), Ok(true));
    assert_eq!(a.equals(&b), Err(EvalError::RecursionLimit));
    assert_eq!(
        a.compare(&b, crate::ast::Operator::LT),
        Err(EvalError::RecursionLimit)
    );
    assert_eq!(list(vec![a.clone()]).contains(&b), Err(EvalError::RecursionLimit));
    assert!(a != b);

    let nested = |inner: Object| -> Object {
        let mut dict = DictValue::new();
        dict.insert("k".into(), inner);
        dict.into()
    };
    assert_eq!(nested(a).equals(&nested(b)), Err(EvalError::RecursionLimit));
}

#[test]
fn test_truth_value() {
    let cases = vec![
        (Object::Integer(0), false),
        (Object::Float(0.0), false),
        (Object::from(""), false),
        (Object::None, false),
        (Object::Boolean(false), false),
        (list(vec![]), false),
        (dict(vec![]), false),
        (RangeValue::new(3, 3, 1).into(), false),
        (Object::Integer(-1), true),
        (Object::from("x"), true),
        (list(vec![Object::None]), true),
        (RangeValue::new(0, 1, 1).into(), true),
    ];

    for (input, expected) in cases.into_iter() {
        assert_eq!(input.truth_value(), expected, "{}", input.repr());
    }
}

#[test]
fn test_equality() {
    let shared = list(vec![Object::Integer(1)]);
    let cases = vec![
        (Object::Integer(1), Object::Float(1.0), true),
        (Object::Integer(1), Object::Boolean(true), false),
        (Object::from("a"), Object::from("a"), true),
        (shared.clone(), shared.clone(), true),
        (shared.clone(), list(vec![Object::Integer(1)]), true),
        (
            dict(vec![("a", Object::Integer(1)), ("b", Object::Integer(2))]),
            dict(vec![("b", Object::Integer(2)), ("a", Object::Integer(1))]),
            true,
        ),
        (dict(vec![("a", Object::Integer(1))]), dict(vec![]), false),
        (Object::None, Object::Integer(0), false),
        (
            RangeValue::new(0, 3, 1).into(),
            RangeValue::new(0, 3, 1).into(),
            true,
        ),
    ];

    for (left, right, expected) in cases.into_iter() {
        assert_eq!(left == right, expected, "{} == {}", left.repr(), right.repr());
    }
}

#[test]
fn test_type_names() {
    let class = Rc::new(ClassObject::new("Point"));
    let cases = vec![
        (Object::Integer(1), "int"),
        (Object::Float(1.0), "float"),
        (Object::from("s"), "str"),
        (Object::Boolean(true), "bool"),
        (Object::None, "NoneType"),
        (list(vec![]), "list"),
        (dict(vec![]), "dict"),
        (RangeValue::new(0, 1, 1).into(), "range"),
        (Object::Class(class.clone()), "type"),
        (Object::Instance(Rc::new(Instance::new(class))), "Point"),
        (Exception::new("E", "m").into(), "Exception"),
    ];

    for (input, expected) in cases.into_iter() {
        assert_eq!(input.type_name(), expected);
    }
}

#[test]
fn test_ranges_are_lazy_and_restartable() {
    let range = RangeValue::new(0, 1_000_000_000_000, 250_000_000_000);
    assert_eq!(range.len(), 4);
    assert!(range.contains(500_000_000_000));
    assert!(!range.contains(1));

    let range: Object = RangeValue::new(10, 0, -4).into();
    let first: Vec<Object> = range.iter().expect("iterable").collect();
    let second: Vec<Object> = range.iter().expect("iterable").collect();
    assert_eq!(first, vec![Object::Integer(10), Object::Integer(6), Object::Integer(2)]);
    assert_eq!(first, second);
    assert_eq!(RangeValue::new(0, 5, -1).len(), 0);
}

#[test]
fn test_hash_keys() {
    assert_eq!(HashKey::try_from(&Object::from("k")), Ok(HashKey::from("k")));
    assert_eq!(HashKey::try_from(&Object::None), Ok(HashKey::None));
    assert_eq!(
        HashKey::try_from(&list(vec![])),
        Err(EvalError::NotHashable {
            type_name: "list".to_owned()
        })
    );
    assert_eq!(
        HashKey::try_from(&Object::Float(1.0)),
        Err(EvalError::NotHashable {
            type_name: "float".to_owned()
        })
    );
}

#[test]
fn test_dict_preserves_insertion_order() {
    let mut dict = DictValue::new();
    dict.insert("z".into(), Object::Integer(1));
    dict.insert("a".into(), Object::Integer(2));
    dict.insert("m".into(), Object::Integer(3));
    dict.insert("z".into(), Object::Integer(4));

    let keys: Vec<String> = dict.keys().map(HashKey::to_string).collect();
    assert_eq!(keys, vec!["'z'", "'a'", "'m'"]);
    assert_eq!(dict.get(&"z".into()), Some(&Object::Integer(4)));
    assert_eq!(dict.len(), 3);
}

#[test]
fn test_eval_error_tags() {
    let cases = vec![
        (
            EvalError::IdentifierNotFound {
                name: "x".to_owned(),
            },
            "RuntimeError",
        ),
        (EvalError::ZeroDivision { detail: "division by zero" }, "ZeroDivisionError"),
        (
            EvalError::KeyNotFound {
                key: "'k'".to_owned(),
            },
            "KeyError",
        ),
        (
            EvalError::ModuleNotFound {
                name: "m".to_owned(),
            },
            "ImportError",
        ),
        (EvalError::RecursionLimit, "RecursionError"),
    ];

    for (error, tag) in cases.into_iter() {
        let message = error.to_string();
        let exception = Exception::from(error);
        assert_eq!(exception.tag, tag);
        assert_eq!(exception.message, Object::String(message));
    }
}

#[test]
fn test_exception_matching() {
    let exception = Exception::new("InnerError", "deep");
    assert!(exception.matches("InnerError"));
    assert!(exception.matches(CATCH_ALL));
    assert!(!exception.matches("ValueError"));
}
