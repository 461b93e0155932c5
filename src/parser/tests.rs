use super::*;
use crate::lexer::tokenize;
use crate::token::Position;
use pretty_assertions::assert_eq;

fn parse_input(input: &str) -> Program {
    parse(tokenize(input).expect("Lex errors found")).expect("Parse errors found")
}

fn parse_failure(input: &str) -> ParseError {
    match parse(tokenize(input).expect("Lex errors found")) {
        Ok(program) => panic!("expected a parse error, got:\n{}", program),
        Err(err) => err,
    }
}

#[test]
fn test_operator_precedence() {
    let cases = vec![
        ("-a * b", "((-a) * b)"),
        ("not a", "(not a)"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a // b % c", "((a // b) % c)"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("a < b == c", "((a < b) == c)"),
        ("5 >= 4 != 3 <= 4", "(((5 >= 4) != 3) <= 4)"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("True", "True"),
        ("False == None", "(False == None)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("2 ** 3 ** 2", "(2 ** (3 ** 2))"),
        ("-2 ** 2", "(-(2 ** 2))"),
        ("2 ** -1", "(2 ** (-1))"),
        ("a or b and c", "(a or (b and c))"),
        ("not a and b", "((not a) and b)"),
        ("not a == b", "(not (a == b))"),
        ("x in xs or y not in ys", "((x in xs) or (y not in ys))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
        ("xs[-1]", "(xs[(-1)])"),
        ("obj.method(1).field", "obj.method(1).field"),
        ("-obj.value", "(-obj.value)"),
        ("{\"a\": 1, 2: [3]}", "{\"a\": 1, 2: [3]}"),
        ("[1, 2.5, 'x', None,]", "[1, 2.5, \"x\", None]"),
    ];

    for (input, expected) in cases.into_iter() {
        let program = parse_input(input);
        assert_eq!(program.statements.len(), 1, "input: {}", input);
        match &program.statements[0] {
            Statement::Expr(expr) => assert_eq!(expr.to_string(), expected, "input: {}", input),
            other => panic!("expected expression statement, got {:?}", other),
        }
    }
}

#[test]
fn test_assignment_statements() {
    let program = parse_input("x = 5\nself.name = name\nd['k'] = v\ncount += 1\nxs -= [1]");

    let rendered: Vec<String> = program
        .statements
        .iter()
        .map(|s| s.to_string().trim_end().to_owned())
        .collect();
    assert_eq!(
        rendered,
        vec![
            "x = 5",
            "self.name = name",
            "d[\"k\"] = v",
            "count += 1",
            "xs -= [1]",
        ]
    );

    match &program.statements[3] {
        Statement::Assign(AssignStatement {
            target: Target::Name(name),
            operator: Some(Operator::Plus),
            ..
        }) => assert_eq!(name, "count"),
        other => panic!("expected augmented assignment, got {:?}", other),
    }
}

#[test]
fn test_round_trip_rendering() {
    let input = "def fibonacci(n):
    if n <= 1:
        return n
    elif n == 2:
        return 1
    else:
        return fibonacci(n - 1) + fibonacci(n - 2)
for i in range(3):
    if i == 1:
        continue
    print(i)
while True:
    break
class Account:
    kind = 'basic'
    def __init__(self, owner, balance=0):
        self.owner = owner
try:
    raise(\"ValueError\", \"bad\")
except ValueError as e:
    print(e)
except:
    raise
import math_utils as mu
from math_utils import square, add as plus
";

    let expected = "def fibonacci(n):
    if (n <= 1):
        return n
    elif (n == 2):
        return 1
    else:
        return (fibonacci((n - 1)) + fibonacci((n - 2)))
for i in range(3):
    if (i == 1):
        continue
    print(i)
while True:
    break
class Account:
    kind = \"basic\"
    def __init__(self, owner, balance=0):
        self.owner = owner
try:
    raise(\"ValueError\", \"bad\")
except ValueError as e:
    print(e)
except:
    raise
import math_utils as mu
from math_utils import square, add as plus
";

    assert_eq!(parse_input(input).to_string(), expected);
}

#[test]
fn test_inline_blocks_and_semicolons() {
    let program = parse_input("if x: y = 1; z = 2\nw = 3;\n");
    assert_eq!(program.statements.len(), 2);
    match &program.statements[0] {
        Statement::If(stmt) => assert_eq!(stmt.branches[0].body.statements.len(), 2),
        other => panic!("expected if statement, got {:?}", other),
    }
}

#[test]
fn test_raise_forms() {
    let cases = vec![
        ("raise(\"boom\")", "raise(\"boom\")"),
        ("raise(\"TypeError\", \"Type mismatch\")", "raise(\"TypeError\", \"Type mismatch\")"),
        ("raise ValueError(\"bad\")", "raise ValueError(\"bad\")"),
        ("raise KeyError", "raise KeyError"),
    ];

    for (input, expected) in cases.into_iter() {
        assert_eq!(parse_input(input).to_string().trim_end(), expected);
    }
}

#[test]
fn test_multiline_literals() {
    let program = parse_input(
        "students = [
    {\"name\": \"Alice\", \"grades\": [95, 87]},
    {\"name\": \"Bob\", \"grades\": [88, 91]}
]
print(students)
",
    );
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn test_nesting_limit() {
    let nested = |depth: usize| format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));

    let program = parse_input(&nested(300));
    assert_eq!(program.statements.len(), 1);

    let chain = format!("x = 1{}\n", " + 1".repeat(600));
    assert_eq!(parse_input(&chain).statements.len(), 1);

    for input in [nested(5000), nested(20000), format!("x = {}1\n", "-".repeat(5000))] {
        match parse_failure(&input) {
            ParseError::TooDeeplyNested { position } => assert_eq!(position.line, 1),
            other => panic!("expected a nesting error, got {}", other),
        }
    }
}

#[test]
fn test_parse_errors() {
    let cases = vec![
        (
            "x = ",
            ParseError::UnexpectedToken {
                expected: "an expression".to_owned(),
                found: Token::Newline,
                position: Position::new(1, 5),
            },
        ),
        (
            "if x\n    y\n",
            ParseError::UnexpectedToken {
                expected: "':'".to_owned(),
                found: Token::Newline,
                position: Position::new(1, 5),
            },
        ),
        (
            "def f(:\n    pass\n",
            ParseError::UnexpectedToken {
                expected: "parameter name".to_owned(),
                found: Token::Colon,
                position: Position::new(1, 7),
            },
        ),
        ("1 = x", ParseError::InvalidTarget { position: Position::new(1, 1) }),
        (
            "break",
            ParseError::OutsideLoop {
                keyword: "break",
                position: Position::new(1, 1),
            },
        ),
        (
            "while x:\n    def f():\n        continue\n",
            ParseError::OutsideLoop {
                keyword: "continue",
                position: Position::new(3, 9),
            },
        ),
        ("return 1", ParseError::OutsideFunction { position: Position::new(1, 1) }),
        (
            "class A:\n    print(1)\n",
            ParseError::InvalidClassBody { position: Position::new(1, 1) },
        ),
        (
            "def f(a, a):\n    pass\n",
            ParseError::DuplicateParameter {
                name: "a".to_owned(),
                position: Position::new(1, 10),
            },
        ),
        (
            "def f(a=1, b):\n    pass\n",
            ParseError::NonDefaultAfterDefault {
                name: "b".to_owned(),
                position: Position::new(1, 12),
            },
        ),
        (
            "try:\n    pass\nx = 1\n",
            ParseError::UnexpectedToken {
                expected: "'except'".to_owned(),
                found: Token::Ident("x".to_owned()),
                position: Position::new(3, 1),
            },
        ),
        (
            "  x = 1\n",
            ParseError::UnexpectedToken {
                expected: "an expression".to_owned(),
                found: Token::Indent,
                position: Position::new(1, 3),
            },
        ),
    ];

    for (input, error) in cases.into_iter() {
        assert_eq!(parse_failure(input), error, "input: {:?}", input);
    }
}
