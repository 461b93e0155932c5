mod expression;
mod statement;
pub use expression::*;
pub use statement::*;

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        for stmt in self.statements.iter() {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_display() {
        let program = Program {
            statements: vec![
                Statement::Assign(AssignStatement {
                    target: Target::Name("myVar".to_owned()),
                    operator: None,
                    value: Expression::Identifier("anotherVar".to_owned()),
                }),
                Statement::Function(Rc::new(FunctionDefinition {
                    name: "inc".to_owned(),
                    parameters: vec![
                        Parameter {
                            name: "x".to_owned(),
                            default: None,
                        },
                        Parameter {
                            name: "by".to_owned(),
                            default: Some(Expression::IntegerLiteral(1)),
                        },
                    ],
                    body: vec![Statement::Return(Some(Expression::Infix(InfixExpression {
                        left: Box::new(Expression::Identifier("x".to_owned())),
                        operator: Operator::Plus,
                        right: Box::new(Expression::Identifier("by".to_owned())),
                    })))]
                    .into(),
                })),
                Statement::Try(TryStatement {
                    body: vec![Statement::Raise(RaiseStatement::Call(vec![
                        Expression::String("ValueError".to_owned()),
                        Expression::String("bad".to_owned()),
                    ]))]
                    .into(),
                    handlers: vec![ExceptClause {
                        tag: Some("ValueError".to_owned()),
                        binding: Some("e".to_owned()),
                        body: BlockStatement::default(),
                    }],
                }),
            ],
        };

        assert_eq!(
            format!("{}", program),
            "myVar = anotherVar
def inc(x, by=1):
    return (x + by)
try:
    raise(\"ValueError\", \"bad\")
except ValueError as e:
    pass
"
        );
    }
}
