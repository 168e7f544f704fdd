//! Concrete-syntax and JSON rendering of Tact ASTs.

mod printer;

use crate::ast::{Expression, Module, ModuleItem, Statement, TypeAnnotation};
use printer::Printer;

/// Render a whole module as Tact source text.
pub fn format_module(module: &Module) -> String {
    let mut p = Printer::new();
    p.module(module);
    p.finish()
}

/// Render a single top-level item.
pub fn format_item(item: &ModuleItem) -> String {
    let mut p = Printer::new();
    p.item(item);
    p.finish()
}

/// Render one statement, including its trailing newline.
pub fn format_statement(stmt: &Statement) -> String {
    let mut p = Printer::new();
    p.statement(stmt);
    p.finish()
}

/// Render an expression on a single line.
pub fn format_expression(expr: &Expression) -> String {
    printer::expression(expr)
}

pub fn format_type(ty: &TypeAnnotation) -> String {
    printer::type_annotation(ty)
}

/// The JSON form of a module, as dumped with `SAMPLES_FORMAT=json`.
pub fn to_json(module: &Module) -> serde_json::Result<String> {
    serde_json::to_string_pretty(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn int(value: u64) -> Expression {
        Expression::new(ExpressionKind::Number {
            base: NumberBase::Dec,
            value,
        })
    }

    fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
        Expression::new(ExpressionKind::OpBinary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    #[test]
    fn number_bases() {
        let lit = |base| {
            format_expression(&Expression::new(ExpressionKind::Number { base, value: 10 }))
        };
        assert_eq!(lit(NumberBase::Bin), "0b1010");
        assert_eq!(lit(NumberBase::Oct), "0o12");
        assert_eq!(lit(NumberBase::Dec), "10");
        assert_eq!(lit(NumberBase::Hex), "0xA");
    }

    #[test]
    fn nested_operators_are_parenthesized() {
        let expr = binary(
            BinaryOp::Mul,
            binary(BinaryOp::Add, int(1), int(2)),
            Expression::new(ExpressionKind::OpUnary {
                op: UnaryOp::Neg,
                operand: Box::new(int(3)),
            }),
        );
        assert_eq!(format_expression(&expr), "(1 + 2) * (-3)");
    }

    #[test]
    fn string_literals_are_escaped() {
        let expr = Expression::new(ExpressionKind::String("say \"hi\"".into()));
        assert_eq!(format_expression(&expr), r#""say \"hi\"""#);
    }

    #[test]
    fn global_constant() {
        let item = ModuleItem::Constant(ConstantDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("A"),
            type_ann: TypeAnnotation::named("Int"),
            initializer: binary(BinaryOp::Add, int(1), int(1)),
        });
        assert_eq!(format_item(&item), "const A: Int = 1 + 1;\n");
    }

    #[test]
    fn contract_with_receiver_and_loops() {
        let body = vec![
            Statement::Until(UntilStmt {
                id: tact_common::next_id(),
                condition: Expression::new(ExpressionKind::Boolean(true)),
                statements: vec![],
            }),
            Statement::Try(TryStmt {
                id: tact_common::next_id(),
                statements: vec![],
                catch_block: Some(CatchBlock {
                    name: Id::new("e"),
                    statements: vec![],
                }),
            }),
        ];
        let contract = ModuleItem::Contract(ContractDecl {
            id: tact_common::next_id(),
            name: Id::new("C"),
            traits: vec![Id::new("T")],
            declarations: vec![
                Declaration::Field(FieldDecl {
                    id: tact_common::next_id(),
                    name: Id::new("m"),
                    type_ann: TypeAnnotation::new(TypeKind::Map {
                        key: Id::new("Int"),
                        value: Id::new("Bool"),
                    }),
                    initializer: None,
                }),
                Declaration::Receiver(Receiver {
                    id: tact_common::next_id(),
                    selector: ReceiverKind::Internal(ReceiverSubKind::Comment("ping".into())),
                    statements: body,
                }),
            ],
        });
        let expected = "\
contract C with T {
    m: map<Int, Bool>;
    receive(\"ping\") {
        do {
        } until (true);
        try {
        } catch (e) {
        }
    }
}
";
        assert_eq!(format_item(&contract), expected);
    }

    #[test]
    fn if_else_layout() {
        let stmt = Statement::Condition(ConditionStmt {
            id: tact_common::next_id(),
            condition: Expression::ident("flag"),
            true_statements: vec![Statement::Return(ReturnStmt {
                id: tact_common::next_id(),
                expression: Some(int(1)),
            })],
            false_statements: Some(vec![]),
        });
        assert_eq!(
            format_statement(&stmt),
            "if (flag) {\n    return 1;\n} else {\n}\n"
        );
    }

    #[test]
    fn json_form_names_node_kinds() {
        let module = Module::new(vec![ModuleItem::PrimitiveType(PrimitiveTypeDecl {
            id: tact_common::next_id(),
            name: Id::new("Int"),
        })]);
        let json = to_json(&module).unwrap();
        assert!(json.contains("PrimitiveType"));
        assert!(json.contains("\"Int\""));
    }
}
