use super::*;
use crate::{
    model::{MappingError, NavigablePath},
    sqm::{
        ComparisonOperator,
        function::{KeywordFunctionRenderer, StandardFunctionRenderer},
    },
    test_support::{address_mapping, model},
    types::{JdbcType, ValueKind},
    value::Value,
};
use std::{collections::BTreeSet, sync::Arc};

fn column(qualifier: &str, name: &str, jdbc_type: JdbcType) -> SqlExpr {
    SqlExpr::Column(ColumnReference {
        qualifier: qualifier.to_string(),
        column: name.to_string(),
        jdbc_type,
    })
}

fn parameter(slot: u32) -> SqlExpr {
    SqlExpr::Parameter(JdbcParameter {
        slot: SlotId(slot),
        jdbc_type: Some(JdbcType::Integer),
    })
}

fn standard_group(entity: &str, table: &str, alias: &str) -> TableGroup {
    TableGroup::Standard(StandardTableGroup {
        path: NavigablePath::root(alias),
        entity: entity.to_string(),
        primary: TableReference {
            table: table.to_string(),
            identification_variable: alias.to_string(),
        },
    })
}

fn values_group(alias: &str, rows: Vec<Vec<SqlExpr>>) -> ValuesTableGroup {
    ValuesTableGroup::new(
        NavigablePath::root(alias),
        ValuesTableReference {
            rows,
            identification_variable: alias.to_string(),
            column_names: vec!["a".to_string(), "b".to_string()],
        },
        vec![None, None],
    )
}

// ---------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------

#[test]
fn placeholders_are_recorded_in_render_order() {
    let mut from = FromClause::default();
    from.add_root(standard_group("Person", "person", "p"));

    // Allocation order differs from textual order on purpose.
    let statement = SqlStatement::Select(SelectStatement {
        from,
        selections: vec![SqlSelection {
            position: 0,
            expr: column("p", "name", JdbcType::Varchar),
        }],
        domain_results: Vec::new(),
        restriction: Some(SqlPredicate::And(vec![
            SqlPredicate::Comparison {
                lhs: column("p", "age", JdbcType::Integer),
                operator: ComparisonOperator::GreaterThan,
                rhs: parameter(2),
            },
            SqlPredicate::InList {
                test: column("p", "age", JdbcType::Integer),
                list: vec![parameter(0), parameter(1)],
                negated: true,
            },
        ])),
    });

    let rendered = render_statement(&statement);

    assert_eq!(
        rendered.sql,
        "select p.name from person p where (p.age > ? and p.age not in (?, ?))"
    );
    assert_eq!(rendered.parameters, vec![SlotId(2), SlotId(0), SlotId(1)]);
}

#[test]
fn multi_column_update_renders_a_row_assignment() {
    let target = TableReference {
        table: "person".to_string(),
        identification_variable: "p".to_string(),
    };
    let statement = SqlStatement::Update(UpdateStatement {
        target,
        assignments: vec![SqlAssignment {
            columns: vec![
                ColumnReference {
                    qualifier: "p".to_string(),
                    column: "street".to_string(),
                    jdbc_type: JdbcType::Varchar,
                },
                ColumnReference {
                    qualifier: "p".to_string(),
                    column: "city".to_string(),
                    jdbc_type: JdbcType::Varchar,
                },
            ],
            value: SqlExpr::Tuple(vec![parameter(0), parameter(1)]),
        }],
        restriction: Some(SqlPredicate::IsNull {
            expr: column("p", "name", JdbcType::Varchar),
            negated: false,
        }),
    });

    let rendered = render_statement(&statement);

    assert_eq!(
        rendered.sql,
        "update person p set (street, city) = (?, ?) where p.name is null"
    );
    assert_eq!(rendered.parameters, vec![SlotId(0), SlotId(1)]);
}

#[test]
fn delete_renders_negated_predicates() {
    let statement = SqlStatement::Delete(DeleteStatement {
        target: TableReference {
            table: "orders".to_string(),
            identification_variable: "o".to_string(),
        },
        restriction: Some(SqlPredicate::Not(Box::new(SqlPredicate::Or(vec![
            SqlPredicate::IsNull {
                expr: column("o", "total", JdbcType::Numeric),
                negated: true,
            },
            SqlPredicate::Comparison {
                lhs: column("o", "id", JdbcType::BigInt),
                operator: ComparisonOperator::Equal,
                rhs: SqlExpr::Literal(SqlLiteral {
                    value: Value::Long(4),
                    jdbc_type: JdbcType::BigInt,
                }),
            },
        ])))),
    });

    assert_eq!(
        render_statement(&statement).sql,
        "delete from orders o where not ((o.total is not null or o.id = 4))"
    );
}

#[test]
fn values_roots_render_inline_rows() {
    let mut from = FromClause::default();
    from.add_root(TableGroup::Values(values_group(
        "v",
        vec![
            vec![parameter(0), parameter(1)],
            vec![parameter(2), parameter(3)],
        ],
    )));
    let statement = SqlStatement::Select(SelectStatement {
        from,
        selections: vec![SqlSelection {
            position: 0,
            expr: column("v", "a", JdbcType::Integer),
        }],
        domain_results: Vec::new(),
        restriction: None,
    });

    let rendered = render_statement(&statement);

    assert_eq!(rendered.sql, "select v.a from (values (?, ?), (?, ?)) v (a, b)");
    assert_eq!(rendered.parameters.len(), 4);
}

#[test]
fn function_renderers() {
    let mut writer = SqlWriter::default();
    writer.render_expr(&SqlExpr::Function(Box::new(SqlFunctionCall {
        name: "coalesce".to_string(),
        renderer: Arc::new(StandardFunctionRenderer),
        arguments: vec![column("p", "name", JdbcType::Varchar), parameter(5)],
        result_type: None,
        model_expressible: None,
    })));
    writer.push_str(", ");
    writer.render_expr(&SqlExpr::Function(Box::new(SqlFunctionCall {
        name: "current_date".to_string(),
        renderer: Arc::new(KeywordFunctionRenderer),
        arguments: Vec::new(),
        result_type: None,
        model_expressible: None,
    })));

    let rendered = writer.finish();

    assert_eq!(rendered.sql, "coalesce(p.name, ?), current_date");
    assert_eq!(rendered.parameters, vec![SlotId(5)]);
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[test]
fn single_element_lists_collapse() {
    let columns = vec![ColumnReference {
        qualifier: "p".to_string(),
        column: "id".to_string(),
        jdbc_type: JdbcType::BigInt,
    }];

    assert!(matches!(SqlExpr::from_columns(columns), SqlExpr::Column(_)));
    assert!(matches!(
        SqlExpr::from_parameters(vec![JdbcParameter {
            slot: SlotId(0),
            jdbc_type: None,
        }]),
        SqlExpr::Parameter(_)
    ));
}

#[test]
fn nested_tuples_flatten_into_leaves() {
    let nested = SqlExpr::Tuple(vec![
        parameter(0),
        SqlExpr::Tuple(vec![parameter(1), parameter(2)]),
    ]);

    assert_eq!(nested.column_count(), 3);

    let mut leaves = Vec::new();
    nested.flatten_into(&mut leaves);
    let slots: Vec<_> = leaves
        .iter()
        .map(|leaf| match leaf {
            SqlExpr::Parameter(parameter) => parameter.slot,
            other => panic!("expected a parameter, found {other:?}"),
        })
        .collect();
    assert_eq!(slots, vec![SlotId(0), SlotId(1), SlotId(2)]);
}

#[test]
fn untyped_parameters_have_no_value_kind() {
    let untyped = SqlExpr::Parameter(JdbcParameter {
        slot: SlotId(0),
        jdbc_type: None,
    });

    assert_eq!(untyped.value_kind(), None);
    assert_eq!(parameter(1).value_kind(), Some(ValueKind::Integer));
}

// ---------------------------------------------------------------------
// Table groups
// ---------------------------------------------------------------------

#[test]
fn values_group_searches_joins_after_itself() {
    let mut group = values_group("v", Vec::new());
    group.add_nested_join(standard_group("Person", "person", "p"));
    group.add_join(standard_group("Order", "orders", "o"));

    assert!(matches!(
        group.table_reference("v"),
        Some(TableReferenceRef::Values(_))
    ));
    assert!(matches!(
        group.table_reference("person"),
        Some(TableReferenceRef::Table(reference)) if reference.identification_variable == "p"
    ));
    assert!(matches!(
        group.table_reference("o"),
        Some(TableReferenceRef::Table(reference)) if reference.table == "orders"
    ));
    assert!(group.table_reference("missing").is_none());
    assert_eq!(group.nested_joins().len(), 1);
    assert_eq!(group.joins().len(), 1);
}

#[test]
fn locator_finds_groups_joined_under_values_roots() {
    let mut group = values_group("v", Vec::new());
    group.add_join(standard_group("Person", "person", "p"));
    let mut from = FromClause::default();
    from.add_root(TableGroup::Values(group));

    let found = from
        .find_table_group(&NavigablePath::root("p"))
        .expect("joined group is found");

    assert_eq!(found.identification_variable(), "p");
    assert!(from.find_table_group(&NavigablePath::root("x")).is_none());
}

#[test]
fn inline_rows_touch_no_tables() {
    let mut from = FromClause::default();
    from.add_root(standard_group("Person", "person", "p"));
    from.add_root(TableGroup::Values(values_group("v", Vec::new())));
    from.add_root(standard_group("Order", "orders", "o"));

    assert_eq!(
        from.affected_table_names(),
        BTreeSet::from(["orders".to_string(), "person".to_string()])
    );
}

// ---------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------

#[test]
fn tuple_results_assemble_their_columns() {
    let result = DomainResult::Tuple(TupleResult::new(
        vec![1, 2],
        Some("home".to_string()),
        ValueKind::Composite,
        Some(NavigablePath::root("p").append("address")),
    ));
    let row = vec![Value::Long(1), Value::text("Main"), Value::text("Oslo")];

    assert_eq!(result.result_variable(), Some("home"));
    assert_eq!(
        result.assemble(&row),
        Some(Value::Composite(vec![Value::text("Main"), Value::text("Oslo")]))
    );
    assert_eq!(result.assemble(&row[..2]), None);
}

#[test]
fn basic_results_read_one_column() {
    let result = DomainResult::Basic(BasicResult {
        position: 0,
        result_variable: None,
        kind: Some(ValueKind::Long),
    });

    assert_eq!(result.assemble(&[Value::Long(8)]), Some(Value::Long(8)));
    assert_eq!(result.assemble(&[]), None);
    assert_eq!(result.result_variable(), None);
}

#[test]
fn values_attribute_must_map_to_a_single_column() {
    let model = model();
    let group = TableGroup::Values(ValuesTableGroup::new(
        NavigablePath::root("v"),
        ValuesTableReference {
            rows: Vec::new(),
            identification_variable: "v".to_string(),
            column_names: vec!["addr".to_string()],
        },
        vec![Some(address_mapping(model.catalog()))],
    ));

    let err = group
        .attribute(&model, "addr")
        .expect_err("composite values column is rejected");

    assert!(matches!(
        err,
        MappingError::MultiColumnValues { ref column, .. } if column == "addr"
    ));
}
