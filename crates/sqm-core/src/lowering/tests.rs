use super::*;
use crate::{
    binding::{DomainParameterXref, QueryParameterBindings},
    config::LoweringConfig,
    model::{MappingError, NavigablePath},
    obs::{metrics_report, metrics_reset_all},
    sql::{DomainResult, JdbcParameter, SqlExpr, SqlStatement, render_statement},
    sqm::{
        ComparisonOperator, OccurrenceId, ParameterKey, QueryParameter, SqmAssignment, SqmDelete,
        SqmExpr, SqmNodeBuilder, SqmPredicate, SqmRoot, SqmSelect, SqmSelection, SqmStatement,
        SqmUpdate, SqmValuesRoot,
    },
    test_support::{address_mapping, builder, model},
    types::{Expressible, JdbcType, PathSource, ValueKind},
    value::Value,
};
use std::sync::Arc;

fn path(segments: &[&str], kind: ValueKind) -> SqmExpr {
    let (root, rest) = segments.split_first().expect("at least a root");
    let path = rest
        .iter()
        .fold(NavigablePath::root(*root), |path, segment| path.append(segment));

    SqmExpr::Path(Arc::new(PathSource::new(path, kind)))
}

fn select(
    roots: Vec<SqmRoot>,
    selections: Vec<SqmExpr>,
    restriction: Option<SqmPredicate>,
) -> SqmStatement {
    SqmStatement::Select(SqmSelect {
        roots,
        selections: selections.into_iter().map(SqmSelection::new).collect(),
        restriction,
        ..SqmSelect::default()
    })
}

fn lower(statement: &SqmStatement) -> LoweredStatement {
    let model = model();
    let config = LoweringConfig::default();

    SqmToSqlConverter::new(&model, &config)
        .lower_statement(statement)
        .expect("statement should lower")
}

fn lower_err(statement: &SqmStatement, config: &LoweringConfig) -> LoweringError {
    let model = model();

    SqmToSqlConverter::new(&model, config)
        .lower_statement(statement)
        .expect_err("lowering should fail")
}

fn occurrence_id(expr: &SqmExpr) -> OccurrenceId {
    match expr {
        SqmExpr::Parameter(parameter) => parameter.id,
        other => panic!("expected a parameter, found {other:?}"),
    }
}

fn slot_types(groups: &[Vec<JdbcParameter>]) -> Vec<Vec<Option<JdbcType>>> {
    groups
        .iter()
        .map(|group| group.iter().map(|slot| slot.jdbc_type).collect())
        .collect()
}

// ---------------------------------------------------------------------
// Parameter typing
// ---------------------------------------------------------------------

#[test]
fn parameter_takes_the_type_of_the_compared_path() {
    let mut builder = builder(&model());
    let parameter = builder.parameter(&Arc::new(QueryParameter::named("age")));
    let id = occurrence_id(&parameter);
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "name"], ValueKind::Text)],
        Some(SqmPredicate::equal(path(&["p", "age"], ValueKind::Integer), parameter)),
    );

    let lowered = lower(&statement);

    assert_eq!(
        slot_types(lowered.jdbc_params.get(id).expect("slots allocated")),
        vec![vec![Some(JdbcType::Integer)]]
    );
    assert_eq!(
        render_statement(&lowered.statement).sql,
        "select p.name from person p where p.age = ?"
    );
}

#[test]
fn embedded_parameter_gets_one_slot_per_column() {
    let mut builder = builder(&model());
    let parameter = builder.parameter(&Arc::new(QueryParameter::named("home")));
    let id = occurrence_id(&parameter);
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "id"], ValueKind::Long)],
        Some(SqmPredicate::equal(
            parameter,
            path(&["p", "address"], ValueKind::Composite),
        )),
    );

    let lowered = lower(&statement);
    let rendered = render_statement(&lowered.statement);

    assert_eq!(
        slot_types(lowered.jdbc_params.get(id).expect("slots allocated")),
        vec![vec![Some(JdbcType::Varchar), Some(JdbcType::Varchar)]]
    );
    assert_eq!(
        rendered.sql,
        "select p.id from person p where (?, ?) = (p.street, p.city)"
    );
    assert_eq!(rendered.parameters.len(), 2);
}

#[test]
fn converted_and_association_paths_type_their_parameters() {
    let mut builder = builder(&model());
    let flag = builder.parameter(&Arc::new(QueryParameter::named("flag")));
    let owner = builder.parameter(&Arc::new(QueryParameter::named("owner")));
    let (flag_id, owner_id) = (occurrence_id(&flag), occurrence_id(&owner));
    let statement = select(
        vec![SqmRoot::new("Person", "p"), SqmRoot::new("Order", "o")],
        vec![path(&["o", "total"], ValueKind::BigDecimal)],
        Some(SqmPredicate::And(vec![
            SqmPredicate::equal(path(&["p", "active"], ValueKind::Boolean), flag),
            SqmPredicate::equal(path(&["o", "customer"], ValueKind::Entity), owner),
        ])),
    );

    let lowered = lower(&statement);

    assert_eq!(
        slot_types(lowered.jdbc_params.get(flag_id).expect("flag slots")),
        vec![vec![Some(JdbcType::Char)]]
    );
    assert_eq!(
        slot_types(lowered.jdbc_params.get(owner_id).expect("owner slots")),
        vec![vec![Some(JdbcType::BigInt)]]
    );
    assert_eq!(
        render_statement(&lowered.statement).sql,
        "select o.total from person p, orders o where (p.active = ? and o.customer_id = ?)"
    );
}

#[test]
fn entity_reference_compares_by_identifier() {
    let mut builder = builder(&model());
    let parameter = builder.parameter(&Arc::new(QueryParameter::named("who")));
    let id = occurrence_id(&parameter);
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "name"], ValueKind::Text)],
        Some(SqmPredicate::equal(path(&["p"], ValueKind::Entity), parameter)),
    );

    let lowered = lower(&statement);

    assert_eq!(
        slot_types(lowered.jdbc_params.get(id).expect("slots allocated")),
        vec![vec![Some(JdbcType::BigInt)]]
    );
    assert_eq!(
        render_statement(&lowered.statement).sql,
        "select p.name from person p where p.id = ?"
    );
}

#[test]
fn own_type_wins_over_the_contextual_hint() {
    let model = model();
    let mut builder = builder(&model);
    let catalog = Arc::clone(model.catalog());
    let long = catalog
        .standard_basic_type_for(ValueKind::Long)
        .expect("long is standard");
    let parameter = builder.parameter(&Arc::new(
        QueryParameter::positional(1).with_type(Expressible::Basic(long)),
    ));
    let id = occurrence_id(&parameter);
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "name"], ValueKind::Text)],
        Some(SqmPredicate::equal(path(&["p", "age"], ValueKind::Integer), parameter)),
    );

    let lowered = lower(&statement);

    assert_eq!(
        slot_types(lowered.jdbc_params.get(id).expect("slots allocated")),
        vec![vec![Some(JdbcType::BigInt)]]
    );
}

#[test]
fn untyped_parameter_defers_or_fails_by_config() {
    let mut builder = builder(&model());
    let parameter = builder.parameter(&Arc::new(QueryParameter::named("x")));
    let id = occurrence_id(&parameter);
    let statement = select(vec![SqmRoot::new("Person", "p")], vec![parameter], None);

    let lowered = lower(&statement);
    assert_eq!(
        slot_types(lowered.jdbc_params.get(id).expect("slots allocated")),
        vec![vec![None]]
    );

    let strict = LoweringConfig {
        strict_parameter_typing: true,
        ..LoweringConfig::default()
    };
    let err = lower_err(&statement, &strict);
    assert!(matches!(err, LoweringError::UntypedParameter { ref parameter } if parameter == ":x"));
}

#[test]
fn occurrence_lowered_twice_gets_two_slot_groups() {
    let mut builder = builder(&model());
    let parameter = builder.parameter(&Arc::new(QueryParameter::named("n")));
    let id = occurrence_id(&parameter);
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![parameter.clone()],
        Some(SqmPredicate::equal(path(&["p", "name"], ValueKind::Text), parameter)),
    );

    let lowered = lower(&statement);
    let groups = lowered.jdbc_params.get(id).expect("slots allocated");

    assert_eq!(groups.len(), 2);
    assert_ne!(groups[0][0].slot, groups[1][0].slot);
    assert_eq!(lowered.jdbc_params.slot_count(), 2);
}

// ---------------------------------------------------------------------
// Literals and tuples
// ---------------------------------------------------------------------

#[test]
fn composite_literal_takes_the_shape_of_the_compared_path() {
    let builder = builder(&model());
    let literal = builder.literal(Value::Composite(vec![
        Value::text("Main"),
        Value::text("Oslo"),
    ]));
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "id"], ValueKind::Long)],
        Some(SqmPredicate::equal(
            path(&["p", "address"], ValueKind::Composite),
            literal,
        )),
    );

    let lowered = lower(&statement);

    assert_eq!(
        render_statement(&lowered.statement).sql,
        "select p.id from person p where (p.street, p.city) = ('Main', 'Oslo')"
    );
    assert!(lowered.jdbc_params.is_empty());
}

#[test]
fn literal_without_a_type_or_hint_fails() {
    let builder = builder(&model());
    let literal = builder.literal(Value::Composite(vec![Value::Int(1)]));
    let statement = select(vec![SqmRoot::new("Person", "p")], vec![literal], None);

    let err = lower_err(&statement, &LoweringConfig::default());

    let LoweringError::Mapping(inner) = err else {
        panic!("expected a mapping error, found {err:?}");
    };
    assert!(matches!(
        *inner,
        MappingError::NoStandardType {
            kind: ValueKind::Composite
        }
    ));
}

#[test]
fn tuple_elements_are_typed_from_the_other_side() {
    let mut builder = builder(&model());
    let street = builder.parameter(&Arc::new(QueryParameter::named("street")));
    let city = builder.parameter(&Arc::new(QueryParameter::named("city")));
    let (street_id, city_id) = (occurrence_id(&street), occurrence_id(&city));
    let tuple = builder.tuple(vec![street, city]);
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "id"], ValueKind::Long)],
        Some(SqmPredicate::equal(
            path(&["p", "address"], ValueKind::Composite),
            tuple,
        )),
    );

    let lowered = lower(&statement);

    for id in [street_id, city_id] {
        assert_eq!(
            slot_types(lowered.jdbc_params.get(id).expect("slots allocated")),
            vec![vec![Some(JdbcType::Varchar)]]
        );
    }
}

#[test]
fn multi_column_selection_is_one_tuple_result() {
    let statement = SqmStatement::Select(SqmSelect {
        roots: vec![SqmRoot::new("Person", "p")],
        selections: vec![
            SqmSelection::new(path(&["p", "name"], ValueKind::Text)),
            SqmSelection::aliased(path(&["p", "address"], ValueKind::Composite), "home"),
        ],
        ..SqmSelect::default()
    });

    let lowered = lower(&statement);
    let SqlStatement::Select(select) = &lowered.statement else {
        panic!("expected a select");
    };

    assert_eq!(select.selections.len(), 3);
    assert_eq!(select.domain_results.len(), 2);
    let DomainResult::Tuple(home) = &select.domain_results[1] else {
        panic!("expected a tuple result");
    };
    assert_eq!(home.jdbc_values_array_positions(), &[1, 2]);
    assert_eq!(home.result_variable(), Some("home"));
    assert_eq!(home.kind(), ValueKind::Composite);
    assert_eq!(
        home.navigable_path().map(NavigablePath::full_path),
        Some("p.address")
    );
    assert!(matches!(
        &select.domain_results[0],
        DomainResult::Basic(result) if result.position == 0 && result.kind == Some(ValueKind::Text)
    ));
}

// ---------------------------------------------------------------------
// Multi-valued expansion
// ---------------------------------------------------------------------

#[test]
fn in_list_expansions_are_lowered_next_to_their_original() {
    let model = model();
    let mut builder: SqmNodeBuilder = builder(&model);
    let parameter = Arc::new(QueryParameter::named("ids").multi_valued());
    let ids = builder.parameter(&parameter);
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "name"], ValueKind::Text)],
        Some(SqmPredicate::in_list(
            path(&["p", "id"], ValueKind::Long),
            vec![ids, builder.literal(99_i64)],
        )),
    );
    let mut xref = DomainParameterXref::from_statement(&statement);
    let mut bindings = QueryParameterBindings::from_xref(&xref);
    bindings
        .bind_multi(&ParameterKey::Named("ids".into()), [1_i64, 2, 3])
        .expect("ids is multi-valued");
    xref.expand_multi_valued(&bindings, &mut builder)
        .expect("expansion succeeds");

    let config = LoweringConfig::default();
    let lowered = SqmToSqlConverter::new(&model, &config)
        .with_expansions(&xref)
        .lower_statement(&statement)
        .expect("statement should lower");
    let rendered = render_statement(&lowered.statement);

    assert_eq!(
        rendered.sql,
        "select p.name from person p where p.id in (?, ?, ?, 99)"
    );
    assert_eq!(lowered.jdbc_params.slot_count(), 3);
    assert!(
        lowered
            .jdbc_params
            .get(OccurrenceId(0))
            .is_some()
    );
}

#[test]
fn expansions_are_ignored_without_an_xref() {
    let model = model();
    let mut builder = builder(&model);
    let parameter = Arc::new(QueryParameter::named("ids").multi_valued());
    let ids = builder.parameter(&parameter);
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "name"], ValueKind::Text)],
        Some(SqmPredicate::in_list(path(&["p", "id"], ValueKind::Long), vec![ids])),
    );

    let lowered = lower(&statement);

    assert_eq!(lowered.jdbc_params.slot_count(), 1);
}

// ---------------------------------------------------------------------
// From clause
// ---------------------------------------------------------------------

#[test]
fn values_root_columns_take_the_widest_row_type() {
    let mut builder = builder(&model());
    let parameter = builder.parameter(&Arc::new(QueryParameter::named("x")));
    let id = occurrence_id(&parameter);
    let statement = SqmStatement::Select(SqmSelect {
        values_roots: vec![SqmValuesRoot {
            path: NavigablePath::root("v"),
            columns: vec!["a".to_string(), "b".to_string()],
            rows: vec![
                vec![builder.literal(1_i32), parameter],
                vec![builder.literal(2_i64), builder.literal("t")],
            ],
        }],
        selections: vec![
            SqmSelection::new(path(&["v", "a"], ValueKind::Long)),
            SqmSelection::new(path(&["v", "b"], ValueKind::Text)),
        ],
        ..SqmSelect::default()
    });

    let lowered = lower(&statement);
    let SqlStatement::Select(select) = &lowered.statement else {
        panic!("expected a select");
    };

    assert_eq!(
        render_statement(&lowered.statement).sql,
        "select v.a, v.b from (values (1, ?), (2, 't')) v (a, b)"
    );
    assert_eq!(
        slot_types(lowered.jdbc_params.get(id).expect("slots allocated")),
        vec![vec![Some(JdbcType::Varchar)]]
    );
    assert!(matches!(
        &select.selections[0].expr,
        SqlExpr::Column(column) if column.jdbc_type == JdbcType::BigInt
    ));
    assert!(select.from.affected_table_names().is_empty());
}

#[test]
fn values_column_spanning_several_columns_is_rejected() {
    let model = model();
    let builder = builder(&model);
    let address = Expressible::Mapped(address_mapping(model.catalog()));
    let home = builder.typed_literal(
        Value::Composite(vec![Value::from("Main"), Value::from("Oslo")]),
        address,
    );
    let statement = SqmStatement::Select(SqmSelect {
        values_roots: vec![SqmValuesRoot {
            path: NavigablePath::root("v"),
            columns: vec!["addr".to_string()],
            rows: vec![vec![home]],
        }],
        selections: vec![SqmSelection::new(path(&["v", "addr"], ValueKind::Composite))],
        ..SqmSelect::default()
    });

    let err = lower_err(&statement, &LoweringConfig::default());

    let LoweringError::Mapping(inner) = err else {
        panic!("expected a mapping error, found {err:?}");
    };
    assert!(matches!(
        *inner,
        MappingError::MultiColumnValues { ref column, .. } if column == "addr"
    ));
}

#[test]
fn unregistered_alias_is_a_missing_table_group() {
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["q", "name"], ValueKind::Text)],
        None,
    );

    let err = lower_err(&statement, &LoweringConfig::default());

    assert!(matches!(err, LoweringError::MissingTableGroup { ref path } if path == "q.name"));
}

#[test]
fn unknown_root_entity_fails() {
    let statement = select(vec![SqmRoot::new("Invoice", "i")], Vec::new(), None);

    let err = lower_err(&statement, &LoweringConfig::default());

    assert!(matches!(err, LoweringError::Mapping(ref inner)
        if matches!(**inner, MappingError::UnknownEntity { .. })));
}

// ---------------------------------------------------------------------
// Data modification
// ---------------------------------------------------------------------

#[test]
fn update_assignment_value_takes_the_target_mapping() {
    let mut builder = builder(&model());
    let home = builder.parameter(&Arc::new(QueryParameter::named("home")));
    let who = builder.parameter(&Arc::new(QueryParameter::named("who")));
    let home_id = occurrence_id(&home);
    let statement = SqmStatement::Update(SqmUpdate {
        target: SqmRoot::new("Person", "p"),
        assignments: vec![SqmAssignment {
            target: Arc::new(PathSource::new(
                NavigablePath::root("p").append("address"),
                ValueKind::Composite,
            )),
            value: home,
        }],
        restriction: Some(SqmPredicate::equal(path(&["p", "id"], ValueKind::Long), who)),
    });

    let lowered = lower(&statement);
    let rendered = render_statement(&lowered.statement);

    assert_eq!(
        rendered.sql,
        "update person p set (street, city) = (?, ?) where p.id = ?"
    );
    assert_eq!(
        slot_types(lowered.jdbc_params.get(home_id).expect("slots allocated")),
        vec![vec![Some(JdbcType::Varchar), Some(JdbcType::Varchar)]]
    );
    assert_eq!(
        lowered.statement.affected_table_names().into_iter().collect::<Vec<_>>(),
        vec!["person".to_string()]
    );
    assert_eq!(lowered.table_groups.roots().len(), 1);
}

#[test]
fn delete_lowers_its_restriction() {
    let mut builder = builder(&model());
    let total = builder.parameter(&Arc::new(QueryParameter::positional(1)));
    let statement = SqmStatement::Delete(SqmDelete {
        target: SqmRoot::new("Order", "o"),
        restriction: Some(SqmPredicate::comparison(
            path(&["o", "total"], ValueKind::BigDecimal),
            ComparisonOperator::LessThan,
            total,
        )),
    });

    let lowered = lower(&statement);

    assert_eq!(
        render_statement(&lowered.statement).sql,
        "delete from orders o where o.total < ?"
    );
}

#[test]
fn lowering_reports_statement_and_slot_counts() {
    metrics_reset_all();
    let mut builder = builder(&model());
    let first = builder.parameter(&Arc::new(QueryParameter::named("a")));
    let second = builder.parameter(&Arc::new(QueryParameter::named("home")));
    let statement = select(
        vec![SqmRoot::new("Person", "p")],
        vec![path(&["p", "id"], ValueKind::Long)],
        Some(SqmPredicate::And(vec![
            SqmPredicate::equal(path(&["p", "age"], ValueKind::Integer), first),
            SqmPredicate::equal(path(&["p", "address"], ValueKind::Composite), second),
        ])),
    );

    let _ = lower(&statement);
    let report = metrics_report();

    assert_eq!(report.ops.statements_lowered, 1);
    assert_eq!(report.ops.parameter_slots, 3);
}
