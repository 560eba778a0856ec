use crate::{
    binding::{DomainParameterXref, JdbcParameterLookup},
    config::LoweringConfig,
    lowering::{LoweringError, SqlAstWalker, walker::mapping_of},
    model::{DomainModel, Mapping, MappingError, NavigablePath},
    obs::sink::{MetricsEvent, record},
    sql::{
        BasicResult, ColumnReference, DeleteStatement, DomainResult, FromClause, JdbcParameter,
        SelectStatement, SlotId, SqlAssignment, SqlExpr, SqlLiteral, SqlPredicate, SqlSelection,
        SqlStatement, StandardTableGroup, TableGroup, TableGroupLocator, TableReference,
        TupleResult, UpdateStatement, ValuesTableGroup, ValuesTableReference,
    },
    sqm::{
        OccurrenceId, SqmDelete, SqmExpr, SqmLiteral, SqmParameter, SqmPredicate, SqmRoot,
        SqmSelect, SqmStatement, SqmUpdate, SqmValuesRoot,
    },
    types::{Expressible, JdbcType, PathSource, TypeCatalog, ValueKind, highest_precedence},
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, trace};

///
/// JdbcParamsByOccurrence
///
/// Slot groups allocated per parameter occurrence, one group per time the
/// occurrence was lowered and one slot per column in each group.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JdbcParamsByOccurrence {
    groups: BTreeMap<OccurrenceId, Vec<Vec<JdbcParameter>>>,
}

impl JdbcParamsByOccurrence {
    #[must_use]
    pub fn get(&self, occurrence: OccurrenceId) -> Option<&[Vec<JdbcParameter>]> {
        self.groups.get(&occurrence).map(Vec::as_slice)
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.groups.values().flatten().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn push(&mut self, occurrence: OccurrenceId, group: Vec<JdbcParameter>) {
        self.groups.entry(occurrence).or_default().push(group);
    }
}

impl JdbcParameterLookup for JdbcParamsByOccurrence {
    fn jdbc_params_for(&self, occurrence: OccurrenceId) -> Option<&[Vec<JdbcParameter>]> {
        self.get(occurrence)
    }
}

///
/// LoweredStatement
///

#[derive(Clone, Debug)]
pub struct LoweredStatement {
    pub statement: SqlStatement,
    pub jdbc_params: JdbcParamsByOccurrence,
    /// Every table group registered during the walk, for resolving paths
    /// at bind time.
    pub table_groups: FromClause,
}

///
/// SqmToSqlConverter
///
/// One lowering walk. The from clause doubles as the table group locator
/// for everything lowered after its roots are registered.
///

pub struct SqmToSqlConverter<'a> {
    model: &'a DomainModel,
    config: &'a LoweringConfig,
    expansions: Option<&'a DomainParameterXref>,
    from_clause: FromClause,
    jdbc_params: JdbcParamsByOccurrence,
    next_slot: u32,
}

impl<'a> SqmToSqlConverter<'a> {
    #[must_use]
    pub fn new(model: &'a DomainModel, config: &'a LoweringConfig) -> Self {
        Self {
            model,
            config,
            expansions: None,
            from_clause: FromClause::default(),
            jdbc_params: JdbcParamsByOccurrence::default(),
            next_slot: 0,
        }
    }

    /// Lower the expansion occurrences registered in `xref` next to the
    /// occurrences they expand.
    #[must_use]
    pub const fn with_expansions(mut self, xref: &'a DomainParameterXref) -> Self {
        self.expansions = Some(xref);
        self
    }

    #[must_use]
    pub const fn from_clause(&self) -> &FromClause {
        &self.from_clause
    }

    #[must_use]
    pub const fn jdbc_params(&self) -> &JdbcParamsByOccurrence {
        &self.jdbc_params
    }

    pub fn lower_statement(
        mut self,
        statement: &SqmStatement,
    ) -> Result<LoweredStatement, LoweringError> {
        let lowered = match statement {
            SqmStatement::Select(select) => SqlStatement::Select(self.lower_select(select)?),
            SqmStatement::Update(update) => SqlStatement::Update(self.lower_update(update)?),
            SqmStatement::Delete(delete) => SqlStatement::Delete(self.lower_delete(delete)?),
        };

        let slots = self.jdbc_params.slot_count() as u64;
        record(MetricsEvent::StatementLowered);
        record(MetricsEvent::ParameterSlotsAllocated { slots });
        debug!(kind = statement.kind(), slots, "lowered statement");

        Ok(LoweredStatement {
            statement: lowered,
            jdbc_params: self.jdbc_params,
            table_groups: self.from_clause,
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn lower_select(&mut self, select: &SqmSelect) -> Result<SelectStatement, LoweringError> {
        for root in &select.roots {
            self.register_root(root)?;
        }
        for values in &select.values_roots {
            self.register_values_root(values)?;
        }

        let mut selections = Vec::new();
        let mut domain_results = Vec::with_capacity(select.selections.len());
        for selection in &select.selections {
            let lowered = self.lower_expression(&selection.expr)?;
            let position = selections.len();

            let result = if let SqlExpr::Tuple(_) = &lowered {
                let kind = selection
                    .expr
                    .expressible_type()?
                    .map_or(ValueKind::Composite, |ty| ty.value_kind());
                let navigable_path = match &selection.expr {
                    SqmExpr::Path(source) => Some(source.path.clone()),
                    _ => None,
                };
                DomainResult::Tuple(TupleResult::new(
                    (position..position + lowered.column_count()).collect(),
                    selection.alias.clone(),
                    kind,
                    navigable_path,
                ))
            } else {
                DomainResult::Basic(BasicResult {
                    position,
                    result_variable: selection.alias.clone(),
                    kind: lowered.value_kind(),
                })
            };

            let mut leaves = Vec::new();
            lowered.flatten_into(&mut leaves);
            for expr in leaves {
                let position = selections.len();
                selections.push(SqlSelection { position, expr });
            }
            domain_results.push(result);
        }

        let restriction = self.lower_restriction(select.restriction.as_ref())?;

        Ok(SelectStatement {
            from: self.from_clause.clone(),
            selections,
            domain_results,
            restriction,
        })
    }

    fn lower_update(&mut self, update: &SqmUpdate) -> Result<UpdateStatement, LoweringError> {
        let target = self.register_root(&update.target)?;

        let mut assignments = Vec::with_capacity(update.assignments.len());
        for assignment in &update.assignments {
            let resolved = self
                .model
                .resolve_path(&assignment.target.path, &self.from_clause)?;
            let target_mapping = resolved.mapping.clone();
            let columns = column_references(
                resolved.qualifier,
                resolved.columns,
                &resolved.mapping,
            );
            let value = self.lower_with_inferred_type(&assignment.value, &|_| {
                Some(target_mapping.clone())
            })?;

            assignments.push(SqlAssignment { columns, value });
        }

        let restriction = self.lower_restriction(update.restriction.as_ref())?;

        Ok(UpdateStatement {
            target,
            assignments,
            restriction,
        })
    }

    fn lower_delete(&mut self, delete: &SqmDelete) -> Result<DeleteStatement, LoweringError> {
        let target = self.register_root(&delete.target)?;
        let restriction = self.lower_restriction(delete.restriction.as_ref())?;

        Ok(DeleteStatement {
            target,
            restriction,
        })
    }

    // ------------------------------------------------------------------
    // From clause
    // ------------------------------------------------------------------

    fn register_root(&mut self, root: &SqmRoot) -> Result<TableReference, LoweringError> {
        let entity = self.model.entity(&root.entity)?;
        let primary = TableReference {
            table: entity.table.clone(),
            identification_variable: root.path.root_alias().to_string(),
        };

        self.from_clause
            .add_root(TableGroup::Standard(StandardTableGroup {
                path: root.path.clone(),
                entity: entity.name.clone(),
                primary: primary.clone(),
            }));

        Ok(primary)
    }

    // Column types are the highest-precedence type of each column across
    // rows; cells are then lowered under their column's type. Each column
    // renders as exactly one SQL column.
    fn register_values_root(&mut self, values: &SqmValuesRoot) -> Result<(), LoweringError> {
        let mut column_mappings = Vec::with_capacity(values.columns.len());
        for (index, column) in values.columns.iter().enumerate() {
            let mut types = Vec::with_capacity(values.rows.len());
            for row in &values.rows {
                types.push(match row.get(index) {
                    Some(cell) => cell.expressible_type()?,
                    None => None,
                });
            }

            let mapping = match highest_precedence(types.iter().map(Option::as_ref)) {
                Some(widest) => self.table_group_aware_mapping(widest)?,
                None => None,
            };
            if let Some(mapping) = mapping.as_ref().filter(|m| m.jdbc_type_count() != 1) {
                return Err(MappingError::MultiColumnValues {
                    column: column.clone(),
                    mapping: mapping.to_string(),
                }
                .into());
            }
            column_mappings.push(mapping);
        }

        let mut rows = Vec::with_capacity(values.rows.len());
        for row in &values.rows {
            let mut cells = Vec::with_capacity(row.len());
            for (index, cell) in row.iter().enumerate() {
                let hint = column_mappings.get(index).cloned().flatten();
                cells.push(self.lower_with_inferred_type(cell, &|_| hint.clone())?);
            }
            rows.push(cells);
        }

        let reference = ValuesTableReference {
            rows,
            identification_variable: values.path.root_alias().to_string(),
            column_names: values.columns.clone(),
        };
        self.from_clause.add_root(TableGroup::Values(ValuesTableGroup::new(
            values.path.clone(),
            reference,
            column_mappings,
        )));

        Ok(())
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    fn lower_restriction(
        &mut self,
        restriction: Option<&SqmPredicate>,
    ) -> Result<Option<SqlPredicate>, LoweringError> {
        restriction
            .map(|predicate| self.lower_predicate(predicate))
            .transpose()
    }

    fn lower_predicate(&mut self, predicate: &SqmPredicate) -> Result<SqlPredicate, LoweringError> {
        let lowered = match predicate {
            SqmPredicate::Comparison { lhs, operator, rhs } => SqlPredicate::Comparison {
                lhs: self.lower_with_inferred_type(lhs, &|walker| mapping_of(walker, rhs))?,
                operator: *operator,
                rhs: self.lower_with_inferred_type(rhs, &|walker| mapping_of(walker, lhs))?,
            },
            SqmPredicate::InList {
                test,
                list,
                negated,
            } => {
                let test_sql = self.lower_with_inferred_type(test, &|walker| {
                    list.first().and_then(|item| mapping_of(walker, item))
                })?;
                let from_test = |walker: &dyn SqlAstWalker| mapping_of(walker, test);
                let expansions = self.expansions;

                let mut items = Vec::with_capacity(list.len());
                for item in list {
                    items.push(self.lower_with_inferred_type(item, &from_test)?);

                    if let SqmExpr::Parameter(parameter) = item
                        && let Some(xref) = expansions
                    {
                        for expansion in xref.expansions(parameter.id) {
                            let expansion = SqmExpr::Parameter(Arc::clone(expansion));
                            items.push(self.lower_with_inferred_type(&expansion, &from_test)?);
                        }
                    }
                }

                SqlPredicate::InList {
                    test: test_sql,
                    list: items,
                    negated: *negated,
                }
            }
            SqmPredicate::And(children) => SqlPredicate::And(self.lower_predicates(children)?),
            SqmPredicate::Or(children) => SqlPredicate::Or(self.lower_predicates(children)?),
            SqmPredicate::Not(inner) => SqlPredicate::Not(Box::new(self.lower_predicate(inner)?)),
            SqmPredicate::IsNull { expr, negated } => SqlPredicate::IsNull {
                expr: self.lower_expression(expr)?,
                negated: *negated,
            },
        };

        Ok(lowered)
    }

    fn lower_predicates(
        &mut self,
        predicates: &[SqmPredicate],
    ) -> Result<Vec<SqlPredicate>, LoweringError> {
        predicates
            .iter()
            .map(|predicate| self.lower_predicate(predicate))
            .collect()
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn lower_literal(
        &self,
        literal: &SqmLiteral,
        inferred: &dyn Fn(&dyn SqlAstWalker) -> Option<Mapping>,
    ) -> Result<SqlExpr, LoweringError> {
        let mapping = match self.table_group_aware_mapping(&literal.expressible)? {
            Some(mapping) => mapping,
            None => inferred(self).ok_or(MappingError::NoStandardType {
                kind: literal.expressible.value_kind(),
            })?,
        };

        let mut values: Vec<SqlExpr> = mapping
            .disassemble(&literal.value)?
            .into_iter()
            .map(|value| {
                SqlExpr::Literal(SqlLiteral {
                    value: value.value,
                    jdbc_type: value.jdbc_type,
                })
            })
            .collect();

        if values.len() == 1
            && let Some(value) = values.pop()
        {
            return Ok(value);
        }

        Ok(SqlExpr::Tuple(values))
    }

    fn lower_path(&self, source: &PathSource) -> Result<SqlExpr, LoweringError> {
        let root = NavigablePath::root(source.path.root_alias());
        if self.from_clause.find_table_group(&root).is_none() {
            return Err(LoweringError::MissingTableGroup {
                path: source.path.to_string(),
            });
        }

        let resolved = self.model.resolve_path(&source.path, &self.from_clause)?;

        Ok(SqlExpr::from_columns(column_references(
            resolved.qualifier,
            resolved.columns,
            &resolved.mapping,
        )))
    }

    // Type order: the occurrence's inferred type, the parameter's declared
    // type, then the contextual hint.
    fn lower_parameter(
        &mut self,
        parameter: &SqmParameter,
        inferred: &dyn Fn(&dyn SqlAstWalker) -> Option<Mapping>,
    ) -> Result<SqlExpr, LoweringError> {
        let own = match parameter.expressible_type() {
            Some(expressible) => self.table_group_aware_mapping(expressible)?,
            None => None,
        };
        let mapping = match own {
            Some(mapping) => Some(mapping),
            None => inferred(&*self),
        };

        let group: Vec<JdbcParameter> = match mapping {
            Some(mapping) => mapping
                .jdbc_types()
                .into_iter()
                .map(|jdbc_type| self.next_parameter(Some(jdbc_type)))
                .collect(),
            None if self.config.strict_parameter_typing => {
                return Err(LoweringError::UntypedParameter {
                    parameter: parameter.key().to_string(),
                });
            }
            None => vec![self.next_parameter(None)],
        };
        trace!(
            parameter = %parameter.key(),
            occurrence = %parameter.id,
            slots = group.len(),
            "allocated parameter slots"
        );

        self.jdbc_params.push(parameter.id, group.clone());

        Ok(SqlExpr::from_parameters(group))
    }

    fn next_parameter(&mut self, jdbc_type: Option<JdbcType>) -> JdbcParameter {
        let slot = SlotId(self.next_slot);
        self.next_slot += 1;

        JdbcParameter { slot, jdbc_type }
    }
}

impl SqlAstWalker for SqmToSqlConverter<'_> {
    fn lower_with_inferred_type(
        &mut self,
        expr: &SqmExpr,
        inferred: &dyn Fn(&dyn SqlAstWalker) -> Option<Mapping>,
    ) -> Result<SqlExpr, LoweringError> {
        match expr {
            SqmExpr::Literal(literal) => self.lower_literal(literal, inferred),
            SqmExpr::Parameter(parameter) => self.lower_parameter(parameter, inferred),
            SqmExpr::Path(source) => self.lower_path(source),
            SqmExpr::Function(function) => function.lower_to_target(self),
            SqmExpr::Tuple(tuple) => {
                let mut elements = Vec::with_capacity(tuple.elements.len());
                for (index, element) in tuple.elements.iter().enumerate() {
                    elements.push(self.lower_with_inferred_type(element, &|walker| {
                        component_mapping(inferred(walker)?, index)
                    })?);
                }

                Ok(SqlExpr::Tuple(elements))
            }
        }
    }

    fn table_group_aware_mapping(
        &self,
        expressible: &Expressible,
    ) -> Result<Option<Mapping>, MappingError> {
        self.model.resolve_mapping(expressible, &self.from_clause)
    }

    fn type_catalog(&self) -> &TypeCatalog {
        self.model.catalog()
    }
}

fn component_mapping(mapping: Mapping, index: usize) -> Option<Mapping> {
    match mapping {
        Mapping::Embedded(embedded) => embedded
            .components
            .get(index)
            .map(|component| component.mapping.clone()),
        Mapping::EntityIdentifier(identifier) => component_mapping(identifier.mapping.clone(), index),
        Mapping::ForeignKey(fk) => component_mapping(fk.key.clone(), index),
        Mapping::Basic(_) | Mapping::Converted(_) => None,
    }
}

fn column_references(
    qualifier: String,
    columns: Vec<String>,
    mapping: &Mapping,
) -> Vec<ColumnReference> {
    columns
        .into_iter()
        .zip(mapping.jdbc_types())
        .map(|(column, jdbc_type)| ColumnReference {
            qualifier: qualifier.clone(),
            column,
            jdbc_type,
        })
        .collect()
}
