//! ANSI-style SQL text with `?` placeholders.
//!
//! Rendering records the slot behind each placeholder in the order the
//! placeholders appear, which is the order bind-by-index applies them in.

use crate::sql::{
    DeleteStatement, FromClause, SelectStatement, SlotId, SqlExpr, SqlPredicate, SqlStatement,
    TableGroup, UpdateStatement,
};

///
/// RenderedSql
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedSql {
    pub sql: String,
    pub parameters: Vec<SlotId>,
}

///
/// SqlWriter
///

#[derive(Debug, Default)]
pub struct SqlWriter {
    sql: String,
    parameters: Vec<SlotId>,
}

impl SqlWriter {
    pub fn push_str(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub fn render_expr(&mut self, expr: &SqlExpr) {
        match expr {
            SqlExpr::Column(column) => {
                if !column.qualifier.is_empty() {
                    self.sql.push_str(&column.qualifier);
                    self.sql.push('.');
                }
                self.sql.push_str(&column.column);
            }
            SqlExpr::Literal(literal) => self.sql.push_str(&literal.value.to_string()),
            SqlExpr::Parameter(parameter) => {
                self.sql.push('?');
                self.parameters.push(parameter.slot);
            }
            SqlExpr::Function(call) => call.renderer.render(&call.name, &call.arguments, self),
            SqlExpr::Tuple(elements) => {
                self.sql.push('(');
                self.render_list(elements);
                self.sql.push(')');
            }
        }
    }

    pub fn render_list(&mut self, exprs: &[SqlExpr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.render_expr(expr);
        }
    }

    fn render_predicate(&mut self, predicate: &SqlPredicate) {
        match predicate {
            SqlPredicate::Comparison { lhs, operator, rhs } => {
                self.render_expr(lhs);
                self.sql.push(' ');
                self.sql.push_str(operator.sql_token());
                self.sql.push(' ');
                self.render_expr(rhs);
            }
            SqlPredicate::InList {
                test,
                list,
                negated,
            } => {
                self.render_expr(test);
                self.sql
                    .push_str(if *negated { " not in (" } else { " in (" });
                self.render_list(list);
                self.sql.push(')');
            }
            SqlPredicate::And(children) => self.render_junction(children, " and "),
            SqlPredicate::Or(children) => self.render_junction(children, " or "),
            SqlPredicate::Not(inner) => {
                self.sql.push_str("not (");
                self.render_predicate(inner);
                self.sql.push(')');
            }
            SqlPredicate::IsNull { expr, negated } => {
                self.render_expr(expr);
                self.sql.push_str(if *negated {
                    " is not null"
                } else {
                    " is null"
                });
            }
        }
    }

    fn render_junction(&mut self, children: &[SqlPredicate], separator: &str) {
        self.sql.push('(');
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(separator);
            }
            self.render_predicate(child);
        }
        self.sql.push(')');
    }

    fn render_where(&mut self, restriction: Option<&SqlPredicate>) {
        if let Some(restriction) = restriction {
            self.sql.push_str(" where ");
            self.render_predicate(restriction);
        }
    }

    fn render_from(&mut self, from: &FromClause) {
        for (i, group) in from.roots().iter().enumerate() {
            self.sql.push_str(if i == 0 { " from " } else { ", " });
            self.render_table_group(group);
        }
    }

    fn render_table_group(&mut self, group: &TableGroup) {
        match group {
            TableGroup::Standard(group) => {
                self.sql.push_str(&group.primary.table);
                self.sql.push(' ');
                self.sql.push_str(&group.primary.identification_variable);
            }
            TableGroup::Values(group) => {
                let reference = &group.reference;
                self.sql.push_str("(values ");
                for (i, row) in reference.rows.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.sql.push('(');
                    self.render_list(row);
                    self.sql.push(')');
                }
                self.sql.push_str(") ");
                self.sql.push_str(&reference.identification_variable);
                self.sql.push_str(" (");
                self.sql.push_str(&reference.column_names.join(", "));
                self.sql.push(')');
            }
        }
    }

    fn render_select(&mut self, select: &SelectStatement) {
        self.sql.push_str("select ");
        for (i, selection) in select.selections.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.render_expr(&selection.expr);
        }
        self.render_from(&select.from);
        self.render_where(select.restriction.as_ref());
    }

    fn render_update(&mut self, update: &UpdateStatement) {
        self.sql.push_str("update ");
        self.sql.push_str(&update.target.table);
        self.sql.push(' ');
        self.sql.push_str(&update.target.identification_variable);
        self.sql.push_str(" set ");
        for (i, assignment) in update.assignments.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            let columns: Vec<&str> = assignment
                .columns
                .iter()
                .map(|column| column.column.as_str())
                .collect();
            if columns.len() == 1 {
                self.sql.push_str(columns[0]);
            } else {
                self.sql.push('(');
                self.sql.push_str(&columns.join(", "));
                self.sql.push(')');
            }
            self.sql.push_str(" = ");
            self.render_expr(&assignment.value);
        }
        self.render_where(update.restriction.as_ref());
    }

    fn render_delete(&mut self, delete: &DeleteStatement) {
        self.sql.push_str("delete from ");
        self.sql.push_str(&delete.target.table);
        self.sql.push(' ');
        self.sql.push_str(&delete.target.identification_variable);
        self.render_where(delete.restriction.as_ref());
    }

    #[must_use]
    pub fn finish(self) -> RenderedSql {
        RenderedSql {
            sql: self.sql,
            parameters: self.parameters,
        }
    }
}

#[must_use]
pub fn render_statement(statement: &SqlStatement) -> RenderedSql {
    let mut writer = SqlWriter::default();
    match statement {
        SqlStatement::Select(select) => writer.render_select(select),
        SqlStatement::Update(update) => writer.render_update(update),
        SqlStatement::Delete(delete) => writer.render_delete(delete),
    }

    writer.finish()
}
