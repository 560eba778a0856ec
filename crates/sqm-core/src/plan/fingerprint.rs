//! Deterministic statement fingerprinting for the interpretation cache.
#![expect(clippy::cast_possible_truncation)]

use crate::{
    binding::DomainParameterXref,
    sqm::{
        ComparisonOperator, SqmExpr, SqmParameter, SqmPredicate, SqmRoot, SqmSelect, SqmStatement,
    },
    types::Expressible,
};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// StatementFingerprint
///
/// Stable digest of everything lowering depends on: statement shape,
/// types, literal values, and parameter occurrence identity. Multi-valued
/// expansions count by position, so re-expanding to the same width keeps
/// the fingerprint.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StatementFingerprint([u8; 32]);

impl StatementFingerprint {
    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for StatementFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

#[must_use]
pub fn fingerprint(statement: &SqmStatement, xref: &DomainParameterXref) -> StatementFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(b"sqmfp:v1");
    hash_statement(&mut hasher, statement, xref);

    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);

    StatementFingerprint(out)
}

fn hash_statement(hasher: &mut Sha256, statement: &SqmStatement, xref: &DomainParameterXref) {
    match statement {
        SqmStatement::Select(select) => {
            write_tag(hasher, 0x01);
            hash_select(hasher, select, xref);
        }
        SqmStatement::Update(update) => {
            write_tag(hasher, 0x02);
            hash_root(hasher, &update.target);
            write_u32(hasher, update.assignments.len() as u32);
            for assignment in &update.assignments {
                write_str(hasher, assignment.target.path.full_path());
                hash_expr(hasher, &assignment.value, xref);
            }
            hash_restriction(hasher, update.restriction.as_ref(), xref);
        }
        SqmStatement::Delete(delete) => {
            write_tag(hasher, 0x03);
            hash_root(hasher, &delete.target);
            hash_restriction(hasher, delete.restriction.as_ref(), xref);
        }
    }
}

fn hash_select(hasher: &mut Sha256, select: &SqmSelect, xref: &DomainParameterXref) {
    write_u32(hasher, select.roots.len() as u32);
    for root in &select.roots {
        hash_root(hasher, root);
    }

    write_u32(hasher, select.values_roots.len() as u32);
    for values in &select.values_roots {
        write_str(hasher, values.path.full_path());
        write_u32(hasher, values.columns.len() as u32);
        for column in &values.columns {
            write_str(hasher, column);
        }
        write_u32(hasher, values.rows.len() as u32);
        for row in &values.rows {
            write_u32(hasher, row.len() as u32);
            for cell in row {
                hash_expr(hasher, cell, xref);
            }
        }
    }

    write_u32(hasher, select.selections.len() as u32);
    for selection in &select.selections {
        hash_expr(hasher, &selection.expr, xref);
        hash_optional_str(hasher, selection.alias.as_deref());
    }

    hash_restriction(hasher, select.restriction.as_ref(), xref);
}

fn hash_root(hasher: &mut Sha256, root: &SqmRoot) {
    write_str(hasher, &root.entity);
    write_str(hasher, root.path.full_path());
}

fn hash_restriction(
    hasher: &mut Sha256,
    restriction: Option<&SqmPredicate>,
    xref: &DomainParameterXref,
) {
    match restriction {
        Some(predicate) => {
            write_tag(hasher, 0x20);
            hash_predicate(hasher, predicate, xref);
        }
        None => write_tag(hasher, 0x21),
    }
}

fn hash_predicate(hasher: &mut Sha256, predicate: &SqmPredicate, xref: &DomainParameterXref) {
    match predicate {
        SqmPredicate::Comparison { lhs, operator, rhs } => {
            write_tag(hasher, 0x22);
            hash_expr(hasher, lhs, xref);
            write_tag(hasher, comparison_tag(*operator));
            hash_expr(hasher, rhs, xref);
        }
        SqmPredicate::InList {
            test,
            list,
            negated,
        } => {
            write_tag(hasher, 0x23);
            write_tag(hasher, u8::from(*negated));
            hash_expr(hasher, test, xref);
            write_u32(hasher, list.len() as u32);
            for item in list {
                hash_expr(hasher, item, xref);
            }
        }
        SqmPredicate::And(children) => {
            write_tag(hasher, 0x24);
            write_u32(hasher, children.len() as u32);
            for child in children {
                hash_predicate(hasher, child, xref);
            }
        }
        SqmPredicate::Or(children) => {
            write_tag(hasher, 0x25);
            write_u32(hasher, children.len() as u32);
            for child in children {
                hash_predicate(hasher, child, xref);
            }
        }
        SqmPredicate::Not(inner) => {
            write_tag(hasher, 0x26);
            hash_predicate(hasher, inner, xref);
        }
        SqmPredicate::IsNull { expr, negated } => {
            write_tag(hasher, 0x27);
            write_tag(hasher, u8::from(*negated));
            hash_expr(hasher, expr, xref);
        }
    }
}

fn hash_expr(hasher: &mut Sha256, expr: &SqmExpr, xref: &DomainParameterXref) {
    match expr {
        SqmExpr::Literal(literal) => {
            write_tag(hasher, 0x40);
            write_expressible(hasher, Some(&literal.expressible));
            write_tag(hasher, literal.value.kind() as u8);
            write_str(hasher, &literal.value.to_string());
        }
        SqmExpr::Parameter(parameter) => {
            write_tag(hasher, 0x41);
            hash_parameter(hasher, parameter);

            let expansions = xref.expansions(parameter.id);
            write_u32(hasher, expansions.len() as u32);
            for expansion in expansions {
                write_expressible(hasher, expansion.anticipated_type.as_ref());
            }
        }
        SqmExpr::Path(source) => {
            write_tag(hasher, 0x42);
            write_str(hasher, source.path.full_path());
            write_tag(hasher, source.kind as u8);
        }
        SqmExpr::Function(function) => {
            write_tag(hasher, 0x43);
            write_str(hasher, function.name());
            write_expressible(hasher, function.implied_result_type());
            write_u32(hasher, function.arguments().len() as u32);
            for argument in function.arguments() {
                hash_expr(hasher, argument, xref);
            }
        }
        SqmExpr::Tuple(tuple) => {
            write_tag(hasher, 0x44);
            write_u32(hasher, tuple.elements.len() as u32);
            for element in &tuple.elements {
                hash_expr(hasher, element, xref);
            }
        }
    }
}

fn hash_parameter(hasher: &mut Sha256, parameter: &SqmParameter) {
    write_str(hasher, &parameter.key().to_string());
    write_u32(hasher, parameter.id.0);
    write_expressible(hasher, parameter.anticipated_type.as_ref());
    write_expressible(hasher, parameter.parameter.declared_type.as_ref());
    write_tag(hasher, u8::from(parameter.parameter.allows_multi_valued));
}

fn write_expressible(hasher: &mut Sha256, expressible: Option<&Expressible>) {
    match expressible {
        Some(expressible) => {
            write_tag(hasher, 0x01);
            write_tag(hasher, expressible.value_kind() as u8);
            write_str(hasher, &expressible.to_string());
        }
        None => write_tag(hasher, 0x00),
    }
}

fn hash_optional_str(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            write_tag(hasher, 0x01);
            write_str(hasher, value);
        }
        None => write_tag(hasher, 0x00),
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

const fn comparison_tag(operator: ComparisonOperator) -> u8 {
    match operator {
        ComparisonOperator::Equal => 0x01,
        ComparisonOperator::NotEqual => 0x02,
        ComparisonOperator::LessThan => 0x03,
        ComparisonOperator::LessThanOrEqual => 0x04,
        ComparisonOperator::GreaterThan => 0x05,
        ComparisonOperator::GreaterThanOrEqual => 0x06,
    }
}
