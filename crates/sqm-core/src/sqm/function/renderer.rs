use crate::sql::{SqlExpr, SqlWriter};
use std::fmt;

///
/// FunctionRenderer
///

pub trait FunctionRenderer: fmt::Debug + Send + Sync {
    fn render(&self, name: &str, arguments: &[SqlExpr], writer: &mut SqlWriter);
}

///
/// StandardFunctionRenderer
///
/// `name(arg, ...)`
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardFunctionRenderer;

impl FunctionRenderer for StandardFunctionRenderer {
    fn render(&self, name: &str, arguments: &[SqlExpr], writer: &mut SqlWriter) {
        writer.push_str(name);
        writer.push_str("(");
        writer.render_list(arguments);
        writer.push_str(")");
    }
}

///
/// KeywordFunctionRenderer
///
/// Niladic functions written as a bare keyword (`current_date`).
///

#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordFunctionRenderer;

impl FunctionRenderer for KeywordFunctionRenderer {
    fn render(&self, name: &str, _: &[SqlExpr], writer: &mut SqlWriter) {
        writer.push_str(name);
    }
}
