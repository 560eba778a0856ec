use crate::{
    sql::SqlExpr,
    sqm::{SqmExpr, function::FunctionError},
    types::{Expressible, TypeFamily, ValueKind},
};
use std::{fmt, sync::Arc};

///
/// ArgumentsValidator
///
/// Checks a call's arguments twice: on the domain tree when the call is
/// built, and on the lowered arguments once their relational types are
/// known.
///

pub trait ArgumentsValidator: fmt::Debug + Send + Sync {
    fn validate(&self, arguments: &[SqmExpr], function: &str) -> Result<(), FunctionError>;

    fn validate_sql_types(
        &self,
        _arguments: &[SqlExpr],
        _function: &str,
    ) -> Result<(), FunctionError> {
        Ok(())
    }
}

///
/// ArgumentCount
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ArgumentCount {
    pub min: usize,
    pub max: Option<usize>,
}

impl ArgumentCount {
    #[must_use]
    pub const fn exactly(count: usize) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    #[must_use]
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    #[must_use]
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    fn describe(self) -> String {
        match self.max {
            Some(max) if max == self.min => format!("exactly {max}"),
            Some(max) => format!("{} to {max}", self.min),
            None => format!("at least {}", self.min),
        }
    }
}

impl ArgumentsValidator for ArgumentCount {
    fn validate(&self, arguments: &[SqmExpr], function: &str) -> Result<(), FunctionError> {
        let found = arguments.len();
        if found < self.min || self.max.is_some_and(|max| found > max) {
            return Err(FunctionError::ArgumentCount {
                function: function.to_string(),
                expected: self.describe(),
                found,
            });
        }

        Ok(())
    }
}

///
/// ArgumentFamilies
///
/// Per-position type families, with an optional family for every position
/// past the listed ones. Untyped arguments are accepted.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArgumentFamilies {
    pub positional: Vec<TypeFamily>,
    pub rest: Option<TypeFamily>,
}

impl ArgumentFamilies {
    #[must_use]
    pub const fn uniform(family: TypeFamily) -> Self {
        Self {
            positional: Vec::new(),
            rest: Some(family),
        }
    }

    #[must_use]
    pub const fn positional(families: Vec<TypeFamily>) -> Self {
        Self {
            positional: families,
            rest: None,
        }
    }

    fn family_at(&self, index: usize) -> Option<TypeFamily> {
        self.positional.get(index).copied().or(self.rest)
    }

    fn check(
        &self,
        function: &str,
        index: usize,
        kind: Option<ValueKind>,
    ) -> Result<(), FunctionError> {
        let (Some(expected), Some(found)) = (self.family_at(index), kind) else {
            return Ok(());
        };
        if found == ValueKind::Object || found.family() == expected {
            return Ok(());
        }

        Err(FunctionError::ArgumentType {
            function: function.to_string(),
            index,
            expected,
            found,
        })
    }
}

impl ArgumentsValidator for ArgumentFamilies {
    fn validate(&self, arguments: &[SqmExpr], function: &str) -> Result<(), FunctionError> {
        for (index, argument) in arguments.iter().enumerate() {
            let kind = argument.expressible_type()?.as_ref().map(Expressible::value_kind);
            self.check(function, index, kind)?;
        }

        Ok(())
    }

    fn validate_sql_types(
        &self,
        arguments: &[SqlExpr],
        function: &str,
    ) -> Result<(), FunctionError> {
        for (index, argument) in arguments.iter().enumerate() {
            self.check(function, index, argument.value_kind())?;
        }

        Ok(())
    }
}

///
/// AllOf
///

#[derive(Clone, Debug)]
pub struct AllOf(pub Vec<Arc<dyn ArgumentsValidator>>);

impl ArgumentsValidator for AllOf {
    fn validate(&self, arguments: &[SqmExpr], function: &str) -> Result<(), FunctionError> {
        self.0
            .iter()
            .try_for_each(|validator| validator.validate(arguments, function))
    }

    fn validate_sql_types(
        &self,
        arguments: &[SqlExpr],
        function: &str,
    ) -> Result<(), FunctionError> {
        self.0
            .iter()
            .try_for_each(|validator| validator.validate_sql_types(arguments, function))
    }
}
