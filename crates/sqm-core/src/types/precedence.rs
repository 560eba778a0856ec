//! Highest-precedence type selection for mixed-type expressions.

use crate::types::Expressible;

/// Pick the type that should represent a list of operand types.
///
/// Folds left to right with [`widen`]; absent entries are skipped by the
/// pairwise rule, and an empty input yields `None`.
pub fn highest_precedence<'a, I>(types: I) -> Option<&'a Expressible>
where
    I: IntoIterator<Item = Option<&'a Expressible>>,
{
    let mut types = types.into_iter();
    let first = types.next()?;

    types.fold(first, widen)
}

/// Binary precedence rule.
///
/// A path operand wins over anything (the left path when both are paths).
/// Otherwise the right operand wins only when it is strictly wider, so ties
/// keep the left operand.
#[must_use]
pub fn widen<'a>(
    left: Option<&'a Expressible>,
    right: Option<&'a Expressible>,
) -> Option<&'a Expressible> {
    match (left, right) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only),
        (Some(left), Some(right)) => {
            if left.is_path() {
                Some(left)
            } else if right.is_path() || right.value_kind().is_wider(left.value_kind()) {
                Some(right)
            } else {
                Some(left)
            }
        }
    }
}
