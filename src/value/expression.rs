//! This module contains the primitive expressions that appear in array
//! indices, array lengths and bounds clauses.

use std::fmt::{Display, Formatter};

/// An integer-valued expression over concrete values and symbolic terms.
///
/// The textual form produced by [`Display`] is canonical: structurally equal
/// expressions always render identically, and it is this form that goes into
/// the identity of the alternatives that mention the expression.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Expression {
    /// A concrete integer.
    Int(i64),

    /// A symbolic integer standing for an unknown input, identified by name.
    Term(String),

    /// The sum of two expressions.
    Add(Box<Expression>, Box<Expression>),

    /// The difference of two expressions.
    Sub(Box<Expression>, Box<Expression>),
}

impl Expression {
    /// Constructs a symbolic term called `name`.
    #[must_use]
    pub fn term(name: impl Into<String>) -> Self {
        Self::Term(name.into())
    }

    /// Constructs the sum of `self` and `other`.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::Add(Box::new(self), Box::new(other))
    }

    /// Constructs the difference of `self` and `other`.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::Sub(Box::new(self), Box::new(other))
    }

    /// Gets the value of the expression if it contains no symbolic terms.
    ///
    /// Arithmetic that would overflow yields [`None`].
    #[must_use]
    pub fn as_concrete(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Term(_) => None,
            Self::Add(left, right) => left.as_concrete()?.checked_add(right.as_concrete()?),
            Self::Sub(left, right) => left.as_concrete()?.checked_sub(right.as_concrete()?),
        }
    }

    /// Gets the names of the symbolic terms in the expression, in order of
    /// appearance and possibly repeated.
    #[must_use]
    pub fn terms(&self) -> Vec<&str> {
        match self {
            Self::Int(_) => vec![],
            Self::Term(name) => vec![name.as_str()],
            Self::Add(left, right) | Self::Sub(left, right) => {
                let mut terms = left.terms();
                terms.extend(right.terms());
                terms
            }
        }
    }

    /// Checks if the expression is a single symbolic term.
    #[must_use]
    pub fn is_term(&self) -> bool {
        matches!(self, Self::Term(_))
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Term(name) => write!(f, "{{{name}}}"),
            Self::Add(left, right) => write!(f, "({left} + {right})"),
            Self::Sub(left, right) => write!(f, "({left} - {right})"),
        }
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

#[cfg(test)]
mod test {
    use crate::value::expression::Expression;

    #[test]
    fn concrete_expressions_evaluate() {
        let expr = Expression::Int(3).add(Expression::Int(4)).sub(Expression::Int(2));
        assert_eq!(expr.as_concrete(), Some(5));
        assert_eq!(expr.to_string(), "((3 + 4) - 2)");
    }

    #[test]
    fn symbolic_expressions_do_not_evaluate() {
        let expr = Expression::term("i").add(Expression::Int(1));
        assert_eq!(expr.as_concrete(), None);
        assert_eq!(expr.terms(), vec!["i"]);
        assert_eq!(expr.to_string(), "({i} + 1)");
    }

    #[test]
    fn overflow_is_not_a_value() {
        let expr = Expression::Int(i64::MAX).add(Expression::Int(1));
        assert_eq!(expr.as_concrete(), None);
    }
}
