//! Elements and their numeric definitions.

use std::collections::BTreeSet;

use crate::model::{Decimal, Name};

/// A named numeric value attached to an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Definition {
    pub name: Name,
    pub value: Decimal,
}

impl Definition {
    /// Creates a definition.
    pub fn new(name: impl Into<Name>, value: Decimal) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A node of a structure: a name plus a set of definitions.
///
/// Definitions are unique by full value, so two definitions with the same
/// name but different values are both kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element {
    pub name: Name,
    pub definitions: BTreeSet<Definition>,
}

impl Element {
    /// Creates an element.
    pub fn new(name: impl Into<Name>, definitions: impl IntoIterator<Item = Definition>) -> Self {
        Self {
            name: name.into(),
            definitions: definitions.into_iter().collect(),
        }
    }

    /// Creates an element without definitions.
    pub fn named(name: impl Into<Name>) -> Self {
        Self::new(name, std::iter::empty())
    }

    /// Iterates over the values of all definitions called `name`.
    pub fn values_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Decimal> + 'a {
        self.definitions
            .iter()
            .filter(move |d| d.name.as_str() == name)
            .map(|d| d.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_with_same_name_are_kept() {
        let element = Element::new(
            "a",
            [
                Definition::new("x", Decimal::from(1)),
                Definition::new("x", Decimal::from(2)),
                Definition::new("x", Decimal::from(1)),
            ],
        );
        assert_eq!(element.definitions.len(), 2);
        assert_eq!(element.values_of("x").count(), 2);
        assert_eq!(element.values_of("y").count(), 0);
    }

    #[test]
    fn test_element_equality_by_value() {
        let a = Element::new("a", [Definition::new("x", Decimal::from(1))]);
        let b = Element::new("a", [Definition::new("x", "1.0".parse().unwrap())]);
        assert_eq!(a, b);
        assert_ne!(a, Element::named("a"));
    }
}
