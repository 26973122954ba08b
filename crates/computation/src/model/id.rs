//! String-backed identifiers and names.
//!
//! Structure and computation ids are distinct types even though both wrap a
//! string, so one can never be passed where the other is expected. Freshly
//! generated ids are random UUID v4 strings; any other string (including
//! sentinel ids that are known not to exist) can be wrapped as-is.

use std::fmt;

use uuid::Uuid;

macro_rules! identity {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh random identity.
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the wrapped string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwraps into the underlying string.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identity!(
    /// Identity of a stored [`Structure`](crate::model::Structure).
    StructureId
);

identity!(
    /// Identity of a stored [`Computation`](crate::model::Computation).
    ComputationId
);

/// Name of an element or definition.
///
/// Equality and ordering are by the wrapped string. The default name is
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    /// Creates a name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the wrapped string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_uuids() {
        let a = StructureId::new();
        let b = StructureId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_wrapped_id_keeps_string() {
        let id = ComputationId::from("not-found");
        assert_eq!(id.as_str(), "not-found");
        assert_eq!(id.to_string(), "not-found");
        assert_eq!(id.into_string(), "not-found".to_string());
    }

    #[test]
    fn test_ids_order_lexicographically() {
        let mut ids = vec![
            StructureId::from("b"),
            StructureId::from("a"),
            StructureId::from("ab"),
        ];
        ids.sort();
        let sorted: Vec<_> = ids.iter().map(StructureId::as_str).collect();
        assert_eq!(sorted, vec!["a", "ab", "b"]);
    }

    #[test]
    fn test_name_default_is_empty() {
        assert_eq!(Name::default().as_str(), "");
        assert_eq!(Name::new("x"), Name::from("x"));
        assert!(Name::from("a") < Name::from("b"));
    }
}
