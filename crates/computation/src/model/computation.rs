//! Computation requests.

use std::fmt;
use std::str::FromStr;

use crate::model::{ComputationId, Decimal, Expression, Name, StructureId};

/// Lifecycle state of a computation.
///
/// Only `New` is ever assigned by this crate; the other states are carried
/// through storage unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    New,
    Computing,
    Failed,
    Done,
}

impl Status {
    /// Returns the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::Computing => "COMPUTING",
            Status::Failed => "FAILED",
            Status::Done => "DONE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Status::New),
            "COMPUTING" => Ok(Status::Computing),
            "FAILED" => Ok(Status::Failed),
            "DONE" => Ok(Status::Done),
            _ => Err(()),
        }
    }
}

/// A request to evaluate an expression in the context of one element of a
/// structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Computation {
    pub id: ComputationId,
    pub structure_id: StructureId,
    pub element_name: Name,
    pub expression: Expression,
    pub status: Status,
    pub result: Option<Decimal>,
}

impl Computation {
    /// Creates a computation in state `New` without a result.
    pub fn new(
        id: ComputationId,
        structure_id: StructureId,
        element_name: impl Into<Name>,
        expression: impl Into<Expression>,
    ) -> Self {
        Self {
            id,
            structure_id,
            element_name: element_name.into(),
            expression: expression.into(),
            status: Status::New,
            result: None,
        }
    }

    /// Returns a copy carrying `id`.
    pub fn with_id(&self, id: ComputationId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Returns a copy in state `status`.
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_computation_starts_fresh() {
        let c = Computation::new(ComputationId::new(), StructureId::new(), "e", "1 + 2");
        assert_eq!(c.status, Status::New);
        assert_eq!(c.result, None);
        assert_eq!(c.expression.as_str(), "1 + 2");
    }

    #[test]
    fn test_with_copies() {
        let c = Computation::new(ComputationId::from("1"), StructureId::from("s"), "e", "x");
        let d = c.with_status(Status::Done).with_id(ComputationId::from("2"));
        assert_eq!(c.status, Status::New);
        assert_eq!(d.status, Status::Done);
        assert_eq!(d.id.as_str(), "2");
        assert_eq!(d.structure_id, c.structure_id);
    }

    #[test]
    fn test_status_strings() {
        for status in [Status::New, Status::Computing, Status::Failed, Status::Done] {
            assert_eq!(status.as_str().parse::<Status>(), Ok(status));
        }
        assert!("new".parse::<Status>().is_err());
    }
}
