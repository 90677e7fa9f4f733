//! Package allocations: how many deliverables of each kind a client's plan covers.

use serde::Serialize;

use crate::domain::deliverable::DeliverableKind;
use crate::domain::types::{ClientId, TypeConstraintError};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PackageAllocation {
    pub client_id: ClientId,
    pub kind: DeliverableKind,
    pub allocated: i32,
    pub used: i32,
}

impl PackageAllocation {
    pub fn remaining(&self) -> i32 {
        (self.allocated - self.used).max(0)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.allocated
    }

    /// Returns the allocation with one more unit used, or `None` when exhausted.
    pub fn consume_one(&self) -> Option<Self> {
        if self.is_exhausted() {
            return None;
        }
        Some(Self {
            used: self.used + 1,
            ..self.clone()
        })
    }

    /// Gives back one unit; usage never drops below zero.
    pub fn restore_one(&self) -> Self {
        Self {
            used: (self.used - 1).max(0),
            ..self.clone()
        }
    }
}

/// Requested allocation size for a client and kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPackageAllocation {
    pub client_id: ClientId,
    pub kind: DeliverableKind,
    pub allocated: i32,
}

impl NewPackageAllocation {
    pub fn try_new(
        client_id: ClientId,
        kind: DeliverableKind,
        allocated: i32,
    ) -> Result<Self, TypeConstraintError> {
        if allocated < 0 {
            return Err(TypeConstraintError::InvalidValue(
                "allocation cannot be negative".to_string(),
            ));
        }
        Ok(Self {
            client_id,
            kind,
            allocated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation(allocated: i32, used: i32) -> PackageAllocation {
        PackageAllocation {
            client_id: ClientId::new(1).unwrap(),
            kind: DeliverableKind::Video,
            allocated,
            used,
        }
    }

    #[test]
    fn consume_stops_at_allocation() {
        let first = allocation(2, 0).consume_one().unwrap();
        let second = first.consume_one().unwrap();
        assert_eq!(second.used, 2);
        assert_eq!(second.remaining(), 0);
        assert!(second.consume_one().is_none());
    }

    #[test]
    fn restore_never_goes_negative() {
        assert_eq!(allocation(3, 0).restore_one().used, 0);
        assert_eq!(allocation(3, 2).restore_one().used, 1);
    }

    #[test]
    fn negative_allocation_is_rejected() {
        let result = NewPackageAllocation::try_new(ClientId::new(1).unwrap(), DeliverableKind::Copy, -1);
        assert!(result.is_err());
    }
}
