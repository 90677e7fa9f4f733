use serde::Serialize;

use crate::domain::deliverable::DeliverableKind;
use crate::domain::package::PackageAllocation;

/// Allocation with the remaining units spelled out.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PackageUsage {
    pub kind: DeliverableKind,
    pub allocated: i32,
    pub used: i32,
    pub remaining: i32,
}

impl From<PackageAllocation> for PackageUsage {
    fn from(allocation: PackageAllocation) -> Self {
        Self {
            kind: allocation.kind,
            allocated: allocation.allocated,
            used: allocation.used,
            remaining: allocation.remaining(),
        }
    }
}
