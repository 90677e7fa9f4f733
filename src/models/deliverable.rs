//! Diesel models for deliverables and package allocations.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::deliverable::{
    Deliverable as DomainDeliverable, DeliverableKind, DeliverableStatus,
    NewDeliverable as DomainNewDeliverable, UpdateDeliverable as DomainUpdateDeliverable,
};
use crate::domain::package::PackageAllocation as DomainPackageAllocation;
use crate::domain::types::{
    CampaignId, ClientId, DeliverableId, DeliverableTitle, TeamMemberId, TypeConstraintError,
    WorkspaceId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::deliverables)]
pub struct Deliverable {
    pub id: i32,
    pub workspace_id: i32,
    pub client_id: i32,
    pub campaign_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub title: String,
    pub kind: String,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::deliverables)]
pub struct NewDeliverable<'a> {
    pub workspace_id: i32,
    pub client_id: i32,
    pub campaign_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub title: &'a str,
    pub kind: &'a str,
    pub status: &'a str,
    pub due_date: Option<NaiveDate>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::deliverables)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateDeliverable<'a> {
    pub campaign_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub title: &'a str,
    pub kind: &'a str,
    pub due_date: Option<NaiveDate>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Queryable, Selectable, AsChangeset)]
#[diesel(table_name = crate::schema::package_allocations)]
pub struct PackageAllocation {
    pub client_id: i32,
    pub kind: String,
    pub allocated: i32,
    pub used: i32,
}

impl TryFrom<Deliverable> for DomainDeliverable {
    type Error = TypeConstraintError;

    fn try_from(row: Deliverable) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DeliverableId::new(row.id)?,
            workspace_id: WorkspaceId::new(row.workspace_id)?,
            client_id: ClientId::new(row.client_id)?,
            campaign_id: row.campaign_id.map(CampaignId::new).transpose()?,
            assignee_id: row.assignee_id.map(TeamMemberId::new).transpose()?,
            title: DeliverableTitle::new(row.title)?,
            kind: DeliverableKind::try_from(row.kind.as_str())?,
            status: DeliverableStatus::try_from(row.status.as_str())?,
            due_date: row.due_date,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewDeliverable> for NewDeliverable<'a> {
    fn from(deliverable: &'a DomainNewDeliverable) -> Self {
        Self {
            workspace_id: deliverable.workspace_id.get(),
            client_id: deliverable.client_id.get(),
            campaign_id: deliverable.campaign_id.map(CampaignId::get),
            assignee_id: deliverable.assignee_id.map(TeamMemberId::get),
            title: deliverable.title.as_str(),
            kind: deliverable.kind.as_str(),
            status: DeliverableStatus::Backlog.as_str(),
            due_date: deliverable.due_date,
        }
    }
}

impl<'a> UpdateDeliverable<'a> {
    pub fn from_domain(update: &'a DomainUpdateDeliverable, updated_at: NaiveDateTime) -> Self {
        Self {
            campaign_id: update.campaign_id.map(CampaignId::get),
            assignee_id: update.assignee_id.map(TeamMemberId::get),
            title: update.title.as_str(),
            kind: update.kind.as_str(),
            due_date: update.due_date,
            updated_at,
        }
    }
}

impl TryFrom<PackageAllocation> for DomainPackageAllocation {
    type Error = TypeConstraintError;

    fn try_from(row: PackageAllocation) -> Result<Self, Self::Error> {
        Ok(Self {
            client_id: ClientId::new(row.client_id)?,
            kind: DeliverableKind::try_from(row.kind.as_str())?,
            allocated: row.allocated,
            used: row.used,
        })
    }
}

impl From<&DomainPackageAllocation> for PackageAllocation {
    fn from(allocation: &DomainPackageAllocation) -> Self {
        Self {
            client_id: allocation.client_id.get(),
            kind: allocation.kind.as_str().to_string(),
            allocated: allocation.allocated,
            used: allocation.used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_deliverable_starts_in_backlog() {
        let domain = DomainNewDeliverable {
            workspace_id: WorkspaceId::new(1).unwrap(),
            client_id: ClientId::new(2).unwrap(),
            campaign_id: None,
            assignee_id: Some(TeamMemberId::new(5).unwrap()),
            title: DeliverableTitle::new("Launch video").unwrap(),
            kind: DeliverableKind::Video,
            due_date: None,
        };
        let row = NewDeliverable::from(&domain);
        assert_eq!(row.status, "backlog");
        assert_eq!(row.kind, "video");
        assert_eq!(row.assignee_id, Some(5));
    }

    #[test]
    fn in_progress_status_parses() {
        let row = Deliverable {
            id: 1,
            workspace_id: 1,
            client_id: 1,
            campaign_id: None,
            assignee_id: None,
            title: "Post".into(),
            kind: "copy".into(),
            status: "in_progress".into(),
            due_date: None,
            completed_at: None,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        };
        let deliverable = DomainDeliverable::try_from(row).unwrap();
        assert_eq!(deliverable.status, DeliverableStatus::InProgress);
    }
}
