use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::deliverable::{
    DeliverableKind, DeliverableStatus, NewDeliverable, UpdateDeliverable,
};
use crate::domain::package::NewPackageAllocation;
use crate::domain::types::{
    CampaignId, ClientId, DeliverableTitle, TeamMemberId, TypeConstraintError, WorkspaceId,
};
use crate::forms::FormError;

fn optional_id<T>(
    value: Option<i32>,
    make: fn(i32) -> Result<T, TypeConstraintError>,
) -> Result<Option<T>, FormError> {
    value
        .map(make)
        .transpose()
        .map_err(|_| FormError::InvalidId)
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeliverableForm {
    pub client_id: i32,
    #[serde(default)]
    pub campaign_id: Option<i32>,
    #[serde(default)]
    pub assignee_id: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub kind: DeliverableKind,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

pub struct DeliverablePayload {
    pub client_id: ClientId,
    pub campaign_id: Option<CampaignId>,
    pub assignee_id: Option<TeamMemberId>,
    pub title: DeliverableTitle,
    pub kind: DeliverableKind,
    pub due_date: Option<NaiveDate>,
}

impl TryFrom<DeliverableForm> for DeliverablePayload {
    type Error = FormError;

    fn try_from(form: DeliverableForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            client_id: ClientId::new(form.client_id).map_err(|_| FormError::InvalidId)?,
            campaign_id: optional_id(form.campaign_id, CampaignId::new)?,
            assignee_id: optional_id(form.assignee_id, TeamMemberId::new)?,
            title: DeliverableTitle::new(form.title).map_err(|_| FormError::InvalidName)?,
            kind: form.kind,
            due_date: form.due_date,
        })
    }
}

impl DeliverablePayload {
    pub fn into_domain(self, workspace_id: WorkspaceId) -> NewDeliverable {
        NewDeliverable {
            workspace_id,
            client_id: self.client_id,
            campaign_id: self.campaign_id,
            assignee_id: self.assignee_id,
            title: self.title,
            kind: self.kind,
            due_date: self.due_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDeliverableForm {
    #[serde(default)]
    pub campaign_id: Option<i32>,
    #[serde(default)]
    pub assignee_id: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub kind: DeliverableKind,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl TryFrom<UpdateDeliverableForm> for UpdateDeliverable {
    type Error = FormError;

    fn try_from(form: UpdateDeliverableForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            campaign_id: optional_id(form.campaign_id, CampaignId::new)?,
            assignee_id: optional_id(form.assignee_id, TeamMemberId::new)?,
            title: DeliverableTitle::new(form.title).map_err(|_| FormError::InvalidName)?,
            kind: form.kind,
            due_date: form.due_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MoveDeliverableForm {
    pub status: DeliverableStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AllocationForm {
    pub kind: DeliverableKind,
    #[validate(range(min = 0))]
    pub allocated: i32,
}

impl AllocationForm {
    pub fn into_domain(self, client_id: ClientId) -> Result<NewPackageAllocation, FormError> {
        self.validate()?;
        Ok(NewPackageAllocation::try_new(
            client_id,
            self.kind,
            self.allocated,
        )?)
    }
}

/// Filters accepted by the deliverable list.
#[derive(Debug, Default, Deserialize)]
pub struct DeliverablesQuery {
    pub client_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub status: Option<DeliverableStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_rejects_bad_ids() {
        let form: DeliverableForm = serde_json::from_str(
            r#"{"client_id":3,"title":"Launch reel","kind":"video","due_date":"2025-04-01"}"#,
        )
        .unwrap();
        let payload = DeliverablePayload::try_from(form).unwrap();
        assert_eq!(payload.kind, DeliverableKind::Video);
        assert!(payload.assignee_id.is_none());

        let form: DeliverableForm =
            serde_json::from_str(r#"{"client_id":3,"assignee_id":0,"title":"x","kind":"copy"}"#)
                .unwrap();
        assert!(matches!(
            DeliverablePayload::try_from(form),
            Err(FormError::InvalidId)
        ));
    }

    #[test]
    fn unknown_status_fails_to_deserialize() {
        assert!(serde_json::from_str::<MoveDeliverableForm>(r#"{"status":"done"}"#).is_err());
        let form: MoveDeliverableForm =
            serde_json::from_str(r#"{"status":"in_progress"}"#).unwrap();
        assert_eq!(form.status, DeliverableStatus::InProgress);
    }
}
