use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::campaign::{
    Campaign as DomainCampaign, CampaignStatus, NewCampaign as DomainNewCampaign,
};
use crate::domain::types::{
    CampaignId, CampaignName, ClientId, Money, Platform, TypeConstraintError, WorkspaceId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct Campaign {
    pub id: i32,
    pub workspace_id: i32,
    pub client_id: i32,
    pub name: String,
    pub platform: String,
    pub status: String,
    pub budget: i64,
    pub spent: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct NewCampaign<'a> {
    pub workspace_id: i32,
    pub client_id: i32,
    pub name: &'a str,
    pub platform: &'a str,
    pub status: &'a str,
    pub budget: i64,
    pub spent: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl TryFrom<Campaign> for DomainCampaign {
    type Error = TypeConstraintError;

    fn try_from(row: Campaign) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CampaignId::new(row.id)?,
            workspace_id: WorkspaceId::new(row.workspace_id)?,
            client_id: ClientId::new(row.client_id)?,
            name: CampaignName::new(row.name)?,
            platform: Platform::new(row.platform)?,
            status: CampaignStatus::try_from(row.status.as_str())?,
            budget: Money::new(row.budget)?,
            spent: Money::new(row.spent)?,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewCampaign> for NewCampaign<'a> {
    fn from(campaign: &'a DomainNewCampaign) -> Self {
        Self {
            workspace_id: campaign.workspace_id.get(),
            client_id: campaign.client_id.get(),
            name: campaign.name.as_str(),
            platform: campaign.platform.as_str(),
            status: CampaignStatus::Planned.as_str(),
            budget: campaign.budget.cents(),
            spent: 0,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
        }
    }
}
