use chrono::Utc;
use diesel::prelude::*;

use crate::domain::campaign::{Campaign, CampaignStatus, NewCampaign};
use crate::domain::types::{CampaignId, PositiveAmount, WorkspaceId};
use crate::models::campaign::{Campaign as DbCampaign, NewCampaign as DbNewCampaign};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CampaignListQuery, CampaignReader, CampaignWriter, DieselRepository};

impl CampaignReader for DieselRepository {
    fn get_campaign_by_id(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Campaign>> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        let row = campaigns::table
            .filter(campaigns::id.eq(id.get()))
            .filter(campaigns::workspace_id.eq(workspace_id.get()))
            .first::<DbCampaign>(&mut conn)
            .optional()?;

        row.map(Campaign::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_campaigns(&self, query: CampaignListQuery) -> RepositoryResult<Vec<Campaign>> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        let mut items = campaigns::table
            .filter(campaigns::workspace_id.eq(query.workspace_id.get()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(client_id) = query.client_id {
            items = items.filter(campaigns::client_id.eq(client_id.get()));
        }
        if let Some(status) = query.status {
            items = items.filter(campaigns::status.eq(status.as_str()));
        }

        let rows = items
            .order((campaigns::start_date.desc(), campaigns::id.desc()))
            .load::<DbCampaign>(&mut conn)?;

        rows.into_iter()
            .map(|row| Campaign::try_from(row).map_err(RepositoryError::from))
            .collect()
    }
}

impl CampaignWriter for DieselRepository {
    fn create_campaign(&self, campaign: &NewCampaign) -> RepositoryResult<Campaign> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        let row = diesel::insert_into(campaigns::table)
            .values(&DbNewCampaign::from(campaign))
            .get_result::<DbCampaign>(&mut conn)?;
        Ok(Campaign::try_from(row)?)
    }

    fn update_campaign_status(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
        status: CampaignStatus,
    ) -> RepositoryResult<Campaign> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        let row = diesel::update(
            campaigns::table
                .filter(campaigns::id.eq(id.get()))
                .filter(campaigns::workspace_id.eq(workspace_id.get())),
        )
        .set((
            campaigns::status.eq(status.as_str()),
            campaigns::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbCampaign>(&mut conn)?;
        Ok(Campaign::try_from(row)?)
    }

    fn record_campaign_spend(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
        amount: PositiveAmount,
    ) -> RepositoryResult<Campaign> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        // Accumulated in SQL, not read-modify-write.
        let row = diesel::update(
            campaigns::table
                .filter(campaigns::id.eq(id.get()))
                .filter(campaigns::workspace_id.eq(workspace_id.get())),
        )
        .set((
            campaigns::spent.eq(campaigns::spent + amount.cents()),
            campaigns::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbCampaign>(&mut conn)?;
        Ok(Campaign::try_from(row)?)
    }
}
