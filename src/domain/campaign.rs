use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::types::{
    CampaignId, CampaignName, ClientId, Money, Platform, TypeConstraintError, WorkspaceId,
};

text_enum!(
    CampaignStatus {
        Planned => "planned",
        Active => "active",
        Paused => "paused",
        Completed => "completed",
    }
);

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Campaign {
    pub id: CampaignId,
    pub workspace_id: WorkspaceId,
    pub client_id: ClientId,
    pub name: CampaignName,
    pub platform: Platform,
    pub status: CampaignStatus,
    pub budget: Money,
    pub spent: Money,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Campaign {
    /// Spend as a whole percentage of budget. A zero budget with any spend
    /// reports 100.
    pub fn utilization_percent(&self) -> u32 {
        let budget = self.budget.cents();
        let spent = self.spent.cents();
        if budget == 0 {
            return if spent > 0 { 100 } else { 0 };
        }
        u32::try_from(spent.saturating_mul(100) / budget).unwrap_or(u32::MAX)
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent > self.budget
    }

    /// Budget left to spend; negative once the campaign overspends.
    pub fn remaining_cents(&self) -> i64 {
        self.budget.cents() - self.spent.cents()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCampaign {
    pub workspace_id: WorkspaceId,
    pub client_id: ClientId,
    pub name: CampaignName,
    pub platform: Platform,
    pub budget: Money,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl NewCampaign {
    pub fn try_new(
        workspace_id: WorkspaceId,
        client_id: ClientId,
        name: CampaignName,
        platform: Platform,
        budget: Money,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, TypeConstraintError> {
        if end_date.is_some_and(|end| end < start_date) {
            return Err(TypeConstraintError::InvalidValue(
                "campaign cannot end before it starts".to_string(),
            ));
        }
        Ok(Self {
            workspace_id,
            client_id,
            name,
            platform,
            budget,
            start_date,
            end_date,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample(id: i32, budget: i64, spent: i64) -> Campaign {
        let start = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let now = start.and_hms_opt(9, 0, 0).unwrap();
        Campaign {
            id: CampaignId::new(id).unwrap(),
            workspace_id: WorkspaceId::new(1).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            name: CampaignName::new("Spring launch").unwrap(),
            platform: Platform::new("Meta").unwrap(),
            status: CampaignStatus::Active,
            budget: Money::new(budget).unwrap(),
            spent: Money::new(spent).unwrap(),
            start_date: start,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn utilization_and_overspend() {
        let half = sample(1, 10_000, 5_000);
        assert_eq!(half.utilization_percent(), 50);
        assert!(!half.is_over_budget());

        let over = sample(2, 10_000, 12_500);
        assert_eq!(over.utilization_percent(), 125);
        assert!(over.is_over_budget());
        assert_eq!(over.remaining_cents(), -2_500);

        assert_eq!(sample(3, 0, 0).utilization_percent(), 0);
        assert_eq!(sample(4, 0, 1).utilization_percent(), 100);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let result = NewCampaign::try_new(
            WorkspaceId::new(1).unwrap(),
            ClientId::new(1).unwrap(),
            CampaignName::new("x").unwrap(),
            Platform::new("Google").unwrap(),
            Money::ZERO,
            start,
            Some(start.pred_opt().unwrap()),
        );
        assert!(result.is_err());
    }
}
