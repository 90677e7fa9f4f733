use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::campaign::{CampaignStatus, NewCampaign};
use crate::domain::types::{
    CampaignName, ClientId, Money, Platform, PositiveAmount, WorkspaceId,
};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct CampaignForm {
    pub client_id: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 60))]
    pub platform: String,
    /// Budget in cents.
    #[validate(range(min = 0))]
    pub budget: i64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl CampaignForm {
    pub fn into_domain(self, workspace_id: WorkspaceId) -> Result<NewCampaign, FormError> {
        self.validate()?;
        Ok(NewCampaign::try_new(
            workspace_id,
            ClientId::new(self.client_id).map_err(|_| FormError::InvalidId)?,
            CampaignName::new(self.name).map_err(|_| FormError::InvalidName)?,
            Platform::new(self.platform)?,
            Money::new(self.budget)?,
            self.start_date,
            self.end_date,
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CampaignStatusForm {
    pub status: CampaignStatus,
}

#[derive(Debug, Deserialize)]
pub struct SpendForm {
    /// Amount in cents, strictly positive.
    pub amount: i64,
}

impl TryFrom<SpendForm> for PositiveAmount {
    type Error = FormError;

    fn try_from(form: SpendForm) -> Result<Self, Self::Error> {
        Ok(PositiveAmount::new(form.amount)?)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CampaignsQuery {
    pub client_id: Option<i32>,
    pub status: Option<CampaignStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_must_be_positive() {
        assert!(PositiveAmount::try_from(SpendForm { amount: 0 }).is_err());
        assert_eq!(
            PositiveAmount::try_from(SpendForm { amount: 1_250 })
                .unwrap()
                .cents(),
            1_250
        );
    }

    #[test]
    fn negative_budget_fails_validation() {
        let form = CampaignForm {
            client_id: 1,
            name: "Summer".to_string(),
            platform: "TikTok".to_string(),
            budget: -1,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: None,
        };
        assert!(matches!(
            form.into_domain(WorkspaceId::new(1).unwrap()),
            Err(FormError::Validation(_))
        ));
    }
}
