//! Campaign budgets and spend tracking.

use std::collections::HashSet;

use crate::domain::campaign::Campaign;
use crate::domain::dashboard::{CampaignSummary, summarize_campaigns};
use crate::domain::team_member::TeamMember;
use crate::domain::types::{CampaignId, ClientId, PositiveAmount};
use crate::forms::campaigns::{CampaignForm, CampaignStatusForm, CampaignsQuery, SpendForm};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{ChangeAction, ChangeEvent, EventHub};
use crate::repository::{
    CampaignListQuery, CampaignReader, CampaignWriter, ClientListQuery, ClientReader, TeamWriter,
};
use crate::services::{
    ServiceError, ServiceResult, accessible_client, is_portal_user, is_restricted_manager,
    portal_client, sync_current_member,
};

fn publish_campaign(hub: &EventHub, campaign: &Campaign, action: ChangeAction) {
    hub.publish(ChangeEvent::new(
        campaign.workspace_id,
        "campaigns",
        action,
        campaign.id.get(),
        campaign,
    ));
}

fn accessible_campaign<R>(
    repo: &R,
    user: &AuthenticatedUser,
    member: &TeamMember,
    campaign_id: i32,
) -> ServiceResult<Campaign>
where
    R: CampaignReader + ClientReader + ?Sized,
{
    let campaign = repo
        .get_campaign_by_id(CampaignId::new(campaign_id)?, member.workspace_id)?
        .ok_or(ServiceError::NotFound)?;
    accessible_client(repo, user, member, campaign.client_id.get())?;
    Ok(campaign)
}

pub fn create_campaign<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: CampaignForm,
) -> ServiceResult<Campaign>
where
    R: ClientReader + TeamWriter + CampaignWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let new_campaign = form.into_domain(member.workspace_id)?;
    accessible_client(repo, user, &member, new_campaign.client_id.get())?;

    let campaign = repo.create_campaign(&new_campaign).map_err(|err| {
        log::error!("Failed to create campaign: {err}");
        err
    })?;

    publish_campaign(hub, &campaign, ChangeAction::Insert);
    Ok(campaign)
}

pub fn update_campaign_status<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    campaign_id: i32,
    form: CampaignStatusForm,
) -> ServiceResult<Campaign>
where
    R: ClientReader + TeamWriter + CampaignReader + CampaignWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let current = accessible_campaign(repo, user, &member, campaign_id)?;

    let campaign = repo
        .update_campaign_status(current.id, member.workspace_id, form.status)
        .map_err(|err| {
            log::error!("Failed to update campaign {} status: {err}", current.id);
            err
        })?;

    publish_campaign(hub, &campaign, ChangeAction::Update);
    Ok(campaign)
}

/// Adds spend to a campaign. Overspending is allowed and shows up as over budget.
pub fn record_spend<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    campaign_id: i32,
    form: SpendForm,
) -> ServiceResult<Campaign>
where
    R: ClientReader + TeamWriter + CampaignReader + CampaignWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let current = accessible_campaign(repo, user, &member, campaign_id)?;
    let amount = PositiveAmount::try_from(form)?;

    let campaign = repo
        .record_campaign_spend(current.id, member.workspace_id, amount)
        .map_err(|err| {
            log::error!("Failed to record spend on campaign {}: {err}", current.id);
            err
        })?;

    if campaign.is_over_budget() && !current.is_over_budget() {
        log::warn!(
            "Campaign {} went over budget: spent {} of {}",
            campaign.id,
            campaign.spent,
            campaign.budget
        );
    }

    publish_campaign(hub, &campaign, ChangeAction::Update);
    Ok(campaign)
}

/// Campaigns visible to the caller. Portal users see their own client's campaigns.
pub fn list_campaigns<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: CampaignsQuery,
) -> ServiceResult<Vec<Campaign>>
where
    R: ClientReader + TeamWriter + CampaignReader + ?Sized,
{
    if is_portal_user(user) {
        let client = portal_client(repo, user)?;
        let mut list_query = CampaignListQuery::new(client.workspace_id).client(client.id);
        if let Some(status) = query.status {
            list_query = list_query.status(status);
        }
        return Ok(repo.list_campaigns(list_query)?);
    }

    let member = sync_current_member(repo, user)?;
    let mut list_query = CampaignListQuery::new(member.workspace_id);
    if let Some(client_id) = query.client_id {
        list_query = list_query.client(ClientId::new(client_id)?);
    }
    if let Some(status) = query.status {
        list_query = list_query.status(status);
    }

    let mut campaigns = repo.list_campaigns(list_query).map_err(|err| {
        log::error!("Failed to list campaigns: {err}");
        err
    })?;

    if is_restricted_manager(user) {
        let (_, assigned) =
            repo.list_clients(ClientListQuery::new(member.workspace_id).member(member.id))?;
        let assigned: HashSet<ClientId> = assigned.into_iter().map(|client| client.id).collect();
        campaigns.retain(|campaign| assigned.contains(&campaign.client_id));
    }

    Ok(campaigns)
}

/// Budget and spend totals over the listed campaigns.
pub fn campaign_summary<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: CampaignsQuery,
) -> ServiceResult<CampaignSummary>
where
    R: ClientReader + TeamWriter + CampaignReader + ?Sized,
{
    let campaigns = list_campaigns(repo, user, query)?;
    Ok(summarize_campaigns(&campaigns))
}
