//! Dashboards assembled from repository reads.

use chrono::Utc;

use crate::domain::dashboard::{
    AdminDashboard, ClientDashboard, MemberDashboard, clients_by_status, compute_workload,
    deliverables_by_column, summarize_campaigns, summarize_invoices, summarize_wallets,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{
    CampaignListQuery, CampaignReader, ClientListQuery, ClientReader, DeliverableListQuery,
    DeliverableReader, InvoiceListQuery, InvoiceReader, MessagingReader, TeamReader, TeamWriter,
    WalletReader,
};
use crate::repository::errors::RepositoryError;
use crate::services::wallet::billing_client;
use crate::services::{ServiceError, ServiceResult, ensure_role, sync_current_member, workspace_of};
use crate::SERVICE_ADMIN_ROLE;

/// Workspace-wide overview for administrators.
pub fn admin_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    low_balance_threshold: i64,
) -> ServiceResult<AdminDashboard>
where
    R: ClientReader
        + TeamReader
        + DeliverableReader
        + InvoiceReader
        + WalletReader
        + CampaignReader
        + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let today = Utc::now().date_naive();

    let load = |what: &str, err: RepositoryError| {
        log::error!("Failed to load {what} for workspace {workspace_id}: {err}");
        ServiceError::from(err)
    };

    let (_, clients) = repo
        .list_clients(ClientListQuery::new(workspace_id))
        .map_err(|err| load("clients", err))?;
    let deliverables = repo
        .list_deliverables(DeliverableListQuery::new(workspace_id))
        .map_err(|err| load("deliverables", err))?;
    let invoices = repo
        .list_invoices(InvoiceListQuery::new(workspace_id))
        .map_err(|err| load("invoices", err))?;
    let wallets = repo
        .list_wallets(workspace_id)
        .map_err(|err| load("wallets", err))?;
    let campaigns = repo
        .list_campaigns(CampaignListQuery::new(workspace_id))
        .map_err(|err| load("campaigns", err))?;
    let members = repo
        .list_members(workspace_id)
        .map_err(|err| load("team", err))?;

    let campaigns = summarize_campaigns(&campaigns);
    Ok(AdminDashboard {
        clients_by_status: clients_by_status(&clients),
        deliverables_by_column: deliverables_by_column(&deliverables),
        overdue_deliverables: deliverables.iter().filter(|d| d.is_overdue(today)).count(),
        invoices: summarize_invoices(&invoices, today),
        wallets: summarize_wallets(&clients, &wallets, low_balance_threshold),
        over_budget_campaigns: campaigns.over_budget_count(),
        campaigns,
        workload: compute_workload(&members, &deliverables, today),
    })
}

/// The caller's own queue and unread messages.
pub fn member_dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<MemberDashboard>
where
    R: TeamWriter + DeliverableReader + MessagingReader + ?Sized,
{
    let member = sync_current_member(repo, user)?;

    let mine = repo
        .list_deliverables(DeliverableListQuery::new(member.workspace_id).assignee(member.id))
        .map_err(|err| {
            log::error!("Failed to load deliverables of member {}: {err}", member.id);
            err
        })?;
    let unread = repo
        .list_member_channels(member.workspace_id, member.id)?
        .iter()
        .map(|summary| summary.unread)
        .sum();

    Ok(MemberDashboard::build(mine, unread, Utc::now().date_naive()))
}

/// Progress, package usage and billing of one client.
pub fn client_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<ClientDashboard>
where
    R: ClientReader
        + TeamWriter
        + DeliverableReader
        + InvoiceReader
        + WalletReader
        + ?Sized,
{
    let client = billing_client(repo, user, client_id)?;
    let workspace_id = client.workspace_id;

    let deliverables =
        repo.list_deliverables(DeliverableListQuery::new(workspace_id).client(client.id))?;
    let package_usage = repo.list_package_allocations(client.id)?;
    let wallet_balance = repo
        .get_wallet(client.id)?
        .map_or(0, |wallet| wallet.balance.cents());
    let open_invoices = repo
        .list_invoices(InvoiceListQuery::new(workspace_id).client(client.id))?
        .into_iter()
        .filter(|invoice| invoice.status.is_outstanding())
        .collect();

    Ok(ClientDashboard {
        deliverables_by_column: deliverables_by_column(&deliverables),
        client,
        package_usage,
        wallet_balance,
        open_invoices,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::deliverable::DeliverableStatus;
    use crate::domain::deliverable::tests::sample as deliverable;
    use crate::domain::invoice::InvoiceStatus;
    use crate::domain::invoice::tests::sample as invoice;
    use crate::domain::messaging::{Channel, ChannelKind, ChannelSummary};
    use crate::domain::types::{ChannelId, ChannelName, ClientId, Money, TeamMemberId, WorkspaceId};
    use crate::domain::wallet::ClientWallet;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn wallet(client_id: i32, balance: i64) -> ClientWallet {
        ClientWallet {
            client_id: ClientId::new(client_id).unwrap(),
            workspace_id: WorkspaceId::new(42).unwrap(),
            balance: Money::new(balance).unwrap(),
            updated_at: timestamp(),
        }
    }

    fn long_ago() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    #[test]
    fn admin_dashboard_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients().times(0);

        let result = admin_dashboard(&repo, &manager_user(), 10_000);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn admin_dashboard_aggregates_workspace() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .returning(|_| Ok((2, vec![client(1, "Acme"), client(2, "Globex")])));
        repo.expect_list_deliverables().returning(|_| {
            Ok(vec![
                deliverable(1, DeliverableStatus::InProgress, Some(long_ago())),
                deliverable(2, DeliverableStatus::Delivered, Some(long_ago())),
            ])
        });
        repo.expect_list_invoices().returning(|_| {
            Ok(vec![
                invoice(1, InvoiceStatus::Sent, long_ago(), 5_000),
                invoice(2, InvoiceStatus::Draft, long_ago(), 7_000),
            ])
        });
        repo.expect_list_wallets()
            .returning(|_| Ok(vec![wallet(1, 500), wallet(2, 50_000)]));
        repo.expect_list_campaigns().returning(|_| Ok(Vec::new()));
        repo.expect_list_members()
            .returning(|_| Ok(vec![member_for(&manager_user(), 5)]));

        let dashboard = admin_dashboard(&repo, &admin_user(), 10_000).unwrap();

        assert_eq!(dashboard.overdue_deliverables, 1);
        assert_eq!(dashboard.invoices.overdue_count, 1);
        assert_eq!(dashboard.invoices.outstanding_amount, 5_000);
        assert_eq!(dashboard.wallets.total_balance, 50_500);
        assert_eq!(
            dashboard.wallets.low_balance_clients,
            vec![ClientId::new(1).unwrap()]
        );
        assert_eq!(dashboard.workload.len(), 1);
    }

    #[test]
    fn member_dashboard_sums_unread_across_channels() {
        let user = manager_user();
        let mut repo = MockRepository::new();
        let member = member_for(&user, 5);
        repo.expect_sync_member()
            .returning(move |_| Ok(member.clone()));
        repo.expect_list_deliverables()
            .withf(|query| query.assignee_id.map(|id| id.get()) == Some(5))
            .returning(|_| Ok(vec![deliverable(1, DeliverableStatus::Review, None)]));
        repo.expect_list_member_channels().returning(|workspace_id, _| {
            let summary = |id: i32, unread: usize| ChannelSummary {
                channel: Channel {
                    id: ChannelId::new(id).unwrap(),
                    workspace_id,
                    name: ChannelName::new("general").unwrap(),
                    kind: ChannelKind::Public,
                    created_by: TeamMemberId::new(1).unwrap(),
                    created_at: timestamp(),
                },
                unread,
                last_message_id: None,
            };
            Ok(vec![summary(1, 2), summary(2, 3)])
        });

        let dashboard = member_dashboard(&repo, &user).unwrap();

        assert_eq!(dashboard.unread_messages, 5);
        assert_eq!(dashboard.open_deliverables.len(), 1);
    }

    #[test]
    fn client_dashboard_shows_only_open_invoices() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_email()
            .returning(|_, _| Ok(Some(client(1, "Acme"))));
        repo.expect_list_deliverables().returning(|_| Ok(Vec::new()));
        repo.expect_list_package_allocations()
            .returning(|_| Ok(Vec::new()));
        repo.expect_get_wallet().returning(|_| Ok(Some(wallet(1, 1_200))));
        repo.expect_list_invoices().returning(|_| {
            Ok(vec![
                invoice(1, InvoiceStatus::Overdue, long_ago(), 5_000),
                invoice(2, InvoiceStatus::Paid, long_ago(), 7_000),
            ])
        });

        let dashboard = client_dashboard(&repo, &portal_user(), 1).unwrap();

        assert_eq!(dashboard.wallet_balance, 1_200);
        assert_eq!(dashboard.open_invoices.len(), 1);
        assert_eq!(dashboard.deliverables_by_column.len(), 5);
    }
}
