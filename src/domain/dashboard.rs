//! Read-side aggregates shown on the admin, member and client dashboards.
//!
//! Everything here is computed in memory from rows the repository already
//! returned, so each aggregate can be tested without a database.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::campaign::Campaign;
use crate::domain::client::{Client, ClientStatus};
use crate::domain::deliverable::{Deliverable, DeliverableStatus};
use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::package::PackageAllocation;
use crate::domain::team_member::TeamMember;
use crate::domain::types::{CampaignId, ClientId, MemberName, TeamMemberId};
use crate::domain::wallet::ClientWallet;

/// Horizon used for "due soon".
pub const DUE_SOON_DAYS: u64 = 7;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: usize,
}

pub fn clients_by_status(clients: &[Client]) -> Vec<StatusCount<ClientStatus>> {
    ClientStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: clients.iter().filter(|c| c.status == *status).count(),
        })
        .collect()
}

pub fn deliverables_by_column(deliverables: &[Deliverable]) -> Vec<StatusCount<DeliverableStatus>> {
    DeliverableStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: deliverables.iter().filter(|d| d.status == *status).count(),
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct InvoiceSummary {
    /// Drives the overdue banner.
    pub overdue_count: usize,
    pub overdue_amount: i64,
    pub outstanding_amount: i64,
    pub paid_this_month: i64,
}

pub fn summarize_invoices(invoices: &[Invoice], today: NaiveDate) -> InvoiceSummary {
    let mut summary = InvoiceSummary::default();
    for invoice in invoices {
        let total = invoice.total.cents();
        if invoice.is_overdue(today) {
            summary.overdue_count += 1;
            summary.overdue_amount = summary.overdue_amount.saturating_add(total);
        }
        if invoice.status.is_outstanding() {
            summary.outstanding_amount = summary.outstanding_amount.saturating_add(total);
        }
        let paid_now = invoice.status == InvoiceStatus::Paid
            && invoice
                .paid_at
                .is_some_and(|at| at.year() == today.year() && at.month() == today.month());
        if paid_now {
            summary.paid_this_month = summary.paid_this_month.saturating_add(total);
        }
    }
    summary
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CampaignUtilization {
    pub campaign_id: CampaignId,
    pub client_id: ClientId,
    pub budget: i64,
    pub spent: i64,
    pub utilization_percent: u32,
    pub over_budget: bool,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct CampaignSummary {
    pub total_budget: i64,
    pub total_spent: i64,
    pub campaigns: Vec<CampaignUtilization>,
    pub over_budget: Vec<CampaignId>,
}

impl CampaignSummary {
    pub fn over_budget_count(&self) -> usize {
        self.over_budget.len()
    }
}

pub fn summarize_campaigns(campaigns: &[Campaign]) -> CampaignSummary {
    let mut summary = CampaignSummary::default();
    for campaign in campaigns {
        summary.total_budget = summary.total_budget.saturating_add(campaign.budget.cents());
        summary.total_spent = summary.total_spent.saturating_add(campaign.spent.cents());
        if campaign.is_over_budget() {
            summary.over_budget.push(campaign.id);
        }
        summary.campaigns.push(CampaignUtilization {
            campaign_id: campaign.id,
            client_id: campaign.client_id,
            budget: campaign.budget.cents(),
            spent: campaign.spent.cents(),
            utilization_percent: campaign.utilization_percent(),
            over_budget: campaign.is_over_budget(),
        });
    }
    summary
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct WalletSummary {
    pub total_balance: i64,
    /// Clients whose balance is strictly below the threshold.
    pub low_balance_clients: Vec<ClientId>,
}

/// Every client counts; one that never received a credit has no wallet row
/// and sits at zero.
pub fn summarize_wallets(
    clients: &[Client],
    wallets: &[ClientWallet],
    low_balance_threshold: i64,
) -> WalletSummary {
    let balances: HashMap<ClientId, i64> = wallets
        .iter()
        .map(|wallet| (wallet.client_id, wallet.balance.cents()))
        .collect();

    let mut summary = WalletSummary::default();
    for client in clients {
        let balance = balances.get(&client.id).copied().unwrap_or(0);
        summary.total_balance = summary.total_balance.saturating_add(balance);
        if balance < low_balance_threshold {
            summary.low_balance_clients.push(client.id);
        }
    }
    summary
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MemberWorkload {
    pub member_id: TeamMemberId,
    pub name: MemberName,
    pub capacity: i32,
    pub open: usize,
    pub overdue: usize,
    pub due_soon: usize,
    pub utilization_percent: u32,
    pub overloaded: bool,
}

/// Workload of every active member, in the order the members were given.
pub fn compute_workload(
    members: &[TeamMember],
    deliverables: &[Deliverable],
    today: NaiveDate,
) -> Vec<MemberWorkload> {
    members
        .iter()
        .filter(|member| member.is_active)
        .map(|member| {
            let assigned: Vec<&Deliverable> = deliverables
                .iter()
                .filter(|d| d.assignee_id == Some(member.id) && d.status.is_open())
                .collect();
            let open = assigned.len();
            let utilization_percent = match usize::try_from(member.capacity) {
                Ok(capacity) if capacity > 0 => {
                    u32::try_from(open * 100 / capacity).unwrap_or(u32::MAX)
                }
                _ => 0,
            };
            let overloaded = i64::try_from(open).unwrap_or(i64::MAX) > i64::from(member.capacity);
            MemberWorkload {
                member_id: member.id,
                name: member.name.clone(),
                capacity: member.capacity,
                open,
                overdue: assigned.iter().filter(|d| d.is_overdue(today)).count(),
                due_soon: assigned
                    .iter()
                    .filter(|d| d.is_due_within(today, DUE_SOON_DAYS))
                    .count(),
                utilization_percent,
                overloaded,
            }
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AdminDashboard {
    pub clients_by_status: Vec<StatusCount<ClientStatus>>,
    pub deliverables_by_column: Vec<StatusCount<DeliverableStatus>>,
    pub overdue_deliverables: usize,
    pub invoices: InvoiceSummary,
    pub wallets: WalletSummary,
    pub campaigns: CampaignSummary,
    pub over_budget_campaigns: usize,
    pub workload: Vec<MemberWorkload>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MemberDashboard {
    pub open_deliverables: Vec<Deliverable>,
    pub overdue: usize,
    pub due_soon: usize,
    pub unread_messages: usize,
}

impl MemberDashboard {
    pub fn build(mine: Vec<Deliverable>, unread_messages: usize, today: NaiveDate) -> Self {
        let mut open_deliverables: Vec<Deliverable> =
            mine.into_iter().filter(|d| d.status.is_open()).collect();
        open_deliverables.sort_by_key(|d| (d.due_date.is_none(), d.due_date, d.id));
        let overdue = open_deliverables.iter().filter(|d| d.is_overdue(today)).count();
        let due_soon = open_deliverables
            .iter()
            .filter(|d| d.is_due_within(today, DUE_SOON_DAYS))
            .count();
        Self {
            open_deliverables,
            overdue,
            due_soon,
            unread_messages,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ClientDashboard {
    pub client: Client,
    pub deliverables_by_column: Vec<StatusCount<DeliverableStatus>>,
    pub package_usage: Vec<PackageAllocation>,
    pub wallet_balance: i64,
    pub open_invoices: Vec<Invoice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::campaign::tests::sample as campaign;
    use crate::domain::deliverable::tests::sample as deliverable;
    use crate::domain::invoice::tests::sample as invoice;
    use crate::domain::team_member::TeamRole;
    use crate::domain::types::{ClientName, EmailAddress, Money, WorkspaceId};

    fn client(id: i32) -> Client {
        Client {
            id: ClientId::new(id).unwrap(),
            workspace_id: WorkspaceId::new(1).unwrap(),
            name: ClientName::new(format!("Client {id}")).unwrap(),
            email: None,
            phone: None,
            company: None,
            status: ClientStatus::Active,
            notes: None,
            created_at: chrono::NaiveDateTime::default(),
            updated_at: chrono::NaiveDateTime::default(),
        }
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    #[test]
    fn overdue_banner_counts_every_overdue_invoice() {
        let today = date(3, 15);
        let invoices = vec![
            invoice(1, InvoiceStatus::Overdue, date(3, 1), 1_000),
            invoice(2, InvoiceStatus::Sent, date(3, 10), 2_000),
            invoice(3, InvoiceStatus::Sent, date(3, 20), 4_000),
            invoice(4, InvoiceStatus::Draft, date(3, 1), 8_000),
            invoice(5, InvoiceStatus::Void, date(3, 1), 16_000),
        ];
        let summary = summarize_invoices(&invoices, today);
        assert_eq!(summary.overdue_count, 2);
        assert_eq!(summary.overdue_amount, 3_000);
        assert_eq!(summary.outstanding_amount, 7_000);
        assert_eq!(summary.paid_this_month, 0);
    }

    #[test]
    fn paid_this_month_uses_payment_date() {
        let today = date(3, 15);
        let mut this_month = invoice(1, InvoiceStatus::Paid, date(2, 1), 500);
        this_month.paid_at = date(3, 2).and_hms_opt(10, 0, 0);
        let mut last_month = invoice(2, InvoiceStatus::Paid, date(2, 1), 700);
        last_month.paid_at = date(2, 27).and_hms_opt(10, 0, 0);
        let summary = summarize_invoices(&[this_month, last_month], today);
        assert_eq!(summary.paid_this_month, 500);
    }

    #[test]
    fn campaign_totals_flag_overspend() {
        let summary = summarize_campaigns(&[campaign(1, 10_000, 2_500), campaign(2, 1_000, 1_500)]);
        assert_eq!(summary.total_budget, 11_000);
        assert_eq!(summary.total_spent, 4_000);
        assert_eq!(summary.over_budget_count(), 1);
        assert_eq!(summary.campaigns[0].utilization_percent, 25);
        assert_eq!(summary.campaigns[1].utilization_percent, 150);
    }

    #[test]
    fn low_balance_is_strictly_below_threshold() {
        let at = chrono::NaiveDateTime::default();
        let wallet = |id: i32, cents: i64| ClientWallet {
            client_id: ClientId::new(id).unwrap(),
            workspace_id: WorkspaceId::new(1).unwrap(),
            balance: Money::new(cents).unwrap(),
            updated_at: at,
        };
        let clients = vec![client(1), client(2), client(3)];
        let summary = summarize_wallets(
            &clients,
            &[wallet(1, 999), wallet(2, 1_000), wallet(3, 5_000)],
            1_000,
        );
        assert_eq!(summary.total_balance, 6_999);
        assert_eq!(summary.low_balance_clients, vec![ClientId::new(1).unwrap()]);
    }

    #[test]
    fn client_without_wallet_counts_as_empty() {
        let summary = summarize_wallets(&[client(4)], &[], 10_000);
        assert_eq!(summary.total_balance, 0);
        assert_eq!(summary.low_balance_clients, vec![ClientId::new(4).unwrap()]);
    }

    #[test]
    fn workload_counts_open_assignments_against_capacity() {
        let today = date(3, 10);
        let member = |id: i32, capacity: i32, is_active: bool| TeamMember {
            id: TeamMemberId::new(id).unwrap(),
            workspace_id: WorkspaceId::new(1).unwrap(),
            name: MemberName::new(format!("Member {id}")).unwrap(),
            email: EmailAddress::new(format!("m{id}@agency.io")).unwrap(),
            role: TeamRole::Member,
            capacity,
            is_active,
            created_at: chrono::NaiveDateTime::default(),
        };
        let assigned = |id: i32, status: DeliverableStatus, due: Option<NaiveDate>, to: i32| {
            let mut d = deliverable(id, status, due);
            d.assignee_id = Some(TeamMemberId::new(to).unwrap());
            d
        };

        let deliverables = vec![
            assigned(1, DeliverableStatus::InProgress, Some(date(3, 1)), 1),
            assigned(2, DeliverableStatus::Review, Some(date(3, 12)), 1),
            assigned(3, DeliverableStatus::Backlog, None, 1),
            assigned(4, DeliverableStatus::Delivered, Some(date(3, 1)), 1),
            assigned(5, DeliverableStatus::Backlog, None, 2),
        ];
        let members = vec![member(1, 2, true), member(2, 0, true), member(3, 5, false)];

        let workload = compute_workload(&members, &deliverables, today);
        assert_eq!(workload.len(), 2);

        let first = &workload[0];
        assert_eq!(first.open, 3);
        assert_eq!(first.overdue, 1);
        assert_eq!(first.due_soon, 1);
        assert_eq!(first.utilization_percent, 150);
        assert!(first.overloaded);

        let second = &workload[1];
        assert_eq!(second.open, 1);
        assert_eq!(second.utilization_percent, 0);
        assert!(second.overloaded);
    }

    #[test]
    fn member_dashboard_keeps_open_cards_only() {
        let today = date(3, 10);
        let dashboard = MemberDashboard::build(
            vec![
                deliverable(1, DeliverableStatus::Delivered, Some(date(3, 1))),
                deliverable(2, DeliverableStatus::Review, Some(date(3, 11))),
                deliverable(3, DeliverableStatus::Backlog, Some(date(3, 2))),
            ],
            4,
            today,
        );
        let ids: Vec<i32> = dashboard.open_deliverables.iter().map(|d| d.id.get()).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(dashboard.overdue, 1);
        assert_eq!(dashboard.due_soon, 1);
        assert_eq!(dashboard.unread_messages, 4);
    }

    #[test]
    fn counts_cover_every_status() {
        let counts = deliverables_by_column(&[deliverable(1, DeliverableStatus::Review, None)]);
        assert_eq!(counts.len(), DeliverableStatus::ALL.len());
        assert_eq!(counts[2].count, 1);
        assert_eq!(clients_by_status(&[]).len(), 4);
    }
}
