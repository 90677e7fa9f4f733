//! Invoice lifecycle: draft, sent, paid, overdue and void.

use std::collections::HashSet;

use chrono::Utc;

use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::types::{ClientId, InvoiceId, WorkspaceId};
use crate::dto::billing::{InvoiceDetail, OverdueSweep};
use crate::forms::billing::{InvoiceForm, InvoicesQuery, PayInvoiceForm};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{ChangeAction, ChangeEvent, EventHub};
use crate::repository::{
    ClientListQuery, ClientReader, InvoiceListQuery, InvoiceReader, InvoiceWriter, TeamWriter,
};
use crate::services::wallet::billing_client;
use crate::services::{
    ServiceError, ServiceResult, ensure_role, is_portal_user, is_restricted_manager,
    portal_client, sync_current_member, workspace_of,
};
use crate::SERVICE_ADMIN_ROLE;

fn publish_invoice(hub: &EventHub, invoice: &Invoice, action: ChangeAction) {
    hub.publish(ChangeEvent::new(
        invoice.workspace_id,
        "invoices",
        action,
        invoice.id.get(),
        invoice,
    ));
}

fn load_invoice<R>(repo: &R, workspace_id: WorkspaceId, invoice_id: i32) -> ServiceResult<Invoice>
where
    R: InvoiceReader + ?Sized,
{
    repo.get_invoice_by_id(InvoiceId::new(invoice_id)?, workspace_id)?
        .ok_or(ServiceError::NotFound)
}

/// Stores a draft invoice with its next sequential number.
pub fn create_invoice<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: InvoiceForm,
) -> ServiceResult<InvoiceDetail>
where
    R: ClientReader + InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let new_invoice = form.into_domain(workspace_id)?;
    repo.get_client_by_id(new_invoice.client_id, workspace_id)?
        .ok_or(ServiceError::NotFound)?;

    let invoice = repo.create_invoice(&new_invoice).map_err(|err| {
        log::error!("Failed to create invoice: {err}");
        err
    })?;
    let items = repo.list_invoice_items(invoice.id)?;
    log::info!("Created invoice {} for client {}", invoice.number, invoice.client_id);

    publish_invoice(hub, &invoice, ChangeAction::Insert);
    Ok(InvoiceDetail { invoice, items })
}

fn transition<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    invoice_id: i32,
    target: InvoiceStatus,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let current = load_invoice(repo, workspace_id, invoice_id)?;
    if !current.status.can_become(target) {
        return Err(ServiceError::Conflict(format!(
            "invoice {} is {} and cannot become {target}",
            current.number, current.status
        )));
    }

    let invoice = repo
        .set_invoice_status(current.id, workspace_id, target)
        .map_err(|err| {
            log::error!("Failed to mark invoice {} {target}: {err}", current.number);
            err
        })?;

    publish_invoice(hub, &invoice, ChangeAction::Update);
    Ok(invoice)
}

/// Draft to sent.
pub fn send_invoice<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    transition(repo, hub, user, invoice_id, InvoiceStatus::Sent)
}

/// Voids anything that has not been paid.
pub fn void_invoice<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    transition(repo, hub, user, invoice_id, InvoiceStatus::Void)
}

/// Settles a sent or overdue invoice, from the client wallet or externally.
pub fn pay_invoice<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: PayInvoiceForm,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let current = load_invoice(repo, workspace_id, invoice_id)?;
    if !current.status.can_pay() {
        return Err(ServiceError::Conflict(format!(
            "invoice {} is {} and cannot be paid",
            current.number, current.status
        )));
    }

    let invoice = repo
        .pay_invoice(current.id, workspace_id, form.method, Utc::now().naive_utc())
        .map_err(|err| {
            log::error!(
                "Failed to pay invoice {} by {}: {err}",
                current.number,
                form.method
            );
            err
        })?;
    log::info!("Invoice {} paid by {}", invoice.number, form.method);

    publish_invoice(hub, &invoice, ChangeAction::Update);
    Ok(invoice)
}

/// Flags the workspace's sent invoices that are past due.
pub fn mark_overdue<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
) -> ServiceResult<OverdueSweep>
where
    R: InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let marked = repo
        .mark_overdue_invoices(Some(workspace_id), Utc::now().date_naive())
        .map_err(|err| {
            log::error!("Failed to mark overdue invoices: {err}");
            err
        })?;

    if marked > 0 {
        hub.publish(ChangeEvent::new(
            workspace_id,
            "invoices",
            ChangeAction::Update,
            0,
            &OverdueSweep { marked },
        ));
    }
    Ok(OverdueSweep { marked })
}

/// Invoices visible to the caller, newest first.
pub fn list_invoices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: InvoicesQuery,
) -> ServiceResult<Vec<Invoice>>
where
    R: ClientReader + TeamWriter + InvoiceReader + ?Sized,
{
    if is_portal_user(user) {
        let client = portal_client(repo, user)?;
        let mut list_query = InvoiceListQuery::new(client.workspace_id).client(client.id);
        if let Some(status) = query.status {
            list_query = list_query.status(status);
        }
        return Ok(repo.list_invoices(list_query)?);
    }

    let member = sync_current_member(repo, user)?;
    let mut list_query = InvoiceListQuery::new(member.workspace_id);
    if let Some(client_id) = query.client_id {
        list_query = list_query.client(ClientId::new(client_id)?);
    }
    if let Some(status) = query.status {
        list_query = list_query.status(status);
    }

    let mut invoices = repo.list_invoices(list_query).map_err(|err| {
        log::error!("Failed to list invoices: {err}");
        err
    })?;

    if is_restricted_manager(user) {
        let (_, assigned) =
            repo.list_clients(ClientListQuery::new(member.workspace_id).member(member.id))?;
        let assigned: HashSet<ClientId> = assigned.into_iter().map(|client| client.id).collect();
        invoices.retain(|invoice| assigned.contains(&invoice.client_id));
    }

    Ok(invoices)
}

pub fn get_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<InvoiceDetail>
where
    R: ClientReader + TeamWriter + InvoiceReader + ?Sized,
{
    let workspace_id = workspace_of(user)?;
    let invoice = load_invoice(repo, workspace_id, invoice_id)?;
    billing_client(repo, user, invoice.client_id.get()).map_err(|err| match err {
        ServiceError::Unauthorized if is_portal_user(user) => ServiceError::NotFound,
        other => other,
    })?;

    let items = repo.list_invoice_items(invoice.id)?;
    Ok(InvoiceDetail { invoice, items })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::invoice::PaymentMethod;
    use crate::domain::invoice::tests::sample as invoice;
    use crate::forms::billing::InvoiceItemForm;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    fn stored(status: InvoiceStatus) -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(move |id, _| Ok(Some(invoice(id.get(), status, due(), 12_000))));
        repo
    }

    #[test]
    fn create_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_create_invoice().times(0);

        let result = create_invoice(
            &repo,
            &EventHub::new(4),
            &manager_user(),
            InvoiceForm {
                client_id: 1,
                issue_date: due(),
                due_date: due(),
                tax_rate_bp: 0,
                notes: None,
                items: vec![InvoiceItemForm {
                    description: "Retainer".to_string(),
                    quantity: 1,
                    unit_price: 100_000,
                }],
            },
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn create_without_items_is_a_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_create_invoice().times(0);

        let result = create_invoice(
            &repo,
            &EventHub::new(4),
            &admin_user(),
            InvoiceForm {
                client_id: 1,
                issue_date: due(),
                due_date: due(),
                tax_rate_bp: 0,
                notes: None,
                items: Vec::new(),
            },
        );

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn only_drafts_can_be_sent() {
        let mut repo = stored(InvoiceStatus::Paid);
        repo.expect_set_invoice_status().times(0);

        let result = send_invoice(&repo, &EventHub::new(4), &admin_user(), 1);

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn draft_is_sent() {
        let mut repo = stored(InvoiceStatus::Draft);
        repo.expect_set_invoice_status()
            .withf(|_, _, status| *status == InvoiceStatus::Sent)
            .times(1)
            .returning(|id, _, status| Ok(invoice(id.get(), status, due(), 12_000)));

        let sent = send_invoice(&repo, &EventHub::new(4), &admin_user(), 1).unwrap();

        assert_eq!(sent.status, InvoiceStatus::Sent);
    }

    #[test]
    fn paid_invoice_cannot_be_voided() {
        let mut repo = stored(InvoiceStatus::Paid);
        repo.expect_set_invoice_status().times(0);

        let result = void_invoice(&repo, &EventHub::new(4), &admin_user(), 1);

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn wallet_payment_without_funds_leaves_invoice_unpaid() {
        let mut repo = stored(InvoiceStatus::Overdue);
        repo.expect_pay_invoice()
            .withf(|_, _, method, _| *method == PaymentMethod::Wallet)
            .times(1)
            .returning(|_, _, _, _| {
                Err(RepositoryError::InsufficientFunds {
                    balance: 0,
                    requested: 12_000,
                })
            });
        let hub = EventHub::new(4);
        let mut rx = hub.subscribe();

        let result = pay_invoice(
            &repo,
            &hub,
            &admin_user(),
            1,
            PayInvoiceForm {
                method: PaymentMethod::Wallet,
            },
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sweep_is_scoped_to_the_callers_workspace() {
        let mut repo = MockRepository::new();
        repo.expect_mark_overdue_invoices()
            .withf(|workspace_id, _| workspace_id.map(|id| id.get()) == Some(42))
            .times(1)
            .returning(|_, _| Ok(2));

        let sweep = mark_overdue(&repo, &EventHub::new(4), &admin_user()).unwrap();

        assert_eq!(sweep.marked, 2);
    }

    #[test]
    fn portal_user_cannot_open_foreign_invoice() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id().returning(|id, _| {
            let mut foreign = invoice(id.get(), InvoiceStatus::Sent, due(), 500);
            foreign.client_id = ClientId::new(2).unwrap();
            Ok(Some(foreign))
        });
        repo.expect_get_client_by_email()
            .returning(|_, _| Ok(Some(client(1, "Acme"))));
        repo.expect_list_invoice_items().times(0);

        let result = get_invoice(&repo, &portal_user(), 5);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
