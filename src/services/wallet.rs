//! Prepaid client wallets.

use chrono::Utc;

use crate::domain::client::Client;
use crate::domain::types::{ClientId, Money};
use crate::domain::wallet::{WalletMovement, WalletTransaction, reconcile};
use crate::dto::billing::{WalletReconciliation, WalletView};
use crate::forms::billing::{TransactionsQuery, WalletMovementForm, WalletMovementPayload};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::realtime::{ChangeAction, ChangeEvent, EventHub};
use crate::repository::{
    ClientReader, TeamWriter, TransactionListQuery, WalletReader, WalletWriter,
};
use crate::services::{
    ServiceError, ServiceResult, accessible_client, ensure_role, is_portal_user, portal_client,
    sync_current_member, workspace_of,
};
use crate::SERVICE_ADMIN_ROLE;

/// Resolves a client the caller may see billing data for.
pub(crate) fn billing_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<Client>
where
    R: ClientReader + TeamWriter + ?Sized,
{
    if is_portal_user(user) {
        let own = portal_client(repo, user)?;
        if own.id.get() != client_id {
            return Err(ServiceError::Unauthorized);
        }
        return Ok(own);
    }
    let member = sync_current_member(repo, user)?;
    accessible_client(repo, user, &member, client_id)
}

fn apply<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    movement: impl FnOnce(ClientId, WalletMovementPayload) -> WalletMovement,
    client_id: i32,
    form: WalletMovementForm,
) -> ServiceResult<WalletTransaction>
where
    R: ClientReader + WalletWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let client = repo
        .get_client_by_id(ClientId::new(client_id)?, workspace_id)?
        .ok_or(ServiceError::NotFound)?;
    let payload = WalletMovementPayload::try_from(form)?;
    let movement = movement(client.id, payload);

    let transaction = repo
        .apply_wallet_movement(workspace_id, &movement, Utc::now().naive_utc())
        .map_err(|err| {
            log::error!(
                "Failed to apply {} of {} to wallet of client {}: {err}",
                movement.kind,
                movement.amount.cents(),
                client.id
            );
            err
        })?;

    hub.publish(ChangeEvent::new(
        workspace_id,
        "wallet_transactions",
        ChangeAction::Insert,
        transaction.id.get(),
        &transaction,
    ));
    Ok(transaction)
}

pub fn credit_wallet<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    client_id: i32,
    form: WalletMovementForm,
) -> ServiceResult<WalletTransaction>
where
    R: ClientReader + WalletWriter + ?Sized,
{
    apply(
        repo,
        hub,
        user,
        |client_id, payload| WalletMovement::credit(client_id, payload.amount, payload.description),
        client_id,
        form,
    )
}

/// Debits the wallet; fails with a conflict when the balance does not cover it.
pub fn debit_wallet<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    client_id: i32,
    form: WalletMovementForm,
) -> ServiceResult<WalletTransaction>
where
    R: ClientReader + WalletWriter + ?Sized,
{
    apply(
        repo,
        hub,
        user,
        |client_id, payload| WalletMovement::debit(client_id, payload.amount, payload.description),
        client_id,
        form,
    )
}

/// Stored balance and one page of the ledger.
pub fn list_transactions<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    query: TransactionsQuery,
) -> ServiceResult<WalletView>
where
    R: ClientReader + TeamWriter + WalletReader + ?Sized,
{
    let client = billing_client(repo, user, client_id)?;

    let page = query.page.unwrap_or(1).max(1);
    let balance = repo
        .get_wallet(client.id)?
        .map_or(0, |wallet| wallet.balance.cents());
    let (total, transactions) = repo
        .list_wallet_transactions(
            TransactionListQuery::new(client.id).paginate(page, DEFAULT_ITEMS_PER_PAGE),
        )
        .map_err(|err| {
            log::error!("Failed to list wallet transactions of client {}: {err}", client.id);
            err
        })?;

    Ok(WalletView {
        client_id: client.id,
        balance,
        transactions: Paginated::new(transactions, total, page, DEFAULT_ITEMS_PER_PAGE),
    })
}

/// Recomputes the balance from the full ledger and compares it with the stored one.
pub fn reconcile_wallet<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<WalletReconciliation>
where
    R: ClientReader + WalletReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let client = repo
        .get_client_by_id(ClientId::new(client_id)?, workspace_id)?
        .ok_or(ServiceError::NotFound)?;

    let stored = repo
        .get_wallet(client.id)?
        .map_or(Money::ZERO, |wallet| wallet.balance);
    let (_, transactions) = repo.list_wallet_transactions(TransactionListQuery::new(client.id))?;

    let report = reconcile(stored, &transactions);
    if !report.is_consistent {
        log::warn!(
            "Wallet of client {} is inconsistent: stored {}, ledger {}",
            client.id,
            report.stored_balance,
            report.ledger_balance
        );
    }

    Ok(WalletReconciliation {
        client_id: client.id,
        report,
    })
}
