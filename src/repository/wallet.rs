//! Client wallets and their append-only ledger.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::types::{ClientId, Money, WorkspaceId};
use crate::domain::wallet::{ClientWallet, WalletMovement, WalletTransaction, apply_movement};
use crate::models::wallet::{
    ClientWallet as DbClientWallet, NewWalletTransaction as DbNewWalletTransaction,
    WalletTransaction as DbWalletTransaction,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TransactionListQuery, WalletReader, WalletWriter};

/// Applies `movement` on an open connection; callers own the transaction.
pub(crate) fn record_movement(
    conn: &mut SqliteConnection,
    workspace_id: WorkspaceId,
    movement: &WalletMovement,
    now: NaiveDateTime,
) -> RepositoryResult<WalletTransaction> {
    use crate::schema::{client_wallets, clients, wallet_transactions};

    let client_exists = diesel::select(diesel::dsl::exists(
        clients::table
            .filter(clients::id.eq(movement.client_id.get()))
            .filter(clients::workspace_id.eq(workspace_id.get())),
    ))
    .get_result::<bool>(conn)?;
    if !client_exists {
        return Err(RepositoryError::NotFound);
    }

    let stored = client_wallets::table
        .find(movement.client_id.get())
        .select(client_wallets::balance)
        .first::<i64>(conn)
        .optional()?
        .unwrap_or(0);

    let balance = apply_movement(Money::new(stored)?, movement.kind, movement.amount)?;

    diesel::insert_into(client_wallets::table)
        .values(&DbClientWallet {
            client_id: movement.client_id.get(),
            workspace_id: workspace_id.get(),
            balance: balance.cents(),
            updated_at: now,
        })
        .on_conflict(client_wallets::client_id)
        .do_update()
        .set((
            client_wallets::balance.eq(balance.cents()),
            client_wallets::updated_at.eq(now),
        ))
        .execute(conn)?;

    let row = diesel::insert_into(wallet_transactions::table)
        .values(&DbNewWalletTransaction {
            client_id: movement.client_id.get(),
            kind: movement.kind.as_str(),
            amount: movement.amount.cents(),
            balance_after: balance.cents(),
            description: movement.description.as_str(),
            invoice_id: movement.invoice_id.map(|id| id.get()),
            created_at: now,
        })
        .get_result::<DbWalletTransaction>(conn)?;

    Ok(WalletTransaction::try_from(row)?)
}

impl WalletReader for DieselRepository {
    fn get_wallet(&self, client_id: ClientId) -> RepositoryResult<Option<ClientWallet>> {
        use crate::schema::client_wallets;

        let mut conn = self.conn()?;
        let row = client_wallets::table
            .find(client_id.get())
            .first::<DbClientWallet>(&mut conn)
            .optional()?;

        row.map(ClientWallet::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_wallets(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<ClientWallet>> {
        use crate::schema::client_wallets;

        let mut conn = self.conn()?;
        let rows = client_wallets::table
            .filter(client_wallets::workspace_id.eq(workspace_id.get()))
            .order(client_wallets::client_id.asc())
            .load::<DbClientWallet>(&mut conn)?;

        rows.into_iter()
            .map(|row| ClientWallet::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    fn list_wallet_transactions(
        &self,
        query: TransactionListQuery,
    ) -> RepositoryResult<(usize, Vec<WalletTransaction>)> {
        use crate::schema::wallet_transactions;

        let mut conn = self.conn()?;

        let query_builder = || {
            wallet_transactions::table
                .filter(wallet_transactions::client_id.eq(query.client_id.get()))
                .into_boxed::<diesel::sqlite::Sqlite>()
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)?;

        let mut items = query_builder().order(wallet_transactions::id.desc());
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }
        let rows = items.load::<DbWalletTransaction>(&mut conn)?;

        let transactions = rows
            .into_iter()
            .map(|row| WalletTransaction::try_from(row).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((usize::try_from(total).unwrap_or_default(), transactions))
    }
}

impl WalletWriter for DieselRepository {
    fn apply_wallet_movement(
        &self,
        workspace_id: WorkspaceId,
        movement: &WalletMovement,
        now: NaiveDateTime,
    ) -> RepositoryResult<WalletTransaction> {
        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| record_movement(conn, workspace_id, movement, now))
    }
}
