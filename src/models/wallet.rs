//! Diesel models for client wallets and the ledger.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{
    ClientId, InvoiceId, LineDescription, Money, PositiveAmount, TransactionId,
    TypeConstraintError, WorkspaceId,
};
use crate::domain::wallet::{
    ClientWallet as DomainClientWallet, TransactionKind,
    WalletTransaction as DomainWalletTransaction,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::client_wallets)]
#[diesel(primary_key(client_id))]
pub struct ClientWallet {
    pub client_id: i32,
    pub workspace_id: i32,
    pub balance: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::wallet_transactions)]
pub struct WalletTransaction {
    pub id: i32,
    pub client_id: i32,
    pub kind: String,
    pub amount: i64,
    pub balance_after: i64,
    pub description: String,
    pub invoice_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::wallet_transactions)]
pub struct NewWalletTransaction<'a> {
    pub client_id: i32,
    pub kind: &'a str,
    pub amount: i64,
    pub balance_after: i64,
    pub description: &'a str,
    pub invoice_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ClientWallet> for DomainClientWallet {
    type Error = TypeConstraintError;

    fn try_from(row: ClientWallet) -> Result<Self, Self::Error> {
        Ok(Self {
            client_id: ClientId::new(row.client_id)?,
            workspace_id: WorkspaceId::new(row.workspace_id)?,
            balance: Money::new(row.balance)?,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<WalletTransaction> for DomainWalletTransaction {
    type Error = TypeConstraintError;

    fn try_from(row: WalletTransaction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TransactionId::new(row.id)?,
            client_id: ClientId::new(row.client_id)?,
            kind: TransactionKind::try_from(row.kind.as_str())?,
            amount: PositiveAmount::new(row.amount)?,
            balance_after: Money::new(row.balance_after)?,
            description: LineDescription::new(row.description)?,
            invoice_id: row.invoice_id.map(InvoiceId::new).transpose()?,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_stored_balance_is_rejected() {
        let row = ClientWallet {
            client_id: 1,
            workspace_id: 1,
            balance: -5,
            updated_at: NaiveDateTime::default(),
        };
        assert!(DomainClientWallet::try_from(row).is_err());
    }

    #[test]
    fn transaction_row_converts() {
        let row = WalletTransaction {
            id: 9,
            client_id: 1,
            kind: "debit".into(),
            amount: 250,
            balance_after: 750,
            description: "Invoice INV-00001".into(),
            invoice_id: Some(3),
            created_at: NaiveDateTime::default(),
        };
        let transaction = DomainWalletTransaction::try_from(row).unwrap();
        assert_eq!(transaction.kind, TransactionKind::Debit);
        assert_eq!(transaction.invoice_id, Some(InvoiceId::new(3).unwrap()));
    }
}
