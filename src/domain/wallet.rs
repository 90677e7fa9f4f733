//! Client wallet and its append-only ledger.
//!
//! The stored balance always equals the sum of credits minus the sum of
//! debits, and every ledger row records the balance right after it was
//! applied. [`apply_movement`] is the single place that computes a new
//! balance; the repository calls it inside the write transaction.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::domain::types::{
    ClientId, InvoiceId, LineDescription, Money, PositiveAmount, TransactionId, WorkspaceId,
};

text_enum!(
    TransactionKind {
        Credit => "credit",
        Debit => "debit",
    }
);

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ClientWallet {
    pub client_id: ClientId,
    pub workspace_id: WorkspaceId,
    pub balance: Money,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WalletTransaction {
    pub id: TransactionId,
    pub client_id: ClientId,
    pub kind: TransactionKind,
    pub amount: PositiveAmount,
    pub balance_after: Money,
    pub description: LineDescription,
    pub invoice_id: Option<InvoiceId>,
    pub created_at: NaiveDateTime,
}

/// A requested change to a wallet, before it is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct WalletMovement {
    pub client_id: ClientId,
    pub kind: TransactionKind,
    pub amount: PositiveAmount,
    pub description: LineDescription,
    pub invoice_id: Option<InvoiceId>,
}

impl WalletMovement {
    pub fn credit(client_id: ClientId, amount: PositiveAmount, description: LineDescription) -> Self {
        Self {
            client_id,
            kind: TransactionKind::Credit,
            amount,
            description,
            invoice_id: None,
        }
    }

    pub fn debit(client_id: ClientId, amount: PositiveAmount, description: LineDescription) -> Self {
        Self {
            client_id,
            kind: TransactionKind::Debit,
            amount,
            description,
            invoice_id: None,
        }
    }

    pub fn with_invoice(mut self, invoice_id: InvoiceId) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Money, requested: Money },
    #[error("wallet balance overflow")]
    Overflow,
}

/// Computes the balance after applying one movement.
pub fn apply_movement(
    balance: Money,
    kind: TransactionKind,
    amount: PositiveAmount,
) -> Result<Money, LedgerError> {
    let amount = Money::from(amount);
    match kind {
        TransactionKind::Credit => balance.checked_add(amount).ok_or(LedgerError::Overflow),
        TransactionKind::Debit => {
            balance
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientFunds {
                    balance,
                    requested: amount,
                })
        }
    }
}

/// Outcome of recomputing a wallet from its ledger.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Reconciliation {
    pub stored_balance: i64,
    pub ledger_balance: i64,
    pub last_balance_after: Option<i64>,
    pub transactions: usize,
    pub is_consistent: bool,
}

/// Recomputes Σcredits − Σdebits and compares it with the stored balance.
///
/// `transactions` may come in any order; the running balance is checked in
/// id order.
pub fn reconcile(stored_balance: Money, transactions: &[WalletTransaction]) -> Reconciliation {
    let mut ordered: Vec<&WalletTransaction> = transactions.iter().collect();
    ordered.sort_by_key(|t| t.id);

    let mut running: i64 = 0;
    let mut running_matches = true;
    for transaction in &ordered {
        let next = match transaction.kind {
            TransactionKind::Credit => running.checked_add(transaction.amount.cents()),
            TransactionKind::Debit => running.checked_sub(transaction.amount.cents()),
        };
        // A ledger whose sum leaves i64 cannot match any stored balance.
        let Some(next) = next else {
            running_matches = false;
            break;
        };
        running = next;
        if running != transaction.balance_after.cents() {
            running_matches = false;
        }
    }

    let last_balance_after = ordered.last().map(|t| t.balance_after.cents());
    let stored = stored_balance.cents();
    let is_consistent = running_matches
        && running == stored
        && last_balance_after.is_none_or(|last| last == stored);

    Reconciliation {
        stored_balance: stored,
        ledger_balance: running,
        last_balance_after,
        transactions: ordered.len(),
        is_consistent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn money(cents: i64) -> Money {
        Money::new(cents).unwrap()
    }

    fn amount(cents: i64) -> PositiveAmount {
        PositiveAmount::new(cents).unwrap()
    }

    fn transaction(id: i32, kind: TransactionKind, cents: i64, after: i64) -> WalletTransaction {
        WalletTransaction {
            id: TransactionId::new(id).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            kind,
            amount: amount(cents),
            balance_after: money(after),
            description: LineDescription::new("entry").unwrap(),
            invoice_id: None,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn credit_then_debit() {
        let after_credit = apply_movement(Money::ZERO, TransactionKind::Credit, amount(5_000)).unwrap();
        assert_eq!(after_credit, money(5_000));
        let after_debit = apply_movement(after_credit, TransactionKind::Debit, amount(1_200)).unwrap();
        assert_eq!(after_debit, money(3_800));
    }

    #[test]
    fn debit_beyond_balance_is_rejected() {
        let result = apply_movement(money(100), TransactionKind::Debit, amount(101));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds {
                balance: money(100),
                requested: money(101),
            })
        );
    }

    #[test]
    fn reconcile_detects_drift() {
        let ledger = vec![
            transaction(2, TransactionKind::Debit, 300, 700),
            transaction(1, TransactionKind::Credit, 1_000, 1_000),
        ];

        let ok = reconcile(money(700), &ledger);
        assert!(ok.is_consistent);
        assert_eq!(ok.ledger_balance, 700);
        assert_eq!(ok.last_balance_after, Some(700));

        let drifted = reconcile(money(900), &ledger);
        assert!(!drifted.is_consistent);
    }

    #[test]
    fn empty_wallet_is_consistent_at_zero() {
        assert!(reconcile(Money::ZERO, &[]).is_consistent);
        assert!(!reconcile(money(1), &[]).is_consistent);
    }

    #[test]
    fn overflowing_ledger_is_inconsistent() {
        let ledger = vec![
            transaction(1, TransactionKind::Credit, i64::MAX, i64::MAX),
            transaction(2, TransactionKind::Credit, 1, i64::MAX),
        ];

        let report = reconcile(money(i64::MAX), &ledger);
        assert!(!report.is_consistent);
        assert_eq!(report.ledger_balance, i64::MAX);
        assert_eq!(report.transactions, 2);
    }
}
