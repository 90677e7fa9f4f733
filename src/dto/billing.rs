use serde::Serialize;

use crate::domain::invoice::{Invoice, InvoiceItem};
use crate::domain::types::ClientId;
use crate::domain::wallet::{Reconciliation, WalletTransaction};
use crate::pagination::Paginated;

#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// Stored balance plus one page of the ledger, newest first.
#[derive(Debug, Serialize)]
pub struct WalletView {
    pub client_id: ClientId,
    pub balance: i64,
    pub transactions: Paginated<WalletTransaction>,
}

#[derive(Debug, Serialize)]
pub struct WalletReconciliation {
    pub client_id: ClientId,
    #[serde(flatten)]
    pub report: Reconciliation,
}

#[derive(Debug, Serialize)]
pub struct OverdueSweep {
    pub marked: usize,
}
