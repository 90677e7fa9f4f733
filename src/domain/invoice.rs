//! Invoices with line items and their status lifecycle.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::types::{
    ClientId, InvoiceId, LineDescription, Money, TypeConstraintError, WorkspaceId,
};

/// Upper bound for the tax rate, expressed in basis points (100% = 10000).
pub const MAX_TAX_RATE_BP: i32 = 10_000;

text_enum!(
    InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
        Void => "void",
    }
);

impl InvoiceStatus {
    /// Sent or overdue: money the client still owes.
    pub fn is_outstanding(self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }

    pub fn can_send(self) -> bool {
        self == InvoiceStatus::Draft
    }

    pub fn can_pay(self) -> bool {
        self.is_outstanding()
    }

    pub fn can_void(self) -> bool {
        !matches!(self, InvoiceStatus::Paid | InvoiceStatus::Void)
    }

    /// Whether a status change from `self` to `target` is allowed.
    pub fn can_become(self, target: InvoiceStatus) -> bool {
        match target {
            InvoiceStatus::Draft => false,
            InvoiceStatus::Sent => self.can_send(),
            InvoiceStatus::Overdue => self == InvoiceStatus::Sent,
            InvoiceStatus::Paid => self.can_pay(),
            InvoiceStatus::Void => self.can_void(),
        }
    }
}

text_enum!(
    /// How an invoice is settled.
    PaymentMethod {
        Wallet => "wallet",
        External => "external",
    }
);

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub workspace_id: WorkspaceId,
    pub client_id: ClientId,
    pub number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: Money,
    pub tax_rate_bp: i32,
    pub tax: Money,
    pub total: Money,
    pub notes: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Invoice {
    /// Overdue either by status or because a sent invoice passed its due date
    /// before the sweeper flagged it.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.status {
            InvoiceStatus::Overdue => true,
            InvoiceStatus::Sent => self.due_date < today,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct InvoiceItem {
    pub id: i32,
    pub invoice_id: InvoiceId,
    pub description: LineDescription,
    pub quantity: i32,
    pub unit_price: Money,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewInvoiceItem {
    pub description: LineDescription,
    pub quantity: i32,
    pub unit_price: Money,
}

impl NewInvoiceItem {
    pub fn try_new(
        description: LineDescription,
        quantity: i32,
        unit_price: Money,
    ) -> Result<Self, TypeConstraintError> {
        if quantity < 1 {
            return Err(TypeConstraintError::InvalidValue(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            description,
            quantity,
            unit_price,
        })
    }

    pub fn amount(&self) -> Result<Money, TypeConstraintError> {
        self.unit_price
            .cents()
            .checked_mul(i64::from(self.quantity))
            .ok_or(TypeConstraintError::InvalidAmount(i64::MAX))
            .and_then(Money::new)
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

/// Sums line items and applies tax rounded half up to the nearest cent.
pub fn compute_totals(
    items: &[NewInvoiceItem],
    tax_rate_bp: i32,
) -> Result<InvoiceTotals, TypeConstraintError> {
    if !(0..=MAX_TAX_RATE_BP).contains(&tax_rate_bp) {
        return Err(TypeConstraintError::InvalidValue(format!(
            "tax rate must be between 0 and {MAX_TAX_RATE_BP} basis points"
        )));
    }

    let mut subtotal = Money::ZERO;
    for item in items {
        subtotal = subtotal
            .checked_add(item.amount()?)
            .ok_or(TypeConstraintError::InvalidAmount(i64::MAX))?;
    }

    let scaled = subtotal
        .cents()
        .checked_mul(i64::from(tax_rate_bp))
        .ok_or(TypeConstraintError::InvalidAmount(i64::MAX))?;
    let tax = Money::new((scaled + 5_000) / 10_000)?;
    let total = subtotal
        .checked_add(tax)
        .ok_or(TypeConstraintError::InvalidAmount(i64::MAX))?;

    Ok(InvoiceTotals {
        subtotal,
        tax,
        total,
    })
}

/// Human-facing invoice number for the `sequence`-th invoice of a workspace.
pub fn format_invoice_number(sequence: i64) -> String {
    format!("INV-{sequence:05}")
}

/// Validated invoice ready to be numbered and stored.
#[derive(Clone, Debug, PartialEq)]
pub struct NewInvoice {
    pub workspace_id: WorkspaceId,
    pub client_id: ClientId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate_bp: i32,
    pub notes: Option<String>,
    pub items: Vec<NewInvoiceItem>,
    pub totals: InvoiceTotals,
}

impl NewInvoice {
    pub fn try_new(
        workspace_id: WorkspaceId,
        client_id: ClientId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        tax_rate_bp: i32,
        notes: Option<String>,
        items: Vec<NewInvoiceItem>,
    ) -> Result<Self, TypeConstraintError> {
        if items.is_empty() {
            return Err(TypeConstraintError::InvalidValue(
                "invoice needs at least one line item".to_string(),
            ));
        }
        if due_date < issue_date {
            return Err(TypeConstraintError::InvalidValue(
                "due date cannot precede issue date".to_string(),
            ));
        }
        let totals = compute_totals(&items, tax_rate_bp)?;
        Ok(Self {
            workspace_id,
            client_id,
            issue_date,
            due_date,
            tax_rate_bp,
            notes: notes
                .map(|s| ammonia::clean(&s).trim().to_string())
                .filter(|s| !s.is_empty()),
            items,
            totals,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn item(quantity: i32, unit_price: i64) -> NewInvoiceItem {
        NewInvoiceItem::try_new(
            LineDescription::new("Social posts").unwrap(),
            quantity,
            Money::new(unit_price).unwrap(),
        )
        .unwrap()
    }

    pub(crate) fn sample(id: i32, status: InvoiceStatus, due: NaiveDate, total: i64) -> Invoice {
        Invoice {
            id: InvoiceId::new(id).unwrap(),
            workspace_id: WorkspaceId::new(1).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            number: format_invoice_number(i64::from(id)),
            status,
            issue_date: due,
            due_date: due,
            subtotal: Money::new(total).unwrap(),
            tax_rate_bp: 0,
            tax: Money::ZERO,
            total: Money::new(total).unwrap(),
            notes: None,
            paid_at: None,
            created_at: due.and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn totals_round_tax_half_up() {
        // 3 × 33.33 = 99.99, 7.25% tax = 7.249275 → 7.25
        let totals = compute_totals(&[item(3, 3_333)], 725).unwrap();
        assert_eq!(totals.subtotal.cents(), 9_999);
        assert_eq!(totals.tax.cents(), 725);
        assert_eq!(totals.total.cents(), 10_724);

        // 0.50 at 10% = 0.05 exactly; 0.05 at 10% = 0.005 → 0.01
        assert_eq!(compute_totals(&[item(1, 50)], 1_000).unwrap().tax.cents(), 5);
        assert_eq!(compute_totals(&[item(1, 5)], 1_000).unwrap().tax.cents(), 1);
    }

    #[test]
    fn totals_reject_out_of_range_tax() {
        assert!(compute_totals(&[item(1, 100)], -1).is_err());
        assert!(compute_totals(&[item(1, 100)], MAX_TAX_RATE_BP + 1).is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(
            NewInvoiceItem::try_new(LineDescription::new("x").unwrap(), 0, Money::ZERO).is_err()
        );
    }

    #[test]
    fn invoice_requires_items_and_ordered_dates() {
        let ws = WorkspaceId::new(1).unwrap();
        let client = ClientId::new(1).unwrap();
        let issue = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();

        assert!(NewInvoice::try_new(ws, client, issue, due, 0, None, vec![]).is_err());
        assert!(NewInvoice::try_new(ws, client, due, issue, 0, None, vec![item(1, 1)]).is_err());

        let invoice = NewInvoice::try_new(ws, client, issue, due, 2_000, None, vec![item(2, 10_000)])
            .unwrap();
        assert_eq!(invoice.totals.total.cents(), 24_000);
    }

    #[test]
    fn numbers_are_zero_padded() {
        assert_eq!(format_invoice_number(1), "INV-00001");
        assert_eq!(format_invoice_number(123_456), "INV-123456");
    }

    #[test]
    fn status_transitions() {
        assert!(InvoiceStatus::Draft.can_send());
        assert!(!InvoiceStatus::Sent.can_send());
        assert!(InvoiceStatus::Overdue.can_pay());
        assert!(!InvoiceStatus::Draft.can_pay());
        assert!(!InvoiceStatus::Paid.can_void());
        assert!(InvoiceStatus::Overdue.can_void());
        assert!(InvoiceStatus::Sent.can_become(InvoiceStatus::Overdue));
        assert!(!InvoiceStatus::Paid.can_become(InvoiceStatus::Void));
        assert!(!InvoiceStatus::Void.can_become(InvoiceStatus::Draft));
    }

    #[test]
    fn sent_invoice_past_due_counts_as_overdue() {
        let due = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let next_day = due.succ_opt().unwrap();
        assert!(!sample(1, InvoiceStatus::Sent, due, 100).is_overdue(due));
        assert!(sample(1, InvoiceStatus::Sent, due, 100).is_overdue(next_day));
        assert!(sample(2, InvoiceStatus::Overdue, due, 100).is_overdue(due));
        assert!(!sample(3, InvoiceStatus::Paid, due, 100).is_overdue(next_day));
    }
}
