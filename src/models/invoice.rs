use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::invoice::{
    Invoice as DomainInvoice, InvoiceItem as DomainInvoiceItem, InvoiceStatus,
    NewInvoiceItem as DomainNewInvoiceItem,
};
use crate::domain::types::{
    ClientId, InvoiceId, LineDescription, Money, TypeConstraintError, WorkspaceId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct Invoice {
    pub id: i32,
    pub workspace_id: i32,
    pub client_id: i32,
    pub number: String,
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: i64,
    pub tax_rate_bp: i32,
    pub tax: i64,
    pub total: i64,
    pub notes: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct NewInvoice<'a> {
    pub workspace_id: i32,
    pub client_id: i32,
    pub number: &'a str,
    pub status: &'a str,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: i64,
    pub tax_rate_bp: i32,
    pub tax: i64,
    pub total: i64,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::invoice_items)]
pub struct InvoiceItem {
    pub id: i32,
    pub invoice_id: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub amount: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoice_items)]
pub struct NewInvoiceItem<'a> {
    pub invoice_id: i32,
    pub description: &'a str,
    pub quantity: i32,
    pub unit_price: i64,
    pub amount: i64,
}

impl<'a> NewInvoiceItem<'a> {
    pub fn from_domain(
        invoice_id: i32,
        item: &'a DomainNewInvoiceItem,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            invoice_id,
            description: item.description.as_str(),
            quantity: item.quantity,
            unit_price: item.unit_price.cents(),
            amount: item.amount()?.cents(),
        })
    }
}

impl TryFrom<Invoice> for DomainInvoice {
    type Error = TypeConstraintError;

    fn try_from(row: Invoice) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InvoiceId::new(row.id)?,
            workspace_id: WorkspaceId::new(row.workspace_id)?,
            client_id: ClientId::new(row.client_id)?,
            number: row.number,
            status: InvoiceStatus::try_from(row.status.as_str())?,
            issue_date: row.issue_date,
            due_date: row.due_date,
            subtotal: Money::new(row.subtotal)?,
            tax_rate_bp: row.tax_rate_bp,
            tax: Money::new(row.tax)?,
            total: Money::new(row.total)?,
            notes: row.notes,
            paid_at: row.paid_at,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<InvoiceItem> for DomainInvoiceItem {
    type Error = TypeConstraintError;

    fn try_from(row: InvoiceItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            invoice_id: InvoiceId::new(row.invoice_id)?,
            description: LineDescription::new(row.description)?,
            quantity: row.quantity,
            unit_price: Money::new(row.unit_price)?,
            amount: Money::new(row.amount)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_amount_is_materialized() {
        let item = DomainNewInvoiceItem::try_new(
            LineDescription::new("Retainer").unwrap(),
            3,
            Money::new(1_500).unwrap(),
        )
        .unwrap();
        let row = NewInvoiceItem::from_domain(7, &item).unwrap();
        assert_eq!(row.amount, 4_500);
        assert_eq!(row.invoice_id, 7);
    }
}
