use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::invoice::{
    Invoice, InvoiceItem, InvoiceStatus, NewInvoice, PaymentMethod, format_invoice_number,
};
use crate::domain::types::{InvoiceId, LineDescription, PositiveAmount, WorkspaceId};
use crate::domain::wallet::WalletMovement;
use crate::models::invoice::{
    Invoice as DbInvoice, InvoiceItem as DbInvoiceItem, NewInvoice as DbNewInvoice,
    NewInvoiceItem as DbNewInvoiceItem,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::wallet::record_movement;
use crate::repository::{DieselRepository, InvoiceListQuery, InvoiceReader, InvoiceWriter};

const NUMBER_PREFIX: &str = "INV-";

/// Next free sequence in the workspace, derived from the highest stored number.
fn next_sequence(conn: &mut SqliteConnection, workspace_id: WorkspaceId) -> RepositoryResult<i64> {
    use crate::schema::invoices;

    let numbers = invoices::table
        .filter(invoices::workspace_id.eq(workspace_id.get()))
        .filter(invoices::number.like(format!("{NUMBER_PREFIX}%")))
        .select(invoices::number)
        .load::<String>(conn)?;

    let highest = numbers
        .iter()
        .filter_map(|number| number.strip_prefix(NUMBER_PREFIX)?.parse::<i64>().ok())
        .max()
        .unwrap_or(0);

    Ok(highest + 1)
}

fn load_invoice(
    conn: &mut SqliteConnection,
    id: InvoiceId,
    workspace_id: WorkspaceId,
) -> RepositoryResult<Invoice> {
    use crate::schema::invoices;

    let row = invoices::table
        .filter(invoices::id.eq(id.get()))
        .filter(invoices::workspace_id.eq(workspace_id.get()))
        .first::<DbInvoice>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;
    Ok(Invoice::try_from(row)?)
}

impl InvoiceReader for DieselRepository {
    fn get_invoice_by_id(
        &self,
        id: InvoiceId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Invoice>> {
        let mut conn = self.conn()?;
        match load_invoice(&mut conn, id, workspace_id) {
            Ok(invoice) => Ok(Some(invoice)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn list_invoice_items(&self, invoice_id: InvoiceId) -> RepositoryResult<Vec<InvoiceItem>> {
        use crate::schema::invoice_items;

        let mut conn = self.conn()?;
        let rows = invoice_items::table
            .filter(invoice_items::invoice_id.eq(invoice_id.get()))
            .order(invoice_items::id.asc())
            .load::<DbInvoiceItem>(&mut conn)?;

        rows.into_iter()
            .map(|row| InvoiceItem::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<Vec<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let mut items = invoices::table
            .filter(invoices::workspace_id.eq(query.workspace_id.get()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(client_id) = query.client_id {
            items = items.filter(invoices::client_id.eq(client_id.get()));
        }
        if let Some(status) = query.status {
            items = items.filter(invoices::status.eq(status.as_str()));
        }

        let rows = items
            .order((invoices::issue_date.desc(), invoices::id.desc()))
            .load::<DbInvoice>(&mut conn)?;

        rows.into_iter()
            .map(|row| Invoice::try_from(row).map_err(RepositoryError::from))
            .collect()
    }
}

impl InvoiceWriter for DieselRepository {
    fn create_invoice(&self, invoice: &NewInvoice) -> RepositoryResult<Invoice> {
        use crate::schema::{clients, invoice_items, invoices};

        let mut conn = self.conn()?;
        conn.immediate_transaction::<Invoice, RepositoryError, _>(|conn| {
            let client_exists = diesel::select(diesel::dsl::exists(
                clients::table
                    .filter(clients::id.eq(invoice.client_id.get()))
                    .filter(clients::workspace_id.eq(invoice.workspace_id.get())),
            ))
            .get_result::<bool>(conn)?;
            if !client_exists {
                return Err(RepositoryError::NotFound);
            }

            let number = format_invoice_number(next_sequence(conn, invoice.workspace_id)?);
            let row = diesel::insert_into(invoices::table)
                .values(&DbNewInvoice {
                    workspace_id: invoice.workspace_id.get(),
                    client_id: invoice.client_id.get(),
                    number: &number,
                    status: InvoiceStatus::Draft.as_str(),
                    issue_date: invoice.issue_date,
                    due_date: invoice.due_date,
                    subtotal: invoice.totals.subtotal.cents(),
                    tax_rate_bp: invoice.tax_rate_bp,
                    tax: invoice.totals.tax.cents(),
                    total: invoice.totals.total.cents(),
                    notes: invoice.notes.as_deref(),
                })
                .get_result::<DbInvoice>(conn)?;

            let items = invoice
                .items
                .iter()
                .map(|item| DbNewInvoiceItem::from_domain(row.id, item))
                .collect::<Result<Vec<_>, _>>()?;
            diesel::insert_into(invoice_items::table)
                .values(&items)
                .execute(conn)?;

            Ok(Invoice::try_from(row)?)
        })
    }

    fn set_invoice_status(
        &self,
        id: InvoiceId,
        workspace_id: WorkspaceId,
        status: InvoiceStatus,
    ) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        conn.immediate_transaction::<Invoice, RepositoryError, _>(|conn| {
            let invoice = load_invoice(conn, id, workspace_id)?;
            if !invoice.status.can_become(status) {
                return Err(RepositoryError::Conflict(format!(
                    "invoice {} is {} and cannot become {status}",
                    invoice.number, invoice.status
                )));
            }

            let row = diesel::update(invoices::table.find(id.get()))
                .set(invoices::status.eq(status.as_str()))
                .get_result::<DbInvoice>(conn)?;
            Ok(Invoice::try_from(row)?)
        })
    }

    fn pay_invoice(
        &self,
        id: InvoiceId,
        workspace_id: WorkspaceId,
        method: PaymentMethod,
        now: NaiveDateTime,
    ) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        conn.immediate_transaction::<Invoice, RepositoryError, _>(|conn| {
            let invoice = load_invoice(conn, id, workspace_id)?;
            if !invoice.status.can_pay() {
                return Err(RepositoryError::Conflict(format!(
                    "invoice {} is {} and cannot be paid",
                    invoice.number, invoice.status
                )));
            }

            // Zero-total invoices settle without a ledger entry.
            if method == PaymentMethod::Wallet && invoice.total.cents() > 0 {
                let movement = WalletMovement::debit(
                    invoice.client_id,
                    PositiveAmount::new(invoice.total.cents())?,
                    LineDescription::new(format!("Payment of invoice {}", invoice.number))?,
                )
                .with_invoice(invoice.id);
                record_movement(conn, workspace_id, &movement, now)?;
            }

            let row = diesel::update(invoices::table.find(id.get()))
                .set((
                    invoices::status.eq(InvoiceStatus::Paid.as_str()),
                    invoices::paid_at.eq(Some(now)),
                ))
                .get_result::<DbInvoice>(conn)?;
            Ok(Invoice::try_from(row)?)
        })
    }

    fn mark_overdue_invoices(
        &self,
        workspace_id: Option<WorkspaceId>,
        today: NaiveDate,
    ) -> RepositoryResult<usize> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let overdue = invoices::status
            .eq(InvoiceStatus::Sent.as_str())
            .and(invoices::due_date.lt(today));

        let updated = match workspace_id {
            Some(workspace_id) => diesel::update(
                invoices::table
                    .filter(overdue)
                    .filter(invoices::workspace_id.eq(workspace_id.get())),
            )
            .set(invoices::status.eq(InvoiceStatus::Overdue.as_str()))
            .execute(&mut conn)?,
            None => diesel::update(invoices::table.filter(overdue))
                .set(invoices::status.eq(InvoiceStatus::Overdue.as_str()))
                .execute(&mut conn)?,
        };

        Ok(updated)
    }
}
