use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::invoice::{InvoiceStatus, NewInvoice, NewInvoiceItem, PaymentMethod};
use crate::domain::types::{ClientId, LineDescription, Money, PositiveAmount, WorkspaceId};
use crate::forms::{FormError, non_blank};

/// Credit or debit of a client wallet.
#[derive(Debug, Deserialize, Validate)]
pub struct WalletMovementForm {
    pub amount: i64,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
}

pub struct WalletMovementPayload {
    pub amount: PositiveAmount,
    pub description: LineDescription,
}

impl TryFrom<WalletMovementForm> for WalletMovementPayload {
    type Error = FormError;

    fn try_from(form: WalletMovementForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            amount: PositiveAmount::new(form.amount)?,
            description: LineDescription::new(form.description)?,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct InvoiceItemForm {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Cents per unit.
    #[validate(range(min = 0))]
    pub unit_price: i64,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct InvoiceForm {
    pub client_id: i32,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Tax rate in basis points.
    #[serde(default)]
    pub tax_rate_bp: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<InvoiceItemForm>,
}

impl InvoiceForm {
    pub fn into_domain(self, workspace_id: WorkspaceId) -> Result<NewInvoice, FormError> {
        self.validate()?;

        let items = self
            .items
            .into_iter()
            .map(|item| {
                NewInvoiceItem::try_new(
                    LineDescription::new(item.description)?,
                    item.quantity,
                    Money::new(item.unit_price)?,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewInvoice::try_new(
            workspace_id,
            ClientId::new(self.client_id).map_err(|_| FormError::InvalidId)?,
            self.issue_date,
            self.due_date,
            self.tax_rate_bp,
            non_blank(self.notes),
            items,
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct PayInvoiceForm {
    pub method: PaymentMethod,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoicesQuery {
    pub client_id: Option<i32>,
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub page: Option<usize>,
}
