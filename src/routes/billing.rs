use actix_web::{Responder, get, post, web};

use crate::forms::billing::{
    InvoiceForm, InvoicesQuery, PayInvoiceForm, TransactionsQuery, WalletMovementForm,
};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::EventHub;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::{invoices as invoices_service, wallet as wallet_service};

#[get("/clients/{client_id}/wallet")]
pub async fn show_wallet(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<TransactionsQuery>,
) -> impl Responder {
    respond(
        "load wallet",
        wallet_service::list_transactions(repo.get_ref(), &user, client_id.into_inner(), query),
    )
}

#[post("/clients/{client_id}/wallet/credit")]
pub async fn credit_wallet(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<WalletMovementForm>,
) -> impl Responder {
    respond_created(
        "credit wallet",
        wallet_service::credit_wallet(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            client_id.into_inner(),
            form,
        ),
    )
}

#[post("/clients/{client_id}/wallet/debit")]
pub async fn debit_wallet(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<WalletMovementForm>,
) -> impl Responder {
    respond_created(
        "debit wallet",
        wallet_service::debit_wallet(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            client_id.into_inner(),
            form,
        ),
    )
}

#[get("/clients/{client_id}/wallet/reconcile")]
pub async fn reconcile_wallet(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "reconcile wallet",
        wallet_service::reconcile_wallet(repo.get_ref(), &user, client_id.into_inner()),
    )
}

#[get("/invoices")]
pub async fn list_invoices(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<InvoicesQuery>,
) -> impl Responder {
    respond(
        "list invoices",
        invoices_service::list_invoices(repo.get_ref(), &user, query),
    )
}

#[post("/invoices")]
pub async fn create_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<InvoiceForm>,
) -> impl Responder {
    respond_created(
        "create invoice",
        invoices_service::create_invoice(repo.get_ref(), hub.get_ref(), &user, form),
    )
}

#[post("/invoices/overdue")]
pub async fn mark_overdue(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
) -> impl Responder {
    respond(
        "mark overdue invoices",
        invoices_service::mark_overdue(repo.get_ref(), hub.get_ref(), &user),
    )
}

#[get("/invoices/{invoice_id}")]
pub async fn show_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "load invoice",
        invoices_service::get_invoice(repo.get_ref(), &user, invoice_id.into_inner()),
    )
}

#[post("/invoices/{invoice_id}/send")]
pub async fn send_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
) -> impl Responder {
    respond(
        "send invoice",
        invoices_service::send_invoice(repo.get_ref(), hub.get_ref(), &user, invoice_id.into_inner()),
    )
}

#[post("/invoices/{invoice_id}/pay")]
pub async fn pay_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<PayInvoiceForm>,
) -> impl Responder {
    respond(
        "pay invoice",
        invoices_service::pay_invoice(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            invoice_id.into_inner(),
            form,
        ),
    )
}

#[post("/invoices/{invoice_id}/void")]
pub async fn void_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
) -> impl Responder {
    respond(
        "void invoice",
        invoices_service::void_invoice(repo.get_ref(), hub.get_ref(), &user, invoice_id.into_inner()),
    )
}
