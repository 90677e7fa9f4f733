#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::realtime::{EventHub, PresenceTracker};
#[cfg(feature = "server")]
use crate::repository::DieselRepository;

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod realtime;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Every staff member of a workspace carries this role.
pub const SERVICE_ACCESS_ROLE: &str = "agency";
pub const SERVICE_ADMIN_ROLE: &str = "agency_admin";
/// Managers only work with the clients they are assigned to.
pub const SERVICE_MANAGER_ROLE: &str = "agency_manager";
/// Client portal users, matched to a client record by email.
pub const SERVICE_CLIENT_ROLE: &str = "agency_client";

/// Registers every JSON endpoint under `/api/v1`.
#[cfg(feature = "server")]
pub fn api_scope() -> actix_web::Scope {
    use crate::routes::{
        billing, campaigns, clients, dashboard, deliverables, events, messaging, session, team,
        workspace,
    };

    web::scope("/api/v1")
        .service(session::open_session)
        .service(session::logout)
        .service(workspace::show_workspace)
        .service(workspace::rename_workspace)
        .service(clients::list_clients)
        .service(clients::create_client)
        .service(clients::import_clients)
        .service(clients::show_client)
        .service(clients::update_client)
        .service(clients::delete_client)
        .service(clients::assign_team)
        .service(team::list_members)
        .service(team::create_member)
        .service(team::team_workload)
        .service(team::migrate_member)
        .service(team::update_member)
        .service(team::list_invitations)
        .service(team::invite_member)
        .service(team::accept_invitation)
        .service(team::revoke_invitation)
        .service(deliverables::list_deliverables)
        .service(deliverables::kanban_board)
        .service(deliverables::create_deliverable)
        .service(deliverables::update_deliverable)
        .service(deliverables::delete_deliverable)
        .service(deliverables::move_deliverable)
        .service(deliverables::package_usage)
        .service(deliverables::set_allocation)
        .service(campaigns::list_campaigns)
        .service(campaigns::campaign_summary)
        .service(campaigns::create_campaign)
        .service(campaigns::update_campaign_status)
        .service(campaigns::record_spend)
        .service(billing::show_wallet)
        .service(billing::credit_wallet)
        .service(billing::debit_wallet)
        .service(billing::reconcile_wallet)
        .service(billing::list_invoices)
        .service(billing::create_invoice)
        .service(billing::mark_overdue)
        .service(billing::show_invoice)
        .service(billing::send_invoice)
        .service(billing::pay_invoice)
        .service(billing::void_invoice)
        .service(messaging::list_channels)
        .service(messaging::create_channel)
        .service(messaging::join_channel)
        .service(messaging::leave_channel)
        .service(messaging::list_messages)
        .service(messaging::post_message)
        .service(messaging::edit_message)
        .service(messaging::delete_message)
        .service(messaging::read_receipts)
        .service(messaging::mark_read)
        .service(messaging::show_draft)
        .service(messaging::save_draft)
        .service(messaging::clear_draft)
        .service(messaging::start_typing)
        .service(messaging::typing_members)
        .service(messaging::heartbeat)
        .service(messaging::online_members)
        .service(dashboard::admin_dashboard)
        .service(dashboard::member_dashboard)
        .service(dashboard::client_dashboard)
        .service(events::change_feed)
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = db::establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);
    let hub = EventHub::new(server_config.event_buffer);
    let presence = web::Data::new(PresenceTracker::new());

    // Keys and stores for identity and sessions.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting agency hub on {}:{}",
        server_config.address,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(api_scope())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(hub.clone()))
            .app_data(presence.clone())
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
