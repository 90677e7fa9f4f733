//! Background worker flipping past-due sent invoices to overdue.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use dotenvy::dotenv;

use agency_hub::db::establish_connection_pool;
use agency_hub::models::config::ServerConfig;
use agency_hub::repository::{DieselRepository, InvoiceWriter};

fn sweep<R>(repo: &R)
where
    R: InvoiceWriter,
{
    let today = Utc::now().date_naive();
    match repo.mark_overdue_invoices(None, today) {
        Ok(0) => log::debug!("No invoices became overdue on {today}"),
        Ok(count) => log::info!("Marked {count} invoices overdue on {today}"),
        Err(e) => log::error!("Error sweeping overdue invoices: {e}"),
    }
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let repo = DieselRepository::new(pool);
    let interval = Duration::from_secs(server_config.overdue_sweep_interval_secs.max(1));

    log::info!("Starting overdue sweeper, running every {}s", interval.as_secs());

    loop {
        sweep(&repo);
        thread::sleep(interval);
    }
}
