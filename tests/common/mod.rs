#![allow(dead_code)]

use agency_hub::db::{DbPool, establish_connection_pool};
use agency_hub::models::auth::AuthenticatedUser;
use agency_hub::repository::DieselRepository;
use agency_hub::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE, SERVICE_CLIENT_ROLE, SERVICE_MANAGER_ROLE};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use serde::de::DeserializeOwned;
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Temporary SQLite database with every migration applied.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("build pool");
        {
            let mut conn = pool.get().expect("get connection");
            conn.run_pending_migrations(MIGRATIONS)
                .expect("run migrations");
        }
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

fn user(sub: &str, email: &str, name: &str, roles: &[&str]) -> AuthenticatedUser {
    let mut user = AuthenticatedUser {
        sub: sub.to_string(),
        email: email.to_string(),
        hub_id: 1,
        name: name.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: 0,
    };
    user.set_expiration(1);
    user
}

pub fn admin() -> AuthenticatedUser {
    user(
        "1",
        "admin@agency.io",
        "Ada Admin",
        &[SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE],
    )
}

pub fn manager(email: &str) -> AuthenticatedUser {
    user(
        "2",
        email,
        "Max Manager",
        &[SERVICE_ACCESS_ROLE, SERVICE_MANAGER_ROLE],
    )
}

pub fn staff(email: &str, name: &str) -> AuthenticatedUser {
    user("3", email, name, &[SERVICE_ACCESS_ROLE])
}

pub fn portal(email: &str) -> AuthenticatedUser {
    user("4", email, "Portal User", &[SERVICE_CLIENT_ROLE])
}

/// Builds a request payload the way the JSON extractor would.
pub fn form<T: DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).expect("valid payload")
}
