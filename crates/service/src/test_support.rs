#![cfg(test)]
use std::sync::Arc;

use configs::DatabaseConfig;
use models::db::SharedConnection;

/// A migrated connection to the database named by `DATABASE_URL`, or `None`
/// when DB tests are disabled or no database is configured.
pub fn shared_connection() -> Option<Arc<SharedConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("skip: DATABASE_URL not set");
        return None;
    };
    let cfg = DatabaseConfig {
        url,
        max_connections: 5,
        acquire_timeout_secs: 10,
        run_migrations: true,
        ..DatabaseConfig::default()
    };
    Some(Arc::new(SharedConnection::new(cfg)))
}
