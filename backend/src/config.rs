//! Runtime configuration, read once at startup from environment variables
//! (a `.env` file is honored when present). Every knob has a default so the
//! tool runs out of the box on an operator's machine.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Credentials the login endpoint checks submitted credentials against.
    pub admin_username: String,
    pub admin_password: String,
    /// Path of the SQLite database file holding the order records.
    pub database_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        AppConfig {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ordertrack.sqlite")),
        }
    }
}
