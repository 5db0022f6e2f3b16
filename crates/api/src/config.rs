use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// Drive synchronization settings; `None` disables sync entirely
    /// (the queue then reports SyncUnavailable as a warning).
    pub drive: Option<DriveConfig>,
}

/// Settings for the Drive synchronization source.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Folder whose immediate sub-folders are the patients.
    pub root_folder_id: String,
    /// Path to the service-account JSON key file.
    pub service_account_file: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `DRIVE_ROOT_FOLDER_ID`       | unset (sync disabled)      |
    /// | `DRIVE_SERVICE_ACCOUNT_FILE` | `service-account.json`     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let drive = std::env::var("DRIVE_ROOT_FOLDER_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|root_folder_id| DriveConfig {
                root_folder_id,
                service_account_file: std::env::var("DRIVE_SERVICE_ACCOUNT_FILE")
                    .unwrap_or_else(|_| "service-account.json".into())
                    .into(),
            });

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            drive,
        }
    }
}
