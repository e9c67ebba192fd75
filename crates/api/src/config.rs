use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for a single-host deployment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8420`).
    pub port: u16,
    /// Store location (default: `sqlite://aura.db`, created on first run).
    pub database_url: String,
    /// Directory receiving per-job artifacts (default: `artifacts`).
    pub artifacts_dir: PathBuf,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Submit-endpoint configuration document (default: `config.json`).
    /// A missing file means only the generic endpoint is registered.
    pub config_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default            |
    /// |------------------------|--------------------|
    /// | `HOST`                 | `0.0.0.0`          |
    /// | `PORT`                 | `8420`             |
    /// | `DATABASE_URL`         | `sqlite://aura.db` |
    /// | `ARTIFACTS_DIR`        | `artifacts`        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`               |
    /// | `CONFIG_PATH`          | `config.json`      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8420".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://aura.db".into());

        let artifacts_dir: PathBuf = std::env::var("ARTIFACTS_DIR")
            .unwrap_or_else(|_| "artifacts".into())
            .into();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let config_path: PathBuf = std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| "config.json".into())
            .into();

        Self {
            host,
            port,
            database_url,
            artifacts_dir,
            request_timeout_secs,
            config_path,
        }
    }
}
