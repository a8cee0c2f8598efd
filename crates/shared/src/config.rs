//! Application configuration management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Outbound SMTP configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Blob storage for rendered exports.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Export cache lifetimes and render limits.
    #[serde(default)]
    pub exports: ExportConfig,
    /// Closing-statement distribution.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Statement presentation settings.
    #[serde(default)]
    pub statements: StatementConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in minutes.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expires_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_minutes: default_access_token_expiry(),
        }
    }
}

fn default_access_token_expiry() -> i64 {
    15
}

/// SMTP configuration for outbound email.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Use implicit TLS relay instead of a plain local relay.
    #[serde(default)]
    pub use_tls: bool,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            use_tls: false,
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "no-reply@till.local".to_string()
}

fn default_from_name() -> String {
    "Till".to_string()
}

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl Default for StorageProvider {
    fn default() -> Self {
        Self::LocalFs {
            root: PathBuf::from("./storage"),
        }
    }
}

impl StorageProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// Storage section of the application config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Backend that holds export blobs.
    #[serde(default)]
    pub provider: StorageProvider,
    /// Timeout applied to every blob read, write and delete.
    #[serde(default = "default_storage_timeout")]
    pub io_timeout_secs: u64,
}

fn default_storage_timeout() -> u64 {
    10
}

/// Export cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Lifetime of a cached export.
    #[serde(default = "default_export_ttl")]
    pub ttl_hours: i64,
    /// Upper bound for a single render.
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,
    /// Cadence of the expired-export sweep.
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_export_ttl(),
            render_timeout_secs: default_render_timeout(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

fn default_export_ttl() -> i64 {
    24
}

fn default_render_timeout() -> u64 {
    30
}

fn default_purge_interval() -> u64 {
    86_400
}

/// Closing-statement distribution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationConfig {
    /// Mailbox that receives closing statements. Distribution is off when unset.
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Statement presentation.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementConfig {
    /// IANA timezone used for every rendered date.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Optional logo image embedded in statements.
    #[serde(default)]
    pub logo_path: Option<PathBuf>,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            logo_path: None,
        }
    }
}

fn default_timezone() -> String {
    "America/Santiago".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TILL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env_applies_defaults() {
        temp_env::with_vars(
            [
                ("TILL__DATABASE__URL", Some("postgres://localhost/till")),
                ("TILL__JWT__SECRET", Some("secret")),
                ("TILL__NOTIFICATIONS__RECIPIENT", Some("owner@example.com")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/till");
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.exports.ttl_hours, 24);
                assert_eq!(config.statements.timezone, "America/Santiago");
                assert_eq!(
                    config.notifications.recipient.as_deref(),
                    Some("owner@example.com")
                );
                assert!(matches!(
                    config.storage.provider,
                    StorageProvider::LocalFs { .. }
                ));
            },
        );
    }

    #[test]
    fn test_storage_provider_tagged() {
        let provider: StorageProvider = serde_json::from_value(serde_json::json!({
            "type": "s3",
            "endpoint": "https://r2.example.com",
            "bucket": "exports",
            "access_key_id": "id",
            "secret_access_key": "key",
            "region": "auto"
        }))
        .unwrap();
        assert!(matches!(provider, StorageProvider::S3 { ref bucket, .. } if bucket == "exports"));
    }
}
