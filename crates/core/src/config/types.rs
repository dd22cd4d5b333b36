use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Chat platform configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Bot API token
    pub token: String,
    /// Long-poll timeout in seconds (default: 30)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u32,
}

fn default_poll_timeout() -> u32 {
    30
}

/// Delivery pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Largest artifact handed to the chat platform directly, in MiB
    #[serde(default = "default_direct_limit_mib")]
    pub direct_limit_mib: u64,
    /// Root directory for per-request working directories
    #[serde(default = "default_work_root")]
    pub work_root: PathBuf,
    /// Minimum interval between status updates, in milliseconds
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    /// How long a probed format catalog stays selectable, in seconds
    #[serde(default = "default_catalog_ttl_secs")]
    pub catalog_ttl_secs: u64,
}

impl DeliveryConfig {
    pub fn direct_limit_bytes(&self) -> u64 {
        self.direct_limit_mib * 1024 * 1024
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            direct_limit_mib: default_direct_limit_mib(),
            work_root: default_work_root(),
            progress_interval_ms: default_progress_interval_ms(),
            catalog_ttl_secs: default_catalog_ttl_secs(),
        }
    }
}

fn default_direct_limit_mib() -> u64 {
    50
}

fn default_work_root() -> PathBuf {
    std::env::temp_dir().join("fetchbot")
}

fn default_progress_interval_ms() -> u64 {
    800
}

fn default_catalog_ttl_secs() -> u64 {
    30 * 60
}

/// Remote upload configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Remote upload provider
    #[serde(default = "default_provider")]
    pub provider: UploadProvider,
    /// Base URL of the anonymous file host
    #[serde(default = "default_anonymous_host_url")]
    pub anonymous_host_url: String,
    /// Object-storage configuration (required when provider = "object_storage")
    #[serde(default)]
    pub object_storage: Option<ObjectStorageConfig>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            anonymous_host_url: default_anonymous_host_url(),
            object_storage: None,
        }
    }
}

fn default_provider() -> UploadProvider {
    UploadProvider::AnonymousHost
}

fn default_anonymous_host_url() -> String {
    "https://transfer.sh".to_string()
}

/// Available remote upload providers
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadProvider {
    AnonymousHost,
    ObjectStorage,
}

/// S3-compatible object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectStorageConfig {
    /// Bucket name
    pub bucket: String,
    /// Bucket region (e.g. "eu-west-1")
    pub region: String,
    /// Access key id
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Object key prefix (default: "fetchbot")
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    "fetchbot".to_string()
}

/// Sanitized config for logging at startup (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub bot: SanitizedBotConfig,
    pub delivery: DeliveryConfig,
    pub upload: SanitizedUploadConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBotConfig {
    pub token_configured: bool,
    pub poll_timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUploadConfig {
    pub provider: UploadProvider,
    pub anonymous_host_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_storage: Option<SanitizedObjectStorageConfig>,
}

/// Sanitized object storage config (secret key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedObjectStorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key_configured: bool,
    pub key_prefix: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            bot: SanitizedBotConfig {
                token_configured: !config.bot.token.is_empty(),
                poll_timeout_secs: config.bot.poll_timeout_secs,
            },
            delivery: config.delivery.clone(),
            upload: SanitizedUploadConfig {
                provider: config.upload.provider,
                anonymous_host_url: config.upload.anonymous_host_url.clone(),
                object_storage: config.upload.object_storage.as_ref().map(|s| {
                    SanitizedObjectStorageConfig {
                        bucket: s.bucket.clone(),
                        region: s.region.clone(),
                        access_key: s.access_key.clone(),
                        secret_key_configured: !s.secret_key.is_empty(),
                        key_prefix: s.key_prefix.clone(),
                    }
                }),
            },
        }
    }
}
