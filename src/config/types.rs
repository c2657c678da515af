use serde::Deserialize;

/// Main configuration structure for Folio-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// The site records are harvested from
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base origin used to resolve relative links and recognize detail pages
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Default number of detail pages processed from a listing page
    #[serde(rename = "max-books", default = "default_max_books")]
    pub max_books: u32,

    /// Pause between detail page fetches in listing mode (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Connect timeout for page and artifact requests (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Read timeout for page and artifact requests (seconds)
    #[serde(rename = "read-timeout-secs", default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_books: default_max_books(),
            delay_ms: default_delay_ms(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

/// User agent sent with every outbound request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

/// Catalog database and local artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite catalog database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory holding locally stored artifacts
    #[serde(rename = "upload-dir")]
    pub upload_dir: String,
}

/// Remote document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// Folder every uploaded artifact is placed into
    #[serde(rename = "folder-id", default)]
    pub folder_id: String,

    /// Environment variable holding the bearer token
    #[serde(rename = "access-token-env", default = "default_token_env")]
    pub access_token_env: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: default_api_base(),
            folder_id: String::new(),
            access_token_env: default_token_env(),
        }
    }
}

fn default_max_books() -> u32 {
    10
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_read_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_token_env() -> String {
    "DRIVE_ACCESS_TOKEN".to_string()
}
