use crate::config::types::{Config, CrawlerConfig, RemoteConfig, SiteConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the connect timeout (seconds)
const MAX_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Upper bound on the read timeout (seconds)
const MAX_READ_TIMEOUT_SECS: u64 = 60;

/// Upper bound on the inter-item delay (milliseconds)
const MAX_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_remote_config(&config.remote)?;

    if config.user_agent.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(
            "base-url must include a host".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_books < 1 {
        return Err(ConfigError::Validation(format!(
            "max-books must be >= 1, got {}",
            config.max_books
        )));
    }

    if config.delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "delay-ms must be <= {}, got {}",
            MAX_DELAY_MS, config.delay_ms
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > MAX_CONNECT_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be between 1 and {}, got {}",
            MAX_CONNECT_TIMEOUT_SECS, config.connect_timeout_secs
        )));
    }

    if config.read_timeout_secs < 1 || config.read_timeout_secs > MAX_READ_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "read-timeout-secs must be between 1 and {}, got {}",
            MAX_READ_TIMEOUT_SECS, config.read_timeout_secs
        )));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.upload_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "upload-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_remote_config(config: &RemoteConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid remote api-base: {}", e)))?;

    if config.folder_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "remote folder-id cannot be empty when remote storage is enabled".to_string(),
        ));
    }

    if config.access_token_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "remote access-token-env cannot be empty".to_string(),
        ));
    }

    Ok(())
}
