use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Each recorded crawl run carries this hash so runs made with different
/// settings can be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const FULL_CONFIG: &str = r#"
[site]
base-url = "https://dtv-ebook.com.vn"

[crawler]
max-books = 3
delay-ms = 500
connect-timeout-secs = 10
read-timeout-secs = 20

[user-agent]
value = "TestAgent/1.0"

[storage]
database-path = "./catalog.db"
upload-dir = "./uploads"

[remote]
enabled = true
api-base = "https://www.googleapis.com"
folder-id = "folder-123"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(FULL_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.base_url, "https://dtv-ebook.com.vn");
        assert_eq!(config.crawler.max_books, 3);
        assert_eq!(config.crawler.delay_ms, 500);
        assert_eq!(config.user_agent.value, "TestAgent/1.0");
        assert!(config.remote.enabled);
        assert_eq!(config.remote.folder_id, "folder-123");
        assert_eq!(config.remote.access_token_env, "DRIVE_ACCESS_TOKEN");
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config = parse_config(
            r#"
[site]
base-url = "https://dtv-ebook.com.vn"

[storage]
database-path = "./catalog.db"
upload-dir = "./uploads"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_books, 10);
        assert_eq!(config.crawler.delay_ms, 2000);
        assert_eq!(config.crawler.connect_timeout_secs, 30);
        assert_eq!(config.crawler.read_timeout_secs, 60);
        assert!(!config.remote.enabled);
        assert!(config.user_agent.value.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config(&FULL_CONFIG.replace("max-books = 3", "max-books = 0"));
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
