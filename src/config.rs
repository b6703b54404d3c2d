use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Port the HTTP server listens on
    pub port: u16,
    /// How long an admin session stays valid
    pub session_ttl_minutes: u64,
    /// Password for the `admin` account created by `storefront-admin bootstrap`
    pub admin_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("storefront").join("storefront.db"),
            port: 8080,
            session_ttl_minutes: 720,
            admin_password: None,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("STOREFRONT_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        if let Ok(db_path) = std::env::var("STOREFRONT_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(port) = std::env::var("STOREFRONT_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("STOREFRONT_PORT", port))?;
        }
        if let Ok(ttl) = std::env::var("STOREFRONT_SESSION_TTL_MINUTES") {
            config.session_ttl_minutes = ttl
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("STOREFRONT_SESSION_TTL_MINUTES", ttl))?;
        }
        if let Ok(password) = std::env::var("STOREFRONT_ADMIN_PASSWORD") {
            config.admin_password = Some(password);
        }

        Ok(config)
    }

    /// Default config file path: <config dir>/storefront/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("storefront")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                )
            }
            ConfigError::InvalidEnv(name, value) => {
                write!(f, "Invalid value '{}' for {}", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Tests that touch process env vars must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config
            .database_path
            .to_string_lossy()
            .contains("storefront.db"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_ttl_minutes, 720);
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_load_from_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/db.sqlite").unwrap();
        writeln!(file, "port: 9090").unwrap();
        writeln!(file, "admin_password: s3cret").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/custom/path/db.sqlite")
        );
        assert_eq!(config.port, 9090);
        assert_eq!(config.session_ttl_minutes, 720);
        assert_eq!(config.admin_password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_env_var_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "port: 9090").unwrap();
        writeln!(file, "session_ttl_minutes: 5").unwrap();

        std::env::set_var("STOREFRONT_PORT", "7070");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.port, 7070);
        assert_eq!(config.session_ttl_minutes, 5);

        std::env::remove_var("STOREFRONT_PORT");
    }

    #[test]
    fn test_invalid_env_value_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp_dir = tempdir().unwrap();

        std::env::set_var("STOREFRONT_SESSION_TTL_MINUTES", "forever");

        let result = Config::load(Some(temp_dir.path().join("none.yaml")));

        std::env::remove_var("STOREFRONT_SESSION_TTL_MINUTES");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("STOREFRONT_SESSION_TTL_MINUTES"));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
