//! Runtime configuration.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// EduHub CLI configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Data directory for the catalog and progress records
    pub data_dir: PathBuf,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Print JSON instead of text
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: ".eduhub".into(),
            log_level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Log filter to install.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }

    /// Install the global tracing subscriber. Logs go to stderr so stdout
    /// stays parseable.
    pub fn init_logging(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data_dir, PathBuf::from(".eduhub"));
        assert_eq!(config.log_level, "info");
        assert!(!config.json);
    }
}
