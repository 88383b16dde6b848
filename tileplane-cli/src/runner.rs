//! Shared setup for commands that talk to the tile plane.

use tileplane::config::ConfigFile;
use tileplane::logging::{init_logging, LoggingGuard};
use tokio::runtime::Runtime;

use crate::error::CliError;

/// Loads configuration, installs logging and builds the runtime.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let logging = init_logging(
            config.logging.directory.as_deref(),
            &config.logging.level,
        )?;
        Ok(Self {
            config,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        tracing::info!(
            version = tileplane::VERSION,
            command,
            config = %tileplane::config::config_file_path().display(),
            "tileplane starting"
        );
    }

    /// Multi-threaded runtime for async commands.
    pub fn runtime(&self) -> Result<Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))
    }
}
