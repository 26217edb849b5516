//! Configuration management infrastructure.
//!
//! Persists signer preferences (keystore location, default alias, digest,
//! verification policy) as TOML. Passwords are never written to the file;
//! the configuration only names the environment variables that carry them.

use crate::adapters::keystore::KeyStoreFormat;
use crate::domain::crypto::DigestAlgorithm;
use crate::domain::types::Password;
use crate::domain::verification::VerificationPolicy;
use crate::infra::error::{AsicError, AsicResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Signer and verifier preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfiguration {
    /// Keystore used when none is given on the command line
    pub keystore_path: Option<PathBuf>,

    /// "jks", "pkcs12", or absent to detect from the file contents
    pub keystore_format: Option<String>,

    /// Alias used when none is given; absent selects the first entry
    pub default_alias: Option<String>,

    /// Environment variable holding the keystore password
    pub store_password_env: String,

    /// Environment variable holding the key password
    pub key_password_env: String,

    /// Digest used for new signatures
    pub signing_digest: String,

    /// "all" or "any"
    pub verification_policy: String,

    /// Print produced signatures as base64
    pub log_signatures: bool,
}

impl Default for SignerConfiguration {
    fn default() -> Self {
        Self {
            keystore_path: None,
            keystore_format: None,
            default_alias: None,
            store_password_env: "ASIC_STORE_PASSWORD".to_string(),
            key_password_env: "ASIC_KEY_PASSWORD".to_string(),
            signing_digest: DigestAlgorithm::Sha1.as_str().to_string(),
            verification_policy: VerificationPolicy::AllSigners.as_str().to_string(),
            log_signatures: false,
        }
    }
}

impl SignerConfiguration {
    pub fn keystore_format(&self) -> AsicResult<Option<KeyStoreFormat>> {
        self.keystore_format
            .as_deref()
            .map(|format| format.parse().map_err(AsicError::Configuration))
            .transpose()
    }

    pub fn signing_digest(&self) -> AsicResult<DigestAlgorithm> {
        self.signing_digest.parse().map_err(AsicError::Configuration)
    }

    pub fn verification_policy(&self) -> AsicResult<VerificationPolicy> {
        self.verification_policy
            .parse()
            .map_err(AsicError::Configuration)
    }

    /// Store password from the configured environment variable.
    pub fn store_password(&self) -> AsicResult<Password> {
        password_from_env(&self.store_password_env)
    }

    /// Key password from its environment variable, falling back to the
    /// store password when that variable is unset.
    pub fn key_password(&self) -> AsicResult<Password> {
        match std::env::var(&self.key_password_env) {
            Ok(value) => Ok(Password::new(value)),
            Err(_) => self.store_password(),
        }
    }
}

fn password_from_env(variable: &str) -> AsicResult<Password> {
    std::env::var(variable).map(Password::new).map_err(|_| {
        AsicError::Configuration(format!("Environment variable {variable} is not set"))
    })
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        match dirs::config_dir() {
            Some(config_dir) => config_dir.join("asic-signer").join("config.toml"),
            None => PathBuf::from("asic-signer-config.toml"),
        }
    }

    /// Load the configuration, or the defaults when no file exists yet.
    pub fn load_or_default(&self) -> AsicResult<SignerConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::debug!(
                "No configuration at {}, using defaults",
                self.config_path.display()
            );
            Ok(SignerConfiguration::default())
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> AsicResult<SignerConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = SignerConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> AsicResult<SignerConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            AsicError::Configuration(format!(
                "Failed to read config file {}: {e}",
                self.config_path.display()
            ))
        })?;

        let config: SignerConfiguration = toml::from_str(&content).map_err(|e| {
            AsicError::Configuration(format!("Failed to parse config file: {e}"))
        })?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &SignerConfiguration) -> AsicResult<()> {
        validate_config(config)?;
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AsicError::Configuration(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            AsicError::Configuration(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            AsicError::Configuration(format!(
                "Failed to write config file {}: {e}",
                self.config_path.display()
            ))
        })?;

        Ok(())
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> AsicResult<()> {
        let mut config = self.load_or_default()?;
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

        match key {
            "keystore_path" => config.keystore_path = optional(value).map(PathBuf::from),
            "keystore_format" => config.keystore_format = optional(value),
            "default_alias" => config.default_alias = optional(value),
            "store_password_env" => config.store_password_env = value.to_string(),
            "key_password_env" => config.key_password_env = value.to_string(),
            "signing_digest" => config.signing_digest = value.to_string(),
            "verification_policy" => config.verification_policy = value.to_string(),
            "log_signatures" => {
                config.log_signatures = value.parse().map_err(|_| {
                    AsicError::Configuration(format!("Invalid boolean value: {value}"))
                })?;
            }
            _ => {
                return Err(AsicError::Configuration(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Export configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> AsicResult<String> {
        let config = self.load_or_default()?;

        match format {
            ExportFormat::Toml => toml::to_string_pretty(&config)
                .map_err(|e| AsicError::Configuration(format!("TOML export failed: {e}"))),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| AsicError::Configuration(format!("JSON export failed: {e}"))),
        }
    }

    /// Import configuration from a string
    pub fn import_config(&self, content: &str, format: ExportFormat) -> AsicResult<()> {
        let config: SignerConfiguration = match format {
            ExportFormat::Toml => toml::from_str(content)
                .map_err(|e| AsicError::Configuration(format!("TOML import failed: {e}")))?,
            ExportFormat::Json => serde_json::from_str(content)
                .map_err(|e| AsicError::Configuration(format!("JSON import failed: {e}")))?,
        };

        self.save(&config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate configuration values
fn validate_config(config: &SignerConfiguration) -> AsicResult<()> {
    config.keystore_format()?;
    config.signing_digest()?;
    config.verification_policy()?;

    if config.store_password_env.trim().is_empty() {
        return Err(AsicError::Configuration(
            "store_password_env must name an environment variable".to_string(),
        ));
    }
    if config.key_password_env.trim().is_empty() {
        return Err(AsicError::Configuration(
            "key_password_env must name an environment variable".to_string(),
        ));
    }

    Ok(())
}

/// Configuration export/import formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Toml,
    Json,
}
