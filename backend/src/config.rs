//! Application configuration.
//!
//! Resolution order, highest first:
//! 1. Command-line flags (and their `CLAPIER_*` environment variables, see `main.rs`)
//! 2. TOML file given with `--config`
//! 3. `<config dir>/clapier/config.toml` when it exists
//! 4. Compiled defaults

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub breeding: BreedingConfig,
    pub pedigree: PedigreeConfig,
    pub locale: LocaleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Origin allowed by CORS; any origin when unset
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            cors_origin: Some("http://localhost:8080".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:clapier.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedingConfig {
    /// Days from mating to expected kindling
    pub gestation_days: u32,
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self { gestation_days: 31 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PedigreeConfig {
    /// Ancestor generations shown when a request does not ask for a depth
    pub default_depth: u32,
    pub max_depth: u32,
}

impl Default for PedigreeConfig {
    fn default() -> Self {
        Self {
            default_depth: 3,
            max_depth: 8,
        }
    }
}

/// Currency and date conventions used by printed documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub currency_symbol: String,
    /// "12,50 €" rather than "€12,50"
    pub symbol_after: bool,
    pub decimal_separator: char,
    /// chrono format string
    pub date_format: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
            symbol_after: true,
            decimal_separator: ',',
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit file, the per-user file, or defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::user_config_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => {
                info!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("clapier").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.pedigree.default_depth > self.pedigree.max_depth {
            anyhow::bail!(
                "pedigree.default_depth ({}) exceeds pedigree.max_depth ({})",
                self.pedigree.default_depth,
                self.pedigree.max_depth
            );
        }
        if self.breeding.gestation_days == 0 {
            anyhow::bail!("breeding.gestation_days must be positive");
        }
        if StrftimeItems::new(&self.locale.date_format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!("locale.date_format {:?} is not a valid format", self.locale.date_format);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pedigree.default_depth, 3);
        assert_eq!(config.breeding.gestation_days, 31);
        assert_eq!(config.database.url, "sqlite:clapier.db");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[pedigree]
default_depth = 2

[locale]
currency_symbol = "$"
symbol_after = false
decimal_separator = "."
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.pedigree.default_depth, 2);
        assert_eq!(config.pedigree.max_depth, 8);
        assert_eq!(config.locale.currency_symbol, "$");
        assert_eq!(config.locale.decimal_separator, '.');
        assert_eq!(config.locale.date_format, "%d/%m/%Y");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_rejects_inconsistent_depths() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pedigree]\ndefault_depth = 9\nmax_depth = 4").unwrap();

        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_rejects_bad_date_format() {
        let mut config = AppConfig::default();
        config.locale.date_format = "%d/%Q/%".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }
}
