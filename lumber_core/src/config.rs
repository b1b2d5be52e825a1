//! # Design Configuration
//!
//! Defaults for design value queries and the list of extra species tables
//! to register, read from a TOML file:
//!
//! ```toml
//! species_tables = ["tables/hem_fir.toml"]
//!
//! [defaults]
//! species = "SP"
//! grade = "no_2"
//! sub_grade = ""
//! wet_service = false
//! repetitive_factor = 1.15
//! bearing_area_factor = 1.0
//! format = "text"
//! ```
//!
//! Relative table paths resolve against the directory of the config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{LumberError, LumberResult};
use crate::materials::TabulatedSpecies;
use crate::nds_factors::WetService;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON record
    Json,
}

/// Default query parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignDefaults {
    pub species: String,
    pub grade: String,
    pub sub_grade: String,
    pub wet_service: bool,
    /// C_r applied to bending
    pub repetitive_factor: f64,
    /// C_b applied to bearing
    pub bearing_area_factor: f64,
    pub format: OutputFormat,
}

impl Default for DesignDefaults {
    fn default() -> Self {
        Self {
            species: "SP".to_string(),
            grade: "no_2".to_string(),
            sub_grade: String::new(),
            wet_service: false,
            repetitive_factor: 1.0,
            bearing_area_factor: 1.0,
            format: OutputFormat::Text,
        }
    }
}

impl DesignDefaults {
    /// Wet service condition of the defaults
    pub fn wet_service(&self) -> WetService {
        WetService::from_flag(self.wet_service)
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DesignConfig {
    pub defaults: DesignDefaults,
    /// Extra species table files
    pub species_tables: Vec<PathBuf>,
}

impl DesignConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> LumberResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| LumberError::config(format!("config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative `species_tables` entries are resolved
    /// against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> LumberResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LumberError::io(path.display().to_string(), e.to_string()))?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(dir) = path.parent() {
            for table in &mut config.species_tables {
                if table.is_relative() {
                    *table = dir.join(&*table);
                }
            }
        }
        debug!(path = %path.display(), tables = config.species_tables.len(), "loaded config");
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults
    pub fn load_or_default(path: Option<&Path>) -> LumberResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> LumberResult<String> {
        toml::to_string_pretty(self).map_err(|e| LumberError::config(format!("config: {}", e)))
    }

    /// Read every configured species table
    pub fn load_species_tables(&self) -> LumberResult<Vec<TabulatedSpecies>> {
        self.species_tables.iter().map(TabulatedSpecies::from_file).collect()
    }

    fn validate(&self) -> LumberResult<()> {
        for (field, value) in [
            ("repetitive_factor", self.defaults.repetitive_factor),
            ("bearing_area_factor", self.defaults.bearing_area_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LumberError::config(format!(
                    "config: {} must be positive, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::ReferenceValueProvider;
    use std::fs;

    const HEM_FIR: &str = r#"
name = "HemFir"
density = 500.0
stress_unit = "psi"

[[grades]]
grade = "no_1"
fb = 975.0
ft = 625.0
fv = 150.0
fct = 405.0
fc = 1350.0
e = 1.5e6
emin = 550e3
"#;

    #[test]
    fn test_defaults() {
        let config = DesignConfig::default();
        assert_eq!(config.defaults.species, "SP");
        assert_eq!(config.defaults.grade, "no_2");
        assert_eq!(config.defaults.sub_grade, "");
        assert_eq!(config.defaults.wet_service(), WetService::Dry);
        assert_eq!(config.defaults.format, OutputFormat::Text);
        assert!(config.species_tables.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let content = "[defaults]\nspecies = \"SPF\"\nwet_service = true\n";
        let config = DesignConfig::from_toml_str(content).unwrap();
        assert_eq!(config.defaults.species, "SPF");
        assert!(config.defaults.wet_service);
        assert_eq!(config.defaults.grade, "no_2");
        assert_eq!(config.defaults.repetitive_factor, 1.0);
    }

    #[test]
    fn test_invalid_config() {
        let content = "[defaults]\nrepetitive_factor = -1.0\n";
        let err = DesignConfig::from_toml_str(content).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        let err = DesignConfig::from_toml_str("defaults = 3").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = DesignConfig::default();
        config.defaults.format = OutputFormat::Json;
        config.defaults.repetitive_factor = 1.15;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("format = \"json\""));
        assert_eq!(DesignConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_resolves_table_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hem_fir.toml"), HEM_FIR).unwrap();
        let config_path = dir.path().join("lumber.toml");
        fs::write(&config_path, "species_tables = [\"hem_fir.toml\"]\n").unwrap();

        let config = DesignConfig::load(&config_path).unwrap();
        assert_eq!(config.species_tables, vec![dir.path().join("hem_fir.toml")]);

        let tables = config.load_species_tables().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name(), "HemFir");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DesignConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");

        assert_eq!(DesignConfig::load_or_default(None).unwrap(), DesignConfig::default());
    }
}
