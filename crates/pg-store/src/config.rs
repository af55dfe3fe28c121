//! Generator configuration from `pg.toml`.
//!
//! Precedence, lowest first: built-in defaults, the config file, environment
//! overrides (`PG_CONFIG` picks the file, `PG_DATASET` the dataset), then
//! whatever the caller layers on top from its own flags.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pg_core::{
    CapType, GenerationMode, GenerationRequest, MAX_LEVEL, PropContinuity, SliceSize,
};
use serde::Deserialize;

use crate::error::{Result, StoreError};

pub const CONFIG_FILE: &str = "pg.toml";
pub const CONFIG_ENV: &str = "PG_CONFIG";
pub const DATASET_ENV: &str = "PG_DATASET";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Dataset file. Relative paths resolve against the config file's directory.
    pub dataset: Option<PathBuf>,
    pub mode: GenerationMode,
    pub length: usize,
    pub level: u8,
    pub intensity: f64,
    pub prop_continuity: PropContinuity,
    pub cap_type: CapType,
    pub slice_size: SliceSize,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let request = GenerationRequest::default();
        Self {
            dataset: None,
            mode: request.mode,
            length: request.length,
            level: request.level,
            intensity: request.intensity,
            prop_continuity: request.prop_continuity,
            cap_type: request.cap_type,
            slice_size: request.slice_size,
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pure parsing (no I/O)
// ---------------------------------------------------------------------------

impl GeneratorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if !(1..=MAX_LEVEL).contains(&self.level) {
            return Err(StoreError::InvalidData(format!(
                "level {} outside 1..={MAX_LEVEL}",
                self.level
            )));
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(StoreError::InvalidData(format!(
                "intensity {} must be a non-negative number",
                self.intensity
            )));
        }
        Ok(())
    }

    /// Replace the dataset path when an override is present.
    pub fn with_dataset_override(mut self, dataset: Option<PathBuf>) -> Self {
        if dataset.is_some() {
            self.dataset = dataset;
        }
        self
    }

    fn relative_to(mut self, base: &Path) -> Self {
        if let Some(ds) = &self.dataset
            && ds.is_relative()
        {
            self.dataset = Some(base.join(ds));
        }
        self
    }

    /// The generation request these settings describe.
    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            mode: self.mode,
            length: self.length,
            level: self.level,
            intensity: self.intensity,
            prop_continuity: self.prop_continuity,
            cap_type: self.cap_type,
            slice_size: self.slice_size,
            ..GenerationRequest::default()
        }
    }
}

// ---------------------------------------------------------------------------
// I/O wrappers
// ---------------------------------------------------------------------------

impl GeneratorConfig {
    /// Read `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config = Self::from_toml_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Load `explicit`, else `PG_CONFIG`, else `./pg.toml`, then apply
    /// `PG_DATASET`. Only an explicit path must exist.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) if !path.exists() => {
                return Err(StoreError::InvalidData(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            Some(path) => Self::load(path)?,
            None => {
                let path = env_path(CONFIG_ENV).unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
                Self::load(&path)?
            }
        };
        Ok(config.with_dataset_override(env_path(DATASET_ENV)))
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_request() {
        let config = GeneratorConfig::default();
        assert_eq!(config.to_request(), GenerationRequest::default());
        assert!(config.dataset.is_none());
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            dataset = "/data/rows.json"
            mode = "circular"
            length = 16
            level = 3
            intensity = 2.5
            prop_continuity = "continuous"
            cap_type = "mirrored_swapped"
            slice_size = "halved"
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.dataset, Some(PathBuf::from("/data/rows.json")));
        assert_eq!(config.seed, Some(7));

        let request = config.to_request();
        assert_eq!(request.mode, GenerationMode::Circular);
        assert_eq!(request.length, 16);
        assert_eq!(request.level, 3);
        assert_eq!(request.intensity, 2.5);
        assert_eq!(request.prop_continuity, PropContinuity::Continuous);
        assert_eq!(request.cap_type, CapType::MirroredSwapped);
        assert_eq!(request.slice_size, SliceSize::Halved);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = GeneratorConfig::from_toml_str("length = 32").unwrap();
        assert_eq!(config.length, 32);
        assert_eq!(config.level, GeneratorConfig::default().level);
    }

    #[test]
    fn test_rejects_bad_level() {
        assert!(matches!(
            GeneratorConfig::from_toml_str("level = 4"),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_rejects_negative_intensity() {
        assert!(GeneratorConfig::from_toml_str("intensity = -1.0").is_err());
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!(matches!(
            GeneratorConfig::from_toml_str("lenght = 3"),
            Err(StoreError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_relative_dataset_resolves_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "dataset = \"rows.json\"\nseed = 3\n").unwrap();
        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.dataset, Some(dir.path().join("rows.json")));
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(GeneratorConfig::discover(Some(&missing)).is_err());
    }

    #[test]
    fn test_dataset_override() {
        let config = GeneratorConfig::default()
            .with_dataset_override(Some(PathBuf::from("a.json")))
            .with_dataset_override(None);
        assert_eq!(config.dataset, Some(PathBuf::from("a.json")));
    }
}
