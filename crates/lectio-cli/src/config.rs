use anyhow::{anyhow, Result};
use lectio_core::Direction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Insight dataset to open when `--dataset` is not given
    pub dataset_path: Option<PathBuf>,
    /// "forward" or "backward" for `lectio nearest`
    pub default_direction: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            dataset_path: None,
            default_direction: Some(Direction::Forward.as_str().to_string()),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_dataset_path(path: &Path) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.dataset_path = Some(path.to_path_buf());
        config.save()
    }

    /// `--dataset` (or `LECTIO_DATASET`) wins over the config file
    pub fn dataset_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.dataset_path.clone())
            .ok_or_else(|| {
                anyhow!("No insight dataset configured. Pass --dataset or set LECTIO_DATASET")
            })
    }

    pub fn direction(&self) -> Direction {
        self.default_direction
            .as_deref()
            .and_then(Direction::from_str)
            .unwrap_or_default()
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("lectio").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.direction(), Direction::Forward);
    }

    #[test]
    fn test_default_matches_new() {
        let config = Config::default();
        assert_eq!(config, Config::new());
        assert_eq!(config.default_direction.as_deref(), Some("forward"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            dataset_path: Some(PathBuf::from("/data/insights.sqlite")),
            default_direction: Some("backward".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.direction(), Direction::Backward);
    }

    #[test]
    fn test_flag_overrides_config() {
        let config = Config {
            dataset_path: Some(PathBuf::from("from-config.json")),
            default_direction: None,
        };
        assert_eq!(
            config.dataset_path(Some(Path::new("from-flag.json"))).unwrap(),
            PathBuf::from("from-flag.json")
        );
        assert_eq!(
            config.dataset_path(None).unwrap(),
            PathBuf::from("from-config.json")
        );
        assert!(Config::default().dataset_path(None).is_err());
    }

    #[test]
    fn test_unknown_direction_falls_back_to_forward() {
        let config = Config {
            dataset_path: None,
            default_direction: Some("sideways".to_string()),
        };
        assert_eq!(config.direction(), Direction::Forward);
    }
}
