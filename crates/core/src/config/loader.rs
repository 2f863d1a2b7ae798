//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Standard config file locations, relative to the working directory.
pub const CONFIG_CANDIDATES: [&str; 3] = [
    ".geosearch.toml",
    "geosearch.toml",
    ".config/geosearch.toml",
];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// The parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings came from, `None` for defaults
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or the first standard location,
    /// falling back to defaults when no file exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Path::new("."))
    }

    /// Like [`Config::load`], resolving standard locations against `dir`
    pub fn load_from(path: Option<&Path>, dir: &Path) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(dir),
        };

        let schema = match config_path {
            Some(ref p) => {
                let schema = load_config_file(p)?;
                schema
                    .validate()
                    .context(format!("In {}", p.display()))
                    .with_suggestion("Fix the value or remove it to use the default")?;
                schema
            }
            None => ConfigSchema::default(),
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}", path.display())).with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {e}", path.display()),
        )
        .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.index.max_rows, 10_000);
    }

    #[test]
    fn test_config_load_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(None, dir.path()).unwrap();
        assert!(config.path.is_none());
        assert_eq!(config.schema, ConfigSchema::default());
    }

    #[test]
    fn test_config_discovers_standard_location() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".config")).unwrap();
        fs::write(
            dir.path().join(".config/geosearch.toml"),
            "[search]\ndebounce_ms = 120\n",
        )
        .unwrap();

        let config = Config::load_from(None, dir.path()).unwrap();
        assert_eq!(config.schema.search.debounce_ms, 120);
        assert!(config.path.unwrap().ends_with(".config/geosearch.toml"));
    }

    #[test]
    fn test_dotfile_wins_over_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".geosearch.toml"), "[map]\nzoom = 3.0\n").unwrap();
        fs::write(dir.path().join("geosearch.toml"), "[map]\nzoom = 5.0\n").unwrap();

        let config = Config::load_from(None, dir.path()).unwrap();
        assert_eq!(config.schema.map.zoom, 3.0);
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[index\nname = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geosearch.toml");
        fs::write(&path, "[search]\nspatial_mode = \"nearby\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.context.unwrap().contains("geosearch.toml"));
        assert!(err.suggestion.is_some());
    }
}
