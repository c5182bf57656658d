use crate::error::ConfigError;
use crate::richtext::style::{StyleProfile, deserialize_font_families};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

const QUALIFIER: &str = "net.richpad";
const ORGANIZATION: &str = "Richpad";
const APPLICATION: &str = "richpad";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Font families offered by the font selector when the config names none
pub const DEFAULT_FONTS: &[&str] = &[
    "Inter",
    "Arial",
    "Georgia",
    "Times New Roman",
    "Courier New",
    "Verdana",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default document title
    pub title: Option<String>,
    /// Font-family options of the toolbar selector
    #[serde(deserialize_with = "deserialize_font_families")]
    pub fonts: Vec<String>,
    /// Whole-document style profile
    pub profile: StyleProfile,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: None,
            fonts: DEFAULT_FONTS.iter().map(|f| f.to_string()).collect(),
            profile: StyleProfile::default(),
        }
    }
}

impl Config {
    /// Load the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the default location, or the defaults when there is none
    pub fn load_default() -> Result<Config, ConfigError> {
        match config_file_path() {
            Some(path) => Config::load(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml).map_err(write_err)
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::style::{Color, FontSize};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.fonts.len(), DEFAULT_FONTS.len());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "title = \"Notes\"\n\n[profile]\nfont_size = 18\ntext_color = \"#336699\"\n\n[profile.h1]\nsize_em = 2.5\nbold = false\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.title.as_deref(), Some("Notes"));
        assert_eq!(config.profile.font_size, FontSize::new(18).unwrap());
        assert_eq!(config.profile.text_color, Some(Color::rgb(0x33, 0x66, 0x99)));
        assert_eq!(config.profile.h1.size_em, 2.5);
        assert_eq!(config.profile.h2, StyleProfile::default().h2);
        assert_eq!(config.fonts, Config::default().fonts);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[profile]\nfont_size = 300\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unsafe_font_families_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[profile]\nfont_family = \"Inter;}</style>\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        fs::write(&path, "fonts = [\"Georgia\", \"Arial; color: red\"]\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.title = Some("Handbook".into());
        config.fonts = vec!["Georgia".into()];
        config.profile.background_color = Some(Color::rgb(250, 250, 250));
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
