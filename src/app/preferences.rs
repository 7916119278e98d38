//! Persisted user settings.
//!
//! Stored as a flat JSON object of named scalars in
//! `<config dir>/shotmark/preferences.json`. Every setter writes the file
//! straight away.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::Rgba;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::PreferencesError;

pub const THICKNESS: &str = "Thickness";
pub const FONT_SIZE: &str = "FontSize";
pub const DRAWING_COLOR: &str = "DrawingColor";
pub const BACKGROUND_COLOR: &str = "BackgroundColor";
pub const DEFAULT_PATH: &str = "DefaultPath";
pub const UPLOAD_ENDPOINT: &str = "UploadEndpoint";
pub const UPLOAD_TOKEN: &str = "UploadToken";

const CHANNEL_SUFFIXES: [&str; 4] = ["_R", "_G", "_B", "_A"];

/// One stored value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Clone, Debug, Default)]
pub struct Preferences {
    path: Option<PathBuf>,
    values: BTreeMap<String, PrefValue>,
}

impl Preferences {
    /// Preferences that are never written anywhere.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shotmark").join("preferences.json"))
    }

    /// Loads from the default location, starting empty if that fails.
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("No config directory available, preferences won't be saved");
            return Self::in_memory();
        };
        match Self::load_from(&path) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("Ignoring preferences: {}", e);
                Self {
                    path: Some(path),
                    values: BTreeMap::new(),
                }
            }
        }
    }

    /// Loads `path`. A missing file is an empty store.
    pub fn load_from(path: &Path) -> Result<Self, PreferencesError> {
        let values = match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(PreferencesError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        debug!("Loaded preferences from {:?}", path);
        Ok(Self {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    pub fn save(&self) -> Result<(), PreferencesError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| PreferencesError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, json).map_err(io_err)
    }

    fn set(&mut self, key: &str, value: PrefValue) {
        self.values.insert(key.to_string(), value);
        if let Err(e) = self.save() {
            warn!("Failed to save preferences: {}", e);
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            PrefValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers are accepted too, JSON doesn't keep `3.0` apart from `3`
    /// once written by hand.
    pub fn float(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            PrefValue::Float(f) => Some(*f),
            PrefValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            PrefValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, PrefValue::Bool(value));
    }

    pub fn set_float(&mut self, key: &str, value: f64) {
        self.set(key, PrefValue::Float(value));
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.set(key, PrefValue::Text(value.to_string()));
    }

    /// Colors live as `<key>_R` .. `<key>_A` ints, with `<key>` set to
    /// `true` once any color has been stored.
    pub fn color(&self, key: &str) -> Option<Rgba<u8>> {
        if !self.bool(key)? {
            return None;
        }
        let mut rgba = [0u8; 4];
        for (channel, suffix) in rgba.iter_mut().zip(CHANNEL_SUFFIXES) {
            let value = self.int(&format!("{}{}", key, suffix))?;
            *channel = value.clamp(0, 255) as u8;
        }
        Some(Rgba(rgba))
    }

    pub fn set_color(&mut self, key: &str, color: Rgba<u8>) {
        for (channel, suffix) in color.0.iter().zip(CHANNEL_SUFFIXES) {
            self.values
                .insert(format!("{}{}", key, suffix), PrefValue::Int(*channel as i64));
        }
        self.set_bool(key, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let prefs = Preferences::load_from(&dir.path().join("nope.json")).expect("load");
        assert_eq!(prefs.float(THICKNESS), None);
    }

    #[test]
    fn test_values_survive_reload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sub").join("preferences.json");
        let mut prefs = Preferences::load_from(&path).expect("load");
        prefs.set_float(THICKNESS, 4.5);
        prefs.set_float(FONT_SIZE, 20.0);
        prefs.set_string(DEFAULT_PATH, "/tmp/shots");
        prefs.set_color(DRAWING_COLOR, Rgba([1, 2, 3, 4]));

        let reloaded = Preferences::load_from(&path).expect("reload");
        assert_eq!(reloaded.float(THICKNESS), Some(4.5));
        assert_eq!(reloaded.float(FONT_SIZE), Some(20.0));
        assert_eq!(reloaded.string(DEFAULT_PATH), Some("/tmp/shots"));
        assert_eq!(reloaded.color(DRAWING_COLOR), Some(Rgba([1, 2, 3, 4])));
        assert_eq!(reloaded.int(&format!("{}_G", DRAWING_COLOR)), Some(2));
    }

    #[test]
    fn test_color_needs_flag() {
        let mut prefs = Preferences::in_memory();
        prefs
            .values
            .insert("BackgroundColor_R".to_string(), PrefValue::Int(9));
        assert_eq!(prefs.color(BACKGROUND_COLOR), None);
        prefs.set_color(BACKGROUND_COLOR, Rgba([0, 0, 0, 0]));
        assert_eq!(prefs.color(BACKGROUND_COLOR), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_wrong_type_reads_as_none() {
        let mut prefs = Preferences::in_memory();
        prefs.set_string(THICKNESS, "thick");
        assert_eq!(prefs.float(THICKNESS), None);
        prefs.values.insert(THICKNESS.to_string(), PrefValue::Int(3));
        assert_eq!(prefs.float(THICKNESS), Some(3.0));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            Preferences::load_from(&path),
            Err(PreferencesError::Parse(_))
        ));
    }
}
