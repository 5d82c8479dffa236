use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{GradiiError, GradiiResult};
use crate::scene::model::WallpaperDef;
use crate::scene::validate::validate_wallpaper;

/// Boundary wrapper around a parsed settings file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wallpaper {
    def: WallpaperDef,
}

impl Wallpaper {
    /// Parse settings JSON from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GradiiResult<Self> {
        let def: WallpaperDef = serde_json::from_reader(r)
            .map_err(|e| GradiiError::serde(format!("parse wallpaper JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse settings JSON from a string.
    pub fn from_json_str(s: &str) -> GradiiResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse settings JSON from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GradiiResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GradiiError::validation(format!("open wallpaper JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Run the structural checks, reporting every problem at once.
    pub fn validate(&self) -> GradiiResult<()> {
        validate_wallpaper(&self.def)
            .map_err(|e| GradiiError::validation(format!("wallpaper validation failed: {e}")))
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> GradiiResult<String> {
        serde_json::to_string_pretty(&self.def)
            .map_err(|e| GradiiError::serde(format!("serialize wallpaper JSON: {e}")))
    }

    /// Wrap an in-memory settings struct.
    pub fn from_def(def: WallpaperDef) -> Self {
        Self { def }
    }

    /// Borrow the settings.
    pub fn def(&self) -> &WallpaperDef {
        &self.def
    }

    /// Take the settings out.
    pub fn into_def(self) -> WallpaperDef {
        self.def
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/wallpaper.rs"]
mod tests;
