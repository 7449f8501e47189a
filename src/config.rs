//! Runtime settings.
//!
//! All paths and heuristic constants live here. The classifier and overlap
//! numbers are tunable knobs, not correctness parameters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OrgchartError, Result};

/// Environment variable naming an optional JSON settings file.
pub const CONFIG_ENV: &str = "ORGCHART_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub extraction: ExtractionSettings,
    pub classifier: ClassifierSettings,
    pub replacement: ReplacementSettings,
    pub overlay: OverlaySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Template configs (`{org_id}.json`) and base documents (`{org_id}.pdf`).
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    pub snapshot_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Symmetric padding added by the coordinate transform.
    pub box_padding: f64,
    /// Max horizontal gap between words of one phrase.
    pub group_distance: f64,
    /// Max `top` difference for two words to share a line.
    pub same_line_tolerance: f64,
    /// Horizontal gap between two glyphs that starts a new word.
    pub word_gap_tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Expected vertical distance between a title and the name under it.
    pub adjacency_offset: f64,
    /// Allowed deviation from `adjacency_offset`.
    pub adjacency_tolerance: f64,
    /// Upper-case text must be longer than this to count as a title.
    pub min_title_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplacementSettings {
    pub font: String,
    pub font_size: f64,
    pub line_height: f64,
    /// White-out padding when no neighbor is close.
    pub padding: f64,
    /// White-out padding when neighbors overlap the target.
    pub tight_padding: f64,
    /// Padding used when searching for neighbors.
    pub neighbor_padding: f64,
    /// Height factor applied when a neighbor sits above the target.
    pub height_shrink: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Estimated glyph width as a fraction of the font size.
    pub char_width_factor: f64,
    pub line_height: f64,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("input/templates"),
            output_dir: PathBuf::from("output"),
            snapshot_path: PathBuf::from("positions_db.json"),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            box_padding: 2.0,
            group_distance: 5.0,
            same_line_tolerance: 3.0,
            word_gap_tolerance: 3.0,
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            adjacency_offset: 10.0,
            adjacency_tolerance: 15.0,
            min_title_len: 3,
        }
    }
}

impl Default for ReplacementSettings {
    fn default() -> Self {
        Self {
            font: "Helvetica-Bold".to_string(),
            font_size: 6.0,
            line_height: 1.2,
            padding: 0.5,
            tight_padding: 0.2,
            neighbor_padding: 3.0,
            height_shrink: 0.9,
        }
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
            line_height: 1.2,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OrgchartError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| OrgchartError::malformed(path, e))
    }

    /// Settings from the file named by `ORGCHART_CONFIG`, or the defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Explicit file wins over the environment.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::from_env(),
        }
    }

    /// The settings-driven output location for an org or document name.
    pub fn default_output_path(&self, stem: &str) -> PathBuf {
        self.paths
            .output_dir
            .join(format!("{}_actualizado.pdf", stem))
    }
}

/// Files in `dir` with extension `ext` (case-insensitive), sorted by name.
pub(crate) fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(OrgchartError::MissingFile {
            path: dir.to_path_buf(),
        });
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext)))
        .collect();
    files.sort();
    Ok(files)
}

/// Write `value` as pretty JSON, creating the parent directory.
///
/// Serialization failures surface as `Io`: nothing was parsed, so a
/// parse hint would mislead.
pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_json_serialize_failure_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("bad.json");
        // non-string map keys can't be written as JSON
        let value: std::collections::BTreeMap<(u8, u8), u8> = [((1, 2), 3)].into_iter().collect();

        let err = save_json(&path, &value).unwrap_err();
        assert!(matches!(err, OrgchartError::Io(_)));
        assert!(!err.to_string().contains("Hint"));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_json_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b.json");
        save_json(&path, &Settings::default()).unwrap();
        let back = Settings::load(&path).unwrap();
        assert_eq!(back.replacement.font_size, 6.0);
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{ "replacement": { "font_size": 8 } }"#).unwrap();
        assert_eq!(s.replacement.font_size, 8.0);
        assert_eq!(s.replacement.font, "Helvetica-Bold");
        assert_eq!(s.extraction.group_distance, 5.0);
        assert_eq!(s.paths.templates_dir, PathBuf::from("input/templates"));
    }

    #[test]
    fn test_default_output_path() {
        let s = Settings::default();
        assert_eq!(
            s.default_output_path("01_ORGANIGRAMA_CEO"),
            PathBuf::from("output/01_ORGANIGRAMA_CEO_actualizado.pdf")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, OrgchartError::MissingFile { .. }));
    }
}
