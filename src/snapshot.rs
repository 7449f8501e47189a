//! # Position Snapshot
//!
//! The position database is a flat JSON file of every phrase found on each
//! chart, produced offline and read back by the update tools:
//!
//! ```text
//! { "version": "2.0", "description": "...",
//!   "organigramas": {
//!     "<org_id>": { "pdf_path", "page_dimensions": {width, height},
//!                   "cargos": [...], "nombres": [...], "otros": [...] } } }
//! ```
//!
//! A snapshot is a value: it is rebuilt wholesale from the source PDFs and
//! replaced on disk, never patched. Older `1.0` snapshots carry a single
//! flat `text_elements` list instead of the three categories; both load.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::classify::{classify_all, ElementType};
use crate::config::{files_with_extension, save_json, Settings};
use crate::error::{OrgchartError, Result};
use crate::extract::{self, ExtractOptions};
use crate::geometry::PdfRect;
use crate::grouping::{group_words, GroupingParams};
use crate::overlap::{collisions, Collision};

pub const SNAPSHOT_VERSION: &str = "2.0";
const SNAPSHOT_DESCRIPTION: &str = "Org chart text positions with overlap review";

/// A phrase on the page, in drawing space, padded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
    #[serde(flatten)]
    pub rect: PdfRect,
    #[serde(rename = "type", default)]
    pub element_type: Option<ElementType>,
}

impl TextElement {
    pub fn new(text: String, rect: PdfRect) -> Self {
        Self {
            text,
            rect,
            element_type: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

/// Everything recorded for one org chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgEntry {
    pub pdf_path: String,
    pub page_dimensions: PageDimensions,
    #[serde(default)]
    pub cargos: Vec<TextElement>,
    #[serde(default)]
    pub nombres: Vec<TextElement>,
    #[serde(default)]
    pub otros: Vec<TextElement>,
    /// Flat list of the `1.0` layout.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_elements: Vec<TextElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<Collision>,
}

impl OrgEntry {
    /// Partition classified elements into the three categories.
    ///
    /// Every element lands in exactly one list; untyped elements go to
    /// `otros`.
    pub fn from_elements(pdf_path: String, page_dimensions: PageDimensions, elements: Vec<TextElement>) -> Self {
        let mut entry = OrgEntry {
            pdf_path,
            page_dimensions,
            cargos: Vec::new(),
            nombres: Vec::new(),
            otros: Vec::new(),
            text_elements: Vec::new(),
            collisions: Vec::new(),
        };
        for element in elements {
            match element.element_type {
                Some(ElementType::Cargo) => entry.cargos.push(element),
                Some(ElementType::Nombre) => entry.nombres.push(element),
                _ => entry.otros.push(element),
            }
        }
        entry
    }

    /// All elements in lookup order: nombres, cargos, otros, then the
    /// legacy flat list.
    pub fn all_elements(&self) -> impl Iterator<Item = &TextElement> {
        self.nombres
            .iter()
            .chain(&self.cargos)
            .chain(&self.otros)
            .chain(&self.text_elements)
    }

    pub fn element_count(&self) -> usize {
        self.nombres.len() + self.cargos.len() + self.otros.len() + self.text_elements.len()
    }
}

/// The whole snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDatabase {
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub organigramas: BTreeMap<String, OrgEntry>,
}

impl Default for PositionDatabase {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            description: SNAPSHOT_DESCRIPTION.to_string(),
            organigramas: BTreeMap::new(),
        }
    }
}

impl PositionDatabase {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OrgchartError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| OrgchartError::malformed(path, e))
    }

    /// Write the snapshot as pretty JSON, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }

    pub fn org(&self, org_id: &str) -> Result<&OrgEntry> {
        self.organigramas
            .get(org_id)
            .ok_or_else(|| OrgchartError::UnknownOrg {
                org_id: org_id.to_string(),
                available: self.organigramas.keys().cloned().collect(),
            })
    }

    /// First element whose text contains `search`, ignoring case.
    ///
    /// Names are searched before titles and other text. Further matches are
    /// logged and ignored.
    pub fn find_element(&self, org_id: &str, search: &str) -> Result<(&TextElement, &OrgEntry)> {
        let entry = self.org(org_id)?;
        let needle = search.to_lowercase();
        let matches: Vec<&TextElement> = entry
            .all_elements()
            .filter(|e| e.text.to_lowercase().contains(&needle))
            .collect();

        let Some(&first) = matches.first() else {
            return Err(OrgchartError::TextNotFound {
                search: search.to_string(),
                scope: format!("snapshot entry '{}'", org_id),
            });
        };

        if matches.len() > 1 {
            warn!("{} matches for '{}', using the first", matches.len(), search);
            for (i, m) in matches.iter().enumerate().take(5) {
                warn!("  {}. '{}' at ({}, {})", i + 1, m.text, m.rect.x, m.rect.y);
            }
        }
        debug!("found '{}' at ({}, {})", first.text, first.rect.x, first.rect.y);
        Ok((first, entry))
    }

    /// Human-readable listing of one org or all of them.
    pub fn listing(&self, org_id: Option<&str>) -> Result<String> {
        let mut out = String::new();
        let orgs: Vec<(&str, &OrgEntry)> = match org_id {
            Some(id) => vec![(id, self.org(id)?)],
            None => self
                .organigramas
                .iter()
                .map(|(k, v)| (k.as_str(), v))
                .collect(),
        };

        for (id, entry) in orgs {
            let _ = writeln!(out, "{}", id);
            let _ = writeln!(out, "  pdf: {}", entry.pdf_path);
            let _ = writeln!(
                out,
                "  page: {} x {}, {} elements",
                entry.page_dimensions.width,
                entry.page_dimensions.height,
                entry.element_count()
            );
            for (label, list) in [
                ("names", &entry.nombres),
                ("titles", &entry.cargos),
                ("other", &entry.otros),
                ("text", &entry.text_elements),
            ] {
                if list.is_empty() {
                    continue;
                }
                let _ = writeln!(out, "  {}:", label);
                for e in list {
                    let kind = e.element_type.map(|t| t.as_str()).unwrap_or("-");
                    let _ = writeln!(
                        out,
                        "    {:<40} {:<6} ({}, {}, {}, {})",
                        e.text, kind, e.rect.x, e.rect.y, e.rect.w, e.rect.h
                    );
                }
            }
            if !entry.collisions.is_empty() {
                let _ = writeln!(out, "  collisions: {}", entry.collisions.len());
            }
        }
        Ok(out)
    }
}

/// Extract, group and classify page 0 of one chart.
pub fn extract_org(pdf_path: &Path, settings: &Settings) -> Result<OrgEntry> {
    let page = extract::extract_file(pdf_path, 0, &ExtractOptions::from(&settings.extraction))?;
    let mut elements = group_words(
        &page.words,
        page.height,
        &GroupingParams::from(&settings.extraction),
    );
    for element in &mut elements {
        element.rect = element.rect.rounded();
    }
    classify_all(&mut elements, &settings.classifier);

    let mut entry = OrgEntry::from_elements(
        pdf_path.display().to_string(),
        PageDimensions {
            width: page.width,
            height: page.height,
        },
        elements,
    );
    let found = {
        let all: Vec<&TextElement> = entry.all_elements().collect();
        collisions(&all, settings.extraction.box_padding)
    };
    entry.collisions = found;
    Ok(entry)
}

/// Build a fresh snapshot from every PDF in the templates directory.
///
/// A PDF that fails to extract is logged and left out.
pub fn build_database(settings: &Settings) -> Result<PositionDatabase> {
    let files = files_with_extension(&settings.paths.templates_dir, "pdf")?;
    if files.is_empty() {
        warn!("no PDFs found in {}", settings.paths.templates_dir.display());
    } else {
        info!("found {} PDFs to process", files.len());
    }

    let mut db = PositionDatabase::default();
    for path in files {
        let Some(org_id) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        match extract_org(&path, settings) {
            Ok(entry) => {
                info!(
                    "{}: {} titles, {} names, {} other",
                    org_id,
                    entry.cargos.len(),
                    entry.nombres.len(),
                    entry.otros.len()
                );
                if !entry.collisions.is_empty() {
                    warn!("{}: {} overlapping element pairs", org_id, entry.collisions.len());
                    for c in &entry.collisions {
                        debug!("  '{}' <-> '{}'", c.a, c.b);
                    }
                }
                db.organigramas.insert(org_id, entry);
            }
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(db)
}

/// Build the snapshot and replace the file at `paths.snapshot_path`.
pub fn rebuild(settings: &Settings) -> Result<PositionDatabase> {
    let db = build_database(settings)?;
    db.save(&settings.paths.snapshot_path)?;
    info!("snapshot written to {}", settings.paths.snapshot_path.display());
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(text: &str, kind: Option<ElementType>, y: f64) -> TextElement {
        TextElement {
            text: text.to_string(),
            rect: PdfRect::new(100.0, y, 80.0, 12.0),
            element_type: kind,
        }
    }

    fn sample() -> PositionDatabase {
        let elements = vec![
            el("GERENTE GENERAL", Some(ElementType::Cargo), 720.0),
            el("Carlos Andreani", Some(ElementType::Nombre), 708.0),
            el("Carlos Ruiz", Some(ElementType::Text), 300.0),
            el("2024", Some(ElementType::Other), 20.0),
        ];
        let entry = OrgEntry::from_elements(
            "input/templates/01_ORGANIGRAMA_CEO.pdf".into(),
            PageDimensions {
                width: 595.0,
                height: 842.0,
            },
            elements,
        );
        let mut db = PositionDatabase::default();
        db.organigramas.insert("01_ORGANIGRAMA_CEO".into(), entry);
        db
    }

    #[test]
    fn test_partition_is_exclusive() {
        let db = sample();
        let entry = db.org("01_ORGANIGRAMA_CEO").unwrap();
        assert_eq!(entry.cargos.len(), 1);
        assert_eq!(entry.nombres.len(), 1);
        assert_eq!(entry.otros.len(), 2);
        assert_eq!(entry.element_count(), 4);
    }

    #[test]
    fn test_find_is_case_insensitive_and_prefers_names() {
        let db = sample();
        let (found, _) = db.find_element("01_ORGANIGRAMA_CEO", "carlos").unwrap();
        assert_eq!(found.text, "Carlos Andreani");
        let (found, entry) = db.find_element("01_ORGANIGRAMA_CEO", "general").unwrap();
        assert_eq!(found.text, "GERENTE GENERAL");
        assert_eq!(entry.page_dimensions.height, 842.0);
    }

    #[test]
    fn test_find_errors() {
        let db = sample();
        assert!(matches!(
            db.find_element("NOPE", "x"),
            Err(OrgchartError::UnknownOrg { .. })
        ));
        assert!(matches!(
            db.find_element("01_ORGANIGRAMA_CEO", "Lucas"),
            Err(OrgchartError::TextNotFound { .. })
        ));
    }

    #[test]
    fn test_element_json_shape() {
        let e = el("CEO", Some(ElementType::Title), 700.0);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["text"], "CEO");
        assert_eq!(json["x"], 100.0);
        assert_eq!(json["h"], 12.0);
        assert_eq!(json["type"], "TITLE");
    }

    #[test]
    fn test_loads_legacy_layout() {
        let raw = r#"{
            "version": "1.0",
            "description": "old",
            "organigramas": {
                "02_ORGANIGRAMA_LUCAS": {
                    "pdf_path": "input/templates/02_ORGANIGRAMA_LUCAS.pdf",
                    "page_dimensions": { "width": 612, "height": 792 },
                    "text_elements": [
                        { "text": "Lucas", "x": 10.5, "y": 20, "w": 30, "h": 12 }
                    ]
                }
            }
        }"#;
        let db: PositionDatabase = serde_json::from_str(raw).unwrap();
        let (found, _) = db.find_element("02_ORGANIGRAMA_LUCAS", "lucas").unwrap();
        assert_eq!(found.rect.x, 10.5);
        assert!(found.element_type.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("positions_db.json");
        let db = sample();
        db.save(&path).unwrap();
        let loaded = PositionDatabase::load(&path).unwrap();
        assert_eq!(loaded, db);
    }

    #[test]
    fn test_listing_mentions_every_element() {
        let text = sample().listing(None).unwrap();
        for needle in ["01_ORGANIGRAMA_CEO", "GERENTE GENERAL", "Carlos Andreani", "2024"] {
            assert!(text.contains(needle), "missing {needle}");
        }
        assert!(sample().listing(Some("NOPE")).is_err());
    }
}
