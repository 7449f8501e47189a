//! # Template Model
//!
//! A template names the text slots (nodes) on one page of a chart. Each node
//! is a box in drawing space plus the font, alignment and line limit used
//! when data is laid into it. Templates are hand-written or produced by
//! [`calibrate`], and never change at render time.

use std::collections::HashSet;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::save_json;
use crate::error::{OrgchartError, Result};
use crate::extract::{self, ExtractOptions};
use crate::geometry::{to_pdf_space, DEFAULT_BOX_PADDING};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// One data-bound slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgNode {
    pub node_id: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub align: Align,
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

fn default_font() -> String {
    "Helvetica".to_string()
}

fn default_font_size() -> f64 {
    10.0
}

fn default_max_lines() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgTemplate {
    pub org_id: String,
    /// Zero-based page the nodes live on.
    #[serde(default)]
    pub page: usize,
    pub nodes: Vec<OrgNode>,
}

impl OrgTemplate {
    /// Parse and validate a template file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OrgchartError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let template: OrgTemplate =
            serde_json::from_str(&raw).map_err(|e| OrgchartError::malformed(path, e))?;
        template
            .validate()
            .map_err(|reason| OrgchartError::InvalidTemplate {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(template)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }

    /// Check the rules serde can't express.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.node_id.as_str()) {
                return Err(format!("duplicate node_id '{}'", node.node_id));
            }
            if !(node.w > 0.0 && node.h > 0.0) {
                return Err(format!(
                    "node '{}' must have positive w and h, got {} x {}",
                    node.node_id, node.w, node.h
                ));
            }
            if !(node.font_size > 0.0) {
                return Err(format!(
                    "node '{}' has non-positive font_size {}",
                    node.node_id, node.font_size
                ));
            }
            if node.max_lines == 0 {
                return Err(format!("node '{}' has max_lines 0", node.node_id));
            }
        }
        Ok(())
    }

    pub fn node(&self, node_id: &str) -> Option<&OrgNode> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }
}

/// Build a one-node template from the first occurrence of `search` on
/// page 0 of `pdf_path`.
pub fn calibrate(
    pdf_path: &Path,
    search: &str,
    node_id: &str,
    org_id: &str,
    opts: &ExtractOptions,
) -> Result<OrgTemplate> {
    let page = extract::extract_file(pdf_path, 0, opts)?;
    info!("page size: {} x {}", page.width, page.height);

    let hits = extract::search_page(&page, search);
    let Some(hit) = hits.first() else {
        return Err(OrgchartError::TextNotFound {
            search: search.to_string(),
            scope: pdf_path.display().to_string(),
        });
    };
    let rect = to_pdf_space(hit, page.height, DEFAULT_BOX_PADDING);
    info!(
        "'{}' found at ({:.2}, {:.2}) size {:.2} x {:.2}",
        search, rect.x, rect.y, rect.w, rect.h
    );

    Ok(OrgTemplate {
        org_id: org_id.to_string(),
        page: 0,
        nodes: vec![OrgNode {
            node_id: node_id.to_string(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            font: "Helvetica-Bold".to_string(),
            font_size: 10.0,
            align: Align::Center,
            max_lines: 3,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let t: OrgTemplate = serde_json::from_str(
            r#"{ "org_id": "X", "nodes": [ { "node_id": "CEO", "x": 1, "y": 2, "w": 3, "h": 4 } ] }"#,
        )
        .unwrap();
        assert_eq!(t.page, 0);
        let n = &t.nodes[0];
        assert_eq!(n.font, "Helvetica");
        assert_eq!(n.font_size, 10.0);
        assert_eq!(n.align, Align::Center);
        assert_eq!(n.max_lines, 2);
    }

    #[test]
    fn test_bad_align_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{ "org_id": "X", "nodes": [ { "node_id": "A", "x": 0, "y": 0, "w": 1, "h": 1, "align": "justify" } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            OrgTemplate::load(&path),
            Err(OrgchartError::MalformedConfig { .. })
        ));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.json");
        std::fs::write(
            &path,
            r#"{ "org_id": "X", "nodes": [
                { "node_id": "A", "x": 0, "y": 0, "w": 1, "h": 1 },
                { "node_id": "A", "x": 5, "y": 5, "w": 1, "h": 1 } ] }"#,
        )
        .unwrap();
        let err = OrgTemplate::load(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate node_id 'A'"));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut t = OrgTemplate {
            org_id: "X".into(),
            page: 0,
            nodes: vec![OrgNode {
                node_id: "A".into(),
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 10.0,
                font: default_font(),
                font_size: 10.0,
                align: Align::Left,
                max_lines: 2,
            }],
        };
        assert!(t.validate().is_ok());
        t.nodes[0].max_lines = 0;
        assert!(t.validate().is_err());
        t.nodes[0].max_lines = 1;
        t.nodes[0].h = 0.0;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            OrgTemplate::load(Path::new("/nope/x.json")),
            Err(OrgchartError::MissingFile { .. })
        ));
    }
}
