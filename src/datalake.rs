//! Position data lookup.
//!
//! The live data source sits behind [`PositionLookup`]; [`StaticLookup`] is
//! an in-memory implementation loaded from JSON or seeded with demo data.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OrgchartError, Result};

/// Who holds a position on a chart, keyed by `node_id` for the join
/// against template nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub org_id: String,
    pub node_id: String,
    pub title: String,
    pub person_name: String,
    #[serde(default = "default_active")]
    pub active_flag: bool,
}

fn default_active() -> bool {
    true
}

pub trait PositionLookup {
    /// Positions for one chart. Unknown ids return an empty list.
    fn get_positions_for_org(&self, org_id: &str) -> Vec<PositionData>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    by_org: BTreeMap<String, Vec<PositionData>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data: PositionData) {
        self.by_org.entry(data.org_id.clone()).or_default().push(data);
    }

    /// Load a JSON array of positions.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OrgchartError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let rows: Vec<PositionData> =
            serde_json::from_str(&raw).map_err(|e| OrgchartError::malformed(path, e))?;
        Ok(rows.into_iter().collect())
    }

    /// The two demo charts.
    pub fn demo() -> Self {
        let row = |org: &str, node: &str, title: &str, name: &str| PositionData {
            org_id: org.to_string(),
            node_id: node.to_string(),
            title: title.to_string(),
            person_name: name.to_string(),
            active_flag: true,
        };
        [
            row("01_ORGANIGRAMA_CEO", "GERENTE_GENERAL", "CEO", "Carlos Andreani"),
            row(
                "01_ORGANIGRAMA_CEO",
                "ASISTENTE",
                "Executive Assistant",
                "Maria Gonzalez",
            ),
            row(
                "02_ORGANIGRAMA_LUCAS",
                "DIRECTOR_LOGISTICA",
                "Director de Logística",
                "Diego Piñero",
            ),
        ]
        .into_iter()
        .collect()
    }
}

impl FromIterator<PositionData> for StaticLookup {
    fn from_iter<T: IntoIterator<Item = PositionData>>(iter: T) -> Self {
        let mut lookup = StaticLookup::new();
        for data in iter {
            lookup.insert(data);
        }
        lookup
    }
}

impl PositionLookup for StaticLookup {
    fn get_positions_for_org(&self, org_id: &str) -> Vec<PositionData> {
        self.by_org.get(org_id).cloned().unwrap_or_default()
    }
}
