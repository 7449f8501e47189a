//! # Pipeline
//!
//! Batch update: for every template in the templates directory, fetch the
//! chart's position data, render it into the template's nodes and merge the
//! overlay onto the sibling `{org_id}.pdf`.
//!
//! Each template is independent. One that fails to load, has no base PDF,
//! has no data or fails to merge is recorded as skipped and the batch moves
//! on; documents are opened and dropped inside a single iteration.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::{files_with_extension, Settings};
use crate::datalake::{PositionData, PositionLookup};
use crate::document;
use crate::error::Result;
use crate::merge;
use crate::pdf::PdfWriter;
use crate::render::render_template;
use crate::template::OrgTemplate;

/// A template the batch did not produce output for.
#[derive(Debug, Clone)]
pub struct Skipped {
    pub config: PathBuf,
    pub reason: String,
}

/// What a pipeline run produced.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub generated: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}

/// Process every `*.json` template in `paths.templates_dir`, in file name
/// order.
pub fn run_pipeline(settings: &Settings, lookup: &dyn PositionLookup) -> Result<PipelineReport> {
    let dir = &settings.paths.templates_dir;
    let configs = files_with_extension(dir, "json")?;
    let mut report = PipelineReport::default();

    if configs.is_empty() {
        warn!("no template configurations found in {}", dir.display());
        return Ok(report);
    }

    for config in configs {
        info!("processing config: {}", config.display());
        match process_template(&config, settings, lookup) {
            Ok(output) => report.generated.push(output),
            Err(reason) => {
                warn!("skipping {}: {}", config.display(), reason);
                report.skipped.push(Skipped { config, reason });
            }
        }
    }

    info!(
        "pipeline completed: {} generated, {} skipped",
        report.generated.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Render and merge one template. The error is the skip reason.
fn process_template(
    config: &Path,
    settings: &Settings,
    lookup: &dyn PositionLookup,
) -> std::result::Result<PathBuf, String> {
    let template = OrgTemplate::load(config).map_err(|e| e.to_string())?;

    let base_path = settings
        .paths
        .templates_dir
        .join(format!("{}.pdf", template.org_id));
    if !base_path.exists() {
        return Err(format!("base PDF not found: {}", base_path.display()));
    }

    info!("fetching data for org id: {}", template.org_id);
    let positions = lookup.get_positions_for_org(&template.org_id);
    if positions.is_empty() {
        return Err(format!("no positions found for {}", template.org_id));
    }

    let output = settings.default_output_path(&template.org_id);
    merge_template(&template, &base_path, &positions, &output, settings).map_err(|e| e.to_string())?;
    Ok(output)
}

fn merge_template(
    template: &OrgTemplate,
    base_path: &Path,
    positions: &[PositionData],
    output: &Path,
    settings: &Settings,
) -> Result<()> {
    let mut base = document::open(base_path)?;
    let page_id = document::page_id(&base, template.page)?;
    let [llx, lly, urx, ury] = document::media_box(&base, page_id);

    let overlay = render_template(template, positions, urx - llx, ury - lly, &settings.overlay);
    let bytes = PdfWriter::new().write(&overlay);
    let overlay_doc = document::open_mem(&bytes)?;

    merge::overlay_page(&mut base, &overlay_doc, template.page)?;
    merge::save(&mut base, output)?;
    info!("generated {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datalake::StaticLookup;
    use crate::error::OrgchartError;

    #[test]
    fn test_missing_templates_dir() {
        let mut settings = Settings::default();
        settings.paths.templates_dir = PathBuf::from("/definitely/missing/templates");
        assert!(matches!(
            run_pipeline(&settings, &StaticLookup::demo()),
            Err(OrgchartError::MissingFile { .. })
        ));
    }

    #[test]
    fn test_empty_dir_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.templates_dir = dir.path().to_path_buf();
        let report = run_pipeline(&settings, &StaticLookup::demo()).unwrap();
        assert!(report.generated.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_malformed_template_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let mut settings = Settings::default();
        settings.paths.templates_dir = dir.path().to_path_buf();
        let report = run_pipeline(&settings, &StaticLookup::demo()).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("broken.json"));
    }
}
