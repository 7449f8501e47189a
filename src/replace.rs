//! # Single-Item Replacement
//!
//! The three ad hoc update flows. Each locates one box on page 0, paints
//! it white, centers the replacement text in it and writes a new PDF:
//!
//! - [`search_and_replace`] searches the PDF itself (case-sensitive).
//! - [`search_and_replace_from_snapshot`] looks the text up in the
//!   position snapshot (case-insensitive) and uses the standard padding.
//! - [`search_and_replace_smart`] does the same lookup, then checks the
//!   snapshot for neighbors and adapts the white-out to spare them.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::Settings;
use crate::document;
use crate::error::{OrgchartError, Result};
use crate::extract::{self, ExtractOptions};
use crate::geometry::{to_pdf_space, PdfRect};
use crate::merge;
use crate::overlap::{adjust_replacement_area, find_overlapping, whiteout_padding};
use crate::pdf::PdfWriter;
use crate::render::render_replacement;
use crate::snapshot::{OrgEntry, PositionDatabase};

/// Replace the first occurrence of `search` found by searching the PDF.
///
/// The default output is named after the PDF's file stem.
pub fn search_and_replace(
    pdf_path: &Path,
    search: &str,
    replacement: &str,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<PathBuf> {
    let doc = document::open(pdf_path)?;
    let page = extract::extract_page(&doc, 0, &ExtractOptions::from(&settings.extraction))?;

    let hits = extract::search_page(&page, search);
    let Some(hit) = hits.first() else {
        return Err(OrgchartError::TextNotFound {
            search: search.to_string(),
            scope: pdf_path.display().to_string(),
        });
    };
    if hits.len() > 1 {
        warn!("{} matches for '{}', using the first", hits.len(), search);
        for (i, other) in hits.iter().enumerate().skip(1).take(4) {
            warn!("  {}. at x0={:.2} top={:.2}", i + 1, other.x0, other.top);
        }
    }

    let rect = to_pdf_space(hit, page.height, settings.extraction.box_padding);
    info!(
        "'{}' found at ({:.2}, {:.2}) size {:.2} x {:.2}",
        search, rect.x, rect.y, rect.w, rect.h
    );

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.default_output_path(&stem));

    apply(
        doc,
        &rect,
        replacement,
        (page.width, page.height),
        settings.replacement.padding,
        &output,
        settings,
    )?;
    Ok(output)
}

/// Replace text located through the position snapshot.
pub fn search_and_replace_from_snapshot(
    org_id: &str,
    search: &str,
    replacement: &str,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<PathBuf> {
    let db = PositionDatabase::load(&settings.paths.snapshot_path)?;
    let (element, entry) = db.find_element(org_id, search)?;
    info!(
        "'{}' found at ({}, {})",
        element.text, element.rect.x, element.rect.y
    );

    let output = resolve_output(org_id, output, settings);
    let doc = open_entry_pdf(entry)?;
    apply(
        doc,
        &element.rect,
        replacement,
        (entry.page_dimensions.width, entry.page_dimensions.height),
        settings.replacement.padding,
        &output,
        settings,
    )?;
    Ok(output)
}

/// Snapshot lookup plus overlap-aware white-out.
///
/// Neighbors within `neighbor_padding` switch the white-out to the tight
/// padding, and a neighbor strictly above shrinks the box's height.
pub fn search_and_replace_smart(
    org_id: &str,
    search: &str,
    replacement: &str,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<PathBuf> {
    let db = PositionDatabase::load(&settings.paths.snapshot_path)?;
    let (element, entry) = db.find_element(org_id, search)?;
    let doc = open_entry_pdf(entry)?;

    let rs = &settings.replacement;
    let neighbors = find_overlapping(element, entry.all_elements(), rs.neighbor_padding);
    if neighbors.is_empty() {
        info!("no neighbors near '{}'", element.text);
    } else {
        warn!("{} element(s) close to '{}'", neighbors.len(), element.text);
        for n in neighbors.iter().take(3) {
            warn!("  '{}' at ({}, {})", n.text, n.rect.x, n.rect.y);
        }
    }

    let rect = adjust_replacement_area(&element.rect, &neighbors, rs.height_shrink);
    let padding = whiteout_padding(!neighbors.is_empty(), rs);

    let output = resolve_output(org_id, output, settings);
    apply(
        doc,
        &rect,
        replacement,
        (entry.page_dimensions.width, entry.page_dimensions.height),
        padding,
        &output,
        settings,
    )?;
    Ok(output)
}

fn resolve_output(org_id: &str, output: Option<&Path>, settings: &Settings) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.default_output_path(org_id))
}

fn open_entry_pdf(entry: &OrgEntry) -> Result<lopdf::Document> {
    document::open(Path::new(&entry.pdf_path))
}

/// Render the white-out overlay, merge it onto page 0 and save.
fn apply(
    mut doc: lopdf::Document,
    rect: &PdfRect,
    replacement: &str,
    (width, height): (f64, f64),
    padding: f64,
    output: &Path,
    settings: &Settings,
) -> Result<()> {
    let overlay = render_replacement(rect, replacement, width, height, padding, &settings.replacement);
    let bytes = PdfWriter::new().write(&overlay);
    let overlay_doc = document::open_mem(&bytes)?;

    merge::overlay_page(&mut doc, &overlay_doc, 0)?;
    merge::save(&mut doc, output)?;
    info!("wrote {}", output.display());
    Ok(())
}
