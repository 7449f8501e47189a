//! # Orgchart
//!
//! Locates text on fixed-layout org chart PDFs, whites it out and writes
//! replacement text in its place without touching the rest of the page.
//!
//! The interesting part is geometric. Extraction reports words top-down;
//! drawing wants boxes bottom-up. Words have to become phrases before they
//! can be replaced as a unit, phrases are labelled as titles or names from
//! their case and vertical stacking, and a white-out box has to be sized so
//! it doesn't erase its neighbors.
//!
//! ## Architecture
//!
//! ```text
//! PDF ──[extract]──► words (top-down)
//!                      ↓
//!                  [grouping] : words → phrases, through [geometry]
//!                      ↓
//!                  [classify] : CARGO / NOMBRE / TITLE / TEXT / OTHER
//!                      ↓
//!                  [snapshot] : positions_db.json, rebuilt wholesale
//!                      ↓
//!   [overlap] + [render::whiteout]      [template] + [datalake]
//!                      ↓                        ↓
//!                      └──► [pdf] overlay ◄─ [render::overlay]
//!                               ↓
//!                           [merge]: overlay drawn over one base page
//! ```
//!
//! [`replace`] holds the three single-item flows and [`pipeline`] the
//! template-driven batch.

pub mod classify;
pub mod cli;
pub mod config;
pub mod datalake;
pub mod document;
pub mod error;
pub mod extract;
pub mod font;
pub mod geometry;
pub mod grouping;
pub mod merge;
pub mod overlap;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod replace;
pub mod snapshot;
pub mod template;

pub use config::Settings;
pub use error::{OrgchartError, Result};
pub use pipeline::{run_pipeline, PipelineReport};
pub use replace::{search_and_replace, search_and_replace_from_snapshot, search_and_replace_smart};

use datalake::PositionData;
use pdf::PdfWriter;
use template::OrgTemplate;

/// Render a template's overlay as PDF bytes on a page of the given size.
///
/// This is the in-memory half of the pipeline: the bytes can be merged with
/// [`merge::merge_overlay`] or written out for inspection.
pub fn render_overlay(
    template: &OrgTemplate,
    data: &[PositionData],
    width: f64,
    height: f64,
    settings: &Settings,
) -> Vec<u8> {
    let page = render::render_template(template, data, width, height, &settings.overlay);
    PdfWriter::new().write(&page)
}
