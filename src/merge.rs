//! # Merge
//!
//! Composites a one-page overlay onto one page of a base document.
//!
//! The overlay page becomes a form XObject in the base document. The base
//! page's existing content is wrapped in `q ... Q` and the form is drawn
//! after it, scaled uniformly to fit the base media box and centered. Only
//! the target page is touched; every other page is written back as-is.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::document;
use crate::error::{OrgchartError, Result};

/// Open `base_path`, lay the first page of `overlay_pdf` over page
/// `page_index`, and write the result to `output`.
///
/// Nothing is written when the page index is out of range or either
/// document fails to parse.
pub fn merge_overlay(base_path: &Path, overlay_pdf: &[u8], page_index: usize, output: &Path) -> Result<()> {
    let mut base = document::open(base_path)?;
    let overlay = document::open_mem(overlay_pdf)?;
    overlay_page(&mut base, &overlay, page_index)?;
    save(&mut base, output)?;
    info!("wrote {}", output.display());
    Ok(())
}

/// Save a document, creating the parent directory if needed.
pub fn save(doc: &mut Document, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    doc.save(output)
        .map_err(|e| OrgchartError::pdf(&format!("failed to save {}", output.display()), e))?;
    Ok(())
}

/// Draw page 0 of `overlay` on top of page `page_index` of `base`.
pub fn overlay_page(base: &mut Document, overlay: &Document, page_index: usize) -> Result<()> {
    let base_page = document::page_id(base, page_index)?;
    let overlay_page = document::page_id(overlay, 0)?;

    let [bx0, by0, bx1, by1] = document::media_box(base, base_page);
    let [ox0, oy0, ox1, oy1] = document::media_box(overlay, overlay_page);

    // The overlay as a form XObject, with its resources copied across.
    let content = document::page_content(overlay, overlay_page)?;
    let overlay_resources = document::page_resources(overlay, overlay_page)
        .cloned()
        .unwrap_or_default();
    let mut imported = HashMap::new();
    let resources = import(base, overlay, &Object::Dictionary(overlay_resources), &mut imported);

    let form = Stream::new(
        dictionary! {
            "Type" => Object::Name(b"XObject".to_vec()),
            "Subtype" => Object::Name(b"Form".to_vec()),
            "BBox" => vec![real(ox0), real(oy0), real(ox1), real(oy1)],
            "Resources" => resources,
            "Filter" => Object::Name(b"FlateDecode".to_vec()),
        },
        compress_to_vec_zlib(&content, 6),
    );
    let form_id = base.add_object(form);

    let (ow, oh) = (ox1 - ox0, oy1 - oy0);
    let (bw, bh) = (bx1 - bx0, by1 - by0);
    let scale = if ow > 0.0 && oh > 0.0 {
        (bw / ow).min(bh / oh)
    } else {
        1.0
    };
    let tx = bx0 + (bw - ow * scale) / 2.0 - ox0 * scale;
    let ty = by0 + (bh - oh * scale) / 2.0 - oy0 * scale;
    debug!(
        "overlay {:.2}x{:.2} onto {:.2}x{:.2}, scale {:.4}",
        ow, oh, bw, bh, scale
    );

    let mut page_resources = document::page_resources(base, base_page)
        .cloned()
        .unwrap_or_default();
    let mut xobjects = page_resources
        .get(b"XObject")
        .ok()
        .and_then(|o| document::deref_dict(base, o))
        .cloned()
        .unwrap_or_default();
    let name = unused_name(&xobjects);
    xobjects.set(name.clone(), Object::Reference(form_id));
    page_resources.set("XObject", Object::Dictionary(xobjects));

    let mut contents = existing_contents(base, base_page)?;
    let open = base.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let draw = format!(
        "Q\nq {:.6} 0 0 {:.6} {:.6} {:.6} cm /{} Do Q\n",
        scale,
        scale,
        tx,
        ty,
        String::from_utf8_lossy(&name)
    );
    let close = base.add_object(Stream::new(Dictionary::new(), draw.into_bytes()));
    contents.insert(0, Object::Reference(open));
    contents.push(Object::Reference(close));

    let page = base
        .get_object_mut(base_page)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| OrgchartError::pdf("failed to get page dictionary", e))?;
    page.set("Resources", Object::Dictionary(page_resources));
    page.set("Contents", Object::Array(contents));
    Ok(())
}

fn real(v: f64) -> Object {
    Object::Real(v as _)
}

/// `/OrgOverlay0`, `/OrgOverlay1`, ... whichever is free.
fn unused_name(xobjects: &Dictionary) -> Vec<u8> {
    (0..)
        .map(|i| format!("OrgOverlay{}", i).into_bytes())
        .find(|n| !xobjects.has(n))
        .unwrap_or_else(|| b"OrgOverlay".to_vec())
}

/// The page's content streams as a list of references.
fn existing_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc
        .get_object(page_id)
        .and_then(|o| o.as_dict())
        .map_err(|e| OrgchartError::pdf("failed to get page dictionary", e))?;
    let contents = match page.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };
    Ok(match contents {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![contents.clone()],
        },
        Object::Array(items) => items.clone(),
        _ => Vec::new(),
    })
}

/// Deep-copy `obj` from `source` into `target`, giving every referenced
/// object a fresh id. `seen` maps source ids to target ids.
fn import(
    target: &mut Document,
    source: &Document,
    obj: &Object,
    seen: &mut HashMap<ObjectId, ObjectId>,
) -> Object {
    match obj {
        Object::Reference(id) => {
            if let Some(mapped) = seen.get(id) {
                return Object::Reference(*mapped);
            }
            let new_id = target.new_object_id();
            seen.insert(*id, new_id);
            let copied = match source.get_object(*id) {
                Ok(inner) => import(target, source, inner, seen),
                Err(_) => Object::Null,
            };
            target.objects.insert(new_id, copied);
            Object::Reference(new_id)
        }
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| import(target, source, item, seen))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(import_dict(target, source, dict, seen)),
        Object::Stream(stream) => {
            let mut copy = stream.clone();
            copy.dict = import_dict(target, source, &stream.dict, seen);
            Object::Stream(copy)
        }
        other => other.clone(),
    }
}

fn import_dict(
    target: &mut Document,
    source: &Document,
    dict: &Dictionary,
    seen: &mut HashMap<ObjectId, ObjectId>,
) -> Dictionary {
    let mut out = Dictionary::new();
    for (key, value) in dict.iter() {
        out.set(key.clone(), import(target, source, value, seen));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PdfWriter;
    use crate::render::OverlayPage;

    fn blank(width: f64, height: f64, pages: usize) -> Document {
        let pages: Vec<OverlayPage> = (0..pages).map(|_| OverlayPage::new(width, height)).collect();
        Document::load_mem(&PdfWriter::new().write_pages(&pages)).unwrap()
    }

    #[test]
    fn test_out_of_range_page() {
        let mut base = blank(612.0, 792.0, 1);
        let overlay = blank(612.0, 792.0, 1);
        let err = overlay_page(&mut base, &overlay, 5).unwrap_err();
        assert!(matches!(
            err,
            OrgchartError::PageIndexOutOfRange {
                index: 5,
                page_count: 1
            }
        ));
    }

    #[test]
    fn test_contents_wrapped_and_form_added() {
        let mut base = blank(612.0, 792.0, 2);
        let overlay = blank(612.0, 792.0, 1);
        overlay_page(&mut base, &overlay, 1).unwrap();

        let page_id = document::page_id(&base, 1).unwrap();
        let page = base.get_object(page_id).unwrap().as_dict().unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);

        let text = String::from_utf8(document::page_content(&base, page_id).unwrap()).unwrap();
        assert!(text.starts_with("q\n"));
        assert!(text.contains("/OrgOverlay0 Do"));
        assert!(text.contains("1.000000 0 0 1.000000 0.000000 0.000000 cm"));

        // the other page is untouched
        let first = document::page_id(&base, 0).unwrap();
        let first = base.get_object(first).unwrap().as_dict().unwrap();
        assert!(first.get(b"Contents").unwrap().as_reference().is_ok());
    }

    #[test]
    fn test_unused_name_skips_taken() {
        let mut dict = Dictionary::new();
        dict.set("OrgOverlay0", Object::Null);
        assert_eq!(unused_name(&dict), b"OrgOverlay1".to_vec());
    }
}
