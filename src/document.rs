//! Thin helpers over `lopdf::Document` shared by extraction and merging.
//!
//! Page attributes such as `/MediaBox` and `/Resources` may be inherited
//! from the page tree, and `/Contents` may be one stream or an array of
//! them; these helpers hide both.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{OrgchartError, Result};

/// US Letter, used when a page tree carries no media box at all.
pub const FALLBACK_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Open a PDF from disk, distinguishing "absent" from "unreadable".
pub fn open(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(OrgchartError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    Document::load(path)
        .map_err(|e| OrgchartError::pdf(&format!("failed to open {}", path.display()), e))
}

/// Open a PDF held in memory.
pub fn open_mem(bytes: &[u8]) -> Result<Document> {
    Document::load_mem(bytes).map_err(|e| OrgchartError::pdf("failed to parse PDF", e))
}

/// Page object ids in document order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// The object id of the page at zero-based `index`.
pub fn page_id(doc: &Document, index: usize) -> Result<ObjectId> {
    let ids = page_ids(doc);
    ids.get(index)
        .copied()
        .ok_or(OrgchartError::PageIndexOutOfRange {
            index,
            page_count: ids.len(),
        })
}

/// Follow an indirect reference, if any.
pub fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Follow a reference and expect a dictionary.
pub fn deref_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match deref(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
pub fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    // Bounded walk: malformed trees can contain /Parent cycles.
    for _ in 0..32 {
        let dict = match doc.get_object(current).ok()? {
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Media box `[llx, lly, urx, ury]` of a page.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    let values: Option<Vec<f64>> = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| deref(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .map(|arr| arr.iter().filter_map(number).collect());
    match values {
        Some(v) if v.len() == 4 => [v[0], v[1], v[2], v[3]],
        _ => FALLBACK_MEDIA_BOX,
    }
}

/// The (possibly inherited) resources dictionary of a page.
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    inherited(doc, page_id, b"Resources").and_then(|obj| deref_dict(doc, obj))
}

/// Decode a content stream, decompressing if needed.
pub fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| OrgchartError::pdf("failed to decompress content stream", e))
    } else {
        Ok(stream.content.clone())
    }
}

/// Concatenated, decoded content of a page.
///
/// Handles both single stream references and arrays of stream references.
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page = doc
        .get_object(page_id)
        .and_then(|o| o.as_dict())
        .map_err(|e| OrgchartError::pdf("failed to get page dictionary", e))?;
    let contents = match page.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };

    let refs: Vec<&Object> = match deref(doc, contents) {
        Some(Object::Array(items)) => items.iter().collect(),
        Some(_) => vec![contents],
        None => Vec::new(),
    };

    let mut content = Vec::new();
    for item in refs {
        let Some(Object::Stream(stream)) = deref(doc, item) else {
            continue;
        };
        if !content.is_empty() {
            content.push(b'\n');
        }
        content.extend_from_slice(&stream_bytes(stream)?);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number() {
        assert_eq!(number(&Object::Integer(3)), Some(3.0));
        assert_eq!(number(&Object::Real(1.5)), Some(1.5));
        assert_eq!(number(&Object::Null), None);
    }

    #[test]
    fn test_open_missing() {
        let err = open(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, OrgchartError::MissingFile { .. }));
    }

    #[test]
    fn test_open_mem_garbage() {
        assert!(matches!(open_mem(b"not a pdf"), Err(OrgchartError::Pdf(_))));
    }
}
