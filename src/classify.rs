//! # Role Classification
//!
//! Labels phrase elements as job titles, person names or other text.
//!
//! The rules lean on an org chart convention: titles are set in upper case,
//! names in mixed case, and a name sits directly below its title. Charts
//! that break the convention get misclassified; that is accepted.
//!
//! Rules, first match wins:
//!
//! 1. all upper case and longer than `min_title_len`: `Cargo` when a
//!    mixed-case element sits just below, otherwise `Title`
//! 2. mixed case: `Nombre` when an upper-case element sits just above,
//!    otherwise `Text`
//! 3. anything else: `Other`

use serde::{Deserialize, Serialize};

use crate::config::ClassifierSettings;
use crate::snapshot::TextElement;

/// The role of a text element on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElementType {
    /// A title with a name beneath it.
    Cargo,
    /// A person name with a title above it.
    Nombre,
    /// Upper-case text with no name beneath it.
    Title,
    /// Mixed-case text with no title above it.
    Text,
    Other,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Cargo => "CARGO",
            ElementType::Nombre => "NOMBRE",
            ElementType::Title => "TITLE",
            ElementType::Text => "TEXT",
            ElementType::Other => "OTHER",
        }
    }
}

/// Classify one element against every element on the same page.
///
/// `y` is the element's drawing-space bottom edge; "below" means a smaller
/// `y` near `y - adjacency_offset`, "above" a larger `y` near
/// `y + adjacency_offset`.
pub fn classify(text: &str, y: f64, page: &[TextElement], settings: &ClassifierSettings) -> ElementType {
    let near = |other_y: f64, target: f64| (other_y - target).abs() < settings.adjacency_tolerance;

    if is_upper(text) && text.chars().count() > settings.min_title_len {
        let name_below = page
            .iter()
            .any(|e| near(e.rect.y, y - settings.adjacency_offset) && is_mixed_case(&e.text));
        if name_below {
            ElementType::Cargo
        } else {
            ElementType::Title
        }
    } else if is_mixed_case(text) {
        let title_above = page
            .iter()
            .any(|e| near(e.rect.y, y + settings.adjacency_offset) && is_upper(&e.text));
        if title_above {
            ElementType::Nombre
        } else {
            ElementType::Text
        }
    } else {
        ElementType::Other
    }
}

/// Assign a type to every element on a page.
pub fn classify_all(elements: &mut [TextElement], settings: &ClassifierSettings) {
    let types: Vec<ElementType> = elements
        .iter()
        .map(|e| classify(&e.text, e.rect.y, elements, settings))
        .collect();
    for (element, kind) in elements.iter_mut().zip(types) {
        element.element_type = Some(kind);
    }
}

/// At least one cased character and no lower-case one.
pub fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Contains both a lower-case and an upper-case character.
pub fn is_mixed_case(text: &str) -> bool {
    text.chars().any(char::is_lowercase) && text.chars().any(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PdfRect;

    fn el(text: &str, y: f64) -> TextElement {
        TextElement::new(text.to_string(), PdfRect::new(100.0, y, 80.0, 12.0))
    }

    fn settings() -> ClassifierSettings {
        ClassifierSettings::default()
    }

    #[test]
    fn test_title_above_name() {
        let mut page = vec![el("GERENTE GENERAL", 700.0), el("Carlos Andreani", 688.0)];
        classify_all(&mut page, &settings());
        assert_eq!(page[0].element_type, Some(ElementType::Cargo));
        assert_eq!(page[1].element_type, Some(ElementType::Nombre));
    }

    #[test]
    fn test_lone_title() {
        let page = vec![el("GERENTE GENERAL", 700.0)];
        assert_eq!(
            classify("GERENTE GENERAL", 700.0, &page, &settings()),
            ElementType::Title
        );
    }

    #[test]
    fn test_lone_name_is_text() {
        let page = vec![el("Carlos Andreani", 400.0), el("GERENTE", 100.0)];
        assert_eq!(
            classify("Carlos Andreani", 400.0, &page, &settings()),
            ElementType::Text
        );
    }

    #[test]
    fn test_short_upper_is_not_title() {
        let page = vec![el("CEO", 700.0), el("Carlos Andreani", 690.0)];
        // "CEO" has no lower case, so it cannot be mixed either
        assert_eq!(classify("CEO", 700.0, &page, &settings()), ElementType::Other);
    }

    #[test]
    fn test_digits_and_lowercase() {
        let page = vec![];
        assert_eq!(classify("2024", 0.0, &page, &settings()), ElementType::Other);
        assert_eq!(classify("solo minusculas", 0.0, &page, &settings()), ElementType::Other);
    }

    #[test]
    fn test_adjacency_window() {
        // below target is y - 10 = 690; 675 is exactly 15 away and misses
        let page = vec![el("DIRECTOR", 700.0), el("Diego Piñero", 675.0)];
        assert_eq!(classify("DIRECTOR", 700.0, &page, &settings()), ElementType::Title);
        let page = vec![el("DIRECTOR", 700.0), el("Diego Piñero", 676.0)];
        assert_eq!(classify("DIRECTOR", 700.0, &page, &settings()), ElementType::Cargo);
    }

    #[test]
    fn test_case_helpers() {
        assert!(is_upper("LOGÍSTICA Y OPERACIONES"));
        assert!(!is_upper("123"));
        assert!(is_mixed_case("Diego Piñero"));
        assert!(!is_mixed_case("DIEGO"));
    }

    #[test]
    fn test_type_serializes_upper() {
        assert_eq!(serde_json::to_string(&ElementType::Nombre).unwrap(), "\"NOMBRE\"");
    }
}
