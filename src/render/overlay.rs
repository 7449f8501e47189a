//! Template-driven overlay: one text block per node that has data.
//!
//! Wrapping is a greedy estimate, not shaping: a character is assumed to be
//! `char_width_factor × font_size` wide, which fixes the characters per
//! line. Alignment then uses real glyph widths.

use std::collections::HashMap;

use log::debug;

use super::{Color, DrawCommand, OverlayPage, TextLine};
use crate::config::OverlaySettings;
use crate::datalake::PositionData;
use crate::font::StandardFont;
use crate::template::{Align, OrgNode, OrgTemplate};

/// Lay `data` into the template's nodes on a page of the given size.
///
/// Nodes without a matching `node_id` in `data` are left blank.
pub fn render_template(
    template: &OrgTemplate,
    data: &[PositionData],
    width: f64,
    height: f64,
    settings: &OverlaySettings,
) -> OverlayPage {
    let by_node: HashMap<&str, &PositionData> = data.iter().map(|d| (d.node_id.as_str(), d)).collect();

    let mut page = OverlayPage::new(width, height);
    for node in &template.nodes {
        let Some(position) = by_node.get(node.node_id.as_str()) else {
            debug!("no data for node {}, leaving it blank", node.node_id);
            continue;
        };
        let text = format!("{}\n{}", position.title, position.person_name);
        page.commands.push(layout_node(node, &text, settings));
    }
    page
}

fn layout_node(node: &OrgNode, text: &str, settings: &OverlaySettings) -> DrawCommand {
    let font = StandardFont::resolve(&node.font);
    let char_width = settings.char_width_factor * node.font_size;
    let chars_per_line = (node.w / char_width).floor() as usize;

    let mut lines = wrap_text(text, chars_per_line);
    lines.truncate(node.max_lines);

    let mut y = node.y + node.h - node.font_size;
    let mut placed = Vec::with_capacity(lines.len());
    for line in lines {
        let line_width = font.measure(&line, node.font_size);
        let x = match node.align {
            Align::Left => node.x,
            Align::Center => node.x + (node.w - line_width) / 2.0,
            Align::Right => node.x + node.w - line_width,
        };
        placed.push(TextLine { x, y, text: line });
        y -= node.font_size * settings.line_height;
    }

    DrawCommand::Text {
        lines: placed,
        font,
        font_size: node.font_size,
        color: Color::BLACK,
    }
}

/// Greedy word wrap to `width` characters.
///
/// Each `\n`-separated paragraph starts on a new line. Runs of whitespace
/// collapse to one space, and words longer than `width` are broken.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 {
                if line_len + 1 + word_len <= width {
                    line.push(' ');
                    line.push_str(word);
                    line_len += 1 + word_len;
                    continue;
                }
                lines.push(std::mem::take(&mut line));
            }

            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > width {
                let rest = chars.split_off(width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            line_len = chars.len();
            line = chars.into_iter().collect();
        }

        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(align: Align) -> OrgNode {
        OrgNode {
            node_id: "CEO".into(),
            x: 100.0,
            y: 700.0,
            w: 200.0,
            h: 40.0,
            font: "Helvetica".into(),
            font_size: 10.0,
            align,
            max_lines: 2,
        }
    }

    fn data(title: &str, name: &str) -> PositionData {
        PositionData {
            org_id: "01_ORGANIGRAMA_CEO".into(),
            node_id: "CEO".into(),
            title: title.into(),
            person_name: name.into(),
            active_flag: true,
        }
    }

    fn template(nodes: Vec<OrgNode>) -> OrgTemplate {
        OrgTemplate {
            org_id: "01_ORGANIGRAMA_CEO".into(),
            page: 0,
            nodes,
        }
    }

    #[test]
    fn test_wrap_greedy() {
        assert_eq!(
            wrap_text("Director de Logistica", 12),
            vec!["Director de", "Logistica"]
        );
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        assert_eq!(wrap_text("CEO\nCarlos Andreani", 33), vec!["CEO", "Carlos Andreani"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_zero_width_still_progresses() {
        assert_eq!(wrap_text("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_ceo_centered_two_lines() {
        let page = render_template(
            &template(vec![node(Align::Center)]),
            &[data("CEO", "Carlos Andreani")],
            595.28,
            841.89,
            &OverlaySettings::default(),
        );
        let lines: Vec<&TextLine> = page.text_lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "CEO");
        assert_eq!(lines[1].text, "Carlos Andreani");
        assert!((lines[0].y - 730.0).abs() < 1e-9);
        assert!((lines[1].y - 718.0).abs() < 1e-9);

        for line in lines {
            let w = StandardFont::Helvetica.measure(&line.text, 10.0);
            let left = line.x - 100.0;
            let right = 300.0 - (line.x + w);
            assert!((left - right).abs() < 1e-9, "line '{}' not centered", line.text);
            assert!(line.x >= 100.0 && line.x + w <= 300.0);
        }
    }

    #[test]
    fn test_times_node_draws_and_centers_in_times() {
        let mut n = node(Align::Center);
        n.font = "Times-Roman".into();
        let page = render_template(&template(vec![n]), &[data("CEO", "Ana")], 600.0, 800.0, &OverlaySettings::default());

        assert_eq!(page.fonts(), vec![StandardFont::TimesRoman]);
        let first = page.text_lines().next().unwrap();
        let w = StandardFont::TimesRoman.measure("CEO", 10.0);
        assert!((first.x - (100.0 + (200.0 - w) / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_left_and_right_alignment() {
        let settings = OverlaySettings::default();
        let left = render_template(&template(vec![node(Align::Left)]), &[data("CEO", "Ana")], 600.0, 800.0, &settings);
        assert_eq!(left.text_lines().next().unwrap().x, 100.0);

        let right = render_template(&template(vec![node(Align::Right)]), &[data("CEO", "Ana")], 600.0, 800.0, &settings);
        let first = right.text_lines().next().unwrap();
        let w = StandardFont::Helvetica.measure("CEO", 10.0);
        assert!((first.x + w - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_truncates_to_max_lines() {
        let mut n = node(Align::Left);
        n.w = 30.0; // 5 characters per line
        n.max_lines = 2;
        let page = render_template(
            &template(vec![n]),
            &[data("Executive Assistant", "Maria Gonzalez")],
            600.0,
            800.0,
            &OverlaySettings::default(),
        );
        let texts: Vec<&str> = page.text_lines().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Execu", "tive"]);
    }

    #[test]
    fn test_node_without_data_is_skipped() {
        let mut other = node(Align::Center);
        other.node_id = "CFO".into();
        let page = render_template(
            &template(vec![node(Align::Center), other]),
            &[data("CEO", "Ana")],
            600.0,
            800.0,
            &OverlaySettings::default(),
        );
        assert_eq!(page.commands.len(), 1);
        assert!(page.fonts() == vec![StandardFont::Helvetica]);
    }
}
