//! Content stream interpreter that turns text-showing operators into glyph
//! boxes.
//!
//! Only what word positions need is tracked: the CTM (`q`, `Q`, `cm`), the
//! text state (`Tf`, `Tc`, `Tw`, `Tz`, `TL`, `Ts`), text positioning
//! (`Td`, `TD`, `Tm`, `T*`) and showing (`Tj`, `TJ`, `'`, `"`). Form
//! XObjects are followed through `Do` up to [`MAX_FORM_DEPTH`].
//!
//! Simple fonts only: each string byte is one glyph, decoded as
//! WinAnsiEncoding. Composite (`Type0`) fonts are skipped.

use log::debug;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::document::{self, number};
use crate::error::{OrgchartError, Result};
use crate::font::encoding::winansi_to_unicode;
use crate::font::{StandardFont, StandardFontMetrics};

const MAX_FORM_DEPTH: usize = 8;

/// One glyph, top-down relative to the page's media box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Affine matrix `[a b c d e f]`, row-vector convention as in PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`
    fn mul(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn from_operands(ops: &[Object]) -> Option<Matrix> {
        if ops.len() < 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, op) in m.iter_mut().zip(ops) {
            *slot = number(op)?;
        }
        Some(Matrix(m))
    }
}

/// Widths and metrics of the font selected by `Tf`.
#[derive(Debug, Clone)]
struct FontInfo {
    first_char: i64,
    /// `/Widths`, in 1/1000 em.
    widths: Vec<f64>,
    fallback: &'static StandardFontMetrics,
    /// In 1/1000 em, negative.
    descent: f64,
    composite: bool,
}

impl FontInfo {
    fn standard(font: StandardFont) -> Self {
        let metrics = font.metrics();
        Self {
            first_char: 0,
            widths: Vec::new(),
            fallback: metrics,
            descent: metrics.descent as f64,
            composite: false,
        }
    }

    fn width(&self, code: u8) -> f64 {
        let idx = code as i64 - self.first_char;
        if idx >= 0 {
            if let Some(w) = self.widths.get(idx as usize) {
                return *w;
            }
        }
        let ch = winansi_to_unicode(code).unwrap_or(' ');
        self.fallback.glyph_width(ch) as f64
    }
}

#[derive(Debug, Clone)]
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font: Option<FontInfo>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    h_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).mul(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }
}

/// Glyphs of one page in content-stream order.
pub fn page_glyphs(doc: &Document, page_id: ObjectId) -> Result<Vec<Glyph>> {
    let [llx, _, _, ury] = document::media_box(doc, page_id);
    let content = document::page_content(doc, page_id)?;
    let resources = document::page_resources(doc, page_id);

    let mut interp = Interpreter {
        doc,
        origin_x: llx,
        origin_top: ury,
        glyphs: Vec::new(),
    };
    interp.run(&content, resources, Matrix::IDENTITY, 0)?;
    Ok(interp.glyphs)
}

struct Interpreter<'a> {
    doc: &'a Document,
    origin_x: f64,
    origin_top: f64,
    glyphs: Vec<Glyph>,
}

impl<'a> Interpreter<'a> {
    fn run(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let content =
            Content::decode(content).map_err(|e| OrgchartError::pdf("failed to decode content stream", e))?;

        let mut ctm = ctm;
        let mut saved: Vec<Matrix> = Vec::new();
        let mut ts = TextState::default();

        for op in &content.operations {
            let args = op.operands.as_slice();
            let arg = |i: usize| args.get(i).and_then(number);

            match op.operator.as_str() {
                "q" => saved.push(ctm),
                "Q" => {
                    if let Some(m) = saved.pop() {
                        ctm = m;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(args) {
                        ctm = m.mul(&ctm);
                    }
                }
                "BT" => {
                    ts.tm = Matrix::IDENTITY;
                    ts.tlm = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let Some(name) = args.first().and_then(|o| o.as_name().ok()) {
                        ts.font = Some(self.load_font(resources, name));
                    }
                    ts.size = arg(1).unwrap_or(ts.size);
                }
                "Tc" => ts.char_spacing = arg(0).unwrap_or(0.0),
                "Tw" => ts.word_spacing = arg(0).unwrap_or(0.0),
                "Tz" => ts.h_scale = arg(0).unwrap_or(100.0) / 100.0,
                "TL" => ts.leading = arg(0).unwrap_or(0.0),
                "Ts" => ts.rise = arg(0).unwrap_or(0.0),
                "Td" => ts.move_line(arg(0).unwrap_or(0.0), arg(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = arg(1).unwrap_or(0.0);
                    ts.leading = -ty;
                    ts.move_line(arg(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(args) {
                        ts.tm = m;
                        ts.tlm = m;
                    }
                }
                "T*" => ts.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = args.first() {
                        self.show(bytes, &mut ts, &ctm);
                    }
                }
                "'" => {
                    ts.next_line();
                    if let Some(Object::String(bytes, _)) = args.first() {
                        self.show(bytes, &mut ts, &ctm);
                    }
                }
                "\"" => {
                    ts.word_spacing = arg(0).unwrap_or(ts.word_spacing);
                    ts.char_spacing = arg(1).unwrap_or(ts.char_spacing);
                    ts.next_line();
                    if let Some(Object::String(bytes, _)) = args.get(2) {
                        self.show(bytes, &mut ts, &ctm);
                    }
                }
                "TJ" => {
                    let Some(Object::Array(items)) = args.first() else {
                        continue;
                    };
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes, &mut ts, &ctm),
                            other => {
                                if let Some(adj) = number(other) {
                                    let tx = -adj / 1000.0 * ts.size * ts.h_scale;
                                    ts.tm = Matrix::translate(tx, 0.0).mul(&ts.tm);
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(name) = args.first().and_then(|o| o.as_name().ok()) {
                        self.draw_form(resources, name, &ctm, depth)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Emit one glyph per byte and advance the text matrix.
    fn show(&mut self, bytes: &[u8], ts: &mut TextState, ctm: &Matrix) {
        let Some(font) = ts.font.as_ref() else {
            return;
        };
        if font.composite {
            return;
        }

        for &code in bytes {
            let w0 = font.width(code) / 1000.0;
            let trm = Matrix([ts.size * ts.h_scale, 0.0, 0.0, ts.size, 0.0, ts.rise])
                .mul(&ts.tm)
                .mul(ctm);
            let [a, _, _, d, e, f] = trm.0;

            if let Some(ch) = winansi_to_unicode(code) {
                let height = d.abs();
                let bottom = f + font.descent / 1000.0 * height;
                let top = bottom + height;
                let x0 = e;
                let x1 = e + w0 * a;
                self.glyphs.push(Glyph {
                    ch,
                    x0: x0.min(x1) - self.origin_x,
                    x1: x0.max(x1) - self.origin_x,
                    top: self.origin_top - top,
                    bottom: self.origin_top - bottom,
                });
            }

            let spacing = if code == b' ' { ts.word_spacing } else { 0.0 };
            let tx = (w0 * ts.size + ts.char_spacing + spacing) * ts.h_scale;
            ts.tm = Matrix::translate(tx, 0.0).mul(&ts.tm);
        }
    }

    fn load_font(&self, resources: Option<&'a Dictionary>, name: &[u8]) -> FontInfo {
        let dict = resources
            .and_then(|r| r.get(b"Font").ok())
            .and_then(|o| document::deref_dict(self.doc, o))
            .and_then(|fonts| fonts.get(name).ok())
            .and_then(|o| document::deref_dict(self.doc, o));
        let Some(dict) = dict else {
            debug!("font /{} not in resources", String::from_utf8_lossy(name));
            return FontInfo::standard(StandardFont::Helvetica);
        };

        let base_font = dict
            .get(b"BaseFont")
            .and_then(|o| o.as_name())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let composite = matches!(dict.get(b"Subtype").and_then(|o| o.as_name()), Ok(b"Type0"));
        if composite {
            debug!("skipping composite font {}", base_font);
        }

        let standard = StandardFont::closest(&base_font);

        let first_char = dict.get(b"FirstChar").ok().and_then(number).unwrap_or(0.0) as i64;
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| document::deref(self.doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| document::deref(self.doc, w).and_then(number).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let descent = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| document::deref_dict(self.doc, o))
            .and_then(|fd| fd.get(b"Descent").ok())
            .and_then(number)
            .unwrap_or(standard.metrics().descent as f64);

        FontInfo {
            first_char,
            widths,
            fallback: standard.metrics(),
            descent,
            composite,
        }
    }

    fn draw_form(
        &mut self,
        resources: Option<&'a Dictionary>,
        name: &[u8],
        ctm: &Matrix,
        depth: usize,
    ) -> Result<()> {
        if depth >= MAX_FORM_DEPTH {
            debug!("form XObject nesting too deep, skipping /{}", String::from_utf8_lossy(name));
            return Ok(());
        }
        let doc = self.doc;
        let stream = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|o| document::deref_dict(doc, o))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|o| document::deref(doc, o))
            .and_then(|o| o.as_stream().ok());
        let Some(stream) = stream else {
            return Ok(());
        };
        if !matches!(stream.dict.get(b"Subtype").and_then(|o| o.as_name()), Ok(b"Form")) {
            return Ok(());
        }

        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| Matrix::from_operands(arr))
            .unwrap_or(Matrix::IDENTITY);
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| document::deref_dict(doc, o))
            .or(resources);
        let content = document::stream_bytes(stream)?;

        self.run(&content, form_resources, matrix.mul(ctm), depth + 1)
    }
}
