use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use super::metrics::Face;
use super::text::{contains_rtl, to_win_ansi};
use super::unicode_font::{self, encode, line_width_pt, GlyphSet, UnicodeFont};
use super::writer::{PAGE_HEIGHT, PAGE_WIDTH};

pub const MARGIN: f32 = 50.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LINE_SPACING: f32 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// Text style for one run of lines.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub face: Face,
    pub size: f32,
    pub gray: f32,
}

impl Style {
    pub const fn new(face: Face, size: f32) -> Self {
        Self {
            face,
            size,
            gray: 0.0,
        }
    }

    pub fn gray(mut self, gray: f32) -> Self {
        self.gray = gray;
        self
    }

    fn line_height(&self) -> f32 {
        self.size * LINE_SPACING
    }
}

/// Flows text top-to-bottom over A4 pages, breaking pages as needed.
///
/// Finished pages accumulate until `drain_pages` hands them to the writer.
/// Glyphs drawn with the embedded face are collected for its ToUnicode map.
pub struct PageLayout {
    ops: Vec<Operation>,
    y: f32,
    finished: Vec<Vec<Operation>>,
    glyphs: GlyphSet,
}

impl PageLayout {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
            finished: Vec::new(),
            glyphs: GlyphSet::new(),
        }
    }

    /// Closes the current page if anything was drawn on it.
    pub fn break_page(&mut self) {
        if !self.ops.is_empty() {
            self.finished.push(std::mem::take(&mut self.ops));
        }
        self.y = PAGE_HEIGHT - MARGIN;
    }

    pub fn drain_pages(&mut self) -> Vec<Vec<Operation>> {
        self.break_page();
        std::mem::take(&mut self.finished)
    }

    pub fn take_glyphs(&mut self) -> GlyphSet {
        std::mem::take(&mut self.glyphs)
    }

    pub fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.break_page();
        }
    }

    /// Draws wrapped text. Right-to-left text is shaped and drawn right-aligned
    /// with the embedded Unicode face.
    pub fn paragraph(&mut self, text: &str, style: Style, indent: f32) {
        if let Some(font) = rtl_font(text) {
            for raw_line in text.lines() {
                self.rtl_lines(font, raw_line, style, Align::Right, indent);
            }
            return;
        }
        let align = if contains_rtl(text) { Align::Right } else { Align::Left };
        for raw_line in text.lines() {
            self.encoded_lines(&to_win_ansi(raw_line), style, align, indent);
        }
    }

    /// Draws a single block of text with an explicit alignment.
    pub fn aligned(&mut self, text: &str, style: Style, align: Align) {
        match rtl_font(text) {
            Some(font) => self.rtl_lines(font, text, style, align, 0.0),
            None => self.encoded_lines(&to_win_ansi(text), style, align, 0.0),
        }
    }

    fn encoded_lines(&mut self, bytes: &[u8], style: Style, align: Align, indent: f32) {
        let metrics = style.face.metrics();
        let width = CONTENT_WIDTH - indent;
        for line in metrics.wrap(bytes, style.size, width) {
            self.ensure_space(style.line_height());
            self.y -= style.size;
            let line_width = metrics.width_pt(&line, style.size);
            let x = match align {
                Align::Left => MARGIN + indent,
                Align::Right => PAGE_WIDTH - MARGIN - line_width,
                Align::Center => (PAGE_WIDTH - line_width) / 2.0,
            };
            self.show(
                style.face.resource_name(),
                Object::String(line, StringFormat::Literal),
                style,
                x,
            );
            self.y -= style.line_height() - style.size;
        }
    }

    /// Right-to-left lines. Left alignment is treated as right; the indent
    /// is taken from the right margin.
    fn rtl_lines(
        &mut self,
        font: &UnicodeFont,
        text: &str,
        style: Style,
        align: Align,
        indent: f32,
    ) {
        for line in font.wrap(text, style.size, CONTENT_WIDTH - indent) {
            let glyphs = font.glyphs(&line);
            let line_width = line_width_pt(&glyphs, style.size);
            self.ensure_space(style.line_height());
            self.y -= style.size;
            let x = match align {
                Align::Center => (PAGE_WIDTH - line_width) / 2.0,
                Align::Left | Align::Right => PAGE_WIDTH - MARGIN - indent - line_width,
            };
            let codes = encode(&glyphs);
            for glyph in glyphs {
                self.glyphs.entry(glyph.id).or_insert(glyph.source);
            }
            self.show(
                unicode_font::RESOURCE_NAME,
                Object::String(codes, StringFormat::Hexadecimal),
                style,
                x,
            );
            self.y -= style.line_height() - style.size;
        }
    }

    fn show(&mut self, font: &str, text: Object, style: Style, x: f32) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("g", vec![style.gray.into()]),
            Operation::new("Tf", vec![font.into(), style.size.into()]),
            Operation::new("Td", vec![x.into(), self.y.into()]),
            Operation::new("Tj", vec![text]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Thin horizontal rule across the content width.
    pub fn rule(&mut self) {
        self.ensure_space(12.0);
        self.y -= 6.0;
        self.ops.extend([
            Operation::new("G", vec![0.75_f32.into()]),
            Operation::new("w", vec![0.5_f32.into()]),
            Operation::new("m", vec![MARGIN.into(), self.y.into()]),
            Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), self.y.into()]),
            Operation::new("S", vec![]),
        ]);
        self.y -= 6.0;
    }

    #[cfg(test)]
    pub fn cursor(&self) -> f32 {
        self.y
    }
}

fn rtl_font(text: &str) -> Option<&'static UnicodeFont> {
    if contains_rtl(text) {
        unicode_font::font()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: Style = Style::new(Face::Regular, 10.0);

    #[test]
    fn test_empty_layout_has_no_pages() {
        let mut layout = PageLayout::new();
        assert!(layout.drain_pages().is_empty());
    }

    #[test]
    fn test_long_text_flows_onto_new_pages() {
        let mut layout = PageLayout::new();
        let text = "word ".repeat(4000);
        layout.paragraph(&text, BODY, 0.0);
        assert!(layout.drain_pages().len() > 1);
    }

    #[test]
    fn test_break_page_resets_cursor() {
        let mut layout = PageLayout::new();
        layout.paragraph("hello", BODY, 0.0);
        assert!(layout.cursor() < PAGE_HEIGHT - MARGIN);
        layout.break_page();
        assert_eq!(layout.cursor(), PAGE_HEIGHT - MARGIN);
        assert_eq!(layout.drain_pages().len(), 1);
    }

    #[test]
    fn test_rtl_paragraph_uses_embedded_face() {
        let mut layout = PageLayout::new();
        layout.paragraph("ملاحظات المقابلة", BODY, 0.0);
        let pages = layout.drain_pages();

        let uses_f3 = pages[0].iter().any(|op| {
            op.operator == "Tf"
                && matches!(op.operands.first(), Some(Object::Name(name)) if name == b"F3")
        });
        assert!(uses_f3);

        let shown = pages[0]
            .iter()
            .find(|op| op.operator == "Tj")
            .and_then(|op| op.operands.first());
        let Some(Object::String(codes, StringFormat::Hexadecimal)) = shown else {
            panic!("expected a hex glyph string, got {shown:?}");
        };
        assert_eq!(codes.len() % 2, 0);

        let glyphs = layout.take_glyphs();
        assert!(glyphs.values().all(|source| source != "?"));
        let text: String = glyphs.values().cloned().collect();
        assert!(text.contains('م') && text.contains('ة'));
    }

    #[test]
    fn test_rtl_lines_are_right_aligned() {
        let mut layout = PageLayout::new();
        layout.paragraph("مرحبا", BODY, 0.0);
        let pages = layout.drain_pages();
        let x = pages[0]
            .iter()
            .find(|op| op.operator == "Td")
            .and_then(|op| op.operands.first())
            .and_then(|x| x.as_float().ok())
            .unwrap();
        assert!(x > PAGE_WIDTH / 2.0, "x = {x}");
    }

    #[test]
    fn test_each_source_line_starts_a_new_line() {
        let mut layout = PageLayout::new();
        layout.paragraph("Question: one\nAnswer: two", BODY, 0.0);
        let pages = layout.drain_pages();
        let shows = pages[0].iter().filter(|op| op.operator == "Tj").count();
        assert_eq!(shows, 2);
    }
}
