//! The embedded TrueType face used for right-to-left fields.
//!
//! Lines are shaped and reordered by `rtl`, mapped to glyph ids through the
//! font's cmap, and shown as two-byte codes under a Type0 font with
//! `Identity-H` encoding. A ToUnicode map built from the glyphs actually used
//! keeps the text searchable and copyable.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::OnceLock;

use ab_glyph::{Font, FontRef, GlyphId};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::warn;

use super::rtl::to_visual;
use super::text::{ascii_stand_in, clean_char};

/// Resource name used in content streams.
pub const RESOURCE_NAME: &str = "F3";
pub const BASE_FONT: &str = "DejaVuSans";

static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Glyph id → the logical text it was drawn for.
pub type GlyphSet = BTreeMap<u16, String>;

/// One positioned glyph. `advance` is in 1/1000 em.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub id: u16,
    pub advance: f32,
    pub source: String,
}

pub struct UnicodeFont {
    face: FontRef<'static>,
    units_per_em: f32,
}

/// The parsed face, or `None` when the embedded data cannot be read.
pub fn font() -> Option<&'static UnicodeFont> {
    static FONT: OnceLock<Option<UnicodeFont>> = OnceLock::new();
    FONT.get_or_init(|| match FontRef::try_from_slice(FONT_DATA) {
        Ok(face) => Some(UnicodeFont {
            units_per_em: face.units_per_em().unwrap_or(2048.0),
            face,
        }),
        Err(e) => {
            warn!("Embedded report font is unreadable, RTL text falls back to WinAnsi: {e}");
            None
        }
    })
    .as_ref()
}

impl UnicodeFont {
    fn glyph_id(&self, c: char) -> Option<u16> {
        let GlyphId(id) = self.face.glyph_id(c);
        (id != 0).then_some(id)
    }

    fn advance(&self, id: u16) -> f32 {
        self.face.h_advance_unscaled(GlyphId(id)) * 1000.0 / self.units_per_em
    }

    fn push_glyph(&self, out: &mut Vec<Glyph>, c: char, source: String) -> bool {
        match self.glyph_id(c) {
            Some(id) => {
                out.push(Glyph {
                    id,
                    advance: self.advance(id),
                    source,
                });
                true
            }
            None => false,
        }
    }

    /// Glyphs for one line in drawing order. Characters the face lacks get
    /// the ASCII stand-ins or `?`.
    pub fn glyphs(&self, line: &str) -> Vec<Glyph> {
        let cleaned: String = line.chars().filter_map(clean_char).collect();
        let mut out = Vec::with_capacity(cleaned.len());
        for shaped in to_visual(&cleaned) {
            if self.push_glyph(&mut out, shaped.ch, shaped.source) {
                continue;
            }
            let stand_in = ascii_stand_in(shaped.ch).unwrap_or("?");
            for c in stand_in.chars() {
                self.push_glyph(&mut out, c, c.to_string());
            }
        }
        out
    }

    pub fn width_pt(&self, text: &str, size: f32) -> f32 {
        line_width_pt(&self.glyphs(text), size)
    }

    /// Greedy word wrap. Returned lines are still in logical order.
    ///
    /// Joins never cross a space, so each word is shaped and measured on its own.
    pub fn wrap(&self, text: &str, size: f32, max_width_pt: f32) -> Vec<String> {
        let space = self.width_pt(" ", size);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split(' ').filter(|w| !w.is_empty()) {
            let word_width = self.width_pt(word, size);

            if !current.is_empty() && current_width + space + word_width <= max_width_pt {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if word_width <= max_width_pt {
                current = word.to_string();
                current_width = word_width;
                continue;
            }

            for c in word.chars() {
                current.push(c);
                let width = self.width_pt(&current, size);
                if width > max_width_pt && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                    current_width = self.width_pt(&current, size);
                } else {
                    current_width = width;
                }
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Writes the Type0 font for `glyphs` into `doc` under `font_id`.
    pub fn embed(&self, doc: &mut Document, font_id: ObjectId, glyphs: &GlyphSet) {
        let scale = 1000.0 / self.units_per_em;
        let ascent = (self.face.ascent_unscaled() * scale).round() as i64;
        let descent = (self.face.descent_unscaled() * scale).round() as i64;

        let font_file = doc.add_object(Stream::new(
            dictionary! { "Length1" => FONT_DATA.len() as i64 },
            FONT_DATA.to_vec(),
        ));
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => BASE_FONT,
            "Flags" => 32_i64,
            "FontBBox" => vec![(-1000_i64).into(), descent.into(), 2000_i64.into(), ascent.into()],
            "ItalicAngle" => 0_i64,
            "Ascent" => ascent,
            "Descent" => descent,
            "CapHeight" => ascent,
            "StemV" => 80_i64,
            "FontFile2" => font_file,
        });

        let mut widths = Vec::with_capacity(glyphs.len() * 2);
        for &id in glyphs.keys() {
            widths.push(Object::Integer(i64::from(id)));
            widths.push(Object::Array(vec![Object::Integer(
                self.advance(id).round() as i64,
            )]));
        }

        let cid_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => BASE_FONT,
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0_i64,
            },
            "FontDescriptor" => descriptor,
            "CIDToGIDMap" => "Identity",
            "W" => widths,
        });
        let to_unicode = doc.add_object(Stream::new(
            dictionary! {},
            to_unicode_cmap(glyphs).into_bytes(),
        ));

        doc.objects.insert(
            font_id,
            Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type0",
                "BaseFont" => BASE_FONT,
                "Encoding" => "Identity-H",
                "DescendantFonts" => vec![Object::Reference(cid_font)],
                "ToUnicode" => to_unicode,
            }),
        );
    }
}

pub fn line_width_pt(glyphs: &[Glyph], size: f32) -> f32 {
    glyphs.iter().map(|g| g.advance).sum::<f32>() * size / 1000.0
}

/// Two bytes per glyph, big-endian, as `Identity-H` expects.
pub fn encode(glyphs: &[Glyph]) -> Vec<u8> {
    glyphs.iter().flat_map(|g| g.id.to_be_bytes()).collect()
}

const CMAP_HEADER: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
";

const CMAP_FOOTER: &str = "endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

/// bfchar blocks are limited to 100 entries each.
fn to_unicode_cmap(glyphs: &GlyphSet) -> String {
    let mut cmap = String::from(CMAP_HEADER);
    let entries: Vec<(&u16, &String)> = glyphs.iter().collect();
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (id, text) in chunk {
            let utf16: String = text.encode_utf16().map(|u| format!("{u:04X}")).collect();
            let _ = writeln!(cmap, "<{id:04X}> <{utf16}>");
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(CMAP_FOOTER);
    cmap
}
