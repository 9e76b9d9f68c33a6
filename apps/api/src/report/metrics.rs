//! Static glyph-width tables for the standard Type1 faces the report uses.
//!
//! Widths are in em units (AFM widths / 1000) and cover ASCII 0x20..=0x7E.
//! Index = (byte as usize) - 32. Bytes above 0x7E (WinAnsi upper half) use
//! `average_char_width`.

/// The WinAnsi faces registered in every report's resource dictionary.
/// Right-to-left text goes through the embedded face in `unicode_font`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Helvetica, body text.
    Regular,
    /// Helvetica-Bold, headings.
    Bold,
}

impl Face {
    /// Resource name used in content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Face::Regular => "Helvetica",
            Face::Bold => "Helvetica-Bold",
        }
    }

    pub fn metrics(self) -> &'static FontMetricTable {
        match self {
            Face::Regular => &HELVETICA_TABLE,
            Face::Bold => &HELVETICA_BOLD_TABLE,
        }
    }
}

pub struct FontMetricTable {
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of WinAnsi-encoded text in em units.
    pub fn measure_bytes(&self, bytes: &[u8]) -> f32 {
        bytes
            .iter()
            .map(|&b| {
                if (32..=126).contains(&b) {
                    self.widths[(b - 32) as usize]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width in points at `size`.
    pub fn width_pt(&self, bytes: &[u8], size: f32) -> f32 {
        self.measure_bytes(bytes) * size
    }

    /// Greedy word wrap of encoded text to `max_width_pt`.
    ///
    /// Words wider than a full line are split at the byte that would overflow.
    pub fn wrap(&self, bytes: &[u8], size: f32, max_width_pt: f32) -> Vec<Vec<u8>> {
        let max_em = max_width_pt / size;
        let mut lines: Vec<Vec<u8>> = Vec::new();
        let mut current: Vec<u8> = Vec::new();
        let mut current_width = 0.0_f32;

        for word in bytes.split(|b| *b == b' ').filter(|w| !w.is_empty()) {
            let word_w = self.measure_bytes(word);
            let space_w = if current.is_empty() { 0.0 } else { self.space_width };

            if current_width + space_w + word_w <= max_em {
                if !current.is_empty() {
                    current.push(b' ');
                }
                current.extend_from_slice(word);
                current_width += space_w + word_w;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_w <= max_em {
                current.extend_from_slice(word);
                current_width = word_w;
                continue;
            }

            for &b in word {
                let w = self.measure_bytes(&[b]);
                if current_width + w > max_em && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(b);
                current_width += w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Helvetica.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0-9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

/// Helvetica-Bold.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0-9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_is_zero() {
        assert_eq!(Face::Regular.metrics().measure_bytes(b""), 0.0);
    }

    #[test]
    fn test_measure_known_word() {
        // R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = Face::Regular.metrics().measure_bytes(b"Rust");
        assert!((width - 2.056).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_upper_half_bytes_use_average_width() {
        let metrics = Face::Regular.metrics();
        assert!((metrics.measure_bytes(&[0xE9]) - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = b"Candidate Matching Report";
        assert!(
            Face::Bold.metrics().measure_bytes(text) > Face::Regular.metrics().measure_bytes(text)
        );
    }

    #[test]
    fn test_wrap_respects_width() {
        let metrics = Face::Regular.metrics();
        let text = b"Designed and shipped a distributed job scheduler handling retries, backoff and observability for hundreds of services";
        let lines = metrics.wrap(text, 10.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics.width_pt(line, 10.0) <= 200.0 + 1e-3);
        }
        let rejoined: Vec<u8> = lines.join(&b' ');
        assert_eq!(rejoined, text.to_vec());
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let metrics = Face::Regular.metrics();
        let word = vec![b'W'; 60];
        let lines = metrics.wrap(&word, 10.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.iter().map(Vec::len).sum::<usize>(), 60);
        for line in &lines {
            assert!(metrics.width_pt(line, 10.0) <= 100.0 + 1e-3);
        }
    }

    #[test]
    fn test_wrap_blank_is_empty() {
        assert!(Face::Regular.metrics().wrap(b"   ", 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_resource_names_are_distinct() {
        let names = [Face::Regular, Face::Bold].map(Face::resource_name);
        assert_eq!(names, ["F1", "F2"]);
    }
}
