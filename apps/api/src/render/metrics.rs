//! Static font metrics for the PDF body font.
//!
//! Widths are in em units (relative to font size), taken from the Helvetica AFM and
//! divided by 1000. Only ASCII 0x20..=0x7E is tabulated; anything else falls back to
//! `average_char_width`, which is close enough for wrapping decisions.
//! Index = (char as usize) - 32.

use printpdf::BuiltinFont;

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Fixed page geometry for rendered documents. All lengths in PostScript points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
}

impl PageConfig {
    /// US letter (8.5" × 11"), 1" margins, 11pt body text on 14pt leading.
    pub fn letter() -> Self {
        Self {
            page_width_pt: 612.0,
            page_height_pt: 792.0,
            margin_pt: 72.0,
            font_size_pt: 11.0,
            line_height_pt: 14.0,
        }
    }

    /// Usable text width in em units at the configured font size.
    /// Letter with 1" margins at 11pt: 468pt / 11pt ≈ 42.5em.
    pub fn text_width_em(&self) -> f32 {
        (self.page_width_pt - 2.0 * self.margin_pt) / self.font_size_pt
    }

    /// Number of text lines that fit between the top and bottom margins.
    pub fn lines_per_page(&self) -> usize {
        ((self.page_height_pt - 2.0 * self.margin_pt) / self.line_height_pt).floor() as usize
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a builtin PDF font.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: BuiltinFont,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }
}

/// Helvetica, the body font of every rendered document.
pub static HELVETICA: FontMetricTable = FontMetricTable {
    font: BuiltinFont::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
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
    average_char_width: 0.55,
    space_width: 0.278,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(HELVETICA.measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = HELVETICA.measure_str("Rust");
        assert!((width - 2.056).abs() < 1e-3, "Rust width should be ~2.056, got {width}");
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let width = HELVETICA.measure_str("é");
        assert!((width - HELVETICA.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_space_width_matches_table() {
        assert!((HELVETICA.char_width(' ') - HELVETICA.space_width).abs() < 1e-6);
    }

    #[test]
    fn test_letter_page_geometry() {
        let config = PageConfig::letter();
        assert!((config.text_width_em() - 42.545).abs() < 0.01);
        assert_eq!(config.lines_per_page(), 46);
    }
}
