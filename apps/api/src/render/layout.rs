//! Text layout: paragraphs → wrapped lines → pages.
//!
//! Every input line is one paragraph. Blank lines are kept as blank paragraphs so the
//! rendered document reproduces the source line sequence. Paragraphs never straddle a
//! page break; one that cannot fit on an empty page is a layout failure.

use crate::render::metrics::{FontMetricTable, PageConfig};
use crate::render::RenderError;

/// One paragraph after word-wrapping. A blank paragraph has a single empty line.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedParagraph {
    pub lines: Vec<String>,
}

/// A laid-out page: the wrapped paragraphs it holds, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub paragraphs: Vec<WrappedParagraph>,
}

impl Page {
    pub fn line_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.lines.len()).sum()
    }

    /// All lines on the page, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.lines.iter().map(String::as_str))
    }
}

/// Splits text into paragraphs on `\n`, dropping a trailing `\r` from each line.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Greedy word-wrap at `max_width_em`. Runs of whitespace collapse to one space.
/// A word wider than the whole line is broken between characters.
pub fn wrap_paragraph(text: &str, metrics: &FontMetricTable, max_width_em: f32) -> WrappedParagraph {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = metrics.measure_str(word);

        if word_w > max_width_em {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = break_word(word, metrics, max_width_em);
            // The tail of a broken word starts the next line and can take more words.
            let tail = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            current_width = metrics.measure_str(&tail);
            current = tail;
            continue;
        }

        let space_w = if current.is_empty() { 0.0 } else { metrics.space_width };
        if !current.is_empty() && current_width + space_w + word_w > max_width_em {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += metrics.space_width;
        }
        current.push_str(word);
        current_width += word_w;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    WrappedParagraph { lines }
}

fn break_word(word: &str, metrics: &FontMetricTable, max_width_em: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;
    for c in word.chars() {
        let w = metrics.char_width(c);
        if !piece.is_empty() && width + w > max_width_em {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Lays the text out into pages.
pub fn layout_text(
    text: &str,
    metrics: &FontMetricTable,
    config: &PageConfig,
) -> Result<Vec<Page>, RenderError> {
    let max_width = config.text_width_em();
    let capacity = config.lines_per_page();

    let mut pages = Vec::new();
    let mut page = Page::default();

    for (index, paragraph) in split_paragraphs(text).into_iter().enumerate() {
        let wrapped = wrap_paragraph(paragraph, metrics, max_width);
        let needed = wrapped.lines.len();

        if needed > capacity {
            return Err(RenderError::ParagraphTooLarge {
                paragraph: index + 1,
                lines: needed,
                capacity,
            });
        }
        if page.line_count() + needed > capacity {
            pages.push(std::mem::take(&mut page));
        }
        page.paragraphs.push(wrapped);
    }
    pages.push(page);

    Ok(pages)
}
