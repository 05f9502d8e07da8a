// Document rendering: text → paginated PDF.
// Layout is pure and CPU-bound; PdfRenderer runs it inside tokio::task::spawn_blocking.

pub mod layout;
pub mod metrics;

use async_trait::async_trait;
use bytes::Bytes;
use printpdf::{Mm, PdfDocument};
use thiserror::Error;
use tracing::debug;

use crate::render::layout::{layout_text, Page};
use crate::render::metrics::{FontMetricTable, PageConfig, HELVETICA};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("paragraph {paragraph} needs {lines} lines but a page holds {capacity}")]
    ParagraphTooLarge {
        paragraph: usize,
        lines: usize,
        capacity: usize,
    },

    #[error("PDF backend error: {0}")]
    Backend(String),
}

/// Produces a downloadable document from a block of text.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, text: &str) -> Result<Bytes, RenderError>;
}

/// Renders plain text as a US-letter PDF in Helvetica, one paragraph per input line.
pub struct PdfRenderer {
    config: PageConfig,
    metrics: &'static FontMetricTable,
}

impl PdfRenderer {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            metrics: &HELVETICA,
        }
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new(PageConfig::letter())
    }
}

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    async fn render(&self, text: &str) -> Result<Bytes, RenderError> {
        let text = to_builtin_charset(text);
        let config = self.config.clone();
        let metrics = self.metrics;

        tokio::task::spawn_blocking(move || {
            let pages = layout_text(&text, metrics, &config)?;
            debug!("laid out {} page(s)", pages.len());
            write_pdf(&pages, metrics, &config)
        })
        .await
        .map_err(|e| RenderError::Backend(format!("render task failed: {e}")))?
    }
}

fn write_pdf(
    pages: &[Page],
    metrics: &FontMetricTable,
    config: &PageConfig,
) -> Result<Bytes, RenderError> {
    let width = pt_to_mm(config.page_width_pt);
    let height = pt_to_mm(config.page_height_pt);

    let (doc, first_page, first_layer) = PdfDocument::new("Cover Letter", width, height, "Text");
    let font = doc
        .add_builtin_font(metrics.font.clone())
        .map_err(|e| RenderError::Backend(e.to_string()))?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, "Text")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        // First baseline sits one font size below the top margin.
        let top = config.page_height_pt - config.margin_pt - config.font_size_pt;
        for (row, line) in page.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = top - row as f32 * config.line_height_pt;
            layer.use_text(
                line,
                config.font_size_pt,
                pt_to_mm(config.margin_pt),
                pt_to_mm(y),
                &font,
            );
        }
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| RenderError::Backend(e.to_string()))?;
    Ok(Bytes::from(bytes))
}

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// Maps text onto what the builtin PDF fonts can draw. They only cover a
/// single-byte Latin encoding, so typographic punctuation that language models
/// favour becomes ASCII and any other character outside Latin-1 becomes `?`.
fn to_builtin_charset(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut replaced = 0usize;
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201F}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2009}' | '\u{202F}' | '\t' => out.push(' '),
            '\u{2022}' => out.push('-'),
            '\n' | '\r' | ' '..='~' | '\u{00A1}'..='\u{00FF}' => out.push(c),
            _ => {
                replaced += 1;
                out.push('?');
            }
        }
    }
    if replaced > 0 {
        debug!("replaced {replaced} character(s) the PDF font cannot encode");
    }
    out
}
