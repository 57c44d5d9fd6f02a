//! Text-to-PDF rendering for the summary path.
//!
//! The renderer lays text out top to bottom in built-in Helvetica, wraps on word boundaries at
//! an estimated glyph width, and breaks pages automatically.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors raised while rendering a PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Layout parameters leave no room for text.
    #[error("page layout leaves no room for text: {0}")]
    Layout(String),
}

/// Interface implemented by text-to-PDF renderers.
pub trait Renderer: Send + Sync {
    /// Render plain text into PDF bytes.
    fn render_text_to_pdf(&self, text: &str) -> Result<Vec<u8>, RenderError>;
}

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const FONT_SIZE_PT: f32 = 11.0;
const LINE_HEIGHT_PT: f32 = 14.0;
const MARGIN_MM: f32 = 20.0;
// Average Helvetica glyph width is roughly half the font size; 1pt = 0.3528mm.
const AVG_CHAR_WIDTH_MM: f32 = 0.50 * FONT_SIZE_PT * 0.3528;

/// A4 renderer backed by `printpdf`.
pub struct PdfRenderer {
    title: String,
}

impl PdfRenderer {
    /// Create a renderer that stamps `title` into the PDF metadata.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new("Document Summary")
    }
}

impl Renderer for PdfRenderer {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    fn render_text_to_pdf(&self, text: &str) -> Result<Vec<u8>, RenderError> {
        let (page_w, page_h) = (Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM));
        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let max_chars_per_line = ((page_w.0 - 2.0 * MARGIN_MM) / AVG_CHAR_WIDTH_MM) as usize;
        let page_h_pt = page_h.into_pt().0;
        let lines_per_page = ((page_h_pt - 2.0 * margin_pt) / LINE_HEIGHT_PT) as usize;
        if max_chars_per_line == 0 || lines_per_page == 0 {
            return Err(RenderError::Layout(format!(
                "{max_chars_per_line} chars per line, {lines_per_page} lines per page"
            )));
        }

        let lines = wrap_text(text, max_chars_per_line);
        let mut pages: Vec<PdfPage> = lines
            .chunks(lines_per_page)
            .map(|page_lines| {
                let ops = page_lines
                    .iter()
                    .enumerate()
                    .flat_map(|(idx, line)| {
                        let y_pt = page_h_pt - margin_pt - (idx as f32 * LINE_HEIGHT_PT);
                        [
                            Op::StartTextSection,
                            Op::SetTextCursor {
                                pos: Point {
                                    x: Pt(margin_pt),
                                    y: Pt(y_pt),
                                },
                            },
                            Op::SetFontSizeBuiltinFont {
                                size: Pt(FONT_SIZE_PT),
                                font: BuiltinFont::Helvetica,
                            },
                            Op::WriteTextBuiltinFont {
                                items: vec![TextItem::Text(line.clone())],
                                font: BuiltinFont::Helvetica,
                            },
                            Op::EndTextSection,
                        ]
                    })
                    .collect();
                PdfPage::new(page_w, page_h, ops)
            })
            .collect();

        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let mut doc = PdfDocument::new(&self.title);
        doc.with_pages(pages);
        debug!(lines = lines.len(), pages = doc.pages.len(), "Summary layout complete");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }
}

/// Wrap text to at most `max_width` characters per line.
///
/// Newlines start a new line, blank lines are kept, and words longer than the limit are split
/// on character boundaries.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            if chars.len() > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let mut pieces = chars.chunks(max_width).peekable();
                current_len = 0;
                while let Some(piece) = pieces.next() {
                    if pieces.peek().is_some() {
                        lines.push(piece.iter().collect());
                    } else {
                        current = piece.iter().collect();
                        current_len = piece.len();
                    }
                }
            } else if current.is_empty() {
                current.push_str(word);
                current_len = chars.len();
            } else if current_len + 1 + chars.len() <= max_width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + chars.len();
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_len = chars.len();
            }
        }

        lines.push(current);
    }

    lines
}
