//! PDF exporter — fixed-margin, single-font, greedy-wrapped pages.
//!
//! Layout happens in points and is independent of `printpdf`, so wrapping and
//! pagination are testable without parsing the produced PDF.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::export::font_metrics::wrap_paragraph;
use crate::export::{DocumentExporter, ExportError};

const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_POINT: f32 = 25.4 / POINTS_PER_INCH;
const LAYER_NAME: &str = "Text";

/// Page geometry in points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub font_size_pt: f32,
    /// Baseline-to-baseline distance.
    pub line_height_pt: f32,
}

impl Default for PageLayout {
    /// US letter, 1" margins, 11pt with 1.3 leading.
    fn default() -> Self {
        Self {
            page_width_pt: 8.5 * POINTS_PER_INCH,
            page_height_pt: 11.0 * POINTS_PER_INCH,
            margin_pt: POINTS_PER_INCH,
            font_size_pt: 11.0,
            line_height_pt: 11.0 * 1.3,
        }
    }
}

impl PageLayout {
    /// Usable line width in em units at the configured font size.
    pub fn text_width_em(&self) -> f32 {
        (self.page_width_pt - 2.0 * self.margin_pt) / self.font_size_pt
    }

    /// Line slots per page; always at least one.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height_pt - 2.0 * self.margin_pt;
        ((usable / self.line_height_pt).floor() as usize).max(1)
    }

    /// Wraps every source line and splits the result into pages.
    /// Empty text still produces a single (blank) page.
    pub fn paginate(&self, text: &str) -> Vec<Vec<String>> {
        let width = self.text_width_em();
        let lines: Vec<String> = text
            .lines()
            .flat_map(|paragraph| wrap_paragraph(paragraph, width))
            .collect();

        if lines.is_empty() {
            return vec![Vec::new()];
        }
        lines
            .chunks(self.lines_per_page())
            .map(<[String]>::to_vec)
            .collect()
    }
}

/// Renders text to PDF with the built-in Helvetica font.
#[derive(Debug, Clone, Default)]
pub struct PdfExporter {
    layout: PageLayout,
    title: String,
}

impl PdfExporter {
    pub fn new(layout: PageLayout, title: impl Into<String>) -> Self {
        Self {
            layout,
            title: title.into(),
        }
    }
}

impl DocumentExporter for PdfExporter {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, text: &str) -> Result<Vec<u8>, ExportError> {
        let layout = &self.layout;
        let width = to_mm(layout.page_width_pt);
        let height = to_mm(layout.page_height_pt);

        let (doc, first_page, first_layer) =
            PdfDocument::new(self.title.as_str(), width, height, LAYER_NAME);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Render(e.to_string()))?;

        let first_baseline = layout.page_height_pt - layout.margin_pt - layout.font_size_pt;

        let mut first = Some((first_page, first_layer));
        for lines in layout.paginate(text) {
            let (page, layer) = match first.take() {
                Some(indices) => indices,
                None => doc.add_page(width, height, LAYER_NAME),
            };
            let canvas = doc.get_page(page).get_layer(layer);

            for (line_no, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline = first_baseline - line_no as f32 * layout.line_height_pt;
                canvas.use_text(
                    line.as_str(),
                    layout.font_size_pt,
                    to_mm(layout.margin_pt),
                    to_mm(baseline),
                    &font,
                );
            }
        }

        doc.save_to_bytes()
            .map_err(|e| ExportError::Render(e.to_string()))
    }
}

fn to_mm(points: f32) -> Mm {
    Mm(points * MM_PER_POINT)
}
