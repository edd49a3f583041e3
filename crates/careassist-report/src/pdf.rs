//! Plain-text → PDF rendering.
//!
//! A4 portrait, Helvetica 14pt, 10mm line pitch. Text is wrapped greedily on
//! word boundaries; words longer than a line are split. A new page starts
//! when the current one is full.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::ReportError;

/// File name used for downloads and email attachments.
pub const REPORT_FILE_NAME: &str = "healthcare_report.pdf";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 10.0;
const FONT_SIZE_PT: f32 = 14.0;
const LINE_WIDTH_CHARS: usize = 72;
const LINES_PER_PAGE: usize = 27;
const LAYER_NAME: &str = "Report";

/// Renders `text` into a PDF document.
///
/// # Errors
///
/// Returns [`ReportError::EmptyReport`] for blank text and
/// [`ReportError::Pdf`] if the document cannot be serialised.
pub fn render_pdf(text: &str) -> Result<Vec<u8>, ReportError> {
    if text.trim().is_empty() {
        return Err(ReportError::EmptyReport);
    }

    let lines = wrap_lines(&to_builtin_charset(text), LINE_WIDTH_CHARS);

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Healthcare Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    for (index, line) in lines.iter().enumerate() {
        let slot = index % LINES_PER_PAGE;
        if index > 0 && slot == 0 {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            layer = doc.get_page(page).get_layer(page_layer);
        }
        #[allow(clippy::cast_precision_loss)]
        let y = PAGE_HEIGHT_MM - MARGIN_MM - LINE_HEIGHT_MM * (slot as f32 + 1.0);
        layer.use_text(line.as_str(), FONT_SIZE_PT, Mm(MARGIN_MM), Mm(y), &font);
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    tracing::debug!(lines = lines.len(), bytes = bytes.len(), "rendered report PDF");
    Ok(bytes)
}

/// Maps text onto what the built-in PDF fonts can show: common typographic
/// punctuation is folded to ASCII, other non-Latin-1 characters become `?`.
fn to_builtin_charset(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            '\t' => ' ',
            c if c == '\n' || (' '..='\u{FF}').contains(&c) => c,
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap. Blank input lines are kept as empty lines.
pub(crate) fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let used = current.chars().count();
                let gap = usize::from(used > 0);
                if used + gap + word.len() <= width {
                    if gap == 1 {
                        current.push(' ');
                    }
                    current.extend(word.iter());
                    break;
                }
                if used > 0 {
                    out.push(std::mem::take(&mut current));
                    continue;
                }
                let rest = word.split_off(width);
                out.push(word.iter().collect());
                word = rest;
            }
        }
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width_and_keeps_order() {
        let lines = wrap_lines("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_lines("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_keeps_blank_paragraph_lines() {
        let lines = wrap_lines("first\n\nsecond", 20);
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn charset_folds_smart_punctuation() {
        assert_eq!(
            to_builtin_charset("\u{201C}rest\u{201D} \u{2013} it\u{2019}s fine \u{1F637}"),
            "\"rest\" - it's fine ?"
        );
        assert_eq!(to_builtin_charset("café"), "café");
    }

    #[test]
    fn render_produces_pdf_bytes() {
        let bytes = render_pdf("You may have a mild viral infection.\nRest and drink fluids.")
            .expect("render should succeed");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn render_handles_multi_page_text() {
        let text = "Stay hydrated and monitor your temperature. ".repeat(200);
        let bytes = render_pdf(&text).expect("render should succeed");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn render_rejects_blank_text() {
        assert!(matches!(render_pdf("  \n "), Err(ReportError::EmptyReport)));
    }
}
