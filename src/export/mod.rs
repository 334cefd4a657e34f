//! Summary export: PDF and plain text.
//!
//! The PDF writer lays text out as a flat list of lines (title, headings,
//! wrapped body) and paginates them onto US Letter pages with a page
//! number footer. Helvetica with the default encoding covers Latin-1;
//! characters outside it are replaced.

use crate::error::{OppsumError, Result};
use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::path::Path;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 11.0;
const FOOTER_SIZE: f32 = 9.0;
const LINE_HEIGHT: f32 = 16.0;
const WRAP_COLUMNS: usize = 88;

/// Everything one exported summary carries.
pub struct SummaryDocument<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub chunks: &'a [String],
}

struct Line {
    text: String,
    size: f32,
    advance: f32,
}

impl Line {
    fn title(text: &str) -> Self {
        Self {
            text: text.to_string(),
            size: TITLE_SIZE,
            advance: 28.0,
        }
    }

    fn heading(text: &str) -> Self {
        Self {
            text: text.to_string(),
            size: HEADING_SIZE,
            advance: 22.0,
        }
    }

    fn body(text: String) -> Self {
        Self {
            text,
            size: BODY_SIZE,
            advance: LINE_HEIGHT,
        }
    }

    fn blank() -> Self {
        Self {
            text: String::new(),
            size: BODY_SIZE,
            advance: LINE_HEIGHT,
        }
    }
}

/// Render a summary document to PDF bytes.
pub fn render_pdf(summary_doc: &SummaryDocument) -> Result<Vec<u8>> {
    let lines = layout_lines(summary_doc);
    let pages = paginate(&lines);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let total = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(total);

    for (number, page_lines) in pages.iter().enumerate() {
        let mut operations = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        for line in page_lines {
            y -= line.advance;
            if line.text.is_empty() {
                continue;
            }
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), line.size.into()]));
            operations.push(Operation::new("Td", vec![MARGIN.into(), y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(latin1(&line.text), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let footer = format!("Page {} of {}", number + 1, total);
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), FOOTER_SIZE.into()]));
        operations.push(Operation::new(
            "Td",
            vec![(PAGE_WIDTH / 2.0 - 25.0).into(), (MARGIN / 2.0).into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(latin1(&footer), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| OppsumError::Export(format!("content stream: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| OppsumError::Export(format!("write pdf: {e}")))?;
    Ok(buffer)
}

/// Render a summary document and write it to `path`.
pub fn write_pdf(summary_doc: &SummaryDocument, path: &Path) -> Result<()> {
    let bytes = render_pdf(summary_doc)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Render a summary document as plain text.
pub fn render_text(summary_doc: &SummaryDocument) -> String {
    let mut out = String::new();
    out.push_str(summary_doc.title);
    out.push('\n');
    out.push_str(&"=".repeat(summary_doc.title.chars().count().clamp(1, WRAP_COLUMNS)));
    out.push_str("\n\nSummary\n-------\n");
    out.push_str(summary_doc.summary.trim());
    out.push('\n');

    if !summary_doc.chunks.is_empty() {
        out.push_str("\nDetailed notes\n--------------\n");
        for (i, chunk) in summary_doc.chunks.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, chunk));
        }
    }

    out
}

/// Timestamped default name for a downloaded summary.
pub fn default_pdf_filename() -> String {
    format!("summary_{}.pdf", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Clean a client-requested filename down to a safe attachment name.
pub fn sanitize_filename(requested: Option<&str>) -> String {
    let cleaned = requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        });

    match cleaned {
        Some(mut name) => {
            if !name.to_ascii_lowercase().ends_with(".pdf") {
                name.push_str(".pdf");
            }
            name
        }
        None => default_pdf_filename(),
    }
}

fn layout_lines(summary_doc: &SummaryDocument) -> Vec<Line> {
    let mut lines = Vec::new();
    lines.push(Line::title(summary_doc.title));
    lines.push(Line {
        text: format!("Generated {}", Local::now().format("%Y-%m-%d %H:%M")),
        size: FOOTER_SIZE,
        advance: 20.0,
    });
    lines.push(Line::blank());

    lines.push(Line::heading("Summary"));
    let summary = if summary_doc.summary.trim().is_empty() {
        "(no summary)"
    } else {
        summary_doc.summary
    };
    for wrapped in wrap_text(summary, WRAP_COLUMNS) {
        lines.push(Line::body(wrapped));
    }

    if !summary_doc.chunks.is_empty() {
        lines.push(Line::blank());
        lines.push(Line::heading("Detailed notes"));
        for (i, chunk) in summary_doc.chunks.iter().enumerate() {
            if i > 0 {
                lines.push(Line::blank());
            }
            for wrapped in wrap_text(&format!("{}. {}", i + 1, chunk), WRAP_COLUMNS) {
                lines.push(Line::body(wrapped));
            }
        }
    }

    lines
}

fn paginate(lines: &[Line]) -> Vec<Vec<&Line>> {
    // Keep body text clear of the footer band.
    let bottom = MARGIN + 20.0;
    let mut pages = Vec::new();
    let mut current: Vec<&Line> = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        if y - line.advance < bottom && !current.is_empty() {
            pages.push(current);
            current = Vec::new();
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= line.advance;
        current.push(line);
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// Word-wrap `text` to at most `columns` characters per line. Words longer
/// than a whole line are split hard.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            for piece in split_long_word(word, columns) {
                let piece_len = piece.chars().count();
                if current_len == 0 {
                    current.push_str(piece);
                    current_len = piece_len;
                } else if current_len + 1 + piece_len <= columns {
                    current.push(' ');
                    current.push_str(piece);
                    current_len += 1 + piece_len;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current.push_str(piece);
                    current_len = piece_len;
                }
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

fn split_long_word(word: &str, columns: usize) -> Vec<&str> {
    if word.chars().count() <= columns {
        return vec![word];
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in word.char_indices() {
        if count == columns {
            pieces.push(&word[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    pieces.push(&word[start..]);
    pieces
}

/// Encode for the standard Helvetica font; anything outside Latin-1
/// becomes a question mark.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document<'a>(summary: &'a str, chunks: &'a [String]) -> SummaryDocument<'a> {
        SummaryDocument {
            title: "Lecture Summary",
            summary,
            chunks,
        }
    }

    #[test]
    fn test_pdf_bytes_have_header_and_trailer() {
        let chunks = vec!["First chunk.".to_string(), "Second chunk.".to_string()];
        let bytes = render_pdf(&document("A short summary.", &chunks)).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let tail = &bytes[bytes.len().saturating_sub(32)..];
        assert!(tail.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn test_long_summary_spans_multiple_pages() {
        let sentence = "Every lecture needs enough words to overflow a single page of output. ";
        let long_summary = sentence.repeat(80);
        let lines = layout_lines(&document(&long_summary, &[]));
        let pages = paginate(&lines);
        assert!(pages.len() > 1);
    }

    #[test]
    fn test_wrap_respects_column_limit() {
        let text = "alpha beta gamma delta epsilon";
        let lines = wrap_text(text, 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta", "epsilon"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 11));
    }

    #[test]
    fn test_wrap_splits_oversized_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_latin1_replaces_unmappable_chars() {
        assert_eq!(latin1("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(latin1("日本"), vec![b'?', b'?']);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(Some("my notes!")), "my_notes_.pdf");
        assert_eq!(sanitize_filename(Some("already.pdf")), "already.pdf");
        assert_eq!(sanitize_filename(Some("UPPER.PDF")), "UPPER.PDF");
        assert!(sanitize_filename(None).starts_with("summary_"));
        assert!(sanitize_filename(Some("   ")).starts_with("summary_"));
    }

    #[test]
    fn test_text_rendering_includes_sections() {
        let chunks = vec!["Point one.".to_string()];
        let text = render_text(&document("The whole summary.", &chunks));

        assert!(text.contains("Lecture Summary"));
        assert!(text.contains("Summary\n-------\n"));
        assert!(text.contains("The whole summary."));
        assert!(text.contains("Detailed notes"));
        assert!(text.contains("1. Point one."));
    }
}
