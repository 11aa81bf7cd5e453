use super::ExportError;
use crate::processing::{FileStatus, ResultSet, SummaryResult};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Attachment name used when the PDF report is downloaded.
pub const PDF_FILENAME: &str = "summaries.pdf";

const REPORT_TITLE: &str = "Document Summaries Report";
const BLOCKS_PER_PAGE: usize = 3;

// A4 in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const CONTENT_WIDTH: i64 = PAGE_WIDTH - 2 * MARGIN;

const BODY_SIZE: i64 = 10;
const BODY_LEADING: i64 = 14;
const HEADING_SIZE: i64 = 12;
const HEADING_LEADING: i64 = HEADING_SIZE + 6;
const TITLE_SIZE: i64 = 20;
const BLOCK_GAP: i64 = 18;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

type Rgb = (f32, f32, f32);
const BLACK: Rgb = (0.0, 0.0, 0.0);
const GREY: Rgb = (0.4, 0.4, 0.4);
const GREEN: Rgb = (0.0, 0.5, 0.0);
const RED: Rgb = (0.8, 0.0, 0.0);
const BLUE: Rgb = (0.0, 0.0, 0.8);

/// Render `results` as a paginated PDF report stamped with `generated_at`.
///
/// Layout: title, timestamp, and a totals table on the first page, then one block per file in
/// input order. A page holds at most three file blocks and breaks earlier when a block would
/// run past the bottom margin.
pub fn render_pdf(
    results: &ResultSet,
    generated_at: OffsetDateTime,
) -> Result<Vec<u8>, ExportError> {
    let timestamp = generated_at.format(&Rfc3339)?;
    let mut layout = PageLayout::new();

    layout.text(BOLD, TITLE_SIZE, REPORT_TITLE, BLACK);
    layout.advance(TITLE_SIZE + 6);
    layout.text(REGULAR, BODY_SIZE, &format!("Generated: {timestamp}"), GREY);
    layout.advance(BODY_LEADING + 10);
    layout.totals_table(results);
    layout.advance(BLOCK_GAP);

    for (index, file) in results.files.iter().enumerate() {
        if index > 0 && index % BLOCKS_PER_PAGE == 0 {
            layout.new_page();
        }
        let block = FileBlock::new(index + 1, file);
        if !layout.fits(block.height()) && !layout.page_is_fresh() {
            layout.new_page();
        }
        block.draw(&mut layout);
        layout.advance(BLOCK_GAP);
    }

    let bytes = assemble(layout.finish(), &timestamp)?;
    tracing::debug!(
        files = results.files.len(),
        bytes = bytes.len(),
        "Rendered PDF report"
    );
    Ok(bytes)
}

/// Operations for each page plus the current pen position.
struct PageLayout {
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn page_is_fresh(&self) -> bool {
        self.y == PAGE_HEIGHT - MARGIN
    }

    fn fits(&self, height: i64) -> bool {
        self.y - height >= MARGIN
    }

    fn advance(&mut self, amount: i64) {
        self.y -= amount;
    }

    /// Move down one body line, breaking the page when the bottom margin is reached.
    fn next_line(&mut self) {
        self.line_break(BODY_LEADING);
    }

    fn line_break(&mut self, leading: i64) {
        self.advance(leading);
        if self.y < MARGIN {
            self.new_page();
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, font: &str, size: i64, text: &str, color: Rgb) {
        self.text_at(font, size, MARGIN, text, color);
    }

    fn text_at(&mut self, font: &str, size: i64, x: i64, text: &str, color: Rgb) {
        let y = self.y - size;
        let (r, g, b) = color;
        self.ops().extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn totals_table(&mut self, results: &ResultSet) {
        let rows = [
            ("Metric", "Count".to_string()),
            ("Total Files", results.total_files.to_string()),
            ("Successful", results.success_count().to_string()),
            ("Errors", results.error_count().to_string()),
        ];
        let row_height = BODY_LEADING + 6;
        let column = MARGIN + CONTENT_WIDTH / 2;
        let top = self.y;

        for (index, (label, value)) in rows.iter().enumerate() {
            let font = if index == 0 { BOLD } else { REGULAR };
            self.advance(4);
            self.text_at(font, BODY_SIZE, MARGIN + 6, label, BLACK);
            self.text_at(font, BODY_SIZE, column + 6, value, BLACK);
            self.advance(row_height - 4);
        }

        let height = top - self.y;
        let mut grid = vec![
            Operation::new("w", vec![0.5.into()]),
            Operation::new("RG", vec![0.0.into(), 0.0.into(), 0.0.into()]),
            Operation::new(
                "re",
                vec![
                    MARGIN.into(),
                    self.y.into(),
                    CONTENT_WIDTH.into(),
                    height.into(),
                ],
            ),
        ];
        for index in 1..rows.len() as i64 {
            let line_y = top - index * row_height;
            grid.push(Operation::new("m", vec![MARGIN.into(), line_y.into()]));
            grid.push(Operation::new(
                "l",
                vec![(MARGIN + CONTENT_WIDTH).into(), line_y.into()],
            ));
        }
        grid.push(Operation::new("m", vec![column.into(), self.y.into()]));
        grid.push(Operation::new("l", vec![column.into(), top.into()]));
        grid.push(Operation::new("S", vec![]));
        self.ops().extend(grid);
    }

    fn finish(self) -> Vec<Vec<Operation>> {
        self.pages
    }
}

/// One file's section of the report, pre-wrapped so its height is known before drawing.
struct FileBlock<'a> {
    file: &'a SummaryResult,
    heading_lines: Vec<String>,
    type_lines: Vec<String>,
    link_lines: Vec<String>,
    summary_lines: Vec<String>,
}

impl<'a> FileBlock<'a> {
    fn new(index: usize, file: &'a SummaryResult) -> Self {
        let body_width = max_chars(BODY_SIZE);
        Self {
            file,
            heading_lines: wrap(&format!("{index}. {}", file.name), max_chars(HEADING_SIZE)),
            type_lines: wrap(&format!("Type: {}", file.mime_type), body_width),
            link_lines: file
                .url
                .as_ref()
                .map(|url| wrap(&format!("Link: {url}"), body_width))
                .unwrap_or_default(),
            summary_lines: wrap(&file.summary, body_width),
        }
    }

    fn height(&self) -> i64 {
        // Status and "Summary:" are always one line each.
        let body_lines =
            self.type_lines.len() + self.link_lines.len() + 2 + self.summary_lines.len();
        self.heading_lines.len() as i64 * HEADING_LEADING + body_lines as i64 * BODY_LEADING
    }

    fn draw(&self, layout: &mut PageLayout) {
        for line in &self.heading_lines {
            layout.text(BOLD, HEADING_SIZE, line, BLACK);
            layout.line_break(HEADING_LEADING);
        }

        for line in &self.type_lines {
            layout.text(REGULAR, BODY_SIZE, line, BLACK);
            layout.next_line();
        }

        let status_color = match self.file.status {
            FileStatus::Success => GREEN,
            FileStatus::Error => RED,
            FileStatus::Unknown => BLACK,
        };
        layout.text(
            BOLD,
            BODY_SIZE,
            &format!("Status: {}", self.file.status.as_str().to_uppercase()),
            status_color,
        );
        layout.next_line();

        for line in &self.link_lines {
            layout.text(REGULAR, BODY_SIZE, line, BLUE);
            layout.next_line();
        }

        layout.text(BOLD, BODY_SIZE, "Summary:", BLACK);
        layout.next_line();
        for line in &self.summary_lines {
            layout.text(REGULAR, BODY_SIZE, line, BLACK);
            layout.next_line();
        }
    }
}

/// Approximate characters per line for Helvetica at `size`, using an average glyph width of
/// half the font size.
fn max_chars(size: i64) -> usize {
    (CONTENT_WIDTH * 2 / size).max(1) as usize
}

/// Greedy word wrap on whitespace; words longer than a line are split hard.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Encode for the standard fonts' WinAnsi encoding; characters outside Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match u32::from(ch) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn assemble(pages: Vec<Vec<Operation>>, timestamp: &str) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular,
            BOLD => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
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
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(REPORT_TITLE),
        "Producer" => Object::string_literal("drivedigest"),
        "Subject" => Object::string_literal(format!("Generated {timestamp}")),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
