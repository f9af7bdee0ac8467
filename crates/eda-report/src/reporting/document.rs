//! Paginated report document.
//!
//! A [`ReportDocument`] is an append-only list of typed [`Block`]s. Calling
//! [`ReportDocument::serialize`] consumes it and lays the blocks out onto PDF
//! pages: Helvetica text, grid tables with a grey header row, and raster images
//! scaled to the content width. Pages break automatically.

use crate::error::{EdaError, Result};
use crate::types::{DocumentBytes, ImageBytes, PageSize};
use crate::utils::truncate_str;
use encoding_rs::WINDOWS_1252;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::debug;

const MARGIN: i64 = 72;
const BODY_SIZE: i64 = 10;
const TABLE_SIZE: i64 = 9;
const TABLE_ROW_HEIGHT: i64 = 16;
const CELL_PADDING: i64 = 4;

/// Regular and bold font resource names.
const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// One unit of report content.
#[derive(Debug, Clone)]
pub enum Block {
    /// Level 1 is the document title; higher levels are section headings.
    Heading { text: String, level: u8 },
    Paragraph(String),
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Image(ImageBytes),
    /// Vertical gap in points.
    Spacer(u32),
}

/// An ordered, append-only sequence of blocks.
#[derive(Debug, Clone, Default)]
pub struct ReportDocument {
    page_size: PageSize,
    blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn heading(&mut self, text: impl Into<String>, level: u8) {
        self.push(Block::Heading {
            text: text.into(),
            level,
        });
    }

    pub fn paragraph(&mut self, text: impl Into<String>) {
        self.push(Block::Paragraph(text.into()));
    }

    pub fn table(&mut self, header: Vec<String>, rows: Vec<Vec<String>>) {
        self.push(Block::Table { header, rows });
    }

    pub fn image(&mut self, image: ImageBytes) {
        self.push(Block::Image(image));
    }

    pub fn spacer(&mut self, points: u32) {
        self.push(Block::Spacer(points));
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Lay out every block and write the PDF. The document is consumed.
    pub fn serialize(self) -> Result<DocumentBytes> {
        let block_count = self.blocks.len();
        let mut writer = PdfWriter::new(self.page_size);
        for block in self.blocks {
            writer.write_block(block)?;
        }
        let bytes = writer.finish()?;
        debug!(
            "Serialized report: {} blocks, {} bytes",
            block_count,
            bytes.len()
        );
        Ok(DocumentBytes::new(bytes))
    }
}

fn assembly_error(e: impl std::fmt::Display) -> EdaError {
    EdaError::AssemblyFailed(e.to_string())
}

/// Encode text for a WinAnsi font; characters outside the code page become '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buffer = [0u8; 4];
    for c in text.chars() {
        let (bytes, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buffer));
        if had_errors {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

/// Approximate Helvetica advance: about half the font size per character.
fn chars_fitting(width: i64, font_size: i64) -> usize {
    (width * 2 / font_size).max(1) as usize
}

/// Greedy word wrap to lines of at most `max_chars` characters.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }

        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Turns blocks into PDF pages.
struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    fonts: Dictionary,
    images: Dictionary,
    page_ids: Vec<ObjectId>,
    operations: Vec<Operation>,
    page_width: i64,
    page_height: i64,
    cursor: i64,
}

impl PdfWriter {
    fn new(page_size: PageSize) -> Self {
        let (page_width, page_height) = page_size.dimensions_pt();
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let resources_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        Self {
            doc,
            pages_id,
            resources_id,
            fonts: dictionary! {
                FONT_REGULAR => regular,
                FONT_BOLD => bold,
            },
            images: Dictionary::new(),
            page_ids: Vec::new(),
            operations: Vec::new(),
            page_width,
            page_height,
            cursor: page_height - MARGIN,
        }
    }

    fn content_width(&self) -> i64 {
        self.page_width - 2 * MARGIN
    }

    fn content_height(&self) -> i64 {
        self.page_height - 2 * MARGIN
    }

    fn write_block(&mut self, block: Block) -> Result<()> {
        match block {
            Block::Heading { text, level } => self.write_heading(&text, level),
            Block::Paragraph(text) => self.write_paragraph(&text),
            Block::Table { header, rows } => self.write_table(&header, &rows),
            Block::Image(image) => self.write_image(&image),
            Block::Spacer(points) => {
                self.cursor -= i64::from(points);
                Ok(())
            }
        }
    }

    /// Start a new page when fewer than `height` points remain.
    fn ensure_space(&mut self, height: i64) -> Result<()> {
        if self.cursor - height < MARGIN && self.cursor < self.page_height - MARGIN {
            self.flush_page()?;
        }
        Ok(())
    }

    fn flush_page(&mut self) -> Result<()> {
        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let encoded = content.encode().map_err(assembly_error)?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        self.cursor = self.page_height - MARGIN;
        Ok(())
    }

    fn text(&mut self, font: &str, size: i64, x: i64, y: i64, text: &str) {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)]),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn write_heading(&mut self, text: &str, level: u8) -> Result<()> {
        let size = if level <= 1 { 22 } else { 15 };
        let leading = size * 3 / 2;
        let lines = wrap_text(text, chars_fitting(self.content_width(), size));

        self.ensure_space(leading * lines.len() as i64 + leading)?;
        for line in lines {
            self.cursor -= leading;
            let x = if level <= 1 {
                let estimated = line.chars().count() as i64 * size / 2;
                MARGIN + ((self.content_width() - estimated) / 2).max(0)
            } else {
                MARGIN
            };
            self.text(FONT_BOLD, size, x, self.cursor, &line);
        }
        self.cursor -= size / 2;
        Ok(())
    }

    fn write_paragraph(&mut self, text: &str) -> Result<()> {
        let leading = BODY_SIZE * 7 / 5;
        for line in wrap_text(text, chars_fitting(self.content_width(), BODY_SIZE)) {
            self.ensure_space(leading)?;
            self.cursor -= leading;
            self.text(FONT_REGULAR, BODY_SIZE, MARGIN, self.cursor, &line);
        }
        self.cursor -= BODY_SIZE / 2;
        Ok(())
    }

    fn write_table(&mut self, header: &[String], rows: &[Vec<String>]) -> Result<()> {
        if header.is_empty() {
            return Ok(());
        }
        let columns = header.len() as i64;
        let column_width = self.content_width() / columns;
        let max_chars = chars_fitting(column_width - 2 * CELL_PADDING, TABLE_SIZE);

        self.ensure_space(TABLE_ROW_HEIGHT * 2)?;
        self.table_row(header, column_width, max_chars, true);
        for row in rows {
            if self.cursor - TABLE_ROW_HEIGHT < MARGIN {
                self.flush_page()?;
                self.table_row(header, column_width, max_chars, true);
            }
            self.table_row(row, column_width, max_chars, false);
        }
        self.cursor -= BODY_SIZE;
        Ok(())
    }

    fn table_row(&mut self, cells: &[String], column_width: i64, max_chars: usize, is_header: bool) {
        let top = self.cursor;
        let bottom = top - TABLE_ROW_HEIGHT;
        let width = column_width * cells.len() as i64;

        if is_header {
            self.operations.extend([
                Operation::new("q", vec![]),
                Operation::new("rg", vec![Object::Real(0.5), Object::Real(0.5), Object::Real(0.5)]),
                Operation::new(
                    "re",
                    vec![
                        Object::Integer(MARGIN),
                        Object::Integer(bottom),
                        Object::Integer(width),
                        Object::Integer(TABLE_ROW_HEIGHT),
                    ],
                ),
                Operation::new("f", vec![]),
                Operation::new("Q", vec![]),
            ]);
        }

        self.operations.push(Operation::new("w", vec![Object::Real(0.5)]));
        for i in 0..cells.len() as i64 {
            self.operations.extend([
                Operation::new(
                    "re",
                    vec![
                        Object::Integer(MARGIN + i * column_width),
                        Object::Integer(bottom),
                        Object::Integer(column_width),
                        Object::Integer(TABLE_ROW_HEIGHT),
                    ],
                ),
                Operation::new("S", vec![]),
            ]);
        }

        if is_header {
            self.operations.push(Operation::new(
                "rg",
                vec![Object::Real(0.96), Object::Real(0.96), Object::Real(0.96)],
            ));
        }
        let font = if is_header { FONT_BOLD } else { FONT_REGULAR };
        for (i, cell) in cells.iter().enumerate() {
            let x = MARGIN + i as i64 * column_width + CELL_PADDING;
            let y = bottom + (TABLE_ROW_HEIGHT - TABLE_SIZE) / 2 + 1;
            self.text(font, TABLE_SIZE, x, y, &truncate_str(cell, max_chars));
        }
        if is_header {
            self.operations.push(Operation::new("g", vec![Object::Integer(0)]));
        }
        self.cursor = bottom;
    }

    fn write_image(&mut self, image: &ImageBytes) -> Result<()> {
        let decoded = image::load_from_memory_with_format(image.as_bytes(), image::ImageFormat::Png)
            .map_err(assembly_error)?
            .to_rgb8();
        let (pixel_width, pixel_height) = decoded.dimensions();
        if pixel_width == 0 || pixel_height == 0 {
            return Err(EdaError::AssemblyFailed("chart image is empty".to_string()));
        }

        let name = format!("Im{}", self.images.len());
        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(pixel_width),
                "Height" => i64::from(pixel_height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            decoded.into_raw(),
        ));
        self.images.set(name.as_bytes().to_vec(), image_id);

        let mut width = self.content_width();
        let mut height = width * i64::from(pixel_height) / i64::from(pixel_width);
        let max_height = self.content_height();
        if height > max_height {
            height = max_height;
            width = height * i64::from(pixel_width) / i64::from(pixel_height);
        }

        self.ensure_space(height)?;
        self.cursor -= height;
        let x = MARGIN + (self.content_width() - width) / 2;
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(height),
                    Object::Integer(x),
                    Object::Integer(self.cursor),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        self.cursor -= BODY_SIZE;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        if !self.operations.is_empty() || self.page_ids.is_empty() {
            self.flush_page()?;
        }

        let resources = dictionary! {
            "Font" => self.fonts.clone(),
            "XObject" => self.images.clone(),
        };
        self.doc
            .objects
            .insert(self.resources_id, Object::Dictionary(resources));

        let kids: Vec<Object> = self.page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(self.page_width),
                Object::Integer(self.page_height),
            ],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).map_err(assembly_error)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> ImageBytes {
        let image = image::RgbImage::from_pixel(4, 2, image::Rgb([200, 10, 10]));
        let mut png = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        ImageBytes::new(png, 4, 2)
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_empty_document_is_valid_pdf() {
        let bytes = ReportDocument::new(PageSize::Letter).serialize().unwrap();
        assert!(bytes.as_bytes().starts_with(b"%PDF-"));
        assert_eq!(page_count(bytes.as_bytes()), 1);
    }

    #[test]
    fn test_blocks_are_kept_in_order() {
        let mut doc = ReportDocument::new(PageSize::A4);
        doc.heading("EDA Report", 1);
        doc.paragraph("Shape: (3, 2)");
        doc.spacer(12);
        assert_eq!(doc.len(), 3);
        assert!(matches!(doc.blocks()[1], Block::Paragraph(ref p) if p == "Shape: (3, 2)"));
    }

    #[test]
    fn test_long_table_breaks_pages() {
        let mut doc = ReportDocument::new(PageSize::Letter);
        let rows: Vec<Vec<String>> = (0..120)
            .map(|i| vec![format!("col_{i}"), i.to_string()])
            .collect();
        doc.table(vec!["Column".into(), "Missing Count".into()], rows);
        let bytes = doc.serialize().unwrap();
        assert!(page_count(bytes.as_bytes()) >= 3);
    }

    #[test]
    fn test_image_embedded() {
        let mut doc = ReportDocument::new(PageSize::Letter);
        doc.paragraph("Histogram of age");
        doc.image(tiny_png());
        let bytes = doc.serialize().unwrap();
        let parsed = lopdf::Document::load_mem(bytes.as_bytes()).unwrap();
        let has_image = parsed.objects.values().any(|object| match object {
            Object::Stream(stream) => stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false),
            _ => false,
        });
        assert!(has_image);
    }

    #[test]
    fn test_corrupt_image_fails_assembly() {
        let mut doc = ReportDocument::new(PageSize::Letter);
        doc.image(ImageBytes::new(b"not a png".to_vec(), 1, 1));
        let err = doc.serialize().unwrap_err();
        assert_eq!(err.error_code(), "ASSEMBLY_FAILED");
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(win_ansi("café €"), b"caf\xe9 \x80".to_vec());
        assert_eq!(win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }
}
