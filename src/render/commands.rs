//! ESC/POS command-stream backend.
//!
//! Renders a document to raw printer commands for a direct device write.
//! Layout is monospace: the paper width fixes a character budget per line
//! and tables are planned in character cells. Images and barcodes go out
//! as GS v 0 raster transfers at the mechanism's 203 DPI.
//!
//! Every stream starts with ESC @ (initialize) and ends with a paper feed
//! and partial cut, so a printer left mid-job by a failed write is reset
//! by the next one.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::GrayImage;
use image::imageops::FilterType;
use tracing::warn;

use crate::barcode;
use crate::document::{
    Align, BarcodeBlock, Block, DividerBlock, Document, ImageBlock, LineStyle, Row, SpacerBlock,
    TableBlock, TextBlock,
};
use crate::layout;
use crate::paper::PaperSize;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// Thermal mechanism resolution, dots per mm (203 DPI).
const DOTS_PER_MM: u32 = 8;

/// Append-only ESC/POS command buffer.
pub struct CommandBuf {
    bytes: Vec<u8>,
}

impl CommandBuf {
    /// Start a fresh stream with ESC @ (initialize printer).
    pub fn new() -> Self {
        Self {
            bytes: vec![ESC, b'@'],
        }
    }

    pub fn align(&mut self, align: Align) -> &mut Self {
        let n = match align {
            Align::Left => 0,
            Align::Center => 1,
            Align::Right => 2,
        };
        self.bytes.extend_from_slice(&[ESC, b'a', n]);
        self
    }

    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.bytes.extend_from_slice(&[ESC, b'E', on as u8]);
        self
    }

    /// GS ! character size: width and height multipliers, 1..=8.
    pub fn size(&mut self, multiplier: u8) -> &mut Self {
        let m = multiplier.clamp(1, 8) - 1;
        self.bytes.extend_from_slice(&[GS, b'!', (m << 4) | m]);
        self
    }

    /// Write a line of text followed by a line feed.
    ///
    /// Control characters are replaced with spaces; user text must never be
    /// able to smuggle commands (a stray GS V would cut the paper) into the
    /// stream.
    pub fn line(&mut self, text: &str) -> &mut Self {
        let mut buf = [0u8; 4];
        for c in text.chars() {
            if c.is_control() {
                self.bytes.push(b' ');
            } else {
                self.bytes
                    .extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
        self.bytes.push(b'\n');
        self
    }

    /// ESC J: feed by a dot count, chunked at the single-byte limit.
    pub fn feed_dots(&mut self, mut dots: u32) -> &mut Self {
        while dots > 0 {
            let step = dots.min(255) as u8;
            self.bytes.extend_from_slice(&[ESC, b'J', step]);
            dots -= step as u32;
        }
        self
    }

    /// ESC d: feed whole lines.
    pub fn feed_lines(&mut self, lines: u8) -> &mut Self {
        self.bytes.extend_from_slice(&[ESC, b'd', lines]);
        self
    }

    /// GS V: partial cut after a short feed.
    pub fn cut(&mut self) -> &mut Self {
        self.bytes.extend_from_slice(&[GS, b'V', 66, 3]);
        self
    }

    /// GS v 0: raster bit image. Pixels darker than mid-gray print black.
    pub fn raster(&mut self, img: &GrayImage) -> &mut Self {
        let width_bytes = img.width().div_ceil(8);
        let height = img.height();
        self.bytes.extend_from_slice(&[
            GS,
            b'v',
            b'0',
            0,
            (width_bytes & 0xFF) as u8,
            (width_bytes >> 8) as u8,
            (height & 0xFF) as u8,
            (height >> 8) as u8,
        ]);
        for y in 0..height {
            for byte_x in 0..width_bytes {
                let mut packed = 0u8;
                for bit in 0..8 {
                    let x = byte_x * 8 + bit;
                    if x < img.width() && img.get_pixel(x, y).0[0] < 128 {
                        packed |= 0x80 >> bit;
                    }
                }
                self.bytes.push(packed);
            }
        }
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for CommandBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a layout pixel count (96 DPI reference) to mechanism dots.
fn px_to_dots(px: u32) -> u32 {
    (px as f32 * 203.0 / 96.0).round() as u32
}

/// Render a document to an ESC/POS command stream.
pub fn render(document: &Document, paper: PaperSize, base_px: u32) -> Vec<u8> {
    let mut buf = CommandBuf::new();
    for block in &document.blocks {
        match block {
            Block::Text(text) => render_text(&mut buf, text, paper, base_px),
            Block::Table(table) => render_table(&mut buf, table, paper),
            Block::Divider(divider) => render_divider(&mut buf, divider, paper),
            Block::Spacer(spacer) => render_spacer(&mut buf, spacer),
            Block::Image(image) => render_image(&mut buf, image, paper),
            Block::Barcode(code) => render_barcode(&mut buf, code, paper),
        }
    }
    buf.feed_lines(4).cut();
    buf.into_bytes()
}

/// Wrap text to a character budget on whitespace, breaking words that are
/// longer than a whole line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let mut word = word;
            loop {
                let sep = if current.is_empty() { 0 } else { 1 };
                if current.chars().count() + sep + word.chars().count() <= width {
                    if sep == 1 {
                        current.push(' ');
                    }
                    current.push_str(word);
                    break;
                }
                if current.is_empty() {
                    // Word longer than the line: hard break.
                    let split: usize = word.char_indices().nth(width).map(|(i, _)| i).unwrap_or(word.len());
                    current.push_str(&word[..split]);
                    lines.push(std::mem::take(&mut current));
                    word = &word[split..];
                    if word.is_empty() {
                        break;
                    }
                } else {
                    lines.push(std::mem::take(&mut current));
                }
            }
        }
        lines.push(current);
    }
    lines
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }
    let space = width - len;
    match align {
        Align::Left => format!("{}{}", text, " ".repeat(space)),
        Align::Right => format!("{}{}", " ".repeat(space), text),
        Align::Center => {
            let left = space / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(space - left))
        }
    }
}

fn render_text(buf: &mut CommandBuf, block: &TextBlock, paper: PaperSize, base_px: u32) {
    let style = block.style.clone().unwrap_or_default();
    let font_px = layout::resolve_font_size(base_px, style.font_size, style.font_scale);
    // Character size multiplier approximates the px ratio against the base.
    let multiplier = ((font_px as f32 / base_px.max(1) as f32).round() as u8).clamp(1, 8);
    let width = paper.chars_per_line() / multiplier as usize;

    buf.feed_dots(px_to_dots(style.margin_top.unwrap_or(0)));
    buf.align(style.align.unwrap_or(Align::Left))
        .bold(style.bold)
        .size(multiplier);
    for line in wrap(&block.value, width) {
        buf.line(&line);
    }
    buf.size(1).bold(false).align(Align::Left);
    buf.feed_dots(px_to_dots(style.margin_bottom.unwrap_or(0)));
}

fn render_table(buf: &mut CommandBuf, block: &TableBlock, paper: PaperSize) {
    let style = block.style.clone().unwrap_or_default();
    let columns = block.column_count();
    let cells = layout::columns::char_widths(columns, paper.chars_per_line());

    let col_align = |index: usize, fallback: Align| -> Align {
        style
            .column_aligns
            .as_ref()
            .and_then(|aligns| aligns.get(index).copied())
            .unwrap_or(fallback)
    };

    buf.feed_dots(px_to_dots(style.margin_top.unwrap_or(0)));
    buf.align(Align::Left);

    if let Some(headers) = block.headers.as_ref().filter(|h| !h.is_empty()) {
        let header_align = style.header_align.unwrap_or(Align::Left);
        buf.bold(style.header_bold);
        let row: String = headers
            .iter()
            .enumerate()
            .map(|(i, h)| pad(h, cells.get(i).copied().unwrap_or(0), col_align(i, header_align)))
            .collect();
        buf.line(&row);
        buf.bold(false);
    }

    for row in &block.rows {
        match row {
            Row::FullWidth(value) => {
                let align = style.full_width_row_align.unwrap_or(Align::Left);
                buf.bold(style.full_width_row_bold);
                for line in wrap(value, paper.chars_per_line()) {
                    buf.line(&pad(&line, paper.chars_per_line(), align));
                }
                buf.bold(false);
            }
            Row::Cells(row_cells) => {
                let line: String = row_cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        pad(cell, cells.get(i).copied().unwrap_or(0), col_align(i, Align::Left))
                    })
                    .collect();
                buf.line(&line);
            }
        }
    }
    buf.feed_dots(px_to_dots(style.margin_bottom.unwrap_or(0)));
}

fn render_divider(buf: &mut CommandBuf, block: &DividerBlock, paper: PaperSize) {
    let style = block.style.clone().unwrap_or_default();
    let fill = match style.line_style.unwrap_or_default() {
        LineStyle::Solid => '_',
        LineStyle::Dashed => '-',
        LineStyle::Dotted => '.',
    };
    buf.feed_dots(px_to_dots(style.margin_top.unwrap_or(5)));
    buf.align(Align::Left);
    buf.line(&fill.to_string().repeat(paper.chars_per_line()));
    buf.feed_dots(px_to_dots(style.margin_bottom.unwrap_or(0)));
}

fn render_spacer(buf: &mut CommandBuf, block: &SpacerBlock) {
    buf.feed_dots(px_to_dots(block.height.unwrap_or(10)));
}

fn render_image(buf: &mut CommandBuf, block: &ImageBlock, paper: PaperSize) {
    let style = block.style.clone().unwrap_or_default();
    let Some(img) = load_image(&block.url) else {
        warn!(url = %block.url, "image unavailable, skipping block");
        return;
    };
    let mut img = img.into_luma8();

    let max_dots = paper.printable_mm() * DOTS_PER_MM;
    let target_width = style.width.map(px_to_dots).unwrap_or(img.width()).min(max_dots);
    let target_height = match style.height {
        Some(h) => px_to_dots(h),
        None => {
            // Preserve aspect ratio.
            (img.height() as u64 * target_width as u64 / img.width().max(1) as u64) as u32
        }
    };
    if target_width != img.width() || target_height != img.height() {
        img = image::imageops::resize(&img, target_width.max(1), target_height.max(1), FilterType::Triangle);
    }

    buf.feed_dots(px_to_dots(style.margin_top.unwrap_or(0)));
    buf.align(style.align.unwrap_or(Align::Center));
    buf.raster(&img);
    buf.align(Align::Left);
    buf.feed_dots(px_to_dots(style.margin_bottom.unwrap_or(0)));
}

fn render_barcode(buf: &mut CommandBuf, block: &BarcodeBlock, paper: PaperSize) {
    let style = block.style.clone().unwrap_or_default();
    let align = style.align.unwrap_or(Align::Center);
    let symbology = block.barcode_type.unwrap_or_default();

    buf.feed_dots(px_to_dots(style.margin_top.unwrap_or(0)));
    match barcode::encode(symbology, &block.value) {
        Ok(modules) => {
            let max_dots = paper.printable_mm() * DOTS_PER_MM;
            let width = style.width.map(px_to_dots).unwrap_or(max_dots / 2).min(max_dots);
            let height = px_to_dots(style.height.unwrap_or(50));
            buf.align(align);
            buf.raster(&barcode::rasterize(&modules, width, height));
            if style.display_value {
                buf.size(1).line(&block.value);
            }
            buf.align(Align::Left);
        }
        Err(e) => {
            warn!(symbology = symbology.name(), error = %e, "barcode fallback to text");
            buf.align(align);
            for line in wrap(&block.value, paper.chars_per_line()) {
                buf.line(&line);
            }
            buf.align(Align::Left);
        }
    }
    buf.feed_dots(px_to_dots(style.margin_bottom.unwrap_or(0)));
}

/// Fetch and decode an image from a `data:` URL or over HTTP.
///
/// This is the one place the renderer touches the network, which is why the
/// dispatcher runs the commands backend on a blocking thread.
fn load_image(url: &str) -> Option<image::DynamicImage> {
    if let Some(rest) = url.strip_prefix("data:") {
        let (_, payload) = rest.split_once(";base64,")?;
        let bytes = BASE64.decode(payload.trim()).ok()?;
        return image::load_from_memory(&bytes).ok();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        let response = reqwest::blocking::get(url).ok()?;
        let bytes = response.bytes().ok()?;
        return image::load_from_memory(&bytes).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BarcodeStyle, TextStyle};

    fn doc(blocks: Vec<Block>) -> Document {
        Document { blocks }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_stream_brackets() {
        let bytes = render(&doc(vec![]), PaperSize::Mm80, 12);
        assert_eq!(&bytes[..2], &[ESC, b'@']);
        let tail = &bytes[bytes.len() - 4..];
        assert_eq!(tail, &[GS, b'V', 66, 3]);
    }

    #[test]
    fn test_text_alignment_and_bold() {
        let bytes = render(
            &doc(vec![Block::Text(TextBlock::styled(
                "hi",
                TextStyle {
                    align: Some(Align::Center),
                    bold: true,
                    ..TextStyle::default()
                },
            ))]),
            PaperSize::Mm80,
            12,
        );
        assert!(contains(&bytes, &[ESC, b'a', 1]));
        assert!(contains(&bytes, &[ESC, b'E', 1]));
        assert!(contains(&bytes, b"hi\n"));
        // style reset after the block
        assert!(contains(&bytes, &[ESC, b'E', 0]));
    }

    #[test]
    fn test_control_bytes_in_text_neutralized() {
        let bytes = render(
            &doc(vec![Block::Text(TextBlock::new("pay\u{1d}VA\u{3}me"))]),
            PaperSize::Mm80,
            12,
        );
        // GS V embedded in the value must not survive as a cut command
        assert!(!contains(&bytes, &[GS, b'V', b'A']));
        assert!(contains(&bytes, b"pay VA me\n"));
    }

    #[test]
    fn test_control_bytes_in_table_cells_neutralized() {
        let table = TableBlock {
            headers: None,
            rows: vec![Row::Cells(vec!["a\u{1b}@b".into(), "c".into()])],
            style: None,
        };
        let bytes = render(&doc(vec![Block::Table(table)]), PaperSize::Mm80, 12);
        // the only ESC @ is the stream's own init preamble
        assert!(!contains(&bytes[2..], &[ESC, b'@']));
        assert!(contains(&bytes, b"a @b"));
    }

    #[test]
    fn test_control_bytes_in_barcode_value_neutralized() {
        let bytes = render(
            &doc(vec![Block::Barcode(BarcodeBlock {
                value: "12\u{1b}@34".into(),
                barcode_type: None,
                style: None,
            })]),
            PaperSize::Mm80,
            12,
        );
        assert!(!contains(&bytes[2..], &[ESC, b'@']));
    }

    #[test]
    fn test_text_size_multiplier() {
        let bytes = render(
            &doc(vec![Block::Text(TextBlock::styled(
                "big",
                TextStyle {
                    font_scale: Some(2.0),
                    ..TextStyle::default()
                },
            ))]),
            PaperSize::Mm80,
            12,
        );
        // 2x maps to GS ! 0x11
        assert!(contains(&bytes, &[GS, b'!', 0x11]));
        assert!(contains(&bytes, &[GS, b'!', 0x00]));
    }

    #[test]
    fn test_divider_fills_line() {
        let bytes = render(
            &doc(vec![Block::Divider(DividerBlock::default())]),
            PaperSize::Mm58,
            12,
        );
        let dashes: Vec<u8> = std::iter::repeat_n(b'-', 32).collect();
        assert!(contains(&bytes, &dashes));
    }

    #[test]
    fn test_spacer_feeds_dots() {
        let bytes = render(
            &doc(vec![Block::Spacer(SpacerBlock { height: Some(48) })]),
            PaperSize::Mm80,
            12,
        );
        // 48 px at 96 DPI is 102 dots at 203 DPI
        assert!(contains(&bytes, &[ESC, b'J', 102]));
    }

    #[test]
    fn test_table_columns_padded() {
        let table = TableBlock {
            headers: None,
            rows: vec![Row::Cells(vec!["Subtotal:".into(), "$9.25".into()])],
            style: Some(crate::document::TableStyle {
                column_aligns: Some(vec![Align::Left, Align::Right]),
                ..Default::default()
            }),
        };
        let bytes = render(&doc(vec![Block::Table(table)]), PaperSize::Mm58, 12);
        // 2 cols on 32 chars: 16 + 16, value right-aligned in its cell
        let expected = format!("{}{}\n", pad("Subtotal:", 16, Align::Left), pad("$9.25", 16, Align::Right));
        assert!(contains(&bytes, expected.as_bytes()));
    }

    #[test]
    fn test_barcode_raster_present() {
        let bytes = render(
            &doc(vec![Block::Barcode(BarcodeBlock {
                value: "ABC-123".into(),
                barcode_type: None,
                style: None,
            })]),
            PaperSize::Mm80,
            12,
        );
        assert!(contains(&bytes, &[GS, b'v', b'0', 0]));
        // displayValue on by default: literal value follows the raster
        assert!(contains(&bytes, b"ABC-123\n"));
    }

    #[test]
    fn test_barcode_fallback_to_text() {
        let bytes = render(
            &doc(vec![Block::Barcode(BarcodeBlock {
                value: "1234".into(),
                barcode_type: Some(crate::barcode::Symbology::Msi),
                style: Some(BarcodeStyle {
                    display_value: false,
                    ..BarcodeStyle::default()
                }),
            })]),
            PaperSize::Mm80,
            12,
        );
        assert!(!contains(&bytes, &[GS, b'v', b'0', 0]));
        assert!(contains(&bytes, b"1234\n"));
    }

    #[test]
    fn test_data_url_image_rasterized() {
        // 1x1 black PNG
        let mut png = Vec::new();
        let img = image::GrayImage::from_pixel(1, 1, image::Luma([0u8]));
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let url = format!("data:image/png;base64,{}", BASE64.encode(&png));
        let bytes = render(
            &doc(vec![Block::Image(ImageBlock { url, style: None })]),
            PaperSize::Mm80,
            12,
        );
        assert!(contains(&bytes, &[GS, b'v', b'0', 0]));
    }

    #[test]
    fn test_unusable_image_skipped() {
        let bytes = render(
            &doc(vec![Block::Image(ImageBlock {
                url: "file:///tmp/nope.png".into(),
                style: None,
            })]),
            PaperSize::Mm80,
            12,
        );
        assert!(!contains(&bytes, &[GS, b'v', b'0', 0]));
    }

    #[test]
    fn test_wrap_breaks_on_whitespace() {
        assert_eq!(wrap("one two three", 8), vec!["one two", "three"]);
        assert_eq!(wrap("a\nb", 8), vec!["a", "b"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_pad_truncates() {
        assert_eq!(pad("toolongvalue", 4, Align::Left), "tool");
        assert_eq!(pad("ab", 4, Align::Right), "  ab");
        assert_eq!(pad("ab", 5, Align::Center), " ab  ");
    }

    #[test]
    fn test_raster_bit_packing() {
        let mut img = GrayImage::from_pixel(10, 1, image::Luma([255u8]));
        img.put_pixel(0, 0, image::Luma([0u8]));
        img.put_pixel(9, 0, image::Luma([0u8]));
        let mut buf = CommandBuf::new();
        buf.raster(&img);
        let bytes = buf.into_bytes();
        // header: 2 bytes wide, 1 tall
        assert!(contains(&bytes, &[GS, b'v', b'0', 0, 2, 0, 1, 0, 0b1000_0000, 0b0100_0000]));
    }
}
