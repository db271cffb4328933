//! HTML markup backend.
//!
//! Produces a self-contained HTML page sized to the paper roll, for the
//! OS print-dialog pipeline. Layout relies on a monospace font stack and
//! percentage table columns; barcodes are rasterized to PNG and embedded
//! as `data:` URLs so the page needs no external resources.

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::warn;

use crate::barcode;
use crate::document::{
    Align, BarcodeBlock, Block, DividerBlock, Document, ImageBlock, LineStyle, Row, SpacerBlock,
    TableBlock, TextBlock,
};
use crate::layout;
use crate::paper::PaperSize;

/// Render a document to a complete HTML page.
pub fn render(document: &Document, paper: PaperSize, base_px: u32) -> String {
    let mut body = String::new();
    for block in &document.blocks {
        match block {
            Block::Text(text) => render_text(&mut body, text, base_px),
            Block::Table(table) => render_table(&mut body, table, base_px),
            Block::Divider(divider) => render_divider(&mut body, divider),
            Block::Spacer(spacer) => render_spacer(&mut body, spacer),
            Block::Image(image) => render_image(&mut body, image),
            Block::Barcode(code) => render_barcode(&mut body, code, paper),
        }
    }
    page_shell(paper, base_px, &body)
}

fn page_shell(paper: PaperSize, base_px: u32, body: &str) -> String {
    let width_mm = paper.width_mm();
    let printable_mm = paper.printable_mm();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
@page {{
  size: {width_mm}mm auto;
  margin: 0;
}}
* {{
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}}
body {{
  width: {width_mm}mm;
  font-family: 'Courier New', Courier, monospace;
  font-size: {base_px}px;
  line-height: 1.4;
  padding-top: 3mm;
  padding-bottom: 3mm;
}}
.content-wrapper {{
  max-width: {printable_mm}mm;
  width: 100%;
}}
.text-left {{ text-align: left; }}
.text-center {{ text-align: center; }}
.text-right {{ text-align: right; }}
.bold {{ font-weight: bold; }}
.divider {{
  border: none;
  margin: 6px 0;
}}
.divider-solid {{ border-top: 1px solid #000; }}
.divider-dashed {{ border-top: 1px dashed #000; }}
.divider-dotted {{ border-top: 1px dotted #000; }}
table {{
  width: 100%;
  border-collapse: collapse;
  table-layout: fixed;
}}
table td {{
  padding: 2px 2px;
  vertical-align: top;
  word-wrap: break-word;
}}
img {{
  max-width: 100%;
  height: auto;
}}
</style>
</head>
<body>
<div class="content-wrapper">
{body}</div>
</body>
</html>
"#
    )
}

fn align_class(align: Align) -> &'static str {
    match align {
        Align::Left => "text-left",
        Align::Center => "text-center",
        Align::Right => "text-right",
    }
}

fn line_class(style: LineStyle) -> &'static str {
    match style {
        LineStyle::Solid => "divider-solid",
        LineStyle::Dashed => "divider-dashed",
        LineStyle::Dotted => "divider-dotted",
    }
}

/// Escape HTML special characters, then turn newlines into explicit breaks.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    out
}

fn render_text(out: &mut String, block: &TextBlock, base_px: u32) {
    let style = block.style.clone().unwrap_or_default();
    let font_px = layout::resolve_font_size(base_px, style.font_size, style.font_scale);
    let bold = if style.bold { " bold" } else { "" };
    let _ = writeln!(
        out,
        r#"<div class="{}{}" style="font-size: {}px; margin-top: {}px; margin-bottom: {}px;">{}</div>"#,
        align_class(style.align.unwrap_or(Align::Left)),
        bold,
        font_px,
        style.margin_top.unwrap_or(0),
        style.margin_bottom.unwrap_or(0),
        escape(&block.value),
    );
}

fn render_table(out: &mut String, block: &TableBlock, base_px: u32) {
    let style = block.style.clone().unwrap_or_default();
    let font_px = layout::resolve_font_size(base_px, style.font_size, style.font_scale);
    let columns = block.column_count();
    let widths = layout::widths(columns);

    let col_align = |index: usize, fallback: Align| -> Align {
        style
            .column_aligns
            .as_ref()
            .and_then(|aligns| aligns.get(index).copied())
            .unwrap_or(fallback)
    };

    let _ = writeln!(
        out,
        r#"<table style="font-size: {}px; margin-top: {}px; margin-bottom: {}px;">"#,
        font_px,
        style.margin_top.unwrap_or(0),
        style.margin_bottom.unwrap_or(0),
    );

    if let Some(headers) = block.headers.as_ref().filter(|h| !h.is_empty()) {
        let header_class = if style.header_bold { "bold" } else { "" };
        let header_align = style.header_align.unwrap_or(Align::Left);
        let _ = writeln!(out, r#"<thead><tr class="{}">"#, header_class);
        for (index, header) in headers.iter().enumerate() {
            let _ = writeln!(
                out,
                r#"<td class="{}" style="width: {}%; white-space: nowrap;">{}</td>"#,
                align_class(col_align(index, header_align)),
                widths.get(index).copied().unwrap_or(0),
                escape(header),
            );
        }
        let _ = writeln!(out, "</tr></thead>");
    }

    let _ = writeln!(out, "<tbody>");
    for row in &block.rows {
        let _ = writeln!(out, "<tr>");
        match row {
            Row::FullWidth(value) => {
                let bold = if style.full_width_row_bold { " bold" } else { "" };
                let _ = writeln!(
                    out,
                    r#"<td colspan="{}" class="{}{}">{}</td>"#,
                    columns.max(1),
                    align_class(style.full_width_row_align.unwrap_or(Align::Left)),
                    bold,
                    escape(value),
                );
            }
            Row::Cells(cells) => {
                for (index, cell) in cells.iter().enumerate() {
                    let bold = style
                        .column_bolds
                        .as_ref()
                        .and_then(|bolds| bolds.get(index).copied())
                        .unwrap_or(false);
                    let _ = writeln!(
                        out,
                        r#"<td class="{}{}" style="width: {}%">{}</td>"#,
                        align_class(col_align(index, Align::Left)),
                        if bold { " bold" } else { "" },
                        widths.get(index).copied().unwrap_or(0),
                        escape(cell),
                    );
                }
            }
        }
        let _ = writeln!(out, "</tr>");
    }
    let _ = writeln!(out, "</tbody>");
    let _ = writeln!(out, "</table>");
}

fn render_divider(out: &mut String, block: &DividerBlock) {
    let style = block.style.clone().unwrap_or_default();
    let _ = writeln!(
        out,
        r#"<div class="divider {}" style="margin-top: {}px; margin-bottom: {}px;"></div>"#,
        line_class(style.line_style.unwrap_or_default()),
        style.margin_top.unwrap_or(5),
        style.margin_bottom.unwrap_or(0),
    );
}

fn render_spacer(out: &mut String, block: &SpacerBlock) {
    let _ = writeln!(
        out,
        r#"<div style="height: {}px;"></div>"#,
        block.height.unwrap_or(10)
    );
}

fn render_image(out: &mut String, block: &ImageBlock) {
    let style = block.style.clone().unwrap_or_default();
    let mut img_style = format!(
        "margin-top: {}px; margin-bottom: {}px;",
        style.margin_top.unwrap_or(0),
        style.margin_bottom.unwrap_or(0)
    );
    if let Some(width) = style.width {
        let _ = write!(img_style, " width: {}px;", width);
    }
    if let Some(height) = style.height {
        let _ = write!(img_style, " height: {}px;", height);
    }
    let _ = writeln!(
        out,
        r#"<div class="{}"><img src="{}" style="{}" /></div>"#,
        align_class(style.align.unwrap_or(Align::Center)),
        escape(&block.url),
        img_style,
    );
}

fn render_barcode(out: &mut String, block: &BarcodeBlock, paper: PaperSize) {
    let style = block.style.clone().unwrap_or_default();
    let align = style.align.unwrap_or(Align::Center);
    let margin_top = style.margin_top.unwrap_or(0);
    let margin_bottom = style.margin_bottom.unwrap_or(0);
    let symbology = block.barcode_type.unwrap_or_default();

    // Default width is half the printable width, at the 96 DPI reference.
    let default_width = (paper.printable_px() as f32 * 0.5).round() as u32;
    let width = style.width.unwrap_or(default_width);
    let height = style.height.unwrap_or(50);

    let data_url = barcode::encode(symbology, &block.value)
        .map_err(|e| {
            warn!(symbology = symbology.name(), error = %e, "barcode fallback to text");
            e
        })
        .ok()
        .and_then(|modules| png_data_url(&barcode::rasterize(&modules, width, height)));

    let Some(data_url) = data_url else {
        let _ = writeln!(
            out,
            r#"<div class="{}" style="margin-top: {}px; margin-bottom: {}px;">{}</div>"#,
            align_class(align),
            margin_top,
            margin_bottom,
            escape(&block.value),
        );
        return;
    };

    let _ = writeln!(out, r#"<div class="{}">"#, align_class(align));
    let _ = writeln!(
        out,
        r#"<img src="{}" style="margin-top: {}px; max-width: 100%; width: {}px;" />"#,
        data_url, margin_top, width,
    );
    if style.display_value {
        let _ = writeln!(
            out,
            r#"<div style="font-size: {}px; margin-top: 2px; margin-bottom: {}px;">{}</div>"#,
            style.font_size.unwrap_or(12),
            margin_bottom,
            escape(&block.value),
        );
    } else {
        let _ = writeln!(out, r#"<div style="margin-bottom: {}px;"></div>"#, margin_bottom);
    }
    let _ = writeln!(out, "</div>");
}

fn png_data_url(img: &image::GrayImage) -> Option<String> {
    let mut png = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut png);
    image::DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut cursor, image::ImageFormat::Png)
        .ok()?;
    Some(format!("data:image/png;base64,{}", BASE64.encode(&png)))
}
