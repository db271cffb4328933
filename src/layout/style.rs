//! Font-size resolution.
//!
//! Every sized block resolves its effective font through the same precedence
//! chain, so a block-level override always wins over the document base:
//!
//! 1. block `font_size` present: `round(font_size × block font_scale)`,
//!    where a missing block scale counts as 1.0;
//! 2. block `font_scale` present (no explicit size): `round(base × scale)`;
//! 3. neither: the document base unchanged.
//!
//! The document base itself is `round(options.font_size × options.font_scale)`
//! and arrives here already computed.

/// Resolve a block's effective font size in pixels against the document base.
pub fn resolve_font_size(base_px: u32, font_size: Option<u32>, font_scale: Option<f32>) -> u32 {
    match (font_size, font_scale) {
        (Some(size), scale) => scale_px(size, scale.unwrap_or(1.0)),
        (None, Some(scale)) => scale_px(base_px, scale),
        (None, None) => base_px,
    }
}

fn scale_px(px: u32, scale: f32) -> u32 {
    if !scale.is_finite() || scale <= 0.0 {
        return px;
    }
    (px as f32 * scale).round().max(1.0) as u32
}
