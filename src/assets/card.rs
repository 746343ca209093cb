//! Placeholder card rendering
//!
//! Cards are drawn with `kurbo` shapes rasterized by `vello_cpu`; label and caption text
//! is shaped with `parley`. Layout, relative to the card edge `s`:
//! - light tile with a dark rounded border inset by `0.03 s`
//! - a colored panel holding the label in large type with a soft shadow
//! - a highlight pill with the caption (only for labels that have one)

use kurbo::Shape;
use vello_cpu::kurbo::{Affine, BezPath, Point, Rect};
use vello_cpu::peniko::Color;
use vello_cpu::{Pixmap, RenderContext};

use image::RgbaImage;

use crate::assets::templates::{caption_for, color_swatch};
use crate::error::{TimelineError, TimelineResult};

/// Panel colors for labels that are not color names
const PALETTE: [[u8; 3]; 8] = [
    [0x0F, 0x3C, 0xAA],
    [0xFF, 0x95, 0x00],
    [0x34, 0xC7, 0x59],
    [0xAF, 0x52, 0xDE],
    [0xFF, 0x2D, 0x55],
    [0x00, 0x7A, 0xFF],
    [0xFF, 0xCC, 0x00],
    [0xA2, 0x84, 0x5E],
];

pub(crate) const TILE: [u8; 4] = [245, 245, 245, 255];
pub(crate) const INK: [u8; 4] = [20, 20, 20, 255];
pub(crate) const PILL: [u8; 4] = [255, 230, 120, 255];
const SHADOW: [u8; 4] = [0, 0, 0, 80];
const LIGHT_TEXT: [u8; 4] = [255, 255, 255, 255];

/// Largest supported card edge (vello_cpu surfaces are u16-sized)
pub(crate) const MAX_CARD_SIZE: u32 = 4096;

/// Text color handed to parley and read back per glyph run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl From<[u8; 4]> for TextBrush {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Shapes text in a single registered font
struct TextPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl TextPainter {
    fn new(font_bytes: &[u8]) -> TimelineResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| TimelineError::asset("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TimelineError::asset("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
                0,
            ),
        })
    }

    fn layout(&mut self, text: &str, size_px: f32, brush: TextBrush) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Lay `text` out no wider than `max_width`, starting from `size_px`
    fn fitted_layout(
        &mut self,
        text: &str,
        size_px: f32,
        max_width: f64,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let layout = self.layout(text, size_px, brush);
        let (w, _) = measure(&layout);
        if w <= max_width {
            return layout;
        }
        let shrunk = (size_px as f64 * max_width / w) as f32;
        self.layout(text, shrunk.max(1.0), brush)
    }

    fn fill(&self, ctx: &mut RenderContext, layout: &parley::Layout<TextBrush>, origin: (f64, f64)) {
        ctx.set_transform(Affine::translate(origin));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(Color::from_rgba8(brush.r, brush.g, brush.b, brush.a));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(Affine::IDENTITY);
    }
}

/// Width and height of a laid out text block
fn measure(layout: &parley::Layout<TextBrush>) -> (f64, f64) {
    let mut w = 0.0f64;
    let mut h = 0.0f64;
    for line in layout.lines() {
        let m = line.metrics();
        w = w.max(f64::from(m.advance));
        h += f64::from(m.ascent + m.descent + m.leading);
    }
    (w.max(1.0), h.max(1.0))
}

/// Panel color: the label's swatch when it names a color, else a stable palette pick
pub(crate) fn card_color(label: &str) -> [u8; 4] {
    let [r, g, b] = color_swatch(label).unwrap_or_else(|| {
        PALETTE[(xxhash_rust::xxh3::xxh3_64(label.as_bytes()) % PALETTE.len() as u64) as usize]
    });
    [r, g, b, 255]
}

/// Ink for text drawn on `background`
fn text_color(background: [u8; 4]) -> [u8; 4] {
    let [r, g, b, _] = background;
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 160.0 {
        INK
    } else {
        LIGHT_TEXT
    }
}

fn to_cpu_path(elements: impl Iterator<Item = kurbo::PathEl>) -> BezPath {
    let pt = |p: kurbo::Point| Point::new(p.x, p.y);
    let mut out = BezPath::new();
    for el in elements {
        match el {
            kurbo::PathEl::MoveTo(p) => out.move_to(pt(p)),
            kurbo::PathEl::LineTo(p) => out.line_to(pt(p)),
            kurbo::PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            kurbo::PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            kurbo::PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn fill_rounded_rect(ctx: &mut RenderContext, rect: [f64; 4], radius: f64, color: [u8; 4]) {
    let [x0, y0, x1, y1] = rect;
    let radius = radius.max(0.0).min((x1 - x0) / 2.0).min((y1 - y0) / 2.0);
    let shape = kurbo::RoundedRect::new(x0, y0, x1, y1, radius);
    let [r, g, b, a] = color;
    ctx.set_paint(Color::from_rgba8(r, g, b, a));
    ctx.fill_path(&to_cpu_path(shape.path_elements(0.1)));
}

/// Rounded rect of `fill` with an `outline` ring of width `line`
fn framed_rounded_rect(
    ctx: &mut RenderContext,
    rect: [f64; 4],
    radius: f64,
    line: f64,
    outline: [u8; 4],
    fill: [u8; 4],
) {
    fill_rounded_rect(ctx, rect, radius, outline);
    let [x0, y0, x1, y1] = rect;
    fill_rounded_rect(
        ctx,
        [x0 + line, y0 + line, x1 - line, y1 - line],
        radius - line,
        fill,
    );
}

/// Draw the card for `label`
///
/// Without `font` the card carries no text: panel and border only.
///
/// # Errors
///
/// Returns `TimelineError::AssetError` if the font cannot be loaded or the card size is
/// out of range
pub(crate) fn render_card(
    label: &str,
    size: u32,
    font: Option<&[u8]>,
) -> TimelineResult<RgbaImage> {
    if size == 0 || size > MAX_CARD_SIZE {
        return Err(TimelineError::asset(format!(
            "card size must be in 1..={MAX_CARD_SIZE}, got {size}"
        )));
    }
    let side = size as u16;
    let s = size as f64;

    let mut ctx = RenderContext::new(side, side);
    ctx.set_transform(Affine::IDENTITY);

    let [r, g, b, a] = TILE;
    ctx.set_paint(Color::from_rgba8(r, g, b, a));
    ctx.fill_rect(&Rect::new(0.0, 0.0, s, s));

    let line = (s * 0.01).max(2.0);
    let radius = s * 0.06;

    let inset = s * 0.03;
    let frame = [inset, inset, s - inset, s - inset];
    framed_rounded_rect(&mut ctx, frame, radius, line, INK, TILE);

    let panel_color = card_color(label);
    let panel = [s * 0.2, s * 0.16, s * 0.8, s * 0.68];
    framed_rounded_rect(&mut ctx, panel, radius, line * 0.6, INK, panel_color);

    if let Some(font) = font {
        let mut painter = TextPainter::new(font)?;

        let text = label.trim();
        if !text.is_empty() {
            let max_w = (panel[2] - panel[0]) * 0.85;
            let size_px = ((panel[3] - panel[1]) * 0.8) as f32;
            let main = painter.fitted_layout(text, size_px, max_w, text_color(panel_color).into());
            let (w, h) = measure(&main);
            let origin = (
                (panel[0] + panel[2] - w) / 2.0,
                (panel[1] + panel[3] - h) / 2.0,
            );
            let shadow = painter.fitted_layout(text, size_px, max_w, SHADOW.into());
            let offset = s * 0.01;
            painter.fill(&mut ctx, &shadow, (origin.0 + offset, origin.1 + offset));
            painter.fill(&mut ctx, &main, origin);
        }

        if let Some(caption) = caption_for(label) {
            let layout = painter.fitted_layout(caption, (s * 0.088) as f32, s * 0.8, INK.into());
            let (tw, th) = measure(&layout);
            let (pad_x, pad_y) = (s * 0.04, s * 0.02);
            let top = s * 0.74;
            let pill = [
                (s - tw) / 2.0 - pad_x,
                top,
                (s + tw) / 2.0 + pad_x,
                top + th + 2.0 * pad_y,
            ];
            let pill_radius = (pill[3] - pill[1]) / 2.0;
            framed_rounded_rect(&mut ctx, pill, pill_radius, line * 0.6, INK, PILL);
            painter.fill(&mut ctx, &layout, ((s - tw) / 2.0, top + pad_y));
        }
    }

    ctx.flush();
    let mut pixmap = Pixmap::new(side, side);
    ctx.render_to_pixmap(&mut pixmap);

    // The opaque tile covers every pixel, so premultiplied and straight alpha coincide
    RgbaImage::from_raw(size, size, pixmap.data_as_u8_slice().to_vec())
        .ok_or_else(|| TimelineError::asset("rendered card has an unexpected buffer size"))
}

/// Common locations of a bold sans-serif font
const SYSTEM_FONT_CANDIDATES: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Bytes of the first installed font from a short list of well-known paths
pub(crate) fn system_font() -> Option<Vec<u8>> {
    SYSTEM_FONT_CANDIDATES.iter().find_map(|path| {
        let bytes = std::fs::read(path).ok()?;
        log::debug!("Using card font {}", path);
        Some(bytes)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_card_without_font_uses_color_swatch() {
        let card = render_card("GREEN", 128, None).unwrap();
        assert_eq!(card.dimensions(), (128, 128));
        assert_eq!(*card.get_pixel(64, 53), Rgba([0x34, 0xC7, 0x59, 255]));
        assert_eq!(*card.get_pixel(1, 1), Rgba(TILE));
        // Border ring
        assert_eq!(*card.get_pixel(64, 4), Rgba(INK));
    }

    #[test]
    fn test_panel_color_is_stable() {
        assert_eq!(card_color("Q"), card_color("Q"));
        assert_eq!(card_color("red"), [0xFF, 0x3B, 0x30, 255]);
    }

    #[test]
    fn test_text_color_contrasts_with_panel() {
        assert_eq!(text_color([0xFF, 0xFF, 0xFF, 255]), INK);
        assert_eq!(text_color([0x0F, 0x3C, 0xAA, 255]), LIGHT_TEXT);
    }

    #[test]
    fn test_invalid_font_is_an_asset_error() {
        let result = render_card("A", 64, Some(&[0u8; 32]));
        assert!(matches!(result, Err(TimelineError::AssetError(_))));
    }

    #[test]
    fn test_oversized_card_rejected() {
        assert!(render_card("A", MAX_CARD_SIZE + 1, None).is_err());
    }

    #[test]
    fn test_label_and_caption_are_drawn() {
        let Some(font) = system_font() else {
            eprintln!("no system font installed, skipping text rendering check");
            return;
        };
        let size = 256;
        let blank = render_card("A", size, None).unwrap();
        let lettered = render_card("A", size, Some(&font)).unwrap();

        let panel_color = Rgba(card_color("A"));
        let changed_in_panel = (52..205)
            .flat_map(|x| (41..174).map(move |y| (x, y)))
            .filter(|&(x, y)| {
                *blank.get_pixel(x, y) == panel_color && *lettered.get_pixel(x, y) != panel_color
            })
            .count();
        assert!(changed_in_panel > 100, "label glyphs missing: {changed_in_panel}");

        let pill_pixels = (0..size)
            .flat_map(|x| (189..size).map(move |y| (x, y)))
            .filter(|&(x, y)| *lettered.get_pixel(x, y) == Rgba(PILL))
            .count();
        assert!(pill_pixels > 100, "caption pill missing: {pill_pixels}");
        assert!(blank.pixels().all(|p| *p != Rgba(PILL)));

        // No caption for labels outside the alphabet table
        let plain = render_card("Z", size, Some(&font)).unwrap();
        assert!(plain.pixels().all(|p| *p != Rgba(PILL)));
    }
}
