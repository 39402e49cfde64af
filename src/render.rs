//! PDF serialisation – turns a recorded [`CanvasDocument`] into PDF bytes
//! using `printpdf` (v0.8 ops-based API) and the builtin base-14 fonts.

use printpdf::*;

use crate::canvas::{CanvasDocument, DrawItem};
use crate::fonts::{FontFamily, FontKey};
use crate::units::mm_to_pt;

/// Baseline offset below the top of the line box, as a multiple of the font
/// size.
const ASCENDER: f32 = 0.75;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a recorded canvas into PDF bytes.
///
/// Images that printpdf cannot decode are skipped with a `log::warn`.
pub fn render_pdf(canvas: &CanvasDocument) -> Vec<u8> {
    let page_w = Mm(canvas.page_width);
    let page_h = Mm(canvas.page_height);
    let page_h_pt = mm_to_pt(canvas.page_height);

    let mut doc = PdfDocument::new(&canvas.title);

    // ── Register images once ───────────────────────────────────────────────
    let mut img_warnings: Vec<PdfWarnMsg> = Vec::new();
    let images: Vec<Option<ImageResource>> = canvas
        .images
        .iter()
        .enumerate()
        .map(|(index, image)| match RawImage::decode_from_bytes(&image.bytes, &mut img_warnings) {
            Ok(raw) => Some(ImageResource {
                xobj_id: doc.add_image(&raw),
                px_width: image.px_width,
                px_height: image.px_height,
            }),
            Err(e) => {
                log::warn!("Skipping image {index}: PDF encode error: {e}");
                None
            }
        })
        .collect();

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages: Vec<PdfPage> = canvas
        .pages
        .iter()
        .map(|page| {
            let mut ops = Vec::new();
            for item in &page.items {
                render_item(&mut ops, item, page_h_pt, &images);
            }
            PdfPage::new(page_w, page_h, ops)
        })
        .collect();

    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    doc.save(&PdfSaveOptions::default(), &mut Vec::new())
}

/// Builtin font for a family and variant.
fn builtin_font(key: FontKey) -> BuiltinFont {
    match (key.family, key.bold, key.italic) {
        (FontFamily::Helvetica, false, false) => BuiltinFont::Helvetica,
        (FontFamily::Helvetica, true, false) => BuiltinFont::HelveticaBold,
        (FontFamily::Helvetica, false, true) => BuiltinFont::HelveticaOblique,
        (FontFamily::Helvetica, true, true) => BuiltinFont::HelveticaBoldOblique,
        (FontFamily::Times, false, false) => BuiltinFont::TimesRoman,
        (FontFamily::Times, true, false) => BuiltinFont::TimesBold,
        (FontFamily::Times, false, true) => BuiltinFont::TimesItalic,
        (FontFamily::Times, true, true) => BuiltinFont::TimesBoldItalic,
        (FontFamily::Courier, false, false) => BuiltinFont::Courier,
        (FontFamily::Courier, true, false) => BuiltinFont::CourierBold,
        (FontFamily::Courier, false, true) => BuiltinFont::CourierOblique,
        (FontFamily::Courier, true, true) => BuiltinFont::CourierBoldOblique,
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en dash
            '\u{2014}' => 0x97, // em dash
            '\u{00A0}' => 0x20, // non-breaking space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0xFF; printpdf passes these
    // bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn rgb(color: [f32; 3]) -> Color {
    Color::Rgb(Rgb {
        r: color[0],
        g: color[1],
        b: color[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Render one draw item into PDF ops. Canvas coordinates are mm from the
/// top-left corner; PDF coordinates are points from the bottom-left.
fn render_item(ops: &mut Vec<Op>, item: &DrawItem, page_h_pt: f32, images: &[Option<ImageResource>]) {
    match item {
        DrawItem::Text {
            text,
            x,
            y,
            font,
            size,
        } => {
            let font = builtin_font(*font);
            let baseline = page_h_pt - mm_to_pt(*y) - size * ASCENDER;

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(mm_to_pt(*x)),
                    y: Pt(baseline),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont { size: Pt(*size), font });
            ops.push(Op::SetFillColor {
                col: rgb([0.0, 0.0, 0.0]),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(text))],
                font,
            });
            ops.push(Op::EndTextSection);
        }
        DrawItem::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        } => {
            ops.push(Op::SetOutlineColor { col: rgb(*color) });
            ops.push(Op::SetOutlineThickness {
                pt: Pt(mm_to_pt(*width)),
            });
            ops.push(Op::DrawLine {
                line: Line {
                    points: vec![
                        point(mm_to_pt(*x1), page_h_pt - mm_to_pt(*y1)),
                        point(mm_to_pt(*x2), page_h_pt - mm_to_pt(*y2)),
                    ],
                    is_closed: false,
                },
            });
        }
        DrawItem::Rect {
            x,
            y,
            width,
            height,
            fill,
        } => {
            let x1 = mm_to_pt(*x);
            let x2 = mm_to_pt(x + width);
            let top = page_h_pt - mm_to_pt(*y);
            let bottom = page_h_pt - mm_to_pt(y + height);

            ops.push(Op::SetFillColor { col: rgb(*fill) });
            ops.push(Op::DrawPolygon {
                polygon: Polygon {
                    rings: vec![PolygonRing {
                        points: vec![point(x1, bottom), point(x2, bottom), point(x2, top), point(x1, top)],
                    }],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                },
            });
        }
        DrawItem::Image {
            image,
            x,
            y,
            width,
            height,
        } => {
            let Some(Some(res)) = images.get(*image) else {
                return;
            };
            // At dpi=72 printpdf renders 1 px = 1 pt, so
            // scale = desired_pt / px_dim.
            let scale_x = mm_to_pt(*width) / res.px_width.max(1) as f32;
            let scale_y = mm_to_pt(*height) / res.px_height.max(1) as f32;

            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(mm_to_pt(*x))),
                    translate_y: Some(Pt(page_h_pt - mm_to_pt(y + height))),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }
}
