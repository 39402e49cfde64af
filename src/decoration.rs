//! Decoration pass – page numbers, continuation indicators and tracking
//! numbers, drawn once per page after all content is laid out.

use crate::config::{Alignment, LetterConfig, Location, ShowPolicy, PAGE_PLACEHOLDER};
use crate::geometry::{available_width, PageGeometry};
use crate::style::EffectiveStyle;
use crate::units::pt_to_mm;
use crate::writer::DocumentWriter;

/// x of an element of `text_width` mm aligned between the margins.
pub fn aligned_x(alignment: Alignment, page_width: f32, left: f32, right: f32, text_width: f32) -> f32 {
    match alignment {
        Alignment::Left => left,
        Alignment::Right => page_width - right - text_width,
        Alignment::Center => left + (available_width(page_width, left, right) - text_width) / 2.0,
    }
}

/// `format` with every `#` replaced by `page`.
pub fn format_page(format: &str, page: usize) -> String {
    format.replace(PAGE_PLACEHOLDER, &page.to_string())
}

/// Top of a text line vertically centred in the header or footer margin.
fn row_y(location: Location, geometry: &PageGeometry, font_size: f32) -> f32 {
    let text_height = pt_to_mm(font_size);
    match location {
        Location::Header => (geometry.margin_y - text_height) / 2.0,
        Location::Footer => geometry.height - geometry.margin_y + (geometry.margin_y - text_height) / 2.0,
    }
}

/// One element of a decoration row.
struct Mark<'a> {
    show: ShowPolicy,
    text: &'a str,
    location: Location,
    alignment: Alignment,
}

/// Draw page numbers, continuation indicators and the tracking number on
/// every page of `writer`. Returns the number of elements drawn.
pub fn decorate<W: DocumentWriter + ?Sized>(
    writer: &mut W,
    config: &LetterConfig,
    geometry: &PageGeometry,
    style: &EffectiveStyle,
) -> usize {
    let total = writer.page_count();
    let mut drawn = 0;

    writer.set_font(&style.font_face, false, false);
    writer.set_font_size(style.size_normal);

    for page in 1..=total {
        writer.set_page(page);

        let page_number = format_page(&config.page_numbers.format, page);
        let next_page = format_page(&config.next_page.format, page + 1);
        let tracking = config.letter_number.text();

        let marks = [
            Mark {
                show: config.page_numbers.show,
                text: &page_number,
                location: config.page_numbers.location,
                alignment: config.page_numbers.alignment,
            },
            Mark {
                // Never on the last page: there is no next page to point to.
                show: if page < total {
                    config.next_page.show
                } else {
                    ShowPolicy::Never
                },
                text: &next_page,
                location: config.next_page.location,
                alignment: config.next_page.alignment,
            },
            Mark {
                show: if tracking.is_some() {
                    ShowPolicy::Always
                } else {
                    ShowPolicy::Never
                },
                text: tracking.unwrap_or_default(),
                location: config.letter_number.location,
                alignment: config.letter_number.alignment,
            },
        ];

        for mark in marks.iter().filter(|m| m.show.shows_on(page)) {
            let width = writer.text_width(mark.text);
            let x = aligned_x(
                mark.alignment,
                geometry.width,
                geometry.margin_x,
                geometry.margin_x,
                width,
            );
            let y = row_y(mark.location, geometry, style.size_normal);
            writer.text(mark.text, x, y);
            drawn += 1;
        }
    }

    writer.set_page(total);
    log::debug!("Decorated {} page(s) with {} element(s)", total, drawn);
    drawn
}
