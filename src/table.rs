//! Table layout for [`PdfCanvas`]: equal-width columns, wrapped cell text,
//! header repeated on every page the table spans.

use crate::canvas::PdfCanvas;
use crate::fonts::{wrap_text, FontKey};
use crate::inline::strip_emphasis;
use crate::markdown::ColumnAlign;
use crate::units::{mm_to_pt, pt_to_mm};
use crate::writer::{DocumentWriter, Table, TableTheme};

/// Inner cell padding in mm.
const CELL_PADDING: f32 = 1.5;
/// Line height of cell text as a multiple of the font size.
const CELL_LINE_HEIGHT: f32 = 1.4;
const STRIPE_FILL: [f32; 3] = [0.96, 0.96, 0.96];

struct RowLayout {
    lines: Vec<Vec<String>>,
    height: f32,
}

fn layout_row(canvas: &PdfCanvas, table: &Table<'_>, cells: &[String], bold: bool, col_width: f32) -> RowLayout {
    let line_height = pt_to_mm(table.font_size) * CELL_LINE_HEIGHT;
    let key = FontKey::new(canvas.fonts().family_for(table.font_face), bold, false);
    let max_width = mm_to_pt(col_width - 2.0 * CELL_PADDING);

    let lines: Vec<Vec<String>> = cells
        .iter()
        .map(|cell| wrap_text(&strip_emphasis(cell), table.font_size, key, max_width, canvas.fonts()))
        .collect();
    let max_lines = lines.iter().map(Vec::len).max().unwrap_or(1).max(1);

    RowLayout {
        lines,
        height: max_lines as f32 * line_height + 2.0 * CELL_PADDING,
    }
}

fn draw_row(
    canvas: &mut PdfCanvas,
    table: &Table<'_>,
    row: &RowLayout,
    y: f32,
    col_width: f32,
    bold: bool,
    fill: Option<[f32; 3]>,
) {
    let line_height = pt_to_mm(table.font_size) * CELL_LINE_HEIGHT;

    if let Some(fill) = fill {
        canvas.fill_rect(table.x, y, table.width, row.height, fill);
    }

    canvas.set_font(table.font_face, bold, false);
    canvas.set_font_size(table.font_size);
    for (col, lines) in row.lines.iter().enumerate() {
        let cell_x = table.x + col as f32 * col_width;
        let align = table.align.get(col).copied().unwrap_or_default();
        for (i, line) in lines.iter().enumerate() {
            let w = canvas.text_width(line);
            let x = match align {
                ColumnAlign::Left => cell_x + CELL_PADDING,
                ColumnAlign::Right => cell_x + col_width - CELL_PADDING - w,
                ColumnAlign::Center => cell_x + (col_width - w) / 2.0,
            };
            canvas.text(line, x, y + CELL_PADDING + i as f32 * line_height);
        }
    }

    let color = table.style.border_color;
    let width = crate::canvas::DEFAULT_LINE_WIDTH;
    match table.style.theme {
        TableTheme::Grid => {
            let bottom = y + row.height;
            canvas.stroke(table.x, y, table.x + table.width, y, width, color);
            canvas.stroke(table.x, bottom, table.x + table.width, bottom, width, color);
            for col in 0..=row.lines.len() {
                let x = table.x + col as f32 * col_width;
                canvas.stroke(x, y, x, bottom, width, color);
            }
        }
        TableTheme::Striped => {
            let bottom = y + row.height;
            canvas.stroke(table.x, bottom, table.x + table.width, bottom, width, color);
        }
        TableTheme::Plain => {}
    }
}

/// Lay the table out on `canvas`. See [`DocumentWriter::table`].
pub(crate) fn draw_table(canvas: &mut PdfCanvas, table: &Table<'_>) -> f32 {
    let columns = table
        .header
        .len()
        .max(table.rows.iter().map(Vec::len).max().unwrap_or(0));
    if columns == 0 {
        return table.start_y;
    }
    let col_width = table.width / columns as f32;
    let limit = canvas.page_height() - table.bottom_margin;
    let header_bold = table.style.header_bold;
    let header_fill = match table.style.theme {
        TableTheme::Plain => None,
        _ => Some(table.style.header_fill),
    };

    let mut header_cells = table.header.to_vec();
    header_cells.resize(columns, String::new());
    let header = layout_row(canvas, table, &header_cells, header_bold, col_width);

    let mut y = table.start_y;
    if y + header.height > limit && y > table.top_margin {
        next_page(canvas);
        y = table.top_margin;
    }
    draw_row(canvas, table, &header, y, col_width, header_bold, header_fill);
    y += header.height;

    for (index, cells) in table.rows.iter().enumerate() {
        let mut cells = cells.clone();
        cells.resize(columns, String::new());
        let row = layout_row(canvas, table, &cells, false, col_width);

        if y + row.height > limit && y > table.top_margin + header.height {
            log::debug!("Table row {} continues on the next page", index + 1);
            next_page(canvas);
            y = table.top_margin;
            draw_row(canvas, table, &header, y, col_width, header_bold, header_fill);
            y += header.height;
        }

        let fill = match table.style.theme {
            TableTheme::Striped if index % 2 == 1 => Some(STRIPE_FILL),
            _ => None,
        };
        draw_row(canvas, table, &row, y, col_width, false, fill);
        y += row.height;
    }

    y
}

/// Move to the following page, creating it when the table is on the last one.
fn next_page(canvas: &mut PdfCanvas) {
    let next = canvas.current_page() + 1;
    if next > canvas.page_count() {
        canvas.add_page();
    } else {
        canvas.set_page(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawItem;
    use crate::writer::TableStyle;

    fn table<'a>(header: &'a [String], rows: &'a [Vec<String>], align: &'a [ColumnAlign], start_y: f32) -> Table<'a> {
        Table {
            header,
            rows,
            align,
            style: TableStyle::default(),
            font_face: "Helvetica",
            font_size: 10.0,
            x: 38.0,
            width: 139.9,
            start_y,
            top_margin: 13.0,
            bottom_margin: 13.0,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn small_table_stays_on_page() {
        let mut canvas = PdfCanvas::new("t", 215.9, 279.4);
        let header = strings(&["Item", "Cost"]);
        let rows = vec![strings(&["Pens", "$2"]), strings(&["**Ink**", "$9"])];
        let align = [ColumnAlign::Left, ColumnAlign::Right];
        let end = canvas.table(&table(&header, &rows, &align, 50.0));

        assert_eq!(canvas.page_count(), 1);
        assert!(end > 50.0);
        let doc = canvas.document();
        assert_eq!(doc.page_text(1), "Item Cost Pens $2 Ink $9");
        assert!(doc.pages[0].items.iter().any(|i| matches!(i, DrawItem::Rect { .. })));
    }

    #[test]
    fn right_aligned_column_hugs_the_edge() {
        let mut canvas = PdfCanvas::new("t", 215.9, 279.4);
        let header = strings(&["A", "B"]);
        let rows = vec![strings(&["x", "y"])];
        let align = [ColumnAlign::Left, ColumnAlign::Right];
        canvas.table(&table(&header, &rows, &align, 20.0));
        let x_y = {
            let texts = canvas.document().texts(1);
            texts.iter().find(|(t, _, _)| *t == "y").map(|(_, x, _)| *x).unwrap()
        };
        let right_edge = 38.0 + 139.9 - CELL_PADDING;
        canvas.set_font("Helvetica", false, false);
        canvas.set_font_size(10.0);
        assert!((x_y + canvas.text_width("y") - right_edge).abs() < 0.01);
    }

    #[test]
    fn long_table_continues_with_repeated_header() {
        let mut canvas = PdfCanvas::new("t", 215.9, 279.4);
        let header = strings(&["Name", "Value"]);
        let rows: Vec<Vec<String>> = (0..60).map(|i| strings(&[&format!("row {i}"), "v"])).collect();
        let align = [ColumnAlign::Left, ColumnAlign::Left];
        let end = canvas.table(&table(&header, &rows, &align, 200.0));

        assert!(canvas.page_count() >= 2);
        assert_eq!(canvas.current_page(), canvas.page_count());
        assert!(end <= 279.4 - 13.0);
        let page2 = canvas.document().texts(2);
        assert_eq!(page2[0].0, "Name");
        assert!((page2[0].2 - (13.0 + CELL_PADDING)).abs() < 1e-4);
    }
}
