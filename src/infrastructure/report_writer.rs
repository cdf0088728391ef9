use std::borrow::Cow;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::domain::error::Result;
use crate::domain::report::{Report, SheetKind};

/// Excel's per-cell text limit, in characters.
const MAX_CELL_CHARS: usize = 32_767;
const TRUNCATION_MARKER: &str = " [truncated]";

/// Writes a report as an `.xlsx` workbook, one worksheet per sheet, in
/// report order.
pub fn write_xlsx(report: &Report, path: &Path) -> Result<()> {
    let header_format = Format::new().set_bold();
    let cell_format = Format::new().set_text_wrap();

    let mut workbook = Workbook::new();
    for sheet in &report.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.title())?;

        for (col, header) in sheet.headers().iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, *header, &header_format)?;
            worksheet.set_column_width(col, column_width(sheet.kind, header))?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (index, row) in sheet.rows.iter().enumerate() {
            let row_number = index as u32 + 1;
            for (col, value) in row.iter().enumerate() {
                let text = fit_cell(value);
                if let Cow::Owned(_) = text {
                    tracing::warn!(
                        sheet = sheet.title(),
                        row = row_number,
                        column = col,
                        chars = value.chars().count(),
                        "cell text exceeds the Excel limit; truncating"
                    );
                }
                worksheet.write_string_with_format(row_number, col as u16, &*text, &cell_format)?;
            }
        }
    }

    workbook.save(path)?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

fn fit_cell(value: &str) -> Cow<'_, str> {
    if value.chars().count() <= MAX_CELL_CHARS {
        return value.into();
    }
    let keep = MAX_CELL_CHARS - TRUNCATION_MARKER.chars().count();
    let mut text: String = value.chars().take(keep).collect();
    text.push_str(TRUNCATION_MARKER);
    text.into()
}

fn column_width(kind: SheetKind, header: &str) -> f64 {
    match (kind, header) {
        (_, "ID") | (_, "Type") => 12.0,
        (SheetKind::BrdAnalysis, "Module") => 28.0,
        (_, "Steps") => 60.0,
        _ => 45.0,
    }
}
