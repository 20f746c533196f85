//! Excel file reader using calamine

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

pub mod workbook;
pub mod xml_parser;

pub use workbook::{Border, Cell, CellStyle, CellValue, Sheet, Workbook};

/// Read a workbook from a file path
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let mut excel: Sheets<_> = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let mut sheets = Vec::new();
    for sheet_name in excel.sheet_names() {
        let range = excel.worksheet_range(&sheet_name).ok();
        sheets.push(parse_sheet(&sheet_name, range.as_ref()));
    }

    // Cell styles are only available for XLSX files
    let is_xlsx = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))
            .with_context(|| format!("Failed to read archive: {}", path.display()))?;
        let styles = xml_parser::parse_styles(&mut archive).unwrap_or_default();
        if !styles.is_empty() {
            let sheet_paths = xml_parser::extract_sheet_paths(&mut archive).unwrap_or_default();
            for (index, sheet) in sheets.iter_mut().enumerate() {
                let sheet_path = sheet_paths
                    .get(&sheet.name)
                    .cloned()
                    .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));
                apply_styles(&mut archive, &sheet_path, &styles, sheet);
            }
        }
    }

    debug!(
        file = %path.display(),
        sheets = sheets.len(),
        "workbook read"
    );

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
    })
}

fn apply_styles(
    archive: &mut zip::ZipArchive<impl std::io::Read + std::io::Seek>,
    sheet_path: &str,
    styles: &[CellStyle],
    sheet: &mut Sheet,
) {
    let Ok(cell_styles) = xml_parser::extract_cell_style_indices(archive, sheet_path) else {
        return;
    };
    for ((row, col), style_idx) in cell_styles {
        if let Some(style) = styles.get(style_idx) {
            if *style != CellStyle::default() {
                sheet.set_style(row, col, style.clone());
            }
        }
    }
}

fn parse_sheet(name: &str, range: Option<&Range<Data>>) -> Sheet {
    let mut sheet = Sheet::new(name);
    let Some(range) = range else {
        return sheet;
    };
    let Some((start_row, start_col)) = range.start() else {
        return sheet;
    };
    let (rows, cols) = range.get_size();

    let mut cells = HashMap::new();
    for rel_row in 0..rows {
        for rel_col in 0..cols {
            let Some(data) = range.get((rel_row, rel_col)) else {
                continue;
            };
            if matches!(data, Data::Empty) {
                continue;
            }
            let row = start_row + rel_row as u32;
            let col = start_col + rel_col as u32;
            cells.insert((row, col), parse_cell_value(data));
        }
    }
    for ((row, col), value) in cells {
        sheet.set_value(row, col, value);
    }
    sheet
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
