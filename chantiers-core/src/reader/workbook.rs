//! Workbook data structures

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::path::PathBuf;

/// Represents a complete workbook
#[derive(Debug, Clone)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get the first sheet whose name starts with the given prefix
    pub fn find_sheet_with_prefix(&self, prefix: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name.starts_with(prefix))
    }

    /// Get all sheet names
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Represents a worksheet
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub cells: HashMap<(u32, u32), Cell>,
    /// Styles of xlsx cells, including styled cells holding no value
    pub styles: HashMap<(u32, u32), CellStyle>,
    pub used_range: Option<(u32, u32)>, // (rows, cols)
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get a cell at the given position
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Set a cell value, growing the used range as needed
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        let value = value.into();
        self.grow(row, col);
        self.cells.insert((row, col), Cell { row, col, value });
    }

    /// Set a cell style, growing the used range as needed
    pub fn set_style(&mut self, row: u32, col: u32, style: CellStyle) {
        self.grow(row, col);
        self.styles.insert((row, col), style);
    }

    fn grow(&mut self, row: u32, col: u32) {
        let (rows, cols) = self.used_range.unwrap_or((0, 0));
        self.used_range = Some((rows.max(row + 1), cols.max(col + 1)));
    }

    /// Number of rows in the used range
    pub fn max_row(&self) -> u32 {
        self.used_range.map(|(rows, _)| rows).unwrap_or(0)
    }

    /// Number of columns in the used range
    pub fn max_col(&self) -> u32 {
        self.used_range.map(|(_, cols)| cols).unwrap_or(0)
    }

    /// Number of cells (valued or styled) up to the last one of the given row
    pub fn row_width(&self, row: u32) -> u32 {
        self.cells
            .keys()
            .chain(self.styles.keys())
            .filter(|(r, _)| *r == row)
            .map(|(_, c)| c + 1)
            .max()
            .unwrap_or(0)
    }

    /// Display value of a cell, empty string when the cell does not exist
    pub fn value(&self, row: u32, col: u32) -> String {
        self.get_cell(row, col)
            .map(|c| c.value.to_string())
            .unwrap_or_default()
    }

    /// Integer value of a cell (numbers are truncated, text is parsed)
    pub fn int(&self, row: u32, col: u32) -> Option<i64> {
        self.float(row, col).map(|f| f.trunc() as i64)
    }

    /// Float value of a cell (text is parsed)
    pub fn float(&self, row: u32, col: u32) -> Option<f64> {
        match &self.get_cell(row, col)?.value {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(t) => t.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Date value of a cell, from an Excel serial number or a dd/mm/yyyy or ISO text
    pub fn date(&self, row: u32, col: u32) -> Option<NaiveDate> {
        match &self.get_cell(row, col)?.value {
            CellValue::Number(n) => date_from_serial(*n),
            CellValue::Text(t) => parse_date_text(t.trim()),
            _ => None,
        }
    }

    /// Get the style of a cell
    pub fn style(&self, row: u32, col: u32) -> Option<&CellStyle> {
        self.styles.get(&(row, col))
    }

    /// Solid fill colour (ARGB) of a cell, empty string when not filled
    pub fn fill_color(&self, row: u32, col: u32) -> &str {
        self.style(row, col)
            .and_then(|s| s.fill.as_deref())
            .unwrap_or("")
    }
}

/// Represents a single cell
#[derive(Debug, Clone)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(t) => t.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(t) => write!(f, "{}", t),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

/// Visual style of a cell: solid fill colour and border sides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStyle {
    /// ARGB colour of a solid fill (e.g. "FFFDE9D9")
    pub fill: Option<String>,
    pub border: Border,
}

impl CellStyle {
    pub fn filled(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Default::default()
        }
    }

    pub fn bordered(border: Border) -> Self {
        Self { fill: None, border }
    }
}

/// Border line styles of each cell side ("thin", "medium", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Border {
    pub left: Option<String>,
    pub right: Option<String>,
    pub top: Option<String>,
    pub bottom: Option<String>,
}

impl Border {
    pub fn has_left(&self) -> bool {
        is_drawn(&self.left)
    }

    pub fn has_right(&self) -> bool {
        is_drawn(&self.right)
    }

    pub fn has_top(&self) -> bool {
        is_drawn(&self.top)
    }

    pub fn has_bottom(&self) -> bool {
        is_drawn(&self.bottom)
    }
}

fn is_drawn(side: &Option<String>) -> bool {
    matches!(side.as_deref(), Some(s) if !s.is_empty() && s != "none")
}

/// Print integral numbers without decimals, like Excel does for general format
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Convert an Excel serial date number to a calendar date
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    excel_epoch()?.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Convert a calendar date to an Excel serial date number
pub fn serial_from_date(date: NaiveDate) -> f64 {
    excel_epoch()
        .map(|epoch| (date - epoch).num_days() as f64)
        .unwrap_or_default()
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(text, "%d/%m/%Y") {
        return Some(d);
    }
    text.get(..10)
        .and_then(|iso| NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_formatting() {
        let mut sheet = Sheet::new("Test");
        sheet.set_value(0, 0, 12.0);
        sheet.set_value(0, 1, 2.5);
        sheet.set_value(0, 2, "PT 182002");

        assert_eq!(sheet.value(0, 0), "12");
        assert_eq!(sheet.value(0, 1), "2.5");
        assert_eq!(sheet.value(0, 2), "PT 182002");
        assert_eq!(sheet.value(5, 5), "");
        assert_eq!(sheet.max_row(), 1);
        assert_eq!(sheet.max_col(), 3);
    }

    #[test]
    fn test_numeric_accessors() {
        let mut sheet = Sheet::new("Test");
        sheet.set_value(0, 0, 12.7);
        sheet.set_value(0, 1, " 45 ");
        sheet.set_value(0, 2, "abc");

        assert_eq!(sheet.int(0, 0), Some(12));
        assert_eq!(sheet.int(0, 1), Some(45));
        assert_eq!(sheet.int(0, 2), None);
        assert_eq!(sheet.float(3, 3), None);
    }

    #[test]
    fn test_dates() {
        let mut sheet = Sheet::new("Test");
        // 2019-02-04 is serial 43500
        sheet.set_value(0, 0, 43500.0);
        sheet.set_value(0, 1, "05/02/2019");
        sheet.set_value(0, 2, "2019-02-06T00:00:00");

        let expected = NaiveDate::from_ymd_opt(2019, 2, 4);
        assert_eq!(sheet.date(0, 0), expected);
        assert_eq!(sheet.date(0, 1), NaiveDate::from_ymd_opt(2019, 2, 5));
        assert_eq!(sheet.date(0, 2), NaiveDate::from_ymd_opt(2019, 2, 6));
        assert_eq!(serial_from_date(expected.unwrap()), 43500.0);
    }

    #[test]
    fn test_row_width_counts_styled_cells() {
        let mut sheet = Sheet::new("Test");
        sheet.set_value(2, 1, "x");
        sheet.set_style(2, 6, CellStyle::filled("FFFFFFFF"));

        assert_eq!(sheet.row_width(2), 7);
        assert_eq!(sheet.row_width(0), 0);
        assert_eq!(sheet.fill_color(2, 6), "FFFFFFFF");
        assert_eq!(sheet.fill_color(2, 1), "");
    }

    #[test]
    fn test_border_sides() {
        let border = Border {
            left: Some("thin".to_string()),
            bottom: Some("none".to_string()),
            ..Default::default()
        };
        assert!(border.has_left());
        assert!(!border.has_bottom());
        assert!(!border.has_top());
    }
}
